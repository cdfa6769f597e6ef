use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = corsproxy::cli::Cli::parse();
    if let Err(e) = corsproxy::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
