use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = webguard::cli::Cli::parse();
    if let Err(e) = webguard::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
