use clap::Parser;
use gham_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    gham_cli::init_tracing(cli.verbose);
    gham_cli::run(cli).await
}
