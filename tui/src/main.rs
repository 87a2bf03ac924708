use clap::Parser;
use huddle_tui::Cli;
use huddle_tui::run_main;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_main(cli).await?;
    Ok(())
}
