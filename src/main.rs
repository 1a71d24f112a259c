use clap::Parser;

use njagu::agent::LlmAgent;
use njagu::cli::Cli;
use njagu::config;
use njagu::dispatch::Dispatcher;
use njagu::ops::Toolkit;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so they never interleave with REPL output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("njagu starting");

    let config = config::load_config(&cli)?;
    tracing::info!(model = %config.model, workspace = %config.workspace.display(), "Config loaded");

    let toolkit = Toolkit::new(&config)?;
    let agent = LlmAgent::new(config, toolkit.clone());
    let mut dispatcher = Dispatcher::new(agent, &toolkit);

    let mut stdout = std::io::stdout();
    match cli.task() {
        Some(task) => {
            dispatcher.run_task(&task, &mut stdout).await?;
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            dispatcher.run_interactive(stdin, &mut stdout).await?;
        }
    }

    Ok(())
}
