use anyhow::Result;
use clap::Parser;

use domain::services::TaskRepository;
use infrastructure::config::Config;
use infrastructure::task_store::JsonTaskStore;
use presentation::cli::{chat, tasks, Cli, Command, TaskAction};
use presentation::web::{parse_bind_address, state::AppState, AxumServer};

#[tokio::main]
async fn main() -> Result<()> {
    shared::telemetry::init();

    let cli = Cli::parse();
    let config = Config::load();
    let store = JsonTaskStore::new(config.tasks_path.clone());

    match cli.command {
        Command::Serve { bind } => {
            let addr = parse_bind_address(bind.as_deref().unwrap_or(&config.bind_addr))?;
            let state = AppState::from_config(&config)?;
            AxumServer::new(state).run(addr).await?;
        }
        Command::Chat { relay_url } => {
            let relay_url = relay_url.unwrap_or_else(|| config.relay_url.clone());
            let snapshot = store.load()?.flatten();
            chat::run(&relay_url, snapshot).await?;
        }
        Command::Tasks { action } => match action {
            TaskAction::List => tasks::list(&store)?,
            TaskAction::Add {
                title,
                time,
                description,
                weekend,
            } => {
                tasks::add(&store, &title, time, description, weekend)?;
            }
            TaskAction::Toggle { id } => {
                tasks::toggle(&store, id)?;
            }
        },
    }

    Ok(())
}
