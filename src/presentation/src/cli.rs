//! Terminal front ends: the interactive chat and the task commands

pub mod chat;
pub mod tasks;

use clap::{Parser, Subcommand};

#[derive(Parser, Clone)]
#[command(name = "routine")]
#[command(about = "Daily routine tracker with an AI chat relay")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Run the chat relay server
    Serve {
        /// Address to listen on (defaults to ROUTINE_BIND)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Chat with the assistant about your tasks
    Chat {
        /// Relay base URL (defaults to ROUTINE_RELAY_URL)
        #[arg(long, value_name = "URL")]
        relay_url: Option<String>,
    },

    /// Manage routine tasks
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum TaskAction {
    /// Show weekday and weekend tasks
    List,

    /// Add a task
    Add {
        title: String,

        /// Time of day, HH:MM
        #[arg(long, value_name = "HH:MM")]
        time: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Add to the weekend routine instead of weekdays
        #[arg(long)]
        weekend: bool,
    },

    /// Mark a task done or pending
    Toggle { id: u64 },
}
