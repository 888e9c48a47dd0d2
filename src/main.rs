use std::path::PathBuf;

use clap::{Parser, Subcommand};
use panefm::config::Config;
use panefm::gateway::LocalFs;
use panefm::{logging, shell};

#[derive(Parser)]
#[command(name = "panefm", about = "A multi-pane, multi-tab file browser shell")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive shell reading commands from stdin (default)
    Shell,
    /// List a directory once and exit
    Ls {
        /// Directory to list (default: current directory)
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load();
    let _log_guard = logging::init(&config.logging)?;

    match cli.command {
        None | Some(Commands::Shell) => {
            let rt = tokio::runtime::Runtime::new()?;
            let result = rt.block_on(shell::run(config));
            // The stdin reader may still be parked on a read
            rt.shutdown_background();
            result
        }
        Some(Commands::Ls { path }) => {
            let path = match path {
                Some(p) => p,
                None => std::env::current_dir()?,
            };
            for row in shell::list_once(&LocalFs, path)? {
                println!("{}", row);
            }
            Ok(())
        }
    }
}
