use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use jumpback::app::{pop, push};
use jumpback::domain::errors::JumpError;
use jumpback::domain::model::PopOutcome;
use jumpback::infra::config::Config;
use jumpback::infra::editor::BbeditBridge;
use jumpback::infra::store::StackStore;

#[derive(Parser)]
#[command(author, version, about = "Save and restore a stack of jump points in BBEdit", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save the current document and selection onto the jump stack
    Push,
    /// Return to the most recently saved jump point
    Pop,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    jumpback::init(cli.verbose);

    let config = Config::load()?;
    let store = StackStore::new(config.stack_path()?, config.lock_timeout());
    let bridge = BbeditBridge::new(&config.editor.automation_command);

    match cli.command {
        Commands::Push => {
            let point = push::run(&bridge, &store, config.max_point_age())?;
            eprintln!(
                "pushed {} ({}..{})",
                point.file_path, point.selection.0, point.selection.1
            );
        }
        Commands::Pop => match pop::run(&bridge, &store) {
            Ok(PopOutcome::Popped(point)) => {
                eprintln!(
                    "jumped back to {} ({}..{})",
                    point.file_path, point.selection.0, point.selection.1
                );
            }
            Ok(PopOutcome::Empty) => eprintln!("nothing to pop"),
            Err(err @ JumpError::TargetMissing { .. }) => {
                return Err(err).context("the saved point was removed from the stack");
            }
            Err(err) => return Err(err.into()),
        },
    }
    Ok(())
}
