use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(author, version, about = "Workspace automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the test suite through cargo nextest
    Nextest {
        #[arg(long)]
        profile: Option<String>,
    },
    /// Run clippy across the workspace, denying warnings
    Clippy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile } => run_nextest(profile),
        Commands::Clippy => run_clippy(),
    }
}

fn run_nextest(profile: Option<String>) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["nextest", "run", "--workspace"]);
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    run(cmd, "cargo nextest run")
}

fn run_clippy() -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]);
    run(cmd, "cargo clippy")
}

fn run(mut cmd: Command, label: &str) -> Result<()> {
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{label} failed");
    }
    Ok(())
}
