use clap::{Parser, Subcommand};
use crowd_mechanics::{CallArgs, run_crowd_mechanics};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(about = "2D mechanical crowd simulation: one call advances one coarse step", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one coarse step from an XML file set
    Run {
        /// Path to the Parameters file
        parameters: PathBuf,
        /// Materials file name, resolved against the Parameters file's Static directory
        materials: PathBuf,
        /// Geometry file name, resolved against the Static directory
        geometry: PathBuf,
        /// Agents file name, resolved against the Static directory
        agents: PathBuf,
        /// Agent Dynamics file name, resolved against the Dynamic directory
        dynamics: PathBuf,
        /// Optional Agent Interactions file name, resolved against the Dynamic directory
        interactions: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let status = match cli.command {
        Command::Run {
            parameters,
            materials,
            geometry,
            agents,
            dynamics,
            interactions,
        } => run_crowd_mechanics(&CallArgs {
            parameters,
            materials,
            geometry,
            agents,
            dynamics,
            interactions,
        }),
    };

    match u8::try_from(status) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}
