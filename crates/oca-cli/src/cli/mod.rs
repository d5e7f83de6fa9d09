mod commands;
mod helpers;

use clap::Parser;
use oca_core::domain::OcaError;

const PROGRAM_NAME: &str = "oca2rat";

pub fn run_from_env() -> i32 {
    let args = std::iter::once(PROGRAM_NAME.to_string())
        .chain(std::env::args().skip(1))
        .collect::<Vec<_>>();

    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let oca_error = error.as_oca_error();
            eprintln!("{}", oca_error.diagnostic_line());
            eprintln!("{}", oca_error.fatal_exit_line());
            oca_error.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "oca2rat",
    version,
    about = "Optical calibration tables and batch jobs for the RAT simulation"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Derive absorption lengths from laser attenuation fits and write the OPTICS table
    Absorption(commands::AbsorptionArgs),
    /// Interpolate PMT angular responses onto the simulation wavelength grid
    PmtResponse(commands::PmtResponseArgs),
    /// Correct grey-disc absorption probabilities with the PMT angular response
    GreyDisc(commands::GreyDiscArgs),
    /// Generate per-cycle macros and scripts for a high-statistics simulation run
    HighStatJobs(commands::HighStatJobsArgs),
    /// Generate macros, scripts and submission files for a shadowing study
    ShadowingJobs(commands::ShadowingJobsArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Absorption(args) => commands::run_absorption_command(args),
        CliCommand::PmtResponse(args) => commands::run_pmt_response_command(args),
        CliCommand::GreyDisc(args) => commands::run_grey_disc_command(args),
        CliCommand::HighStatJobs(args) => commands::run_high_stat_jobs_command(args),
        CliCommand::ShadowingJobs(args) => commands::run_shadowing_jobs_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(OcaError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_oca_error(&self) -> OcaError {
        match self {
            Self::Usage(message) => OcaError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => OcaError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

impl From<OcaError> for CliError {
    fn from(error: OcaError) -> Self {
        Self::Compute(error)
    }
}
