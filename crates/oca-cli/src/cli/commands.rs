use super::CliError;
use super::helpers::*;
use oca_core::common::FormulaVariant;
use oca_core::domain::CalibrationTool;
use oca_core::modules::ToolExecutor;
use oca_core::modules::absorption::{
    AbsorptionRequest, AbsorptionTool, DEFAULT_ABSORPTION_OUTPUT, absorption_summary,
};
use oca_core::modules::grey_disc::{DEFAULT_GREY_DISC_OUTPUT, GreyDiscRequest, GreyDiscTool};
use oca_core::modules::jobs::{
    HighStatJobsTool, HighStatParameters, JobEnvironment, JobRequest, ShadowingJobsTool,
    ShadowingParameters,
};
use oca_core::modules::pmt_response::{
    DEFAULT_PMT_OUTPUT, PmtResponseRequest, PmtResponseTool, pmt_response_summary,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Copy, clap::ValueEnum)]
pub(super) enum FormulaArg {
    /// A = L*S / (S - f*L)
    Ratio,
    /// A = 1 / (c - f/S)
    Reciprocal,
}

impl From<FormulaArg> for FormulaVariant {
    fn from(value: FormulaArg) -> Self {
        match value {
            FormulaArg::Ratio => Self::Ratio,
            FormulaArg::Reciprocal => Self::Reciprocal,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct AbsorptionArgs {
    /// Reference optics table holding RSLENGTH0 and ABSLENGTH0 curves
    #[arg(long)]
    optics_table: PathBuf,

    /// Directory the fit file names are resolved against
    #[arg(long)]
    fits_dir: Option<PathBuf>,

    /// Section of the optics table to read, e.g. 'index: "lightwater_sno"'
    #[arg(long)]
    section: Option<String>,

    /// Absorption formula variant
    #[arg(long, value_enum)]
    formula: Option<FormulaArg>,

    /// Rayleigh scattering scale factor
    #[arg(long)]
    scattering_factor: Option<f64>,

    /// Degree of the absorption ratio fit written to the table (1-3)
    #[arg(long)]
    fit_degree: Option<usize>,

    /// Output table path
    #[arg(long, default_value = DEFAULT_ABSORPTION_OUTPUT)]
    output: PathBuf,

    /// JSON run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON report output path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Laser fit files, ".ocadb" is appended when no extension is given
    #[arg(value_name = "FIT", required = true)]
    fits: Vec<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct PmtResponseArgs {
    /// Directory the fit file names are resolved against
    #[arg(long)]
    fits_dir: Option<PathBuf>,

    /// Output table path
    #[arg(long, default_value = DEFAULT_PMT_OUTPUT)]
    output: PathBuf,

    /// JSON run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON report output path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Laser fit files, ".ocadb" is appended when no extension is given
    #[arg(value_name = "FIT", required = true)]
    fits: Vec<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct GreyDiscArgs {
    /// Grey-disc parameter table with absorption_probability
    #[arg(long)]
    parameters: PathBuf,

    /// PMT response table written by pmt-response
    #[arg(long)]
    responses: PathBuf,

    /// Output table path
    #[arg(long, default_value = DEFAULT_GREY_DISC_OUTPUT)]
    output: PathBuf,

    /// JSON report output path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct EnvironmentArgs {
    /// RAT installation root
    #[arg(value_name = "RAT_ROOT")]
    rat_root: String,

    /// LOCAS installation root
    #[arg(value_name = "LOCAS_ROOT")]
    locas_root: String,

    /// LOCAS scratch data directory
    #[arg(value_name = "LOCAS_TMP")]
    locas_data_tmp: String,
}

impl From<EnvironmentArgs> for JobEnvironment {
    fn from(args: EnvironmentArgs) -> Self {
        Self {
            rat_root: args.rat_root,
            locas_root: args.locas_root,
            locas_data_tmp: args.locas_data_tmp,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct JobDirectoryFlags {
    /// Directory holding the macro and script templates
    #[arg(long, default_value = ".")]
    template_dir: PathBuf,

    /// Directory the generated files are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct HighStatJobsArgs {
    /// Base macro name; '<MACRO>.mac' is read from the template directory
    #[arg(value_name = "MACRO")]
    base_macro: String,

    /// Number of cycles
    #[arg(value_name = "CYCLES")]
    cycles: u32,

    /// Events simulated per cycle
    #[arg(value_name = "EVENTS")]
    events_per_cycle: u64,

    /// Job identifier appended to the script names
    #[arg(value_name = "JOB_ID")]
    job_id: String,

    #[command(flatten)]
    environment: EnvironmentArgs,

    #[command(flatten)]
    directories: JobDirectoryFlags,
}

#[derive(clap::Args)]
pub(super) struct ShadowingJobsArgs {
    /// Source x position (mm)
    #[arg(value_name = "X", allow_hyphen_values = true)]
    x: String,

    /// Source y position (mm)
    #[arg(value_name = "Y", allow_hyphen_values = true)]
    y: String,

    /// Source z position (mm)
    #[arg(value_name = "Z", allow_hyphen_values = true)]
    z: String,

    /// Laser wavelength (nm)
    #[arg(value_name = "WAVELENGTH")]
    wavelength: String,

    /// Number of cycles per configuration
    #[arg(value_name = "JOBS")]
    jobs: u32,

    /// Events simulated per cycle
    #[arg(value_name = "EVENTS")]
    events_per_job: u64,

    /// Job identifier used as the file-name prefix
    #[arg(value_name = "JOB_ID")]
    job_id: String,

    #[command(flatten)]
    environment: EnvironmentArgs,

    #[command(flatten)]
    directories: JobDirectoryFlags,
}

pub(super) fn run_absorption_command(args: AbsorptionArgs) -> Result<i32, CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(section) = args.section {
        config.optics_section = section;
    }
    if let Some(formula) = args.formula {
        config.formula = formula.into();
    }
    if let Some(factor) = args.scattering_factor {
        config.scattering_factor = factor;
    }
    if let Some(degree) = args.fit_degree {
        config.fit_degree = degree;
    }

    let request = AbsorptionRequest {
        fit_paths: resolve_fit_paths(args.fits_dir.as_deref(), &args.fits),
        optics_table: args.optics_table,
        output_path: args.output,
        config,
    };
    info!(
        tool = %CalibrationTool::Absorption,
        fits = request.fit_paths.len(),
        formula = request.config.formula.as_str(),
        "starting"
    );

    let report = AbsorptionTool.execute(&request)?;
    println!("{}", absorption_summary(&report.analysis));
    print_artifacts(&report.artifacts);
    write_report(args.report.as_deref(), &report)?;
    Ok(0)
}

pub(super) fn run_pmt_response_command(args: PmtResponseArgs) -> Result<i32, CliError> {
    let request = PmtResponseRequest {
        fit_paths: resolve_fit_paths(args.fits_dir.as_deref(), &args.fits),
        output_path: args.output,
        config: load_config(args.config.as_deref())?,
    };
    info!(
        tool = %CalibrationTool::PmtResponse,
        fits = request.fit_paths.len(),
        "starting"
    );

    let report = PmtResponseTool.execute(&request)?;
    println!("{}", pmt_response_summary(&report.matrix));
    print_artifacts(&report.artifacts);
    write_report(args.report.as_deref(), &report)?;
    Ok(0)
}

pub(super) fn run_grey_disc_command(args: GreyDiscArgs) -> Result<i32, CliError> {
    let request = GreyDiscRequest {
        parameters_path: args.parameters,
        responses_path: args.responses,
        output_path: args.output,
    };
    info!(tool = %CalibrationTool::GreyDisc, "starting");

    let report = GreyDiscTool.execute(&request)?;
    println!(
        "corrected {} of {} angle bins in {} wavelength rows",
        report.corrected_bins, report.angle_bins, report.rows
    );
    print_artifacts(&report.artifacts);
    write_report(args.report.as_deref(), &report)?;
    Ok(0)
}

pub(super) fn run_high_stat_jobs_command(args: HighStatJobsArgs) -> Result<i32, CliError> {
    let request = JobRequest {
        parameters: HighStatParameters {
            base_macro: args.base_macro,
            cycles: args.cycles,
            events_per_cycle: args.events_per_cycle,
            job_id: args.job_id,
            environment: args.environment.into(),
        },
        template_dir: args.directories.template_dir,
        output_dir: args.directories.output_dir,
    };
    info!(
        tool = %CalibrationTool::HighStatJobs,
        cycles = request.parameters.cycles,
        "starting"
    );

    let report = HighStatJobsTool.execute(&request)?;
    print_artifacts(&report.artifacts);
    Ok(0)
}

pub(super) fn run_shadowing_jobs_command(args: ShadowingJobsArgs) -> Result<i32, CliError> {
    let request = JobRequest {
        parameters: ShadowingParameters {
            x: args.x,
            y: args.y,
            z: args.z,
            wavelength: args.wavelength,
            jobs: args.jobs,
            events_per_job: args.events_per_job,
            job_id: args.job_id,
            environment: args.environment.into(),
        },
        template_dir: args.directories.template_dir,
        output_dir: args.directories.output_dir,
    };
    info!(
        tool = %CalibrationTool::ShadowingJobs,
        jobs = request.parameters.jobs,
        total_events = request.parameters.total_events(),
        "starting"
    );

    let report = ShadowingJobsTool.execute(&request)?;
    print_artifacts(&report.artifacts);
    Ok(0)
}
