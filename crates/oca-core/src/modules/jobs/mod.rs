//! Batch-job file generation from macro and shell-script templates.
//!
//! Every planned file is rendered in memory before the first one is written,
//! so a missing template or an unresolved placeholder leaves the output
//! directory untouched.

mod model;
mod template;

use super::ToolExecutor;
use crate::domain::{ComputeResult, OcaError, OcaResult, OutputArtifact};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use model::{
    HighStatParameters, JobEnvironment, PlannedFile, SHADOWING_CONFIGURATIONS, SHADOWING_CORES,
    ShadowingParameters, high_stat_macro_name, high_stat_plan, high_stat_script_name, rhm_stem,
    shadowing_cycle_stem, shadowing_plan, submission_script_name, whm_stem,
};
pub use template::{PlaceholderSyntax, Template, TemplateContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest<P> {
    pub parameters: P,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub artifacts: Vec<OutputArtifact>,
}

pub struct HighStatJobsTool;

impl ToolExecutor for HighStatJobsTool {
    type Request = JobRequest<HighStatParameters>;
    type Report = JobReport;

    fn execute(&self, request: &Self::Request) -> ComputeResult<JobReport> {
        let parameters = &request.parameters;
        require_name("macro name", &parameters.base_macro)?;
        require_name("job id", &parameters.job_id)?;
        generate(
            &high_stat_plan(parameters),
            &request.template_dir,
            &request.output_dir,
        )
    }
}

pub struct ShadowingJobsTool;

impl ToolExecutor for ShadowingJobsTool {
    type Request = JobRequest<ShadowingParameters>;
    type Report = JobReport;

    fn execute(&self, request: &Self::Request) -> ComputeResult<JobReport> {
        let parameters = &request.parameters;
        require_name("job id", &parameters.job_id)?;
        generate(
            &shadowing_plan(parameters),
            &request.template_dir,
            &request.output_dir,
        )
    }
}

/// Renders `plan` against templates in `template_dir` and writes the results
/// into `output_dir`.
pub fn generate(
    plan: &[PlannedFile],
    template_dir: &Path,
    output_dir: &Path,
) -> ComputeResult<JobReport> {
    let mut templates: BTreeMap<(&str, PlaceholderSyntax), Template> = BTreeMap::new();
    let mut rendered = Vec::with_capacity(plan.len());

    for file in plan {
        let key = (file.template.as_str(), file.syntax);
        if !templates.contains_key(&key) {
            let template = load_template(template_dir, &file.template, file.syntax)?;
            templates.insert(key, template);
        }
        let template = templates.get(&key).ok_or_else(|| {
            OcaError::internal(
                "INTERNAL.TEMPLATE_CACHE",
                format!("template '{}' missing from cache", file.template),
            )
        })?;
        rendered.push((output_dir.join(&file.file_name), template.render(&file.context)?));
    }

    fs::create_dir_all(output_dir).map_err(|source| {
        OcaError::io_system(
            "IO.OUTPUT_DIRECTORY",
            format!(
                "failed to create output directory '{}': {}",
                output_dir.display(),
                source
            ),
        )
    })?;

    let mut artifacts = Vec::with_capacity(rendered.len());
    for (path, content) in rendered {
        fs::write(&path, content.as_bytes()).map_err(|source| {
            OcaError::io_system(
                "IO.JOB_WRITE",
                format!("failed to write job file '{}': {}", path.display(), source),
            )
        })?;
        debug!(path = %path.display(), "wrote job file");
        artifacts.push(OutputArtifact::new(path));
    }

    info!(
        files = artifacts.len(),
        templates = templates.len(),
        output_dir = %output_dir.display(),
        "generated job files"
    );
    Ok(JobReport { artifacts })
}

fn load_template(dir: &Path, name: &str, syntax: PlaceholderSyntax) -> OcaResult<Template> {
    let path = dir.join(name);
    let source = fs::read_to_string(&path).map_err(|source| {
        OcaError::io_system(
            "IO.TEMPLATE_READ",
            format!("failed to read template '{}': {}", path.display(), source),
        )
    })?;
    Template::parse(name, &source, syntax)
}

fn require_name(what: &str, value: &str) -> OcaResult<()> {
    if value.trim().is_empty() || value.contains(['/', '\\']) {
        return Err(OcaError::input_validation(
            "INPUT.JOB_PARAMETER",
            format!("{what} must be a non-empty file-name fragment, got '{value}'"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        HighStatJobsTool, HighStatParameters, JobEnvironment, JobRequest, ShadowingJobsTool,
        ShadowingParameters,
    };
    use crate::modules::ToolExecutor;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn environment() -> JobEnvironment {
        JobEnvironment {
            rat_root: "/opt/rat".to_string(),
            locas_root: "/opt/oca".to_string(),
            locas_data_tmp: "/scratch".to_string(),
        }
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("template should be written");
    }

    fn high_stat_request(temp: &TempDir) -> JobRequest<HighStatParameters> {
        JobRequest {
            parameters: HighStatParameters {
                base_macro: "lb".to_string(),
                cycles: 2,
                events_per_cycle: 1000,
                job_id: "J1".to_string(),
                environment: environment(),
            },
            template_dir: temp.path().join("templates"),
            output_dir: temp.path().join("out"),
        }
    }

    #[test]
    fn high_stat_jobs_are_written_with_substitutions() {
        let temp = TempDir::new().expect("tempdir should be created");
        let request = high_stat_request(&temp);
        fs::create_dir_all(&request.template_dir).unwrap();
        write(
            &request.template_dir,
            "lb.mac",
            "/rat/procset file \"$ROOTFileName\"\n/rat/run/start $EventsPerCycle\n",
        );
        write(
            &request.template_dir,
            "RATBashScript.sh",
            "source %RatRoot/env.sh\ncd %LocasDataTmp\nrat %MacroName # %JobDesc %LocasRoot\n",
        );

        let report = HighStatJobsTool.execute(&request).expect("jobs should generate");
        assert_eq!(report.artifacts.len(), 4);

        let macro_text = fs::read_to_string(request.output_dir.join("lb_1.mac")).unwrap();
        assert_eq!(
            macro_text,
            "/rat/procset file \"lb_1.root\"\n/rat/run/start 1000\n"
        );
        let script = fs::read_to_string(request.output_dir.join("lb_0_J1.sh")).unwrap();
        assert_eq!(
            script,
            "source /opt/rat/env.sh\ncd /scratch\nrat lb_0.mac # lb /opt/oca\n"
        );
    }

    #[test]
    fn rendered_files_keep_template_line_endings() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut request = high_stat_request(&temp);
        request.parameters.cycles = 1;
        fs::create_dir_all(&request.template_dir).unwrap();
        write(
            &request.template_dir,
            "lb.mac",
            "file=$ROOTFileName events=$EventsPerCycle",
        );
        write(&request.template_dir, "RATBashScript.sh", "a\r\nrat %MacroName");

        HighStatJobsTool.execute(&request).expect("jobs should generate");

        assert_eq!(
            fs::read(request.output_dir.join("lb_0.mac")).unwrap(),
            b"file=lb_0.root events=1000"
        );
        assert_eq!(
            fs::read(request.output_dir.join("lb_0_J1.sh")).unwrap(),
            b"a\r\nrat lb_0.mac"
        );
    }

    #[test]
    fn unresolved_placeholder_writes_nothing() {
        let temp = TempDir::new().expect("tempdir should be created");
        let request = high_stat_request(&temp);
        fs::create_dir_all(&request.template_dir).unwrap();
        write(&request.template_dir, "lb.mac", "$ROOTFileName $EventsPerCycle\n");
        write(&request.template_dir, "RATBashScript.sh", "%MacroName %Queue\n");

        let error = HighStatJobsTool
            .execute(&request)
            .expect_err("%Queue has no value");
        assert_eq!(error.placeholder(), "INPUT.TEMPLATE_UNRESOLVED");
        assert!(!request.output_dir.exists());
    }

    #[test]
    fn missing_template_is_an_io_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let request = high_stat_request(&temp);
        let error = HighStatJobsTool
            .execute(&request)
            .expect_err("templates are missing");
        assert_eq!(error.placeholder(), "IO.TEMPLATE_READ");
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn shadowing_jobs_produce_the_full_file_set() {
        let temp = TempDir::new().expect("tempdir should be created");
        let templates = temp.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        write(&templates, "WHM.cxx", "void WHM_${JobID}_${ConfigName}(){ int n = ${NumberOfJobs}; }\n");
        write(&templates, "ROOTBashWHM.sh", "root -b -q %ROOTMacroName # %ConfigName %JobID %RatRoot\n");
        write(&templates, "BaseSubmission.sh", "for i in $(seq 0 %NumberOfJobs); do qsub %JobID_%ConfigName_$i.sh; done\n");
        write(&templates, "RHM.cxx", "// ${ConfigNameCore} ${ConfigNameW} ${ConfigNameWO} ${JobID} ${XPos} ${YPos} ${ZPos} ${WLength} ${NumEvents}\n");
        write(&templates, "ROOTBashRHM.sh", "root -b -q %ROOTMacroName # %ConfigNameCore %JobID\n");
        write(&templates, "RATBash.sh", "rat %MacroName # %JobDesc %JobID %LocasRoot %LocasDataTmp\n");
        for configuration in ["wAVHD", "woAVHD", "wGEO", "woGEO"] {
            write(
                &templates,
                &format!("{configuration}.mac"),
                "/rat/procset file \"%ROOTFileName\"\n/generator/pos/set %XPos %YPos %ZPos\n/generator/wavelength %Lambda\n/rat/run/start %EventsPerCycle\n",
            );
        }

        let request = JobRequest {
            parameters: ShadowingParameters {
                x: "0".to_string(),
                y: "0".to_string(),
                z: "600".to_string(),
                wavelength: "505".to_string(),
                jobs: 2,
                events_per_job: 500,
                job_id: "S1".to_string(),
                environment: environment(),
            },
            template_dir: templates,
            output_dir: temp.path().join("out"),
        };

        let error = ShadowingJobsTool
            .execute(&request)
            .expect_err("%JobID_ reads as one identifier");
        assert_eq!(error.placeholder(), "INPUT.TEMPLATE_UNRESOLVED");

        write(
            &request.template_dir,
            "BaseSubmission.sh",
            "for i in $(seq 0 %NumberOfJobs); do qsub %{JobID}_%{ConfigName}_$i.sh; done\n",
        );
        let report = ShadowingJobsTool.execute(&request).expect("jobs should generate");
        assert_eq!(report.artifacts.len(), 12 + 4 + 16);

        let rhm = fs::read_to_string(request.output_dir.join("RHM_S1_AVHD.cxx")).unwrap();
        assert_eq!(rhm, "// AVHD wAVHD woAVHD S1 0 0 600 505 1000\n");
        let submission =
            fs::read_to_string(request.output_dir.join("S1_wGEO_Submission.sh")).unwrap();
        assert_eq!(
            submission,
            "for i in $(seq 0 2); do qsub S1_wGEO_$i.sh; done\n"
        );
        let cycle_macro = fs::read_to_string(request.output_dir.join("S1_woGEO_1.mac")).unwrap();
        assert!(cycle_macro.contains("\"S1_woGEO_1.root\""));
        assert!(cycle_macro.contains("/generator/pos/set 0 0 600"));
    }

    #[test]
    fn job_id_must_be_a_file_name_fragment() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut request = high_stat_request(&temp);
        request.parameters.job_id = "../escape".to_string();
        let error = HighStatJobsTool.execute(&request).expect_err("separator should fail");
        assert_eq!(error.placeholder(), "INPUT.JOB_PARAMETER");
    }
}
