use super::template::{PlaceholderSyntax, TemplateContext};

/// Configurations simulated for every shadowing job: with and without the
/// vessel hold-down ropes (`AVHD`) and the remaining geometry (`GEO`).
pub const SHADOWING_CONFIGURATIONS: [&str; 4] = ["wAVHD", "woAVHD", "wGEO", "woGEO"];
pub const SHADOWING_CORES: [&str; 2] = ["AVHD", "GEO"];

pub const HIGH_STAT_SCRIPT_TEMPLATE: &str = "RATBashScript.sh";
pub const SHADOWING_SCRIPT_TEMPLATE: &str = "RATBash.sh";
pub const SUBMISSION_TEMPLATE: &str = "BaseSubmission.sh";
pub const WHM_MACRO_TEMPLATE: &str = "WHM.cxx";
pub const WHM_SCRIPT_TEMPLATE: &str = "ROOTBashWHM.sh";
pub const RHM_MACRO_TEMPLATE: &str = "RHM.cxx";
pub const RHM_SCRIPT_TEMPLATE: &str = "ROOTBashRHM.sh";

/// Installation paths substituted into every generated shell script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEnvironment {
    pub rat_root: String,
    pub locas_root: String,
    pub locas_data_tmp: String,
}

impl JobEnvironment {
    fn apply(&self, context: TemplateContext) -> TemplateContext {
        context
            .with("RatRoot", &self.rat_root)
            .with("LocasRoot", &self.locas_root)
            .with("LocasDataTmp", &self.locas_data_tmp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighStatParameters {
    pub base_macro: String,
    pub cycles: u32,
    pub events_per_cycle: u64,
    pub job_id: String,
    pub environment: JobEnvironment,
}

/// Source position and wavelength are kept as given so the generated macros
/// carry exactly the text the operator typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowingParameters {
    pub x: String,
    pub y: String,
    pub z: String,
    pub wavelength: String,
    pub jobs: u32,
    pub events_per_job: u64,
    pub job_id: String,
    pub environment: JobEnvironment,
}

impl ShadowingParameters {
    pub fn total_events(&self) -> u64 {
        u64::from(self.jobs).saturating_mul(self.events_per_job)
    }
}

/// One file to produce: which template, which syntax, what to substitute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub file_name: String,
    pub template: String,
    pub syntax: PlaceholderSyntax,
    pub context: TemplateContext,
}

impl PlannedFile {
    fn new(
        file_name: String,
        template: impl Into<String>,
        syntax: PlaceholderSyntax,
        context: TemplateContext,
    ) -> Self {
        Self {
            file_name,
            template: template.into(),
            syntax,
            context,
        }
    }
}

pub fn high_stat_macro_name(base: &str, cycle: u32) -> String {
    format!("{base}_{cycle}.mac")
}

pub fn high_stat_script_name(base: &str, cycle: u32, job_id: &str) -> String {
    format!("{base}_{cycle}_{job_id}.sh")
}

pub fn shadowing_cycle_stem(job_id: &str, configuration: &str, cycle: u32) -> String {
    format!("{job_id}_{configuration}_{cycle}")
}

pub fn whm_stem(job_id: &str, configuration: &str) -> String {
    format!("WHM_{job_id}_{configuration}")
}

pub fn rhm_stem(job_id: &str, core: &str) -> String {
    format!("RHM_{job_id}_{core}")
}

pub fn submission_script_name(job_id: &str, configuration: &str) -> String {
    format!("{job_id}_{configuration}_Submission.sh")
}

pub fn high_stat_plan(parameters: &HighStatParameters) -> Vec<PlannedFile> {
    let base = &parameters.base_macro;
    let macro_template = format!("{base}.mac");
    let mut plan = Vec::with_capacity(parameters.cycles as usize * 2);

    for cycle in 0..parameters.cycles {
        let macro_name = high_stat_macro_name(base, cycle);
        plan.push(PlannedFile::new(
            macro_name.clone(),
            macro_template.clone(),
            PlaceholderSyntax::Dollar,
            TemplateContext::new()
                .with("ROOTFileName", format!("{base}_{cycle}.root"))
                .with("EventsPerCycle", parameters.events_per_cycle),
        ));
        plan.push(PlannedFile::new(
            high_stat_script_name(base, cycle, &parameters.job_id),
            HIGH_STAT_SCRIPT_TEMPLATE,
            PlaceholderSyntax::Percent,
            parameters.environment.apply(
                TemplateContext::new()
                    .with("MacroName", macro_name)
                    .with("JobDesc", base),
            ),
        ));
    }

    plan
}

pub fn shadowing_plan(parameters: &ShadowingParameters) -> Vec<PlannedFile> {
    let job_id = &parameters.job_id;
    let environment = &parameters.environment;
    let mut plan = Vec::new();

    for configuration in SHADOWING_CONFIGURATIONS {
        let stem = whm_stem(job_id, configuration);
        plan.push(PlannedFile::new(
            format!("{stem}.cxx"),
            WHM_MACRO_TEMPLATE,
            PlaceholderSyntax::Dollar,
            TemplateContext::new()
                .with("ConfigName", configuration)
                .with("NumberOfJobs", parameters.jobs)
                .with("JobID", job_id),
        ));
        plan.push(PlannedFile::new(
            format!("{stem}.sh"),
            WHM_SCRIPT_TEMPLATE,
            PlaceholderSyntax::Percent,
            environment.apply(
                TemplateContext::new()
                    .with("ConfigName", configuration)
                    .with("ROOTMacroName", format!("{stem}.cxx"))
                    .with("JobID", job_id),
            ),
        ));
        plan.push(PlannedFile::new(
            submission_script_name(job_id, configuration),
            SUBMISSION_TEMPLATE,
            PlaceholderSyntax::Percent,
            TemplateContext::new()
                .with("ConfigName", configuration)
                .with("NumberOfJobs", parameters.jobs)
                .with("JobID", job_id),
        ));
    }

    for core in SHADOWING_CORES {
        let stem = rhm_stem(job_id, core);
        plan.push(PlannedFile::new(
            format!("{stem}.cxx"),
            RHM_MACRO_TEMPLATE,
            PlaceholderSyntax::Dollar,
            TemplateContext::new()
                .with("ConfigNameCore", core)
                .with("ConfigNameW", format!("w{core}"))
                .with("ConfigNameWO", format!("wo{core}"))
                .with("JobID", job_id)
                .with("XPos", &parameters.x)
                .with("YPos", &parameters.y)
                .with("ZPos", &parameters.z)
                .with("WLength", &parameters.wavelength)
                .with("NumEvents", parameters.total_events()),
        ));
        plan.push(PlannedFile::new(
            format!("{stem}.sh"),
            RHM_SCRIPT_TEMPLATE,
            PlaceholderSyntax::Percent,
            environment.apply(
                TemplateContext::new()
                    .with("ConfigNameCore", core)
                    .with("ROOTMacroName", format!("{stem}.cxx"))
                    .with("JobID", job_id),
            ),
        ));
    }

    for cycle in 0..parameters.jobs {
        for configuration in SHADOWING_CONFIGURATIONS {
            let stem = shadowing_cycle_stem(job_id, configuration, cycle);
            plan.push(PlannedFile::new(
                format!("{stem}.mac"),
                format!("{configuration}.mac"),
                PlaceholderSyntax::Percent,
                TemplateContext::new()
                    .with("ROOTFileName", format!("{stem}.root"))
                    .with("EventsPerCycle", parameters.events_per_job)
                    .with("XPos", &parameters.x)
                    .with("YPos", &parameters.y)
                    .with("ZPos", &parameters.z)
                    .with("Lambda", &parameters.wavelength),
            ));
        }
        for configuration in SHADOWING_CONFIGURATIONS {
            let stem = shadowing_cycle_stem(job_id, configuration, cycle);
            plan.push(PlannedFile::new(
                format!("{stem}.sh"),
                SHADOWING_SCRIPT_TEMPLATE,
                PlaceholderSyntax::Percent,
                environment.apply(
                    TemplateContext::new()
                        .with("MacroName", format!("{stem}.mac"))
                        .with("JobDesc", configuration)
                        .with("JobID", job_id),
                ),
            ));
        }
    }

    plan
}
