//! End-to-end run: prober, environment, packages, config and smoke.

use std::path::{Path, PathBuf};

use crate::appconfig::{ensure_config, validate_config, ConfigStatus, ValidateOptions};
use crate::application::{check_application, check_platform, ApplicationSpec};
use crate::config::{resolve_path, PitchSettings};
use crate::environment::{ensure_environment, EnvironmentHandle, EnvironmentOptions};
use crate::error::{PitchError, Result};
use crate::packages::{
    install_and_validate, load_manifest, ImportNames, InstallOptions, PackageSpec,
};
use crate::report::{
    any_degrading, generate_report, ReportInput, RunReport, Status, TargetKind, ValidationResult,
};
use crate::requirements::{probe, ProbeOptions, RequirementRegistry};
use crate::shell::{CommandRunner, Platform};
use crate::smoke::{run_smoke, SmokeRecord, SmokeSpec};
use crate::ui::UserInterface;

use super::state::{Phase, RunState};

const STAGES: usize = 4;

/// Per-invocation switches layered over the settings.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Base directory for every relative path in the settings.
    pub project_root: PathBuf,
    /// Leave non-critical packages out.
    pub skip_optional: bool,
    /// Probe and import only; run no installers.
    pub check_only: bool,
    pub platform: Platform,
}

impl PipelineOptions {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            skip_optional: false,
            check_only: false,
            platform: Platform::current(),
        }
    }
}

/// Carries the run state and everything found so far.
struct Run {
    state: RunState,
    results: Vec<ValidationResult>,
    smoke: Option<SmokeRecord>,
    fatal: Option<String>,
}

impl Run {
    fn new() -> Self {
        Self {
            state: RunState::new(),
            results: Vec::new(),
            smoke: None,
            fatal: None,
        }
    }

    /// Record a stage's results and move to `phase`.
    fn finish_stage(&mut self, phase: Phase, results: Vec<ValidationResult>) {
        let degraded = any_degrading(&results);
        self.results.extend(results);
        match self.state.advance(phase, degraded) {
            Ok(next) => {
                tracing::info!("Run state: {}", next);
                self.state = next;
            }
            Err(e) => tracing::error!("{}", e),
        }
    }

    /// Record a fatal error; no further stages run.
    fn abort(&mut self, kind: TargetKind, target: &str, error: &PitchError) {
        tracing::error!("{}", error);
        self.results.push(
            ValidationResult::new(kind, target, Status::Error)
                .with_detail(error.to_string())
                .with_hint(fatal_hint(error)),
        );
        match self.state.fail() {
            Ok(next) => self.state = next,
            Err(e) => tracing::error!("{}", e),
        }
        self.fatal = Some(error.to_string());
    }
}

fn fatal_hint(error: &PitchError) -> String {
    match error {
        PitchError::EnvironmentCreation { path, .. } => format!(
            "Check that the base interpreter can create environments (python -m venv), then delete {} and rerun",
            path.display()
        ),
        PitchError::InstallerUnavailable { path, .. } => format!(
            "Repair pip with `python -m ensurepip --upgrade` inside {} or delete it and rerun",
            path.display()
        ),
        _ => "Rerun with --debug for details".to_string(),
    }
}

/// Run every stage in order and assemble the report.
///
/// Returns the report even when the run fails; the only error is a manifest
/// that cannot be parsed, which is detected before anything is run.
pub fn run_pipeline(
    settings: &PitchSettings,
    options: &PipelineOptions,
    runner: &dyn CommandRunner,
    ui: &mut dyn UserInterface,
) -> Result<RunReport> {
    let root = options.project_root.as_path();
    let packages = load_manifest(&resolve_path(root, &settings.manifest))?;
    let env_path = resolve_path(root, &settings.env_path);
    let python = settings.python_for(options.platform);

    ui.show_header(&format!("Preparing {}", settings.app_name));
    let mut run = Run::new();

    ui.show_stage(1, STAGES, "Prerequisites");
    let mut registry = RequirementRegistry::builtin(options.platform, &python);
    registry.extend(settings.requirements.iter().cloned());
    let probe_options = ProbeOptions {
        allow_install: !options.check_only,
        detect_timeout: settings.timeouts.probe(),
        install_timeout: settings.timeouts.install(),
    };
    let tool_results = probe(registry.as_slice(), runner, &probe_options, ui);
    run.finish_stage(Phase::Probing, tool_results);

    ui.show_stage(2, STAGES, "Environment");
    let env = environment_stage(&mut run, &env_path, &python, settings, options, runner, ui);
    if let Some(env) = env {
        ui.show_stage(3, STAGES, "Packages");
        if packages_stage(&mut run, &packages, &env, settings, options, runner, ui) {
            ui.show_stage(4, STAGES, "Configuration");
            config_stage(&mut run, settings, root, ui);
            smoke_stage(&mut run, settings, root, &env, runner, ui);
            run.finish_stage(Phase::Reported, Vec::new());
        }
    }

    Ok(generate_report(ReportInput {
        app_name: settings.app_name.clone(),
        environment: env_path,
        state: run.state,
        results: run.results,
        smoke: run.smoke,
        fatal: run.fatal,
    }))
}

fn environment_stage(
    run: &mut Run,
    env_path: &Path,
    python: &str,
    settings: &PitchSettings,
    options: &PipelineOptions,
    runner: &dyn CommandRunner,
    ui: &mut dyn UserInterface,
) -> Option<EnvironmentHandle> {
    let env_options = EnvironmentOptions {
        create_timeout: settings.timeouts.environment(),
        installer_timeout: settings.timeouts.environment(),
        allow_upgrade: !options.check_only,
    };

    let mut spinner = ui.start_spinner(&format!("Preparing {}", env_path.display()));
    match ensure_environment(env_path, python, runner, &env_options) {
        Ok(env) => {
            spinner.finish_and_clear();
            let results = env.results();
            for result in &results {
                ui.show_result(result);
            }
            run.finish_stage(Phase::EnvReady, results);
            Some(env)
        }
        Err(e) => {
            spinner.finish_error("Environment could not be prepared");
            run.abort(TargetKind::Environment, &env_path.display().to_string(), &e);
            if let Some(result) = run.results.last() {
                ui.show_result(result);
            }
            None
        }
    }
}

fn packages_stage(
    run: &mut Run,
    packages: &[PackageSpec],
    env: &EnvironmentHandle,
    settings: &PitchSettings,
    options: &PipelineOptions,
    runner: &dyn CommandRunner,
    ui: &mut dyn UserInterface,
) -> bool {
    let mut import_names = ImportNames::builtin();
    import_names.extend(&settings.import_names);
    let install_options = InstallOptions {
        skip_optional: options.skip_optional,
        allow_install: !options.check_only,
        install_timeout: settings.timeouts.install(),
        import_timeout: settings.timeouts.import(),
        import_names,
        binary_only: settings.binary_only.clone(),
    };

    match install_and_validate(packages, env, runner, &install_options, ui) {
        Ok(mut results) => {
            results.extend(application_checks(settings, options, env, runner, ui));
            run.finish_stage(Phase::DepsValidated, results);
            true
        }
        Err(e) => {
            run.abort(TargetKind::Package, "pip", &e);
            if let Some(result) = run.results.last() {
                ui.show_result(result);
            }
            false
        }
    }
}

fn application_checks(
    settings: &PitchSettings,
    options: &PipelineOptions,
    env: &EnvironmentHandle,
    runner: &dyn CommandRunner,
    ui: &mut dyn UserInterface,
) -> Vec<ValidationResult> {
    let app = &settings.application;
    if !app.enabled {
        return Vec::new();
    }

    let spec = ApplicationSpec {
        root: options.project_root.clone(),
        package_dir: app.package_dir.clone(),
        directories: app.directories.clone(),
        files: app.files.clone(),
        modules: app.modules.clone(),
        import_timeout: settings.timeouts.import(),
    };
    let mut spinner = ui.start_spinner(&format!("Checking {}", app.package_dir.display()));
    let mut results: Vec<ValidationResult> =
        check_platform(options.platform, app.windows_only).into_iter().collect();
    results.extend(check_application(&spec, env, runner));
    spinner.finish_and_clear();

    for result in &results {
        ui.show_result(result);
    }
    results
}

fn config_stage(
    run: &mut Run,
    settings: &PitchSettings,
    root: &Path,
    ui: &mut dyn UserInterface,
) {
    let template = resolve_path(root, &settings.config_template);
    let target = resolve_path(root, &settings.config_path);

    let mut results = Vec::new();
    match ensure_config(&template, &target) {
        Ok(status) => {
            if status == ConfigStatus::TemplateMissing {
                results.push(status.to_result(&template, &target));
            } else {
                if status == ConfigStatus::Created {
                    ui.message(&format!(
                        "Created {} from the template; fill in your keys",
                        target.display()
                    ));
                }
                let validate_options = ValidateOptions {
                    required_sections: settings.required_sections.clone(),
                };
                results.extend(validate_config(&target, &validate_options));
            }
        }
        Err(e) => results.push(
            ValidationResult::new(TargetKind::Config, target.display().to_string(), Status::Error)
                .with_detail(e.to_string()),
        ),
    }

    for result in &results {
        ui.show_result(result);
    }
    run.finish_stage(Phase::ConfigChecked, results);
}

fn smoke_stage(
    run: &mut Run,
    settings: &PitchSettings,
    root: &Path,
    env: &EnvironmentHandle,
    runner: &dyn CommandRunner,
    ui: &mut dyn UserInterface,
) {
    if !settings.smoke.enabled {
        let command = &settings.smoke.command;
        let result = ValidationResult::new(TargetKind::Smoke, command, Status::Skipped)
            .with_detail("disabled in settings")
            .degrading(false);
        ui.show_result(&result);
        run.finish_stage(Phase::SmokeTested, vec![result]);
        return;
    }

    let spec = SmokeSpec {
        command: settings.smoke.command.clone(),
        expected_artifacts: settings.smoke.artifacts.clone(),
        cwd: root.to_path_buf(),
        timeout: settings.timeouts.smoke(),
    };
    let mut spinner = ui.start_spinner(&format!("Running {}", spec.command));
    let record = run_smoke(&spec, env, runner);
    spinner.finish_and_clear();

    let result = record.to_result();
    ui.show_result(&result);
    run.smoke = Some(record);
    run.finish_stage(Phase::SmokeTested, vec![result]);
}
