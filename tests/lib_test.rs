//! Library integration tests.

use std::fs;
use std::path::PathBuf;

use pitch::appconfig::{validate_document, ConfigDocument, ValidateOptions};
use pitch::config::PitchSettings;
use pitch::environment::EnvironmentHandle;
use pitch::report::{OverallStatus, ReportStore, Status};
use pitch::runner::{run_pipeline, Phase, PipelineOptions, RunState};
use pitch::shell::{CommandResult, Platform, ScriptedRunner};
use pitch::ui::MockUI;
use pitch::PitchError;
use tempfile::TempDir;

const CONFIG: &str = "\
HOST_AGENT:
  API_TYPE: openai
  API_BASE: https://api.openai.com/v1/chat/completions
  API_KEY: ${OPENAI_API_KEY}
APP_AGENT:
  API_TYPE: openai
  API_BASE: https://api.openai.com/v1/chat/completions
  API_KEY: ${OPENAI_API_KEY}
BACKUP_AGENT:
  API_TYPE: openai
  API_BASE: https://api.openai.com/v1/chat/completions
  API_KEY: ${OPENAI_API_KEY}
";

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("requirements.txt"), "pyyaml==6.0.1\nart\n").unwrap();
    fs::create_dir_all(temp.path().join("ufo/config")).unwrap();
    fs::write(temp.path().join("ufo/config/config.yaml.template"), CONFIG).unwrap();
    let app = PitchSettings::default().application;
    for dir in &app.directories {
        fs::create_dir_all(temp.path().join("ufo").join(dir)).unwrap();
    }
    for file in &app.files {
        fs::write(temp.path().join("ufo").join(file), "").unwrap();
    }
    temp
}

fn options(temp: &TempDir) -> PipelineOptions {
    PipelineOptions {
        platform: Platform::Linux,
        ..PipelineOptions::new(temp.path())
    }
}

fn healthy_machine(env_root: PathBuf) -> ScriptedRunner {
    let runner = ScriptedRunner::new();
    runner.on("python3 --version", CommandResult::success("Python 3.11.4"));
    runner.on("git --version", CommandResult::success("git version 2.45.1"));
    runner.on("cc --version", CommandResult::success("cc (GCC) 13.2.0"));
    runner.on_with("-m venv", move |_| {
        let handle = EnvironmentHandle::at(&env_root);
        fs::create_dir_all(handle.scripts_dir())?;
        fs::write(handle.activation_marker(), "# activate")?;
        Ok(CommandResult::success(""))
    });
    runner.on("-m pip --version", CommandResult::success("pip 24.0"));
    runner.on("--upgrade pip", CommandResult::success(""));
    runner.on("pip install", CommandResult::success(""));
    runner.on("import", CommandResult::success(""));
    runner.on("python -m ufo --help", CommandResult::success("usage: ufo"));
    runner
}

#[test]
fn error_types_are_public() {
    let err = PitchError::SettingsNotFound {
        path: "ci/pitch.yml".into(),
    };
    assert!(err.to_string().contains("ci/pitch.yml"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> pitch::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn pipeline_bootstraps_a_fresh_project() {
    let temp = project();
    let runner = healthy_machine(temp.path().join("ufo_env"));
    let mut ui = MockUI::new();

    let settings = PitchSettings::default();
    let report = run_pipeline(&settings, &options(&temp), &runner, &mut ui).unwrap();

    assert_eq!(report.overall, OverallStatus::Pass);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.state, RunState::Active(Phase::Reported));
    assert!(runner.was_called("-m venv"));
    assert!(runner.was_called("\"import ufo.utils\""));
    assert!(temp.path().join("ufo/config/config.yaml").exists());

    let store = ReportStore::new(temp.path().join("reports"));
    let path = store.write(&report).unwrap();
    assert_eq!(store.latest().unwrap(), Some(path));
}

#[test]
fn pipeline_fails_when_environment_cannot_be_created() {
    let temp = project();
    let runner = ScriptedRunner::new();
    runner.on("python3 --version", CommandResult::success("Python 3.11.4"));
    runner.on("-m venv", CommandResult::failure(1, "No module named venv"));
    let mut ui = MockUI::new();

    let settings = PitchSettings::default();
    let report = run_pipeline(&settings, &options(&temp), &runner, &mut ui).unwrap();

    assert_eq!(report.overall, OverallStatus::Fail);
    assert_eq!(report.exit_code(), 2);
    assert!(report.state.is_failed());
    assert!(!runner.was_called("pip install"));
    assert!(report.render().contains("Overall: FAIL"));
}

#[test]
fn config_rules_run_over_parsed_documents() {
    let doc = ConfigDocument::parse("HOST_AGENT:\n  API_TYPE: openai\n").unwrap();
    let results = validate_document("config.yaml", &doc, &ValidateOptions::default());

    assert!(results.iter().all(|r| r.status == Status::Error));
    assert!(results.iter().any(|r| r.target == "APP_AGENT"));
    assert!(results.iter().any(|r| r.target == "HOST_AGENT.API_BASE"));
}
