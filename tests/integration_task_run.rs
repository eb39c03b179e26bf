//! End-to-end task execution tests
//!
//! Drives scripts through the engine with scripted and mock-LLM backends.

use std::sync::Arc;

use gepetto::agent::{AgentAction, LlmBackend, ScriptedBackend};
use gepetto::config::Config;
use gepetto::domain::{RunState, Status};
use gepetto::error::Result;
use gepetto::llm::{CompletionResponse, MockLlmClient};
use gepetto::report::ReportWriter;
use gepetto::runner::{BUDGET_EXHAUSTED, TaskEngine};
use gepetto::task::{Task, parse_task, parse_task_file};
use serde_json::json;
use tempfile::TempDir;

fn task(steps: &[&str]) -> Arc<Task> {
    Arc::new(Task::new(
        "Integration",
        "End-to-end run",
        steps.iter().map(|s| s.to_string()).collect(),
    ))
}

fn config_with(vars: &[(&str, &str)]) -> Config {
    Config::default().with_overrides(vars.iter().copied())
}

#[tokio::test]
async fn test_single_step_success() {
    let backend = ScriptedBackend::new(vec![AgentAction::complete(Status::Success, "done")]);
    let engine = TaskEngine::new(Arc::new(backend.clone()));

    let result = engine
        .execute(task(&["Open ${URL}"]), &config_with(&[("URL", "http://x")]))
        .await;

    assert_eq!(result.status(), Some(Status::Success));
    assert_eq!(result.step_results.len(), 1);
    assert_eq!(result.step_results[0].step, "Open http://x");
    assert_eq!(result.step_results[0].status, Status::Success);
    assert_eq!(result.step_results[0].details.as_deref(), Some("done"));
    assert_eq!(backend.steps_sent(), vec!["Open http://x"]);
}

#[tokio::test]
async fn test_missing_variable_errors_before_any_step() {
    let backend = ScriptedBackend::new(vec![AgentAction::complete(Status::Success, "done")]);
    let engine = TaskEngine::new(Arc::new(backend.clone()));

    let result = engine.execute(task(&["Open ${URL}", "Close"]), &Config::default()).await;

    assert_eq!(result.status(), Some(Status::Error));
    assert!(result.step_results.is_empty());
    assert!(result.error_message.as_deref().unwrap_or_default().contains("URL"));
    assert!(backend.plans().is_empty());
    assert!(backend.instructions().is_empty());
}

#[tokio::test]
async fn test_missing_variable_in_later_step_blocks_first_step() {
    let backend = ScriptedBackend::new(vec![AgentAction::complete(Status::Success, "done")]);
    let engine = TaskEngine::new(Arc::new(backend.clone()));

    let result = engine
        .execute(task(&["Close the banner", "Open ${URL}"]), &Config::default())
        .await;

    assert_eq!(result.state, RunState::Errored);
    assert!(result.step_results.is_empty());
    assert!(backend.instructions().is_empty());
}

#[tokio::test]
async fn test_failed_step_short_circuits() {
    let backend = ScriptedBackend::new(vec![
        AgentAction::complete(Status::Failed, "heading missing"),
        AgentAction::complete(Status::Success, "should never be used"),
    ]);
    let engine = TaskEngine::new(Arc::new(backend.clone()));

    let result = engine
        .execute(
            task(&["Check heading", "Visit ${PAGE}"]),
            &config_with(&[("PAGE", "/about")]),
        )
        .await;

    assert_eq!(result.status(), Some(Status::Failed));
    assert_eq!(result.step_results.len(), 1);
    assert_eq!(result.error_message.as_deref(), Some("Step failed: Check heading"));
    assert_eq!(backend.steps_sent(), vec!["Check heading"]);
}

#[tokio::test]
async fn test_budget_exhaustion_short_circuits() {
    let backend = ScriptedBackend::new(vec![]);
    let engine = TaskEngine::new(Arc::new(backend.clone()));
    let mut config = Config::default();
    config.max_steps = 3;

    let result = engine.execute(task(&["Spin forever", "Never reached"]), &config).await;

    assert_eq!(result.status(), Some(Status::Error));
    assert_eq!(result.step_results.len(), 1);
    assert_eq!(result.step_results[0].status, Status::Error);
    assert_eq!(result.step_results[0].details.as_deref(), Some(BUDGET_EXHAUSTED));
    assert_eq!(result.error_message.as_deref(), Some("Step failed: Spin forever"));
    assert_eq!(backend.instructions().len(), 3);
}

#[tokio::test]
async fn test_backend_failure_mid_run_is_errored() {
    let backend = ScriptedBackend::with_results(vec![
        Ok(AgentAction::complete(Status::Success, "first ok")),
        Err(gepetto::GepettoError::Backend("connection reset".into())),
    ]);
    let engine = TaskEngine::new(Arc::new(backend));

    let result = engine.execute(task(&["one", "two", "three"]), &Config::default()).await;

    assert_eq!(result.state, RunState::Errored);
    assert_eq!(result.step_results.len(), 1);
    assert_eq!(result.error_message.as_deref(), Some("Backend error: connection reset"));
    assert!(result.is_finished());
}

#[tokio::test]
async fn test_variable_names_match_case_insensitively() {
    let backend = ScriptedBackend::new(vec![AgentAction::complete(Status::Success, "ok")]);
    let engine = TaskEngine::new(Arc::new(backend.clone()));

    let result = engine
        .execute(
            task(&["Navigate to ${hostname}"]),
            &config_with(&[("HOSTNAME", "https://weather.gov")]),
        )
        .await;

    assert!(result.is_success());
    assert_eq!(result.step_results[0].step, "Navigate to https://weather.gov");
    let plans = backend.plans();
    assert_eq!(
        plans[0].context.get("hostname").map(String::as_str),
        Some("https://weather.gov")
    );
    assert_eq!(plans[0].context.get("task").map(String::as_str), Some("Integration"));
}

#[tokio::test]
async fn test_every_path_records_duration_once() {
    let cases: Vec<(ScriptedBackend, Config)> = vec![
        (ScriptedBackend::new(vec![AgentAction::complete(Status::Success, "ok")]), Config::default()),
        (ScriptedBackend::new(vec![]), config_with(&[])),
        (ScriptedBackend::failing_plan("down"), Config::default()),
    ];

    for (backend, config) in cases {
        let engine = TaskEngine::new(Arc::new(backend));
        let result = engine.execute(task(&["step"]), &config).await;
        assert!(result.is_finished());
        assert!(result.status().is_some());
    }

    let engine = TaskEngine::new(Arc::new(ScriptedBackend::new(vec![])));
    let missing = engine.execute(task(&["${NOPE}"]), &Config::default()).await;
    assert!(missing.is_finished());
}

#[tokio::test]
async fn test_llm_backend_end_to_end() {
    let client = Arc::new(MockLlmClient::new(vec![
        CompletionResponse::tool_use("t1", "navigate", json!({"url": "http://x"})),
        CompletionResponse::tool_use("t2", "complete_test", json!({"status": "SUCCESS", "message": "opened"})),
        CompletionResponse::tool_use("t3", "complete_test", json!({"status": "FAILED", "message": "no login form"})),
    ]));
    let engine = TaskEngine::new(Arc::new(LlmBackend::new(Arc::clone(&client), 512)));

    let result = engine
        .execute(
            task(&["Open ${URL}", "Log in", "Log out"]),
            &config_with(&[("URL", "http://x")]),
        )
        .await;

    assert_eq!(result.status(), Some(Status::Failed));
    assert_eq!(result.step_results.len(), 2);
    assert_eq!(result.step_results[0].details.as_deref(), Some("opened"));
    assert_eq!(result.step_results[1].details.as_deref(), Some("no login form"));
    assert_eq!(client.requests().len(), 3);
    assert!(client.requests()[0].system.contains("Task: Integration"));
}

#[tokio::test]
async fn test_identical_steps_each_reach_the_model() {
    let client = Arc::new(MockLlmClient::new(vec![
        CompletionResponse::tool_use("t1", "complete_test", json!({"status": "SUCCESS", "message": "page 2"})),
        CompletionResponse::tool_use("t2", "complete_test", json!({"status": "SUCCESS", "message": "page 3"})),
    ]));
    let engine = TaskEngine::new(Arc::new(LlmBackend::new(Arc::clone(&client), 512)));

    let result = engine.execute(task(&["Click Next", "Click Next"]), &Config::default()).await;

    assert_eq!(result.status(), Some(Status::Success));
    assert_eq!(result.step_results[1].details.as_deref(), Some("page 3"));
    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    let second_turn = requests[1].messages.last().unwrap();
    assert_eq!(second_turn.text(), "Step: Click Next");
}

#[tokio::test]
async fn test_parse_run_and_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = temp_dir.path().join("weather-check.gpt");
    std::fs::write(
        &script,
        "description: \"Check weather\"\ntags: [smoke]\n\nTask:\n  Navigate to ${HOSTNAME}\n  Search for ${LOCATION}\n",
    )?;

    let task = Arc::new(parse_task_file(&script)?);
    assert_eq!(task.name, "weather check");

    let config = config_with(&[("HOSTNAME", "https://weather.gov"), ("location", "Paris")]);
    let backend = ScriptedBackend::new(vec![
        AgentAction::complete(Status::Success, "home page"),
        AgentAction::progress("type"),
        AgentAction::complete(Status::Success, "forecast shown").with_reasoning("results visible"),
    ]);
    let result = TaskEngine::new(Arc::new(backend)).execute(task, &config).await;
    assert!(result.is_success());
    assert_eq!(result.step_results[1].step, "Search for Paris");

    let paths = ReportWriter::new(temp_dir.path().join("results")).save(&result)?;
    assert!(paths.dir.starts_with(temp_dir.path().join("results").join("weather_check")));

    let xml = std::fs::read_to_string(&paths.junit)?;
    assert!(xml.contains("tests=\"2\" failures=\"0\" errors=\"0\""));

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&paths.json)?)?;
    assert_eq!(json["testName"], "weather check");
    assert_eq!(json["status"], "SUCCESS");
    assert_eq!(json["stepResults"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn test_parse_rejects_bad_date() {
    let err = parse_task("created: \"yesterday\"\nTask:\n  a\n", "x").unwrap_err();
    assert!(err.contains("line 1"));
}
