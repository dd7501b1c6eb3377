//! Argument parsing and handler flows for the Taskhire CLI

use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;
use taskhire_cli::cli::commands::{ConfigAction, ProjectAction, TaskAction};
use taskhire_cli::cli::handlers;
use taskhire_cli::config::{CliConfig, TokenBackend};
use taskhire_cli::{Args, CliError, Commands};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn memory_config(server: &MockServer) -> CliConfig {
    let mut config = CliConfig::default();
    config.api.base_url = server.uri();
    config.auth.token_backend = TokenBackend::Memory;
    config.auth.init_data = Some("query_id=1&hash=ff".into());
    config
}

#[test]
fn test_parse_task_create() {
    let args = Args::try_parse_from([
        "taskhire",
        "--json",
        "tasks",
        "create",
        "--title",
        "Landing page",
        "--project",
        "p1",
        "--time-limit",
        "3d",
    ])
    .unwrap();

    assert!(args.json);
    match args.command {
        Commands::Tasks {
            action: TaskAction::Create { title, fields },
        } => {
            assert_eq!(title, "Landing page");
            assert_eq!(fields.project_id.as_deref(), Some("p1"));
            assert_eq!(fields.time_limit.as_deref(), Some("3d"));
            assert!(fields.description.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_project_update_and_globals() {
    let args = Args::try_parse_from([
        "taskhire",
        "projects",
        "update",
        "p1",
        "--active",
        "false",
        "--config",
        "/tmp/taskhire.toml",
        "-v",
    ])
    .unwrap();

    assert_eq!(
        args.config.as_deref(),
        Some(std::path::Path::new("/tmp/taskhire.toml"))
    );
    assert!(args.verbosity.log_level().is_some());
    match args.command {
        Commands::Projects {
            action: ProjectAction::Update { id, fields, .. },
        } => {
            assert_eq!(id, "p1");
            assert_eq!(fields.active, Some(false));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_refine_requires_all_answers() {
    assert!(Args::try_parse_from(["taskhire", "refine", "--problem", "slow hiring"]).is_err());

    let args = Args::try_parse_from([
        "taskhire",
        "refine",
        "--problem",
        "slow hiring",
        "--context",
        "startup",
        "--expected-outcome",
        "hire in a week",
    ])
    .unwrap();
    assert!(matches!(args.command, Commands::Refine { .. }));
}

#[test]
fn test_parse_whoami_silent() {
    let args = Args::try_parse_from(["taskhire", "whoami", "--silent"]).unwrap();
    assert!(matches!(args.command, Commands::Whoami { silent: true }));
}

#[tokio::test]
async fn test_login_exchanges_launch_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tg/login"))
        .and(body_json(json!({"initData": "query_id=1&hash=ff"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "fresh"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = memory_config(&mock_server);
    handlers::auth::handle_login(&config).await.unwrap();
}

#[tokio::test]
async fn test_login_without_launch_data_fails_early() {
    let mock_server = MockServer::start().await;
    let mut config = memory_config(&mock_server);
    config.auth.init_data = None;

    let result = handlers::auth::handle_login(&config).await;
    assert!(matches!(result, Err(CliError::Login(_))));
}

#[tokio::test]
async fn test_rejected_login_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tg/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad hash"})))
        .mount(&mock_server)
        .await;

    let config = memory_config(&mock_server);
    let result = handlers::auth::handle_login(&config).await;
    assert!(matches!(result, Err(CliError::Login(_))));
}

#[tokio::test]
async fn test_task_list_surfaces_api_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
        .mount(&mock_server)
        .await;

    let config = memory_config(&mock_server);
    let error = handlers::tasks::handle_tasks(&config, TaskAction::List, true)
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "API error: db down");
}

#[tokio::test]
async fn test_task_list_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "title": "Landing page", "status": "draft"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = memory_config(&mock_server);
    handlers::tasks::handle_tasks(&config, TaskAction::List, true)
        .await
        .unwrap();
}

#[test]
fn test_config_show() {
    let config = CliConfig::default();
    handlers::config::handle_config(&config, None, ConfigAction::Show, true).unwrap();
}
