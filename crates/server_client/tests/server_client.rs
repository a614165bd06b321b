//! Wire-contract tests against a mock benchmark server.

use httpmock::prelude::*;
use serde_json::json;

use medperf_config::{CubeLayout, Settings};
use medperf_server_client::{ServerClient, ServerError};

const TOKEN: &str = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b";
const AUTH: &str = "Token 9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b";

fn layout(root: &std::path::Path) -> CubeLayout {
    Settings {
        storage: root.to_path_buf(),
        ..Settings::default()
    }
    .cube_layout()
}

fn mock_login(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/auth-token/")
            .json_body(json!({"username": "alice", "password": "secret"}));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"token": TOKEN}));
    })
}

/// Client logged in against `server`, storing cubes under `root`.
fn logged_in(server: &MockServer, root: &std::path::Path) -> ServerClient {
    mock_login(server);
    let mut client = ServerClient::new(server.base_url(), layout(root)).unwrap();
    client.login("alice", "secret").unwrap();
    client
}

// ── Login ───────────────────────────────────────────────────────────

#[test]
fn test_login_sets_session() {
    let server = MockServer::start();
    let login = mock_login(&server);
    let dir = tempfile::tempdir().unwrap();

    let mut client = ServerClient::new(server.base_url(), layout(dir.path())).unwrap();
    assert!(!client.is_authenticated());

    client.login("alice", "secret").unwrap();
    login.assert();
    assert!(client.is_authenticated());
}

#[test]
fn test_login_bad_credentials() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/auth-token/");
        then.status(400)
            .json_body(json!({"non_field_errors": ["Unable to log in with provided credentials."]}));
    });
    let dir = tempfile::tempdir().unwrap();

    let mut client = ServerClient::new(server.base_url(), layout(dir.path())).unwrap();
    let err = client.login("alice", "wrong").unwrap_err();

    assert!(matches!(err, ServerError::Authentication { status: 400 }), "got {:?}", err);
    assert!(!client.is_authenticated());
}

#[test]
fn test_login_success_without_token_is_auth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/auth-token/");
        then.status(200).json_body(json!({}));
    });
    let dir = tempfile::tempdir().unwrap();

    let mut client = ServerClient::new(server.base_url(), layout(dir.path())).unwrap();
    let err = client.login("alice", "secret").unwrap_err();

    assert!(matches!(err, ServerError::Authentication { .. }));
    assert!(!client.is_authenticated());
}

#[test]
fn test_authenticated_calls_require_login() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.path_includes("/");
        then.status(200).json_body(json!({"id": 1}));
    });
    let dir = tempfile::tempdir().unwrap();
    let client = ServerClient::new(server.base_url(), layout(dir.path())).unwrap();

    assert!(matches!(client.get_benchmark(1), Err(ServerError::NotAuthenticated)));
    assert!(matches!(client.get_benchmark_models(1), Err(ServerError::NotAuthenticated)));
    assert!(matches!(client.get_cube_metadata(1), Err(ServerError::NotAuthenticated)));
    assert!(matches!(client.upload_dataset(&json!({"name": "d"})), Err(ServerError::NotAuthenticated)));
    assert!(matches!(client.upload_results(&json!({"results": {}})), Err(ServerError::NotAuthenticated)));

    any.assert_calls(0);
}

// ── Benchmarks ──────────────────────────────────────────────────────

#[test]
fn test_get_benchmark_passthrough() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/benchmarks/42")
            .header("Authorization", AUTH);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"id": 42, "name": "demo"}));
    });

    let benchmark = client.get_benchmark(42).unwrap();
    mock.assert();
    assert_eq!(
        serde_json::to_value(&benchmark).unwrap(),
        json!({"id": 42, "name": "demo"}),
    );
    assert_eq!(benchmark.uid(), Some(42));
}

#[test]
fn test_get_benchmark_not_found() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    server.mock(|when, then| {
        when.method(GET).path("/benchmarks/42");
        then.status(404).json_body(json!({"detail": "Not found."}));
    });

    let err = client.get_benchmark(42).unwrap_err();
    assert!(matches!(err, ServerError::NotFound { status: 404, .. }), "got {:?}", err);
}

#[test]
fn test_get_benchmark_models_preserves_order() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    server.mock(|when, then| {
        when.method(GET)
            .path("/benchmarks/3/models")
            .header("Authorization", AUTH);
        then.status(200).json_body(json!([
            {"id": 9, "name": "resnet"},
            {"id": 2, "name": "densenet"},
            {"id": 14, "name": "xrv"},
        ]));
    });

    assert_eq!(client.get_benchmark_models(3).unwrap(), vec![9, 2, 14]);
}

#[test]
fn test_get_benchmark_models_error() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    server.mock(|when, then| {
        when.method(GET).path("/benchmarks/3/models");
        then.status(500);
    });

    let err = client.get_benchmark_models(3).unwrap_err();
    assert!(matches!(err, ServerError::Retrieval { status: 500, .. }), "got {:?}", err);
}

// ── Cubes ───────────────────────────────────────────────────────────

#[test]
fn test_get_cube_metadata() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    server.mock(|when, then| {
        when.method(GET)
            .path("/mlcubes/5/")
            .header("Authorization", AUTH);
        then.status(200).json_body(json!({
            "id": 5,
            "git_mlcube_url": "https://host/mlcube.yaml",
            "tarball_hash": "abc",
        }));
    });

    let meta = client.get_cube_metadata(5).unwrap();
    assert_eq!(meta.uid(), Some(5));
    assert_eq!(meta.cube_url(), Some("https://host/mlcube.yaml"));
}

#[test]
fn test_get_cube_metadata_not_found() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    server.mock(|when, then| {
        when.method(GET).path("/mlcubes/5/");
        then.status(404);
    });

    assert!(matches!(client.get_cube_metadata(5), Err(ServerError::NotFound { .. })));
}

#[test]
fn test_download_writes_exact_bytes_and_overwrites() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    // Downloads do not need a session
    let client = ServerClient::new(server.base_url(), layout(dir.path())).unwrap();

    let payload: &[u8] = b"\x1f\x8b\x08\x00binary\x00tarball";
    let mock = server.mock(|when, then| {
        when.method(GET).path("/files/tmp.tar.gz");
        then.status(200).body(payload);
    });

    let url = server.url("/files/tmp.tar.gz");
    let path = client.get_cube_additional(&url, 11).unwrap();
    assert_eq!(
        path,
        dir.path().join("cubes/11/workspace/additional_files/tmp.tar.gz"),
    );
    assert_eq!(std::fs::read(&path).unwrap(), payload);

    // Second download replaces the file in place
    std::fs::write(&path, b"stale").unwrap();
    let again = client.get_cube_additional(&url, 11).unwrap();
    assert_eq!(again, path);
    assert_eq!(std::fs::read(&path).unwrap(), payload);

    mock.assert_calls(2);
}

#[test]
fn test_download_cube_and_params_paths() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = ServerClient::new(server.base_url(), layout(dir.path())).unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/mlcube.yaml");
        then.status(200).body("name: xrv\n");
    });
    server.mock(|when, then| {
        when.method(GET).path("/parameters.yaml");
        then.status(200).body("threshold: 0.5\n");
    });

    let cube = client.get_cube(&server.url("/mlcube.yaml"), 4).unwrap();
    let params = client.get_cube_params(&server.url("/parameters.yaml"), 4).unwrap();

    assert_eq!(cube, dir.path().join("cubes/4/mlcube.yaml"));
    assert_eq!(params, dir.path().join("cubes/4/workspace/parameters.yaml"));
    assert_eq!(std::fs::read_to_string(params).unwrap(), "threshold: 0.5\n");
}

#[test]
fn test_download_failure_writes_nothing() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = ServerClient::new(server.base_url(), layout(dir.path())).unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/missing.yaml");
        then.status(404);
    });

    let url = server.url("/missing.yaml");
    let err = client.get_cube(&url, 8).unwrap_err();

    match err {
        ServerError::Download { url: failed, status } => {
            assert_eq!(failed, url);
            assert_eq!(status, 404);
        }
        other => panic!("expected Download error, got {:?}", other),
    }
    assert!(!dir.path().join("cubes/8").exists());
}

#[test]
fn test_download_cube_files_from_metadata() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    server.mock(|when, then| {
        when.method(GET).path("/mlcubes/6/");
        then.status(200).json_body(json!({
            "id": 6,
            "git_mlcube_url": server.url("/raw/mlcube.yaml"),
            "git_parameters_url": "",
            "tarball_url": server.url("/raw/add.tar.gz"),
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/raw/mlcube.yaml");
        then.status(200).body("name: metrics\n");
    });
    let tarball = server.mock(|when, then| {
        when.method(GET).path("/raw/add.tar.gz");
        then.status(200).body("tar");
    });

    let meta = client.get_cube_metadata(6).unwrap();
    let files = client.download_cube_files(6, &meta).unwrap();

    assert_eq!(files.cube, dir.path().join("cubes/6/mlcube.yaml"));
    assert!(files.params.is_none());
    assert_eq!(
        files.additional.as_deref(),
        Some(dir.path().join("cubes/6/workspace/additional_files/tmp.tar.gz").as_path()),
    );
    tarball.assert();
}

// ── Registrations ───────────────────────────────────────────────────

#[test]
fn test_upload_dataset_returns_id() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    let registration = json!({
        "name": "chexpert-small",
        "description": "validation split",
        "generated_uid": "3c9a0d",
    });

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/datasets/")
            .header("Authorization", AUTH)
            .json_body(registration.clone());
        then.status(201).json_body(json!({"id": 17, "name": "chexpert-small"}));
    });

    assert_eq!(client.upload_dataset(&registration).unwrap(), 17);
    mock.assert();
}

#[test]
fn test_upload_dataset_requires_created() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    // 200 is not 201
    server.mock(|when, then| {
        when.method(POST).path("/datasets/");
        then.status(200).json_body(json!({"id": 17}));
    });

    let err = client.upload_dataset(&json!({"name": "d"})).unwrap_err();
    assert!(matches!(err, ServerError::Upload { status: 200, .. }), "got {:?}", err);
}

#[test]
fn test_upload_results() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    let results = json!({
        "benchmark": 1,
        "model": 2,
        "dataset": 3,
        "results": {"auc": 0.91},
    });

    server.mock(|when, then| {
        when.method(POST)
            .path("/results/")
            .header("Authorization", AUTH)
            .json_body(results.clone());
        then.status(201).json_body(json!({"id": 5}));
    });

    assert_eq!(client.upload_results(&results).unwrap(), 5);
}

#[test]
fn test_upload_results_rejected() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in(&server, dir.path());

    server.mock(|when, then| {
        when.method(POST).path("/results/");
        then.status(400).json_body(json!({"model": ["This field is required."]}));
    });

    let err = client.upload_results(&json!({})).unwrap_err();
    assert!(matches!(err, ServerError::Upload { status: 400, .. }));
}
