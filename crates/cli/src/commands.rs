//! Benchmark server commands.
//!
//! `medperf login`                 check credentials
//! `medperf benchmark show|models` benchmark lookups
//! `medperf cube show|download`    cube metadata and artifacts
//! `medperf dataset upload`        register a dataset
//! `medperf result upload`         register benchmark results
//!
//! Every command opens its own session: create the client, log in, run one
//! operation. Tokens are never written to disk.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use medperf_config::Settings;
use medperf_server_client::{ServerClient, ServerError};

use crate::exit_codes::*;
use crate::{CliError, OutputFormat};

/// Everything a command needs to reach the server.
pub struct Context {
    pub settings: Settings,
    pub username: Option<String>,
    pub password: Option<String>,
}

// ── Session ─────────────────────────────────────────────────────────

/// Build a client from settings and log in.
pub fn connect(ctx: &Context) -> Result<ServerClient, CliError> {
    let username = ctx.username.as_deref().ok_or_else(|| {
        CliError::args("No username provided")
            .with_hint("pass --username or set MEDPERF_USERNAME")
    })?;
    let password = ctx.password.as_deref().ok_or_else(|| {
        CliError::args("No password provided")
            .with_hint("pass --password or set MEDPERF_PASSWORD")
    })?;

    let mut client = ServerClient::with_timeout(
        ctx.settings.server.clone(),
        ctx.settings.cube_layout(),
        Duration::from_secs(ctx.settings.timeout_secs),
    )
    .map_err(server_error)?;

    client.login(username, password).map_err(server_error)?;
    Ok(client)
}

pub fn cmd_login(ctx: &Context) -> Result<(), CliError> {
    connect(ctx)?;
    eprintln!("Authenticated against {}", ctx.settings.server);
    Ok(())
}

// ── Benchmarks ──────────────────────────────────────────────────────

pub fn cmd_benchmark_show(ctx: &Context, benchmark_uid: u64, format: OutputFormat) -> Result<(), CliError> {
    let client = connect(ctx)?;
    let benchmark = client.get_benchmark(benchmark_uid).map_err(server_error)?;
    print!("{}", render(&benchmark, format)?);
    Ok(())
}

pub fn cmd_benchmark_models(ctx: &Context, benchmark_uid: u64, format: OutputFormat) -> Result<(), CliError> {
    let client = connect(ctx)?;
    let models = client.get_benchmark_models(benchmark_uid).map_err(server_error)?;

    match format {
        OutputFormat::Text => {
            for uid in models {
                println!("{}", uid);
            }
        }
        other => print!("{}", render(&models, other)?),
    }
    Ok(())
}

// ── Cubes ───────────────────────────────────────────────────────────

pub fn cmd_cube_show(ctx: &Context, cube_uid: u64, format: OutputFormat) -> Result<(), CliError> {
    let client = connect(ctx)?;
    let metadata = client.get_cube_metadata(cube_uid).map_err(server_error)?;
    print!("{}", render(&metadata, format)?);
    Ok(())
}

pub fn cmd_cube_download(ctx: &Context, cube_uid: u64, format: OutputFormat) -> Result<(), CliError> {
    let client = connect(ctx)?;
    let metadata = client.get_cube_metadata(cube_uid).map_err(server_error)?;
    let files = client.download_cube_files(cube_uid, &metadata).map_err(server_error)?;

    match format {
        OutputFormat::Text => {
            println!("{}", files.cube.display());
            for path in files.params.iter().chain(files.additional.iter()) {
                println!("{}", path.display());
            }
        }
        other => print!("{}", render(&files, other)?),
    }
    Ok(())
}

// ── Registrations ───────────────────────────────────────────────────

pub fn cmd_dataset_upload(ctx: &Context, file: &Path) -> Result<(), CliError> {
    let registration = read_registration(file)?;
    let client = connect(ctx)?;
    let uid = client.upload_dataset(&registration).map_err(server_error)?;
    println!("{}", uid);
    eprintln!("Dataset registered with UID {}", uid);
    Ok(())
}

pub fn cmd_result_upload(ctx: &Context, file: &Path) -> Result<(), CliError> {
    let results = read_registration(file)?;
    let client = connect(ctx)?;
    let uid = client.upload_results(&results).map_err(server_error)?;
    println!("{}", uid);
    eprintln!("Results registered with UID {}", uid);
    Ok(())
}

/// Read a registration record. YAML is accepted, so JSON files work too.
pub fn read_registration(file: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(file).map_err(|e| {
        let message = format!("{}: {}", file.display(), e);
        if e.kind() == std::io::ErrorKind::NotFound {
            CliError::args(message)
        } else {
            CliError::io(message)
        }
    })?;

    let yaml: serde_yaml::Value = serde_yaml::from_str(&contents).map_err(|e| {
        CliError::parse(format!("{}: {}", file.display(), e))
    })?;

    if !yaml.is_mapping() {
        return Err(CliError::parse(format!("{}: expected a mapping at the top level", file.display())));
    }

    // JSON has no NaN/Inf; serde_json would store them as null.
    if let Some(key) = find_non_finite(&yaml, "") {
        return Err(CliError::parse(format!(
            "{}: non-finite number at '{}' cannot be sent as JSON",
            file.display(),
            key,
        )));
    }

    serde_json::to_value(&yaml).map_err(|e| CliError::parse(format!("{}: {}", file.display(), e)))
}

/// Dotted path of the first NaN or infinite float, if any.
fn find_non_finite(value: &serde_yaml::Value, path: &str) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::Number(n) => n.as_f64()
            .filter(|f| !f.is_finite())
            .map(|_| path.to_string()),
        Value::Sequence(items) => items.iter().enumerate().find_map(|(i, item)| {
            find_non_finite(item, &join_key(path, &i.to_string()))
        }),
        Value::Mapping(map) => map.iter().find_map(|(k, v)| {
            let key = match k {
                Value::String(s) => s.clone(),
                other => serde_yaml::to_string(other)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default(),
            };
            find_non_finite(v, &join_key(path, &key))
        }),
        Value::Tagged(tagged) => find_non_finite(&tagged.value, path),
        _ => None,
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

// ── Output ──────────────────────────────────────────────────────────

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|s| s + "\n")
            .map_err(|e| e.to_string()),
        OutputFormat::Yaml | OutputFormat::Text => {
            serde_yaml::to_string(value).map_err(|e| e.to_string())
        }
    };
    rendered.map_err(|message| CliError { code: EXIT_ERROR, message, hint: None })
}

/// Convert a server error into a CLI error with a hint where one helps.
pub fn server_error(e: ServerError) -> CliError {
    let hint = match &e {
        ServerError::Authentication { .. } => Some("check MEDPERF_USERNAME / MEDPERF_PASSWORD"),
        ServerError::Network(_) => Some("is the server URL right? set --server or MEDPERF_SERVER"),
        ServerError::Upload { status: 400, .. } => Some("the server rejected the record; check required fields"),
        _ => None,
    };

    CliError {
        code: server_exit_code(&e),
        message: e.to_string(),
        hint: hint.map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_registration_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registration.yaml");
        std::fs::write(&path, "name: chexpert\nsplit_seed: 0\nmetadata:\n  rows: 234\n").unwrap();

        let value = read_registration(&path).unwrap();
        assert_eq!(value["name"], "chexpert");
        assert_eq!(value["metadata"]["rows"], 234);
    }

    #[test]
    fn test_read_registration_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, r#"{"benchmark": 1, "results": {"auc": 0.9}}"#).unwrap();

        let value = read_registration(&path).unwrap();
        assert_eq!(value["benchmark"], 1);
    }

    #[test]
    fn test_read_registration_rejects_scalars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "- just\n- a list\n").unwrap();

        let err = read_registration(&path).unwrap_err();
        assert_eq!(err.code, EXIT_PARSE);
    }

    #[test]
    fn test_read_registration_rejects_nan_metric() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.yaml");
        std::fs::write(&path, "results:\n  auc: .nan\n").unwrap();

        let err = read_registration(&path).unwrap_err();
        assert_eq!(err.code, EXIT_PARSE);
        assert!(err.message.contains("results.auc"), "message: {}", err.message);
    }

    #[test]
    fn test_read_registration_rejects_infinity_in_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.yaml");
        std::fs::write(&path, "scores:\n  - 0.5\n  - -.inf\n").unwrap();

        let err = read_registration(&path).unwrap_err();
        assert_eq!(err.code, EXIT_PARSE);
        assert!(err.message.contains("scores.1"), "message: {}", err.message);
    }

    #[test]
    fn test_read_registration_keeps_finite_floats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.yaml");
        std::fs::write(&path, "results:\n  auc: 0.875\n  f1: 1.0e-3\n").unwrap();

        let value = read_registration(&path).unwrap();
        assert_eq!(value["results"]["auc"], 0.875);
        assert_eq!(value["results"]["f1"], 0.001);
    }

    #[test]
    fn test_read_registration_missing_file() {
        let err = read_registration(Path::new("/nonexistent/registration.yaml")).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }

    #[test]
    fn test_connect_requires_credentials() {
        let ctx = Context {
            settings: Settings::default(),
            username: None,
            password: Some("pw".into()),
        };
        let err = connect(&ctx).err().unwrap();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.hint.unwrap().contains("MEDPERF_USERNAME"));
    }

    #[test]
    fn test_server_error_mapping() {
        let err = server_error(ServerError::NotFound { what: "benchmark", status: 404 });
        assert_eq!(err.code, EXIT_SERVER_NOT_FOUND);
        assert!(err.message.contains("benchmark doesn't exist"));
        assert!(err.hint.is_none());

        let err = server_error(ServerError::Authentication { status: 400 });
        assert_eq!(err.code, EXIT_SERVER_AUTH);
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_render_formats() {
        let value = serde_json::json!({"id": 42, "name": "demo"});
        let json = render(&value, OutputFormat::Json).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&json).unwrap(), value);

        let yaml = render(&value, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("id: 42"));
        assert!(yaml.contains("name: demo"));
    }
}
