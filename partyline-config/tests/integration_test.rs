//! Integration tests for partyline-config

use partyline_config::*;
use partyline_core::{Party, Request, Response};
use std::io::Write;
use tempfile::Builder;

fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file_then_env() {
    let file = temp_file(
        ".toml",
        r#"
        invites = ["/__invite__", "/one/__invite__"]
        partyline_key = "from_file"
        "#,
    );

    let env = EnvLoader::with_vars(ENV_PREFIX, [("PARTYLINE_KEY", "from_env")]);
    let config = PartyConfigLoader::new()
        .file(file.path())
        .env(env)
        .load()
        .unwrap();

    assert_eq!(config.invites, vec!["/__invite__", "/one/__invite__"]);
    assert_eq!(config.partyline_key, "from_env");
    assert!(!config.ignore_missing_services);
}

#[test]
fn test_json_file() {
    let file = temp_file(
        ".json",
        r#"{"invites": ["/two/__invite__"], "ignore_missing_services": true}"#,
    );

    let config = PartyConfigLoader::new().file(file.path()).load().unwrap();
    assert_eq!(config.invites, vec!["/two/__invite__"]);
    assert!(config.ignore_missing_services);
    assert_eq!(config.partyline_key, "partyline");
}

#[test]
fn test_env_file() {
    let file = temp_file(
        ".env",
        "PARTYLINE_INVITES=/a/__invite__,/b/__invite__\nPARTYLINE_BASE_URL=https://party.example\n",
    );

    let config = PartyConfigLoader::new().file(file.path()).load().unwrap();
    assert_eq!(config.invites, vec!["/a/__invite__", "/b/__invite__"]);
    assert_eq!(config.base_url.as_deref(), Some("https://party.example"));
}

#[test]
fn test_env_file_matches_dotenv_loader() {
    let content = "export PARTYLINE_KEY=party\nPARTYLINE_BASE_URL=http://localhost:5000 # dev\n";
    let file = temp_file(".env", content);

    let from_file = PartyConfigLoader::new().file(file.path()).load().unwrap();
    assert_eq!(from_file.partyline_key, "party");
    assert_eq!(from_file.base_url.as_deref(), Some("http://localhost:5000"));

    let env = EnvLoader::with_vars(ENV_PREFIX, Vec::<(String, String)>::new())
        .dotenv(file.path())
        .unwrap();
    let from_dotenv = PartyConfigLoader::new().env(env).load().unwrap();
    assert_eq!(from_file, from_dotenv);
}

#[test]
fn test_dotenv_fills_gaps_only() {
    let file = temp_file(
        ".env",
        "PARTYLINE_KEY=dotenv_key\nPARTYLINE_INVITES=/__invite__\n",
    );

    let env = EnvLoader::with_vars(ENV_PREFIX, [("PARTYLINE_KEY", "process_key")])
        .dotenv(file.path())
        .unwrap();
    let config = PartyConfigLoader::new().env(env).load().unwrap();

    assert_eq!(config.partyline_key, "process_key");
    assert_eq!(config.invites, vec!["/__invite__"]);
}

#[test]
fn test_invalid_file_is_rejected() {
    let file = temp_file(".toml", r#"invites = ["relative/__invite__"]"#);
    let result = PartyConfigLoader::new().file(file.path()).load();
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_missing_file() {
    let result = PartyConfigLoader::new().file("/nonexistent/party.toml").load();
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_loaded_config_drives_party() {
    let file = temp_file(".toml", r#"invites = ["/missing/__invite__"]"#);
    let config = PartyConfigLoader::new().file(file.path()).load().unwrap();

    let party = Party::builder()
        .mount("/present", |_req: Request| -> partyline_core::Result<Response> {
            Ok(Response::text("here"))
        })
        .config(config)
        .build()
        .unwrap();

    assert_eq!(party.rsvps().len(), 1);
    assert!(!party.rsvps()[0].is_accepted());
}
