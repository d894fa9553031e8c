//! Tests for config functionality.

use crate::config::{Config, LlmConfig};
use crate::error::PromptError;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.llm.provider, "anthropic");
    assert_eq!(config.llm.model, "claude-3-7-sonnet-latest");
    assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
    assert_eq!(config.llm.temperature, 0.7);
    assert_eq!(config.llm.max_tokens, 1024);
    assert_eq!(config.llm.top_p, 1.0);
    assert!(config.llm.system_prompt.is_empty());
    assert_eq!(config.run.max_iterations, 10);
    assert_eq!(config.run.log_file, "logs/prompt_tests.json");
    assert!(config.run.append_timestamp);
    assert_eq!(config.best_of_n.num_runs, 5);
    assert_eq!(config.best_of_n.log_file, "logs/best_of_n_tests.json");
    assert!(config.best_of_n.eval_template.contains("{{initial_prompt}}"));
    assert!(config.best_of_n.eval_template.contains("{{outputs}}"));
    assert_eq!(
        config.best_of_n.eval_vars,
        "outputs=$$results(Output), initial_prompt=$$initial_prompt()"
    );
    config.validate().unwrap();
}

#[test]
fn test_parse_empty_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config.run.max_iterations, 10);
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
llm:
  model: claude-3-5-haiku-latest
  temperature: 0.2
run:
  max_iterations: 3
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.llm.model, "claude-3-5-haiku-latest");
    assert_eq!(config.llm.temperature, 0.2);
    assert_eq!(config.run.max_iterations, 3);

    // Unspecified values should use defaults
    assert_eq!(config.llm.max_tokens, 1024);
    assert_eq!(config.run.log_file, "logs/prompt_tests.json");
    assert_eq!(config.best_of_n.num_runs, 5);
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
future_setting: 42
llm:
  provider: anthropic
  shiny_new_knob: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.llm.provider, "anthropic");
}

#[test]
fn test_rejects_unknown_provider() {
    let err = Config::from_yaml("llm:\n  provider: nope\n").unwrap_err();
    assert!(err.to_string().contains("unknown provider 'nope'"));
}

#[test]
fn test_rejects_out_of_range_temperature() {
    let err = Config::from_yaml("llm:\n  temperature: 1.5\n").unwrap_err();
    assert!(err.to_string().contains("temperature"));
}

#[test]
fn test_rejects_out_of_range_top_p() {
    let err = Config::from_yaml("llm:\n  top_p: -0.1\n").unwrap_err();
    assert!(err.to_string().contains("top_p"));
}

#[test]
fn test_rejects_zero_limits() {
    assert!(Config::from_yaml("llm:\n  max_tokens: 0\n").is_err());
    assert!(Config::from_yaml("run:\n  max_iterations: 0\n").is_err());
    assert!(Config::from_yaml("best_of_n:\n  num_runs: 0\n").is_err());
}

#[test]
fn test_invalid_yaml_is_user_error() {
    let err = Config::from_yaml("llm: [unclosed").unwrap_err();
    assert!(matches!(err, PromptError::UserError(_)));
}

#[test]
fn test_yaml_roundtrip() {
    let mut config = Config::default();
    config.llm.system_prompt = "Be brief.".to_string();
    config.best_of_n.num_runs = 3;

    let yaml = serde_yaml::to_string(&config).unwrap();
    let back = Config::from_yaml(&yaml).unwrap();

    assert_eq!(back.llm.system_prompt, "Be brief.");
    assert_eq!(back.best_of_n.num_runs, 3);
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("promptmill.yaml");
    std::fs::write(&path, "run:\n  log_file: out/log.json\n").unwrap();

    let config = Config::resolve(Some(path.as_path())).unwrap();
    assert_eq!(config.run.log_file, "out/log.json");
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::resolve(Some(dir.path().join("absent.yaml").as_path())).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_explicit_api_key_wins() {
    let llm = LlmConfig {
        api_key_env: "PROMPTMILL_TEST_UNUSED_KEY".to_string(),
        ..LlmConfig::default()
    };
    assert_eq!(llm.resolve_api_key(Some("  sk-explicit ")).unwrap(), "sk-explicit");
}

#[test]
#[serial]
fn test_api_key_from_environment() {
    let llm = LlmConfig {
        api_key_env: "PROMPTMILL_TEST_API_KEY".to_string(),
        ..LlmConfig::default()
    };
    // SAFETY: serialized test; no other thread reads this variable.
    unsafe { std::env::set_var("PROMPTMILL_TEST_API_KEY", "sk-from-env") };
    let key = llm.resolve_api_key(None);
    unsafe { std::env::remove_var("PROMPTMILL_TEST_API_KEY") };

    assert_eq!(key.unwrap(), "sk-from-env");
}

#[test]
#[serial]
fn test_missing_api_key_is_credential_error() {
    let llm = LlmConfig {
        api_key_env: "PROMPTMILL_TEST_MISSING_KEY".to_string(),
        ..LlmConfig::default()
    };
    // SAFETY: serialized test; no other thread reads this variable.
    unsafe { std::env::remove_var("PROMPTMILL_TEST_MISSING_KEY") };

    let err = llm.resolve_api_key(Some("   ")).unwrap_err();
    assert!(matches!(err, PromptError::MissingCredential(_)));
    assert!(err.to_string().contains("PROMPTMILL_TEST_MISSING_KEY"));
}
