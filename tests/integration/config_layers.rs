//! Integration tests for configuration loading

use sectionseo::config::{ConfigLoader, ProviderKind};
use tempfile::TempDir;

#[test]
fn test_workspace_file_and_environment_file_merge() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();

    std::fs::write(
        config_dir.join("config.toml"),
        r#"
[generation]
api_key = "from-workspace"
provider = "DeepSeek"
ai_model = "DeepSeek-V3"
iblock_id = 7
exclusions = "3, 4, abc"

[endpoint]
url = "http://localhost:9000/seo/"
"#,
    )
    .unwrap();
    std::fs::write(
        config_dir.join("development.toml"),
        r#"
[generation]
limit = 25
"#,
    )
    .unwrap();

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.generation.api_key, "from-workspace");
    assert_eq!(config.generation.provider, ProviderKind::DeepSeek);
    assert_eq!(config.generation.iblock_id, 7);
    assert_eq!(config.generation.limit, 25);
    assert!(config.generation.validate().is_ok());
    assert_eq!(config.endpoint.url, "http://localhost:9000/seo/");

    let scope = config.generation.scope();
    assert_eq!(scope.exclusion_ids, vec!["3", "4", "abc"]);
}

#[test]
fn test_explicit_file_keeps_defaults_for_missing_sections() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("seo.toml");
    std::fs::write(
        &config_file,
        r#"
[generation]
api_key = "k"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.endpoint.url, "https://test/seo/");
    assert_eq!(config.generation.max_length_title, 80);
    assert!(config.generation.skip_processed);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
}
