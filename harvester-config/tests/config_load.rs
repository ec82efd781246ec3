use harvester_config::HarvestConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FILE_YAML: &str = r#"
tag: todo
limit: 20
output_dir: exports
accounts:
  - name: account1
    instance: https://mastodon.social
    account_id: username1
    access_token: "${HARVEST_TEST_TOKEN_1}"
  - name: account2
    instance: https://fosstodon.org
    account_id: 109876
    access_token: "${HARVEST_TEST_TOKEN_2}"
"#;

#[test]
#[serial]
fn loads_accounts_from_file_and_expands_tokens() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "harvester.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("HARVEST_TEST_TOKEN_1", Some("tok-one")),
            ("HARVEST_TEST_TOKEN_2", Some("tok-two")),
        ],
        || {
            let config = HarvestConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load harvester config");

            assert_eq!(config.accounts.len(), 2);
            assert_eq!(config.accounts[0].name, "account1");
            assert_eq!(config.accounts[0].access_token, "tok-one");
            assert_eq!(config.accounts[1].account_id, "109876");
            assert_eq!(config.accounts[1].access_token, "tok-two");
            assert_eq!(config.page_size(), 20);
            assert_eq!(config.output_dir, PathBuf::from("exports"));
        },
    );
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "harvester.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("HARVESTER__TAG", Some("chores")),
            ("HARVESTER__LIMIT", Some("5")),
        ],
        || {
            let config = HarvestConfigLoader::new().with_file(&p).load().unwrap();
            assert_eq!(config.tag_name(), "chores");
            assert_eq!(config.page_size(), 5);
        },
    );
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.yaml");
    assert!(HarvestConfigLoader::new().with_file(missing).load().is_err());
}

#[test]
#[serial]
fn account_without_token_fails_to_load() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "harvester.yaml",
        "accounts:\n  - name: a\n    instance: https://x\n    account_id: a\n",
    );
    let err = HarvestConfigLoader::new().with_file(&p).load().unwrap_err();
    assert!(err.to_string().contains("access_token"));
}
