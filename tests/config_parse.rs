use emoji_batch::config::{Config, DuplicatePolicy};

#[test]
fn parse_example_config() {
    let raw = include_str!("../emoji-batch.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.global.progress_filename, "progress.json");
    assert_eq!(cfg.duplicates.parse_policy().unwrap(), DuplicatePolicy::Record);
    assert_eq!(
        cfg.workspace.emoji_page_url().unwrap(),
        "https://my-team.slack.com/customize/emoji"
    );
}

#[test]
fn empty_config_uses_defaults() {
    let cfg: Config = toml::from_str("").expect("parse TOML");
    assert_eq!(cfg.timeouts.duplicate_check_ms, 250);
    assert_eq!(cfg.timeouts.save_seconds, 60);
    assert!(cfg.browser.headless);
    assert!(cfg.workspace.emoji_page_url().is_err());
}
