use forensight::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../forensight.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.server.primary_path, "/verify_with_instructions");
    assert_eq!(cfg.server.legacy_path, "/verify");
    assert_eq!(cfg.progress.cap_percent, 95);
    assert!(cfg.progress.min_step <= cfg.progress.max_step);
    assert!(!cfg.output.out_dir.is_empty());
}

#[test]
fn missing_keys_fall_back_to_defaults() {
    let raw = r#"
[server]
base_url = "http://forensics.local:9000/"
primary_path = "/v2/verify"
"#;
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.server.legacy_path, "/verify");
    assert_eq!(cfg.server.timeout_seconds, 300);
    assert_eq!(cfg.query.flag_clear_ms, 2000);
    assert_eq!(cfg.upload.file_field, "files");
    assert_eq!(
        cfg.endpoint(&cfg.server.primary_path),
        "http://forensics.local:9000/v2/verify"
    );
}
