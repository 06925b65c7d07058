use super::*;
use crate::config::SessionConfig;
use tempfile::TempDir;

fn config_in(temp_dir: &TempDir) -> Config {
    Config {
        session: SessionConfig {
            state_dir: temp_dir.path().join("state"),
            db_file: temp_dir.path().join("state").join("agent.db"),
            history_turns: 3,
        },
        ..Default::default()
    }
}

#[test]
fn test_timing_records_phases_in_order() {
    let mut timing = TimingScope::new();
    timing.start_phase("first");
    timing.start_phase("second");
    assert!(timing.end_phase("second").is_some());
    assert!(timing.end_phase("first").is_some());
    assert!(timing.end_phase("never_started").is_none());

    let names: Vec<&str> = timing
        .get_phase_durations()
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(names, vec!["second", "first"]);

    let report = timing.generate_timing_report();
    assert!(report.contains("- second:"));
    assert!(report.contains("- first:"));
}

#[test]
fn test_explicit_user_is_saved() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(&temp_dir);

    assert_eq!(resolve_user_id(&config, Some(" alice ")).unwrap(), "alice");
    assert_eq!(
        load_user_id(&config.user_file()).unwrap().as_deref(),
        Some("alice")
    );
    // 之后不带参数时沿用已保存的标识
    assert_eq!(resolve_user_id(&config, None).unwrap(), "alice");
}

#[test]
fn test_write_output_creates_parent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("reports").join("idea.md");
    write_output(&path, "# Report").unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), "# Report");
}

#[tokio::test]
async fn test_dns_facts_rejects_invalid_domain() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(&temp_dir);
    assert!(launch_dns_facts(&config, "not a domain").await.is_err());
}
