// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Writes a harness configuration file into the temp dir and returns
/// its path.
pub fn write_config(temp_dir: &TempDir, content: &str) -> PathBuf {
    let config_path = temp_dir.path().join("BetaHarness.toml");
    fs::write(&config_path, content).expect("Failed to write config");
    config_path
}

/// A minimal configuration with no targets at all.
pub fn empty_config(temp_dir: &TempDir) -> PathBuf {
    write_config(
        temp_dir,
        r#"
language = "en"
"#,
    )
}

/// A configuration driving one long-lived process through the windows
/// adapter. `tail -f /dev/null` stays alive until the harness shuts it
/// down, so the connect/run/disconnect lifecycle is exercised end to
/// end without any real target software.
#[cfg(unix)]
pub fn tail_target_config(temp_dir: &TempDir, extra_tests: &str) -> PathBuf {
    let report_dir = temp_dir.path().join("reports");
    write_config(
        temp_dir,
        &format!(
            r#"
language = "en"
report_dir = "{report_dir}"

[[targets]]
name = "long-lived"
adapter = "windows"
target = "/usr/bin/tail"

[targets.config]
args = "-f /dev/null"
startup_secs = 0
shutdown_grace_secs = 0

[[targets.tests]]
name = "smoke"
{extra_tests}
"#,
            report_dir = report_dir.display(),
            extra_tests = extra_tests
        ),
    )
}

/// Helper to create an invalid TOML configuration.
pub fn create_invalid_toml(temp_dir: &TempDir) -> PathBuf {
    let config_path = temp_dir.path().join("invalid.toml");
    let content = r#"
language = "en"
# Invalid TOML - missing closing bracket
[[targets]
name = "broken"
"#;
    fs::write(&config_path, content).unwrap();
    config_path
}
