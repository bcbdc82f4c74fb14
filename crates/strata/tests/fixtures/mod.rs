use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Writes `contents` to `<tmp>/<name>` and returns the directory guard with the file path.
///
/// # Panics
/// * If the temporary directory or file cannot be created.
#[must_use]
pub fn config_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write config");
    (dir, path)
}

pub const FULL_TOML: &str = r#"
[logging]
name = "registry-app"
level = "debug"
console = false
json = true
max_files = 3

[properties]
".net.Host" = "example.org"
".net.http.UserAgent" = "strata/1.0"
"#;
