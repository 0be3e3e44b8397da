//! Configuration loading and resolution.

use std::path::PathBuf;

/// Environment variable naming the project root.
pub const PROJECT_DIR_ENV: &str = "SELECTOR_FORGE_HOME";

/// Directory holding the page map.
pub const DATA_DIR: &str = "data";

/// Directory holding one folder per captured page.
pub const PAGES_DIR: &str = "Test_Pages";

/// Directory holding captured screenshots.
pub const SCREENSHOTS_DIR: &str = "reports/screenshots";

/// Resolve the project root: explicit path, then `SELECTOR_FORGE_HOME`, then the working directory.
pub fn resolve_project_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(PROJECT_DIR_ENV) {
        if !env_path.trim().is_empty() {
            return PathBuf::from(env_path);
        }
    }

    PathBuf::from(".")
}

/// Location of the REPL history file.
pub fn repl_history_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(home).join(".selector_forge_history")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        assert_eq!(resolve_project_dir(Some("/tmp/proj")), PathBuf::from("/tmp/proj"));
    }
}
