//! Editor configuration, loaded from JSON. Every field has a default.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use easel_history::HistoryConfig;
use easel_project::AutosaveConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub autosave: AutosaveConfig,
}

/// Load editor config from disk.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<EditorConfig> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config file: {}", path.display()))?;
    let config: EditorConfig = serde_json::from_str(&data).context("parse config json")?;
    tracing::debug!(?config, "Loaded editor config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: EditorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert!(config.history.truncate_redo_on_new_action);
        assert_eq!(config.history.max_states, None);
        assert_eq!(config.autosave.debounce_ms, 500);
        assert!(config.autosave.flush_on_close);
    }

    #[test]
    fn test_partial_config() {
        let config: EditorConfig = serde_json::from_str(
            r#"{ "history": { "truncate_redo_on_new_action": false }, "autosave": { "debounce_ms": 250 } }"#,
        )
        .unwrap();
        assert!(!config.history.truncate_redo_on_new_action);
        assert_eq!(config.autosave.debounce_ms, 250);
        assert!(config.autosave.flush_on_close);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_config("target/does-not-exist.json").unwrap_err();
        assert!(format!("{err:#}").contains("read config file"));
    }
}
