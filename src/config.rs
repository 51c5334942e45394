use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "TimerConfig::default_warn_budget_ms")]
    pub warn_budget_ms: f64,
    #[serde(default)]
    pub log_lifecycle: bool,
}

impl TimerConfig {
    const fn default_warn_budget_ms() -> f64 {
        4.0
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read timer config {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse timer config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("[timers] config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self { warn_budget_ms: Self::default_warn_budget_ms(), log_lifecycle: false }
    }
}
