//! Driver configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vfe_graph::Override;

use crate::error::{AppError, AppResult};

/// Which override form to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    Value,
    Offset,
    Scale,
}

/// Override for one single variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverrideDef {
    /// Variable index in the VFE table.
    pub var: u8,
    pub kind: OverrideKind,
    pub value: f32,
}

impl OverrideDef {
    pub fn to_override(&self) -> Override {
        match self.kind {
            OverrideKind::Value => Override::Value(self.value),
            OverrideKind::Offset => Override::Offset(self.value),
            OverrideKind::Scale => Override::Scale(self.value),
        }
    }
}

/// Knobs the driver passes to VFE setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Bound on each coprocessor round-trip.
    pub pmu_timeout_ms: u64,
    /// Fail decoding on unrecognized fuse-20 ids.
    pub strict_fuse_ids: bool,
    pub overrides: Vec<OverrideDef>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            pmu_timeout_ms: 1000,
            strict_fuse_ids: false,
            overrides: Vec::new(),
        }
    }
}

impl DriverConfig {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load_yaml(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn pmu_timeout(&self) -> Duration {
        Duration::from_millis(self.pmu_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = DriverConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, DriverConfig::default());
        assert_eq!(cfg.pmu_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn parses_overrides() {
        let yaml = r#"
pmu_timeout_ms: 250
strict_fuse_ids: true
overrides:
  - var: 3
    kind: offset
    value: -12.5
  - var: 0
    kind: value
    value: 800
"#;
        let cfg = DriverConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.pmu_timeout_ms, 250);
        assert!(cfg.strict_fuse_ids);
        assert_eq!(cfg.overrides[0].to_override(), Override::Offset(-12.5));
        assert_eq!(cfg.overrides[1].to_override(), Override::Value(800.0));
    }

    #[test]
    fn rejects_unknown_override_kind() {
        let yaml = "overrides:\n  - { var: 1, kind: clamp, value: 1.0 }\n";
        assert!(matches!(
            DriverConfig::from_yaml_str(yaml),
            Err(AppError::Yaml(_))
        ));
    }
}
