use crate::foundation::error::FramewireResult;
use std::path::PathBuf;

/// Default block source read size, in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 500_000;

/// Runtime settings supplied by the embedding application.
///
/// Framewire never reads or writes configuration storage itself; the caller
/// constructs this value (or deserializes it with [`Config::from_json`]) and
/// passes it wherever a block source or renderer is opened.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Read chunk size used by block sources, in bytes.
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// Path to the external renderer executable, if one is available.
    #[serde(default)]
    pub renderer: Option<PathBuf>,
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            renderer: None,
        }
    }
}

impl Config {
    /// Parse a configuration value from a JSON string.
    pub fn from_json(json: &str) -> FramewireResult<Self> {
        let cfg = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("parse configuration JSON: {e}"))?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg.block_size, DEFAULT_BLOCK_SIZE);
        assert!(cfg.renderer.is_none());
    }

    #[test]
    fn explicit_fields_are_honored() {
        let cfg =
            Config::from_json(r#"{"block_size": 1024, "renderer": "/usr/bin/raytracer"}"#).unwrap();
        assert_eq!(cfg.block_size, 1024);
        assert_eq!(cfg.renderer, Some(PathBuf::from("/usr/bin/raytracer")));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(Config::from_json("not json").is_err());
    }
}
