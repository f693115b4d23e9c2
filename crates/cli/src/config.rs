use anyhow::{Context as AnyhowContext, Result};
use pairs_collector::PipelineConfig;
use pairs_vector_store::ClusterCount;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "PAIRS_CONFIG";

/// Explicit `--config`, else `PAIRS_CONFIG`, else none.
pub fn config_path(flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf).or_else(|| {
        env::var_os(CONFIG_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}

pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: PipelineConfig = toml::from_str(&raw)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub target: Option<usize>,
    pub per_source_cap: Option<usize>,
    pub min_pairs: Option<usize>,
    pub dim: Option<usize>,
    pub k: Option<ClusterCount>,
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(value) = self.min_len {
            config.min_len = value;
        }
        if let Some(value) = self.max_len {
            config.max_len = value;
        }
        if let Some(value) = self.target {
            config.target = value;
        }
        if let Some(value) = self.per_source_cap {
            config.per_source_cap = value;
        }
        if let Some(value) = self.min_pairs {
            config.min_pairs = value;
        }
        if let Some(value) = self.dim {
            config.dim = value;
        }
        if let Some(value) = self.k {
            config.k = value;
        }
        if let Some(value) = self.iterations {
            config.iterations = value;
        }
        if let Some(value) = self.seed {
            config.seed = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_path_gives_defaults() {
        assert_eq!(load_config(None).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn toml_values_then_flags() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("pairs.toml");
        fs::write(&path, "min_len = 3\nk = 16\nseed = 7\n").unwrap();

        let mut config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.min_len, 3);
        assert_eq!(config.k, ClusterCount::Fixed(16));

        ConfigOverrides {
            seed: Some(9),
            k: Some(ClusterCount::Auto),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.seed, 9);
        assert_eq!(config.k, ClusterCount::Auto);
        assert_eq!(config.min_len, 3);
    }

    #[test]
    fn unknown_keys_fail_with_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "clusters = 4\n").unwrap();
        let err = load_config(Some(path.as_path())).unwrap_err();
        assert!(format!("{err:#}").contains("bad.toml"));
    }

    #[test]
    fn explicit_flag_wins_over_env() {
        let flag = PathBuf::from("explicit.toml");
        assert_eq!(config_path(Some(flag.as_path())), Some(flag));
    }
}
