use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use skirmish_core::EvolutionConfig;

pub const DATA_DIR_ENV: &str = "SKIRMISH_DATA_DIR";
pub const SEED_ENV: &str = "SKIRMISH_SEED";
pub const DEFAULT_DATA_DIR: &str = "./skirmish-data";

/// Config file wins over a preset; with neither the defaults apply. A seed in
/// `SKIRMISH_SEED` overrides whatever was loaded.
pub fn load_config(path: Option<&Path>, preset: Option<&str>) -> Result<EvolutionConfig> {
    let mut cfg = if let Some(path) = path {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_slice::<EvolutionConfig>(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))?
    } else if let Some(name) = preset {
        EvolutionConfig::preset(name).ok_or_else(|| {
            anyhow!(
                "unknown preset '{}' (try: elitist, roulette, smoke)",
                name
            )
        })?
    } else {
        EvolutionConfig::default()
    };

    if let Some(seed) = read_env_seed(SEED_ENV) {
        cfg.seed = seed;
    }
    cfg.clamp();
    Ok(cfg)
}

/// Flag, then `SKIRMISH_DATA_DIR`, then `./skirmish-data`.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| read_env_path(DATA_DIR_ENV))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Decimal or `0x`-prefixed hex.
pub fn parse_seed(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| anyhow!("invalid hex seed '{}': {}", s, e))
    } else {
        s.parse::<u32>()
            .map_err(|e| anyhow!("invalid seed '{}': {}", s, e))
    }
}

pub(crate) fn read_env_seed(name: &str) -> Option<u32> {
    env::var(name).ok().and_then(|value| parse_seed(&value).ok())
}

pub(crate) fn read_env_path(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::SelectionStrategy;

    #[test]
    fn parse_seed_accepts_hex_and_decimal() {
        assert_eq!(parse_seed("0xDEADBEEF").unwrap(), 0xDEAD_BEEF);
        assert_eq!(parse_seed(" 42 ").unwrap(), 42);
        assert!(parse_seed("0xZZ").is_err());
        assert!(parse_seed("-1").is_err());
    }

    #[test]
    fn preset_is_used_when_no_file_given() {
        let cfg = load_config(None, Some("roulette")).unwrap();
        assert_eq!(cfg.selection, SelectionStrategy::Roulette);
    }

    #[test]
    fn unknown_preset_lists_the_known_ones() {
        let err = load_config(None, Some("nope")).unwrap_err().to_string();
        assert!(err.contains("unknown preset 'nope'"));
        assert!(err.contains("smoke"));
    }

    #[test]
    fn config_file_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let cfg = EvolutionConfig {
            population_size: 2,
            ..EvolutionConfig::default()
        };
        std::fs::write(&path, serde_json::to_vec(&cfg).unwrap()).unwrap();

        let loaded = load_config(Some(path.as_path()), Some("smoke")).unwrap();
        assert_eq!(
            loaded.population_size,
            skirmish_core::config::MIN_POPULATION
        );
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let err = load_config(Some(Path::new("/nonexistent/cfg.json")), None)
            .unwrap_err()
            .to_string();
        assert!(err.contains("/nonexistent/cfg.json"));
    }

    #[test]
    fn explicit_data_dir_flag_wins() {
        let dir = resolve_data_dir(Some(PathBuf::from("/tmp/somewhere")));
        assert_eq!(dir, PathBuf::from("/tmp/somewhere"));
    }
}
