//! `contextweave config` — Effective configuration.

use contextweave_config::AppConfig;
use std::path::PathBuf;

pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

pub fn run(config: &AppConfig, explicit: Option<PathBuf>, path_only: bool) -> anyhow::Result<()> {
    let path = config_path(explicit);
    if path_only {
        println!("{}", path.display());
        return Ok(());
    }

    if !path.exists() {
        println!("# No config file at {}, showing defaults", path.display());
    }
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_under_config_dir() {
        let path = config_path(None);
        assert!(path.ends_with(".contextweave/config.toml"));
    }

    #[test]
    fn explicit_path_wins() {
        let path = config_path(Some(PathBuf::from("/tmp/cw.toml")));
        assert_eq!(path, PathBuf::from("/tmp/cw.toml"));
    }

    #[test]
    fn effective_config_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let rendered = toml::to_string_pretty(&AppConfig::default()).unwrap();
        std::fs::write(&path, rendered).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.default_model, AppConfig::default().default_model);
    }
}
