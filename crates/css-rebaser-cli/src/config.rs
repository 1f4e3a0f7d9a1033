//! Configuration loading.

use crate::error::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use css_rebaser::{PolicyError, PrefixRewrite, RulesPolicy};
use serde::Deserialize;
use std::fs;

/// File picked up from the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "css-rebase.json";

/// Settings read from `css-rebase.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RebaseConfig {
    /// Directory that absolute source paths are made relative to.
    pub base_dir: Option<Utf8PathBuf>,
    /// Produce a source map even without `--map-output`.
    pub emit_map: Option<bool>,
    /// Globs of resolved paths that are left untouched.
    pub exclude: Vec<String>,
    /// Prefix substitutions applied to resolved paths.
    pub rewrites: Vec<PrefixRewrite>,
}

impl RebaseConfig {
    /// Loads `explicit`, or `css-rebase.json` from `cwd` when it exists.
    ///
    /// A relative `baseDir` is taken relative to the config file.
    pub fn load(explicit: Option<&Utf8Path>, cwd: &Utf8Path) -> Result<Self, CliError> {
        let path = match explicit {
            Some(path) => cwd.join(path),
            None => {
                let path = cwd.join(CONFIG_FILE);
                if !path.is_file() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&content).map_err(|source| CliError::Config {
                path: path.clone(),
                source,
            })?;

        if let (Some(base_dir), Some(dir)) = (&config.base_dir, path.parent()) {
            if base_dir.is_relative() {
                config.base_dir = Some(dir.join(base_dir));
            }
        }

        Ok(config)
    }

    /// Builds the policy described by `exclude` and `rewrites`.
    pub fn policy(&self) -> Result<RulesPolicy, PolicyError> {
        RulesPolicy::new(self.exclude.as_slice(), self.rewrites.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utf8_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_missing_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = RebaseConfig::load(None, &utf8_dir(&dir)).unwrap();
        assert_eq!(config, RebaseConfig::default());
    }

    #[test]
    fn test_default_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_dir(&dir);
        fs::write(
            root.join(CONFIG_FILE),
            r#"{
                "baseDir": "styles",
                "emitMap": true,
                "exclude": ["**/*.svg"],
                "rewrites": [{ "from": "node_modules/", "to": "~" }]
            }"#,
        )
        .unwrap();

        let config = RebaseConfig::load(None, &root).unwrap();
        assert_eq!(config.base_dir, Some(root.join("styles")));
        assert_eq!(config.emit_map, Some(true));
        assert_eq!(config.exclude, vec!["**/*.svg".to_string()]);
        assert_eq!(
            config.rewrites,
            vec![PrefixRewrite {
                from: "node_modules/".to_string(),
                to: "~".to_string(),
            }]
        );
        assert!(config.policy().is_ok());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = RebaseConfig::load(Some(Utf8Path::new("nope.json")), &utf8_dir(&dir))
            .unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_dir(&dir);
        fs::write(root.join("custom.json"), r#"{ "base": "x" }"#).unwrap();

        let err = RebaseConfig::load(Some(Utf8Path::new("custom.json")), &root).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_invalid_glob() {
        let config = RebaseConfig {
            exclude: vec!["a[".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.policy(), Err(PolicyError::InvalidGlob(_))));
    }
}
