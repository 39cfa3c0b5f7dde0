use crate::storage::SqliteStore;
use crate::visitation::VisitationLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SkosdbConfig {
    /// Database file, relative to the base directory unless absolute
    pub database: Option<String>,
    #[serde(default)]
    pub visitation: VisitationLimits,
}

impl SkosdbConfig {
    pub fn database_path_in(&self, base: &Path) -> PathBuf {
        match &self.database {
            Some(db) => base.join(db),
            None => default_database_path_in(base),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("skosdb.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".skosdb").join("skosdb.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<SkosdbConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: SkosdbConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &SkosdbConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "skosdb config already exists at {}; refusing to replace its database and visitation settings without force",
            path.display()
        );
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Open (and create if needed) the store a config points at
pub fn open_store(config: &SkosdbConfig, base: &Path) -> anyhow::Result<SqliteStore> {
    let db_path = config.database_path_in(base);
    ensure_db_dir(&db_path)?;
    info!("Opening store at {}", db_path.display());
    Ok(SqliteStore::open(&db_path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thing::ConceptScheme;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("skosdb.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skosdb.toml");
        let config = SkosdbConfig {
            database: Some("thesaurus.db".into()),
            visitation: VisitationLimits {
                max_depth: Some(64),
                max_rows: None,
            },
        };

        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(config.clone()));

        let err = write_config(&path, &config, false).unwrap_err();
        assert!(err.to_string().contains("skosdb config already exists"));
        write_config(&path, &SkosdbConfig::default(), true).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(SkosdbConfig::default()));
    }

    #[test]
    fn test_limits_default_when_absent() {
        let config: SkosdbConfig = toml::from_str(r#"database = "a.db""#).unwrap();
        assert_eq!(config.visitation, VisitationLimits::default());
    }

    #[test]
    fn test_open_store_creates_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = SkosdbConfig::default();
        let db_path = default_database_path_in(dir.path());

        {
            let store = open_store(&config, dir.path()).unwrap();
            store.session().create_scheme(&ConceptScheme::new(1)).unwrap();
        }
        assert!(db_path.exists());

        let store = open_store(&config, dir.path()).unwrap();
        assert!(store.session().get_scheme(1).unwrap().is_some());
    }
}
