//! Durable store for plugin Git registries.
//!
//! Registries live in `registries.yml` under the plugins directory: a fixed
//! comment header followed by a YAML mapping from host URL
//! (`scheme://host`) to an ordered list of organization paths. Every
//! operation is a full read-modify-write cycle; there is no locking because
//! the CLI is single-process and synchronous.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::config;
use crate::error::{TerminusError, TerminusResult};

pub const REGISTRIES_FILE: &str = "registries.yml";

/// Fixed header at the top of `registries.yml`. A file holding exactly this
/// header is an intentionally emptied store.
pub const REGISTRIES_HEADER: &str = "\
# Terminus plugin registries
#
# List of well-known or custom plugin Git registries
---";

const DEFAULT_HOST: &str = "https://github.com";
const DEFAULT_ORGS: [&str; 5] = [
    "pantheon-systems",
    "derimagia",
    "pi-ron",
    "sean-e-dietrich",
    "uberhacker",
];

/// Host URL mapped to its ordered organization paths.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registries(pub BTreeMap<String, Vec<String>>);

impl Registries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten into fully qualified `host/path` registry URLs.
    pub fn urls(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(host, paths)| paths.iter().map(move |path| format!("{}/{}", host, path)))
            .collect()
    }

    fn seeded() -> Self {
        let mut map = BTreeMap::new();
        map.insert(
            DEFAULT_HOST.to_string(),
            DEFAULT_ORGS.iter().map(|org| org.to_string()).collect(),
        );
        Self(map)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The exact URL is already stored; the store is left unchanged.
    AlreadyExists,
    /// The URL has no organization path; a bare host is not a registry.
    MissingNamespace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

#[derive(Debug, Clone, Copy)]
enum RegistryOp {
    Add,
    Remove,
}

impl RegistryOp {
    fn verb(self) -> &'static str {
        match self {
            RegistryOp::Add => "add",
            RegistryOp::Remove => "remove",
        }
    }
}

pub struct RegistryStore {
    plugins_dir: PathBuf,
}

impl RegistryStore {
    /// Store rooted at the configured plugins directory.
    pub fn from_env() -> TerminusResult<Self> {
        Ok(Self {
            plugins_dir: config::plugins_dir()?,
        })
    }

    /// Store rooted at an explicit directory.
    pub fn open(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
        }
    }

    pub fn registries_path(&self) -> PathBuf {
        self.plugins_dir.join(REGISTRIES_FILE)
    }

    /// Load the registries, seeding the default list on first use.
    pub fn load(&self) -> TerminusResult<Registries> {
        let path = self.registries_path();
        if !path.exists() {
            self.write(&Registries::seeded(), RegistryOp::Add)?;
        }

        let data = fs::read_to_string(&path)?;
        if data.trim_end() == REGISTRIES_HEADER {
            return Ok(Registries::default());
        }
        serde_yaml::from_str(&data).map_err(|source| TerminusError::RegistryParse { path, source })
    }

    /// Fully qualified registry URLs, in mapping order.
    pub fn list(&self) -> TerminusResult<Vec<String>> {
        Ok(self.load()?.urls())
    }

    /// Add a registry URL. The URL must parse and carry an organization
    /// path; trailing slashes are normalized away before comparison.
    pub fn add(&self, url: &str) -> TerminusResult<AddOutcome> {
        let (canonical, host, path) = parse_registry_url(url)?;

        if self.list()?.contains(&canonical) {
            return Ok(AddOutcome::AlreadyExists);
        }
        let Some(path) = path else {
            return Ok(AddOutcome::MissingNamespace);
        };

        let mut registries = self.load()?;
        registries.0.entry(host).or_default().push(path);
        self.write(&registries, RegistryOp::Add)?;
        Ok(AddOutcome::Added)
    }

    /// Remove a registry URL, pruning its host group if that was the last
    /// path under it.
    pub fn remove(&self, url: &str) -> TerminusResult<RemoveOutcome> {
        // Unlike add, a malformed URL is simply not present.
        let Ok((canonical, host, path)) = parse_registry_url(url) else {
            return Ok(RemoveOutcome::NotFound);
        };

        if !self.list()?.contains(&canonical) {
            return Ok(RemoveOutcome::NotFound);
        }
        let Some(path) = path else {
            return Ok(RemoveOutcome::NotFound);
        };

        let mut registries = self.load()?;
        if let Some(paths) = registries.0.get_mut(&host) {
            if let Some(index) = paths.iter().position(|p| p == &path) {
                paths.remove(index);
            }
            if paths.is_empty() {
                registries.0.remove(&host);
            }
        }
        self.write(&registries, RegistryOp::Remove)?;
        Ok(RemoveOutcome::Removed)
    }

    /// Overwrite `registries.yml` with header + mapping. A failed write is a
    /// hard error naming the attempted operation.
    fn write(&self, registries: &Registries, op: RegistryOp) -> TerminusResult<()> {
        let yaml =
            serde_yaml::to_string(registries).map_err(|e| TerminusError::RegistrySave {
                op: op.verb(),
                message: e.to_string(),
            })?;
        let data = format!("{}\n{}", REGISTRIES_HEADER, yaml);
        fs::write(self.registries_path(), data).map_err(|e| TerminusError::RegistrySave {
            op: op.verb(),
            message: e.to_string(),
        })
    }
}

/// Split a registry URL into its canonical form, `scheme://host` group key
/// and organization path. The path is `None` for a bare host.
fn parse_registry_url(url: &str) -> TerminusResult<(String, String, Option<String>)> {
    let trimmed = url.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|_| TerminusError::InvalidUrl(url.trim().to_string()))?;
    if parsed.host_str().is_none() {
        return Err(TerminusError::InvalidUrl(url.trim().to_string()));
    }

    let host = parsed.origin().ascii_serialization();
    let path = parsed.path().trim_matches('/');
    if path.is_empty() {
        Ok((host.clone(), host, None))
    } else {
        let canonical = format!("{}/{}", host, path);
        Ok((canonical, host, Some(path.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, RegistryStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = RegistryStore::open(temp_dir.path());
        (temp_dir, store)
    }

    #[test]
    fn test_first_load_seeds_defaults() {
        let (_tmp, store) = store();
        let urls = store.list().unwrap();

        assert_eq!(urls.len(), 5);
        assert_eq!(urls[0], "https://github.com/pantheon-systems");
        assert!(urls.contains(&"https://github.com/uberhacker".to_string()));

        let data = fs::read_to_string(store.registries_path()).unwrap();
        assert!(data.starts_with(REGISTRIES_HEADER));
    }

    #[test]
    fn test_header_only_file_is_empty_store() {
        let (_tmp, store) = store();
        fs::write(store.registries_path(), format!("{}\n", REGISTRIES_HEADER)).unwrap();

        assert!(store.load().unwrap().is_empty());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_add_normalizes_trailing_slash() {
        let (_tmp, store) = store();
        let outcome = store.add("https://gitlab.com/example-org/").unwrap();

        assert_eq!(outcome, AddOutcome::Added);
        assert!(store
            .list()
            .unwrap()
            .contains(&"https://gitlab.com/example-org".to_string()));
    }

    #[test]
    fn test_duplicate_add_is_idempotent() {
        let (_tmp, store) = store();
        assert_eq!(
            store.add("https://gitlab.com/example-org").unwrap(),
            AddOutcome::Added
        );
        let before = store.list().unwrap();

        assert_eq!(
            store.add("https://gitlab.com/example-org/").unwrap(),
            AddOutcome::AlreadyExists
        );
        assert_eq!(store.list().unwrap(), before);
    }

    #[test]
    fn test_add_rejects_bare_host() {
        let (_tmp, store) = store();
        let before = store.list().unwrap();

        assert_eq!(
            store.add("https://gitlab.com/").unwrap(),
            AddOutcome::MissingNamespace
        );
        assert_eq!(store.list().unwrap(), before);
    }

    #[test]
    fn test_add_rejects_invalid_url() {
        let (_tmp, store) = store();
        assert!(matches!(
            store.add("not a url"),
            Err(TerminusError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_remove_unknown_reports_not_found() {
        let (_tmp, store) = store();
        let before = store.list().unwrap();

        assert_eq!(
            store.remove("https://gitlab.com/example-org").unwrap(),
            RemoveOutcome::NotFound
        );
        assert_eq!(store.list().unwrap(), before);
    }

    #[test]
    fn test_remove_malformed_url_reports_not_found() {
        let (_tmp, store) = store();
        assert_eq!(
            store.remove("not a url").unwrap(),
            RemoveOutcome::NotFound
        );
    }

    #[test]
    fn test_remove_added_registry() {
        let (_tmp, store) = store();
        store.add("https://gitlab.com/example-org").unwrap();

        assert_eq!(
            store.remove("https://gitlab.com/example-org").unwrap(),
            RemoveOutcome::Removed
        );
        let urls = store.list().unwrap();
        assert!(!urls.contains(&"https://gitlab.com/example-org".to_string()));
        // The now-empty gitlab.com group is pruned from the mapping.
        assert!(!store.load().unwrap().0.contains_key("https://gitlab.com"));
    }

    #[test]
    fn test_save_load_round_trip_is_stable() {
        let (_tmp, store) = store();
        store.add("https://gitlab.com/example-org").unwrap();

        let registries = store.load().unwrap();
        store.write(&registries, RegistryOp::Add).unwrap();
        let first = fs::read_to_string(store.registries_path()).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, registries);
        store.write(&reloaded, RegistryOp::Add).unwrap();
        let second = fs::read_to_string(store.registries_path()).unwrap();

        assert_eq!(first, second);
    }
}
