// src/registry.rs

use crate::adapter::Adapter;
use crate::error::{Error, Result};
use crate::features::FeatureSet;
use crate::git::GitAdapter;
use crate::github::{self, GitHubAdapter};
use crate::repository::Repository;

/// Settings needed by some backends when a repository is opened
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub github_token: Option<String>,
    pub github_api_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            github_api_url: github::DEFAULT_API_URL.to_string(),
        }
    }
}

/// Creates the adapter for a repository location
pub type AdapterFactory = fn(&str, &BackendConfig) -> Result<Box<dyn Adapter>>;

/// A VCS known to the registry
#[derive(Clone)]
pub struct VcsEntry {
    pub name: &'static str,
    /// Optional features every repository of this VCS provides
    pub features: FeatureSet,
    pub open: AdapterFactory,
}

/// Maps VCS names to the adapters implementing them
#[derive(Clone, Default)]
pub struct Registry {
    entries: Vec<VcsEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry knowing `git` and `github`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(VcsEntry {
            name: GitAdapter::VCS,
            features: FeatureSet::FILE_STATS | FeatureSet::LINE_STATS,
            open: open_git,
        });
        registry.register(VcsEntry {
            name: GitHubAdapter::VCS,
            features: FeatureSet::empty(),
            open: open_github,
        });
        registry
    }

    /// Adds a VCS, replacing any earlier entry with the same name
    pub fn register(&mut self, entry: VcsEntry) {
        self.entries.retain(|e| e.name != entry.name);
        self.entries.push(entry);
    }

    pub fn get(&self, name: &str) -> Result<&VcsEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| Error::UnknownVcs(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Opens the repository at `location` with the adapter registered for `vcs`.
    /// The repository supports the features declared by the entry.
    pub fn open(&self, vcs: &str, location: &str, config: &BackendConfig) -> Result<Repository> {
        let entry = self.get(vcs)?;
        let adapter = (entry.open)(location, config)?;
        Ok(Repository::with_features(location, adapter, entry.features))
    }
}

fn open_git(location: &str, _config: &BackendConfig) -> Result<Box<dyn Adapter>> {
    Ok(Box::new(GitAdapter::open(location)?))
}

fn open_github(location: &str, config: &BackendConfig) -> Result<Box<dyn Adapter>> {
    let adapter = GitHubAdapter::new(location, &config.github_api_url, config.github_token.clone())?;
    Ok(Box::new(adapter))
}
