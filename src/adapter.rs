// src/adapter.rs

use crate::error::{Error, Result};
use crate::features::{Feature, FeatureSet};
use crate::model::*;
use std::collections::HashMap;
use std::fmt;

/// Access to the raw history of one repository.
///
/// Every backend (local git, GitHub, ...) implements this trait and is
/// injected into a [`Repository`](crate::Repository) when it is created.
/// Only `resolve_ref` and `fetch_commits` are mandatory; the remaining
/// operations answer [`Error::NotImplemented`] unless a backend provides them.
pub trait Adapter {
    /// Short name of the VCS backend, used in error messages
    fn vcs(&self) -> &'static str;

    /// Optional features provided by this backend. Read once per repository.
    fn supported_features(&self) -> FeatureSet;

    /// Whether `name` is already a canonical commit identifier
    fn is_commit_id(&self, name: &str) -> bool {
        name.len() == 40 && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Resolves a symbolic ref to a commit identifier
    fn resolve_ref(&self, name: &str) -> Result<CommitId>;

    /// Loads the commits after `from` (exclusive) up to `to` (inclusive), newest first.
    /// Without `from` the whole ancestry of `to` is loaded.
    fn fetch_commits(&self, from: Option<&str>, to: &str) -> Result<CommitBatch>;

    /// The ref used when no range is given
    fn current_branch(&self) -> Result<String> {
        Err(Error::not_implemented(self.vcs(), "current_branch"))
    }

    fn list_branches(&self) -> Result<RefMap> {
        Err(Error::not_implemented(self.vcs(), "list_branches"))
    }

    fn list_tags(&self) -> Result<RefMap> {
        Err(Error::not_implemented(self.vcs(), "list_tags"))
    }

    fn project_metadata(&self) -> Result<ProjectMetadata> {
        Err(Error::not_implemented(self.vcs(), "project_metadata"))
    }

    /// Line counts for the given commits. Missing entries count as no change.
    fn load_line_stats(&self, _ids: &[CommitId]) -> Result<HashMap<CommitId, LineStats>> {
        Err(Error::not_implemented(self.vcs(), "load_line_stats"))
    }

    fn load_file_stats(&self, _id: &str) -> Result<FileStats> {
        Err(Error::not_implemented(self.vcs(), "load_file_stats"))
    }
}

/// An adapter together with the features it declared at creation.
///
/// Shared by every entity built from the adapter's data, so lazily loaded
/// fields and feature checks can reach the backend.
pub struct Backend {
    vcs: &'static str,
    features: FeatureSet,
    adapter: Box<dyn Adapter>,
}

impl Backend {
    /// A backend with the features the adapter declares itself
    pub fn new(adapter: Box<dyn Adapter>) -> Self {
        let features = adapter.supported_features();
        Self::with_features(adapter, features)
    }

    /// A backend with features declared by whoever registered the adapter
    pub fn with_features(adapter: Box<dyn Adapter>, features: FeatureSet) -> Self {
        Self {
            vcs: adapter.vcs(),
            features,
            adapter,
        }
    }

    pub fn vcs(&self) -> &'static str {
        self.vcs
    }

    pub fn features(&self) -> FeatureSet {
        self.features
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.features.supports(feature)
    }

    /// Fails with [`Error::Unsupported`] unless `feature` is available
    pub fn support(&self, feature: Feature) -> Result<()> {
        if self.supports(feature) {
            Ok(())
        } else {
            Err(Error::Unsupported { feature, vcs: self.vcs })
        }
    }

    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter.as_ref()
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("vcs", &self.vcs)
            .field("features", &self.features.names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl Adapter for Bare {
        fn vcs(&self) -> &'static str {
            "bare"
        }

        fn supported_features(&self) -> FeatureSet {
            FeatureSet::LINE_STATS
        }

        fn resolve_ref(&self, name: &str) -> Result<CommitId> {
            Err(Error::RefNotFound(name.to_string()))
        }

        fn fetch_commits(&self, _from: Option<&str>, _to: &str) -> Result<CommitBatch> {
            Ok(CommitBatch::default())
        }
    }

    #[test]
    fn optional_operations_are_not_implemented() {
        let adapter = Bare;
        for result in [
            adapter.list_branches().map(|_| ()),
            adapter.list_tags().map(|_| ()),
            adapter.project_metadata().map(|_| ()),
            adapter.current_branch().map(|_| ()),
            adapter.load_file_stats("abc").map(|_| ()),
        ] {
            assert!(matches!(result, Err(Error::NotImplemented { vcs: "bare", .. })));
        }
    }

    #[test]
    fn commit_ids_are_forty_lowercase_hex_digits() {
        let adapter = Bare;
        assert!(adapter.is_commit_id("0123456789abcdef0123456789abcdef01234567"));
        assert!(!adapter.is_commit_id("master"));
        assert!(!adapter.is_commit_id("0123456789ABCDEF0123456789ABCDEF01234567"));
        assert!(!adapter.is_commit_id("0123456"));
    }

    #[test]
    fn backend_checks_declared_features() {
        let backend = Backend::new(Box::new(Bare));
        assert!(backend.support(Feature::LineStats).is_ok());
        assert!(matches!(
            backend.support(Feature::FileStats),
            Err(Error::Unsupported { feature: Feature::FileStats, vcs: "bare" })
        ));

        let backend = Backend::with_features(Box::new(Bare), FeatureSet::FILE_STATS);
        assert!(backend.supports(Feature::FileStats));
        assert!(!backend.supports(Feature::LineStats));
    }
}
