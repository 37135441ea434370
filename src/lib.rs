// src/lib.rs

//! Commit history analytics over pluggable version control backends.
//!
//! A [`Repository`] resolves commit ranges, caches every commit it has seen
//! and answers statistics queries through [`CommitCollection`] and
//! [`ActorCollection`]. History is read through an [`Adapter`]; the bundled
//! ones cover local git repositories and GitHub projects.

pub mod actor;
pub mod adapter;
pub mod collections;
pub mod commit;
pub mod error;
pub mod features;
pub mod git;
pub mod github;
pub mod model;
pub mod range;
pub mod registry;
pub mod repository;

pub use actor::Actor;
pub use adapter::{Adapter, Backend};
pub use collections::{Activity, ActorCollection, CommitCollection, DayStats};
pub use commit::Commit;
pub use error::{Error, Result};
pub use features::{Feature, FeatureSet};
pub use range::{RangeSpec, ResolvedRange};
pub use registry::{BackendConfig, Registry, VcsEntry};
pub use repository::{FileStat, LineHistory, Repository};
