// src/collections/mod.rs

mod activity;
mod actor_collection;
mod collection;
mod commit_collection;

pub use activity::{Activity, DayStats};
pub use actor_collection::ActorCollection;
pub use collection::{Collection, Identify};
pub use commit_collection::CommitCollection;
