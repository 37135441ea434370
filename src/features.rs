// src/features.rs

use bitflags::bitflags;
use std::fmt;

/// An optional capability a backend may provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Added, modified and deleted file lists per commit
    FileStats,
    /// Added and deleted line counts per commit
    LineStats,
}

impl Feature {
    pub const ALL: [Feature; 2] = [Feature::FileStats, Feature::LineStats];

    pub fn name(self) -> &'static str {
        match self {
            Feature::FileStats => "file_stats",
            Feature::LineStats => "line_stats",
        }
    }

    fn flag(self) -> FeatureSet {
        match self {
            Feature::FileStats => FeatureSet::FILE_STATS,
            Feature::LineStats => FeatureSet::LINE_STATS,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// The fixed set of features a backend declares when it is created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FeatureSet: u8 {
        const FILE_STATS = 1;
        const LINE_STATS = 1 << 1;
    }
}

impl FeatureSet {
    pub fn supports(self, feature: Feature) -> bool {
        self.contains(feature.flag())
    }

    /// Names of the supported features, in declaration order
    pub fn names(self) -> Vec<&'static str> {
        Feature::ALL
            .into_iter()
            .filter(|&feature| self.supports(feature))
            .map(Feature::name)
            .collect()
    }
}
