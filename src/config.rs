//! Resolved runtime settings

use std::path::PathBuf;

/// Directory holding persisted state when none is given
pub const DEFAULT_DATA_DIR: &str = ".outreach-roadmap";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "ROADMAP_DATA_DIR";

/// Default log filter, raised to debug by `--verbose`
pub const DEFAULT_LOG_FILTER: &str = "outreach_roadmap=warn";
pub const VERBOSE_LOG_FILTER: &str = "outreach_roadmap=debug";

/// Forward projection input volume when none is given
pub const DEFAULT_PROJECTION_VOLUME: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapConfig {
    pub data_dir: PathBuf,
    pub verbose: bool,
}

impl RoadmapConfig {
    pub fn new(data_dir: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            data_dir: data_dir.into(),
            verbose,
        }
    }

    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        }
    }
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR, false)
    }
}
