//! Key/value persistence for the session snapshot and active channel
//!
//! Each key is a file in the data directory. Reads that fail fall back to
//! defaults and writes that fail only lose durability; both are logged.

use crate::error::{RoadmapError, RoadmapResult};
use crate::snapshot::validate_snapshot;
use crate::types::{AppState, Channel};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key holding the JSON snapshot
pub const STATE_KEY: &str = "outreachRoadmapState";

/// Key holding the active channel code
pub const ACTIVE_TOOL_KEY: &str = "outreachRoadmapActiveTool";

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Raw value for `key`, `None` when it was never written
    pub fn read_key(&self, key: &str) -> RoadmapResult<Option<String>> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RoadmapError::Storage(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn write_key(&self, key: &str, value: &str) -> RoadmapResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            RoadmapError::Storage(format!("cannot create {}: {}", self.dir.display(), e))
        })?;
        let path = self.key_path(key);
        fs::write(&path, value).map_err(|e| {
            RoadmapError::Storage(format!("cannot write {}: {}", path.display(), e))
        })
    }

    /// Stored snapshot, or the built-in default when absent, unreadable or
    /// holding negative or non-finite numbers
    pub fn load_state(&self) -> AppState {
        let parsed = self.read_key(STATE_KEY).and_then(|content| match content {
            Some(json) => {
                let state: AppState = serde_json::from_str(&json)?;
                validate_snapshot(&state)?;
                Ok(Some(state))
            }
            None => Ok(None),
        });

        match parsed {
            Ok(Some(state)) => {
                debug!(dir = %self.dir.display(), "restored snapshot");
                state
            }
            Ok(None) => AppState::default(),
            Err(e) => {
                warn!("Could not load state, using defaults: {}", e);
                AppState::default()
            }
        }
    }

    pub fn save_state(&self, state: &AppState) {
        let result = serde_json::to_string(state)
            .map_err(RoadmapError::from)
            .and_then(|json| self.write_key(STATE_KEY, &json));
        if let Err(e) = result {
            warn!("Could not save state: {}", e);
        }
    }

    /// Stored channel, LinkedIn when absent or unrecognised
    pub fn load_active_channel(&self) -> Channel {
        match self.read_key(ACTIVE_TOOL_KEY) {
            Ok(Some(code)) => code.trim().parse().unwrap_or_else(|e| {
                warn!("Ignoring stored active channel: {}", e);
                Channel::LinkedIn
            }),
            Ok(None) => Channel::LinkedIn,
            Err(e) => {
                warn!("Could not load active channel: {}", e);
                Channel::LinkedIn
            }
        }
    }

    pub fn save_active_channel(&self, channel: Channel) {
        if let Err(e) = self.write_key(ACTIVE_TOOL_KEY, channel.code()) {
            warn!("Could not save active channel: {}", e);
        }
    }

    /// Remove every persisted key
    pub fn clear(&self) -> RoadmapResult<()> {
        for key in [STATE_KEY, ACTIVE_TOOL_KEY] {
            match fs::remove_file(self.key_path(key)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(RoadmapError::Storage(e.to_string())),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_keys_use_defaults() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("never-created"));
        assert_eq!(store.load_state(), AppState::default());
        assert_eq!(store.load_active_channel(), Channel::LinkedIn);
    }

    #[test]
    fn test_state_persists() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        let mut state = AppState::default();
        state.program_settings.offer_price = 9000.0;

        store.save_state(&state);
        assert!(dir.path().join(STATE_KEY).exists());
        assert_eq!(store.load_state(), state);
    }

    #[test]
    fn test_corrupt_state_falls_back() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        store.write_key(STATE_KEY, "{not json").unwrap();
        assert_eq!(store.load_state(), AppState::default());
    }

    #[test]
    fn test_negative_stored_values_fall_back() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        let mut state = AppState::default();
        state.program_settings.offer_price = -5000.0;
        store.write_key(STATE_KEY, &serde_json::to_string(&state).unwrap()).unwrap();

        let restored = store.load_state();
        assert_eq!(restored, AppState::default());

        let kpis = crate::core::compute_kpis(
            &restored.program_settings,
            &restored.linkedin.current_performance,
            Channel::LinkedIn,
        );
        assert!(kpis.current_revenue >= 0.0);
        assert!(kpis.avg_deal_value >= 0.0);
    }

    #[test]
    fn test_active_channel_persists() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        store.save_active_channel(Channel::Email);
        assert_eq!(store.read_key(ACTIVE_TOOL_KEY).unwrap().as_deref(), Some("EO"));
        assert_eq!(store.load_active_channel(), Channel::Email);

        store.write_key(ACTIVE_TOOL_KEY, "TIKTOK").unwrap();
        assert_eq!(store.load_active_channel(), Channel::LinkedIn);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        store.save_state(&AppState::default());
        store.save_active_channel(Channel::FacebookInstagram);
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.read_key(STATE_KEY).unwrap(), None);
        assert_eq!(store.load_active_channel(), Channel::LinkedIn);
    }
}
