//! Snapshot files: import and export of a complete state as YAML or JSON

use crate::error::{RoadmapError, RoadmapResult};
use crate::types::{AppState, Channel, PerformanceField, TargetField};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Yaml,
    Json,
}

impl SnapshotFormat {
    /// `.yaml`/`.yml` are YAML; everything else is JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => SnapshotFormat::Yaml,
            _ => SnapshotFormat::Json,
        }
    }
}

pub fn parse_snapshot(content: &str, format: SnapshotFormat) -> RoadmapResult<AppState> {
    let state = match format {
        SnapshotFormat::Yaml => serde_yaml::from_str(content)?,
        SnapshotFormat::Json => serde_json::from_str(content)?,
    };
    Ok(state)
}

pub fn render_snapshot(state: &AppState, format: SnapshotFormat) -> RoadmapResult<String> {
    let content = match format {
        SnapshotFormat::Yaml => serde_yaml::to_string(state)?,
        SnapshotFormat::Json => serde_json::to_string_pretty(state)?,
    };
    Ok(content)
}

/// Read a snapshot file. Negative or non-finite numbers are rejected.
pub fn load_snapshot(path: &Path) -> RoadmapResult<AppState> {
    let content = fs::read_to_string(path)?;
    let state = parse_snapshot(&content, SnapshotFormat::from_path(path))?;
    validate_snapshot(&state)?;
    Ok(state)
}

pub fn write_snapshot(path: &Path, state: &AppState) -> RoadmapResult<()> {
    let content = render_snapshot(state, SnapshotFormat::from_path(path))?;
    fs::write(path, content)?;
    Ok(())
}

/// Every number must be finite and non-negative
pub(crate) fn validate_snapshot(state: &AppState) -> RoadmapResult<()> {
    let settings = &state.program_settings;
    check_number("programSettings.offerPrice", settings.offer_price)?;
    check_number("programSettings.targetRevenueGoal", settings.target_revenue_goal)?;

    for channel in Channel::ALL {
        let data = state.channel(channel);
        for field in PerformanceField::ALL {
            check_number(
                &format!("{}.currentPerformance.{}", channel.code(), field.key()),
                field.get(&data.current_performance),
            )?;
        }
        for field in TargetField::ALL {
            check_number(
                &format!("{}.referenceTargets.{}", channel.code(), field.key()),
                field.get(&data.reference_targets),
            )?;
        }
    }
    Ok(())
}

fn check_number(path: &str, value: f64) -> RoadmapResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RoadmapError::Validation(format!(
            "{} must be a non-negative number, got {}",
            path, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SnapshotFormat::from_path(Path::new("a.yaml")), SnapshotFormat::Yaml);
        assert_eq!(SnapshotFormat::from_path(Path::new("a.YML")), SnapshotFormat::Yaml);
        assert_eq!(SnapshotFormat::from_path(Path::new("a.json")), SnapshotFormat::Json);
        assert_eq!(SnapshotFormat::from_path(Path::new("a")), SnapshotFormat::Json);
    }

    #[test]
    fn test_yaml_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.yaml");
        let mut state = AppState::default();
        state.program_settings.offer_name = "Mastermind".to_string();

        write_snapshot(&path, &state).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("programSettings:"));
        assert!(content.contains("offerName: Mastermind"));
        assert_eq!(load_snapshot(&path).unwrap(), state);
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut state = AppState::default();
        state.email.reference_targets.close_rate = -1.0;
        let err = validate_snapshot(&state).unwrap_err();
        assert!(err.to_string().contains("EO.referenceTargets.closeRate"));
    }

    #[test]
    fn test_incomplete_snapshot_is_parse_error() {
        let result = parse_snapshot("programSettings:\n  offerName: x\n", SnapshotFormat::Yaml);
        assert!(matches!(result, Err(RoadmapError::Yaml(_))));
    }
}
