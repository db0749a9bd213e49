//! Reducer, persistence and snapshot file tests

use outreach_roadmap::snapshot::{load_snapshot, write_snapshot};
use outreach_roadmap::state::{apply_field_update, FieldUpdate};
use outreach_roadmap::storage::{StateStore, ACTIVE_TOOL_KEY, STATE_KEY};
use outreach_roadmap::types::{AppState, Channel};
use outreach_roadmap::RoadmapError;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn update(path: &str) -> FieldUpdate {
    path.parse().unwrap()
}

#[test]
fn test_sequence_of_updates() {
    let state = AppState::default();
    let state = apply_field_update(&state, update("programSettings.offerPrice"), "2500");
    let state = apply_field_update(&state, update("programSettings.targetRevenueGoal"), "50000");
    let state = apply_field_update(&state, update("LIO.referenceTargets.closeRate"), "30.5");
    let state = apply_field_update(&state, update("EO.currentPerformance.totalShows"), "-3");

    assert_eq!(state.program_settings.offer_price, 2500.0);
    assert_eq!(state.program_settings.target_revenue_goal, 50_000.0);
    assert_eq!(state.linkedin.reference_targets.close_rate, 30.5);
    assert_eq!(state.email.current_performance.total_shows, 0.0);
    // untouched channel
    assert_eq!(state.facebook_instagram, AppState::default().facebook_instagram);
}

#[test]
fn test_channel_aliases_in_paths() {
    assert_eq!(
        update("email.currentPerformance.dealsClosed"),
        update("EO.currentPerformance.dealsClosed")
    );
}

#[test]
fn test_unknown_path_is_validation_error() {
    let err = "LIO.currentPerformance.revenue"
        .parse::<FieldUpdate>()
        .unwrap_err();
    assert!(matches!(err, RoadmapError::Validation(_)));
}

#[test]
fn test_store_round_trip_with_updates() {
    let dir = TempDir::new().unwrap();
    let store = StateStore::new(dir.path());

    let state = apply_field_update(
        &store.load_state(),
        update("FIO.referenceTargets.positiveReplyRate"),
        "40",
    );
    store.save_state(&state);
    store.save_active_channel(Channel::FacebookInstagram);

    let reopened = StateStore::new(dir.path());
    assert_eq!(reopened.load_state(), state);
    assert_eq!(reopened.load_active_channel(), Channel::FacebookInstagram);

    let raw = fs::read_to_string(dir.path().join(STATE_KEY)).unwrap();
    assert!(raw.contains("\"positiveReplyRate\":40.0"));
    assert_eq!(
        fs::read_to_string(dir.path().join(ACTIVE_TOOL_KEY)).unwrap(),
        "FIO"
    );
}

#[test]
fn test_json_snapshot_import() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let mut state = AppState::default();
    state.email.current_performance.messages_sent = 12_345.0;

    write_snapshot(&path, &state).unwrap();
    assert_eq!(load_snapshot(&path).unwrap(), state);
}

#[test]
fn test_malformed_snapshot_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "programSettings: [1, 2").unwrap();
    assert!(load_snapshot(&path).is_err());
}
