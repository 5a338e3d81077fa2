//! End-to-end runs of the left-gear routine against the simulated plant.

use cs_cli::{CliError, DriveConfig, LEFT_GEAR_TERMINAL, run_left_gear};

#[test]
fn default_routine_completes() {
    let config = DriveConfig::default();
    let summary = run_left_gear(&config, 4000).unwrap();

    assert_eq!(summary.trace, LEFT_GEAR_TERMINAL);
    assert_eq!(
        summary.visited,
        vec!["Idle", "Initial-Forward", "Rotate", "Final-Forward", "Idle"]
    );
    assert!(summary.ticks > 0 && summary.ticks < 4000);

    let expected = config.sequence.initial_forward + config.sequence.final_forward;
    assert!(
        (summary.distance - expected).abs() < 2.0,
        "distance {} vs {expected}",
        summary.distance
    );
    assert!(
        (summary.heading - config.sequence.rotate_angle).abs() < 1.0,
        "heading {}",
        summary.heading
    );
}

#[test]
fn negative_turn_rotates_the_other_way() {
    let mut config = DriveConfig::default();
    config.sequence.rotate_angle = -45.0;
    let summary = run_left_gear(&config, 4000).unwrap();

    assert_eq!(summary.trace, LEFT_GEAR_TERMINAL);
    assert!((summary.heading + 45.0).abs() < 1.0);
}

#[test]
fn small_budget_times_out() {
    let config = DriveConfig::default();
    let err = run_left_gear(&config, 50).unwrap_err();
    match err {
        CliError::Timeout { ticks, trace } => {
            assert_eq!(ticks, 50);
            assert_eq!(trace, "LeftGear > Initial-Forward");
        }
        other => panic!("expected timeout, got {other}"),
    }
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let mut config = DriveConfig::default();
    config.loops.drive_max_speed = -1.0;
    assert!(matches!(
        run_left_gear(&config, 4000),
        Err(CliError::Config { .. })
    ));
}
