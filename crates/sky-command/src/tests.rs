//! Unit tests for sky-command.

use std::sync::Arc;

use sky_core::{Command, CommandId, Coord, SimTime, StationId};
use sky_energy::{Battery, ChargeModel};

use crate::{ChargePoint, ChargePoints, CommandError, CommandExecEngine, FlightModel};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn model() -> Arc<FlightModel> {
    Arc::new(FlightModel::default())
}

/// One amp-hour station at `pos` with the reference curve.
fn station(id: u32, pos: Coord) -> ChargePoint {
    let alg = ChargeModel::default().build().unwrap();
    ChargePoint::new(StationId(id), pos, alg)
}

fn no_points() -> ChargePoints {
    ChargePoints::default()
}

/// An initialized engine for `cmd` starting at `from`.
fn active(cmd: Command, from: Coord, points: &ChargePoints) -> CommandExecEngine {
    let mut e = CommandExecEngine::new(CommandId(0), cmd, true, model());
    e.bind(from, points).unwrap();
    e.initialize(SimTime::ZERO).unwrap();
    e
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ── Trajectory ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod trajectory {
    use super::*;
    use crate::Trajectory;

    #[test]
    fn level_flight_has_zero_climb() {
        let t = Trajectory::between(Coord::new(0.0, 0.0, 2.0), Coord::new(100.0, 0.0, 2.0));
        assert_eq!(t.climb_angle_deg(), 0.0);
        assert_eq!(t.distance, 100.0);
        assert_eq!(t.duration(5.0), 20.0);
    }

    #[test]
    fn diagonal_climb() {
        let t = Trajectory::between(Coord::ORIGIN, Coord::new(0.0, 10.0, 10.0));
        assert!(approx(t.climb_angle_deg(), 45.0));
        let mid = t.advance(Coord::ORIGIN, t.distance / 2.0);
        assert!(approx(mid.x, 0.0) && approx(mid.y, 5.0) && approx(mid.z, 5.0));
    }

    #[test]
    fn vertical_climb_is_ninety_degrees() {
        let t = Trajectory::between(Coord::ORIGIN, Coord::new(0.0, 0.0, 30.0));
        assert!(approx(t.climb_angle_deg(), 90.0));
    }
}

// ── ChargePoints ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod charge_points {
    use super::*;

    #[test]
    fn nearest_station() {
        let points = ChargePoints::new(vec![
            station(0, Coord::new(0.0, 0.0, 0.0)),
            station(1, Coord::new(100.0, 0.0, 0.0)),
            station(2, Coord::new(0.0, 300.0, 0.0)),
        ]);
        assert_eq!(points.nearest(Coord::new(80.0, 10.0, 5.0)).unwrap().id, StationId(1));
        assert_eq!(points.nearest(Coord::new(0.0, 200.0, 0.0)).unwrap().id, StationId(2));
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn empty_has_no_nearest() {
        assert!(no_points().nearest(Coord::ORIGIN).is_none());
    }

    #[test]
    fn insert_then_lookup() {
        let mut points = no_points();
        points.insert(station(7, Coord::new(1.0, 2.0, 3.0)));
        assert_eq!(points.get(StationId(7)).unwrap().position, Coord::new(1.0, 2.0, 3.0));
        assert!(points.get(StationId(8)).is_none());
        assert_eq!(points.nearest(Coord::ORIGIN).unwrap().id, StationId(7));
    }
}

// ── CommandExecEngine ─────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use super::*;
    use crate::EngineState;

    #[test]
    fn waypoint_scenario() {
        let points = no_points();
        let mut e = active(Command::Waypoint { x: 100.0, y: 0.0, z: 2.0, speed: 5.0 }, Coord::new(0.0, 0.0, 2.0), &points);
        let mut battery = Battery::full(5_400.0);

        let out = e.update_state(&mut battery, 20.0, SimTime::ZERO).unwrap();

        let current = FlightModel::default().current.mean_for_climb(0.0);
        assert!(approx(e.position().x, 100.0));
        assert!(approx(battery.remaining(), 5_400.0 - current * 20.0 / 3600.0));
        assert!(approx(out.consumed_mah, current * 20.0 / 3600.0));
        assert!(!out.depleted);
        assert!(e.is_completed(SimTime(20.0)));
    }

    #[test]
    fn partial_step_moves_along_segment() {
        let points = no_points();
        let mut e = active(Command::Waypoint { x: 100.0, y: 0.0, z: 2.0, speed: 5.0 }, Coord::new(0.0, 0.0, 2.0), &points);
        let mut battery = Battery::full(5_400.0);
        e.update_state(&mut battery, 10.0, SimTime::ZERO).unwrap();
        assert!(approx(e.position().x, 50.0));
        assert!(!e.is_completed(SimTime(10.0)));
    }

    #[test]
    fn update_before_initialize_is_an_error() {
        let mut e = CommandExecEngine::new(CommandId(3), Command::HoldPosition { duration: 5.0 }, false, model());
        e.bind(Coord::ORIGIN, &no_points()).unwrap();
        let mut battery = Battery::full(100.0);
        let err = e.update_state(&mut battery, 1.0, SimTime::ZERO).unwrap_err();
        assert!(matches!(err, CommandError::NotInitialized(CommandId(3))));
        assert!(matches!(e.predict_full_consumption(0.5), Err(CommandError::NotInitialized(_))));
    }

    #[test]
    fn initialize_before_bind_is_an_error() {
        let mut e = CommandExecEngine::new(CommandId(1), Command::Takeoff { altitude: 10.0 }, true, model());
        assert!(matches!(e.initialize(SimTime::ZERO), Err(CommandError::NotBound(_))));
    }

    #[test]
    fn takeoff_climbs_in_place() {
        let points = no_points();
        let mut e = active(Command::Takeoff { altitude: 10.0 }, Coord::new(5.0, 5.0, 0.0), &points);
        let mut battery = Battery::full(5_000.0);
        for _ in 0..5 {
            e.update_state(&mut battery, 1.0, SimTime::ZERO).unwrap();
        }
        assert_eq!(e.position(), Coord::new(5.0, 5.0, 10.0));
        assert!(e.is_completed(SimTime(5.0)));
        let climb = FlightModel::default().current.mean_for_climb(90.0);
        assert!(approx(battery.remaining(), 5_000.0 - climb * 5.0 / 3600.0));
    }

    #[test]
    fn hold_completes_after_duration() {
        let points = no_points();
        let mut e = active(Command::HoldPosition { duration: 30.0 }, Coord::new(1.0, 1.0, 5.0), &points);
        let mut battery = Battery::full(5_000.0);
        e.update_state(&mut battery, 10.0, SimTime(10.0)).unwrap();
        assert!(!e.is_completed(SimTime(29.0)));
        assert!(e.is_completed(SimTime(30.0)));
        assert_eq!(e.position(), Coord::new(1.0, 1.0, 5.0));
        let hover = FlightModel::default().current.hover.mean_ma;
        assert!(approx(battery.remaining(), 5_000.0 - hover * 10.0 / 3600.0));
    }

    #[test]
    fn exchange_waits_for_explicit_completion() {
        let points = no_points();
        let mut e = active(Command::Exchange { peer: None, initiator: false, mission: false }, Coord::ORIGIN, &points);
        assert!(!e.is_completed(SimTime(1e6)));
        e.complete_exchange();
        assert!(e.is_completed(SimTime::ZERO));
    }

    #[test]
    fn empty_battery_reports_depletion() {
        let points = no_points();
        let mut e = active(Command::HoldPosition { duration: 600.0 }, Coord::ORIGIN, &points);
        let mut battery = Battery::new(5_000.0, 1.0);
        let out = e.update_state(&mut battery, 60.0, SimTime::ZERO).unwrap();
        assert!(out.depleted);
        assert!(battery.is_empty());
    }

    #[test]
    fn charge_flies_docks_and_charges_to_target() {
        let points = ChargePoints::new(vec![station(4, Coord::new(10.0, 0.0, 0.0))]);
        let mut e = active(Command::Charge { station: StationId(4) }, Coord::ORIGIN, &points);
        let mut battery = Battery::new(5_200.0, 2_600.0);

        let first = e.update_state(&mut battery, 1.0, SimTime::ZERO).unwrap();
        assert_eq!(first.docked, Some(StationId(4)));
        assert_eq!(e.docked_station(), Some(StationId(4)));
        assert!(!e.is_completed(SimTime(1.0)));

        let mut t = 1.0;
        while !e.is_completed(SimTime(t)) {
            let out = e.update_state(&mut battery, 1.0, SimTime(t)).unwrap();
            assert_eq!(out.consumed_mah, 0.0);
            t += 1.0;
            assert!(t < 20_000.0, "never reached the charge target");
        }
        assert!(battery.remaining_percentage() >= 99.0);
    }

    #[test]
    fn charge_to_unknown_station_fails_to_bind() {
        let mut e = CommandExecEngine::new(CommandId(0), Command::Charge { station: StationId(9) }, false, model());
        let err = e.bind(Coord::ORIGIN, &no_points()).unwrap_err();
        assert!(matches!(err, CommandError::UnknownStation(StationId(9))));
    }

    #[test]
    fn completed_engine_ignores_updates() {
        let points = no_points();
        let mut e = active(Command::HoldPosition { duration: 1.0 }, Coord::ORIGIN, &points);
        e.mark_completed();
        assert_eq!(e.state(), EngineState::Completed);
        let mut battery = Battery::full(100.0);
        e.update_state(&mut battery, 10.0, SimTime::ZERO).unwrap();
        assert_eq!(battery.remaining(), 100.0);
    }
}

// ── Prediction ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod prediction {
    use super::*;

    #[test]
    fn full_consumption_matches_physics_at_median() {
        let points = no_points();
        let e = active(Command::Waypoint { x: 100.0, y: 0.0, z: 2.0, speed: 5.0 }, Coord::new(0.0, 0.0, 2.0), &points);
        let p = e.predict_full_consumption(0.5).unwrap();
        let current = FlightModel::default().current.mean_for_climb(0.0);
        assert!(approx(p.consumption_mah, current * 20.0 / 3600.0));
        assert!(approx(p.duration_secs, 20.0));
        assert_eq!(p.end, Coord::new(100.0, 0.0, 2.0));
    }

    #[test]
    fn higher_percentile_is_more_conservative() {
        let points = no_points();
        let e = active(Command::Waypoint { x: 100.0, y: 0.0, z: 2.0, speed: 5.0 }, Coord::new(0.0, 0.0, 2.0), &points);
        let mean = e.predict_full_consumption(0.5).unwrap().consumption_mah;
        let p90 = e.predict_full_consumption(0.9).unwrap().consumption_mah;
        assert!(p90 > mean);
    }

    #[test]
    fn predict_from_works_on_pending_engine_without_side_effects() {
        let e = CommandExecEngine::new(
            CommandId(0),
            Command::Waypoint { x: 0.0, y: 50.0, z: 0.0, speed: 10.0 },
            true,
            model(),
        );
        let p = e.predict_from(Coord::ORIGIN, &no_points(), 0.5).unwrap();
        assert!(approx(p.duration_secs, 5.0));
        assert_eq!(e.state(), crate::EngineState::Pending);
    }

    #[test]
    fn remaining_prediction_shrinks_as_the_command_progresses() {
        let points = no_points();
        let mut e = active(Command::HoldPosition { duration: 100.0 }, Coord::ORIGIN, &points);
        let mut battery = Battery::full(5_000.0);
        let before = e.predict_remaining(SimTime::ZERO, 0.5).unwrap();
        e.update_state(&mut battery, 40.0, SimTime(40.0)).unwrap();
        let after = e.predict_remaining(SimTime(40.0), 0.5).unwrap();
        assert!(approx(before.duration_secs, 100.0));
        assert!(approx(after.duration_secs, 60.0));
    }

    #[test]
    fn return_trip_goes_to_nearest_station() {
        let points = ChargePoints::new(vec![
            station(0, Coord::new(0.0, 0.0, 0.0)),
            station(1, Coord::new(1_000.0, 0.0, 0.0)),
        ]);
        let m = FlightModel::default();
        let p = m.return_trip(Coord::new(900.0, 0.0, 0.0), &points, 0.5);
        assert_eq!(p.end, Coord::new(1_000.0, 0.0, 0.0));
        assert!(approx(p.duration_secs, 100.0 / m.return_speed));
        assert_eq!(m.return_trip(Coord::ORIGIN, &no_points(), 0.5).consumption_mah, 0.0);
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use sky_core::{GeoOrigin, MissionId};

    use super::*;
    use crate::{LoaderError, MissionSource, load_mission_csv, load_mission_reader};

    fn source() -> MissionSource {
        MissionSource { origin: GeoOrigin::new(30.0, -88.0), default_speed: 5.0, repeat: false }
    }

    const CSV: &str = "\
command,param1,param2,param3,param4,lat,lon,alt
22,0,0,0,0,30.0,-88.0,10
16,0,0,0,0,30.001,-88.0,10
16,8,0,0,0,30.0,-88.0,10
19,30,0,0,0,0,0,0
";

    #[test]
    fn parses_supported_commands() {
        let m = load_mission_reader(Cursor::new(CSV), MissionId(1), &source()).unwrap();
        assert_eq!(m.id, MissionId(1));
        assert_eq!(m.commands.len(), 4);
        assert_eq!(m.commands[0], Command::Takeoff { altitude: 10.0 });
        match m.commands[1] {
            Command::Waypoint { x, y, z, speed } => {
                assert!(x.abs() < 1e-9);
                assert!((y - 111.19).abs() < 0.5);
                assert_eq!(z, 10.0);
                assert_eq!(speed, 5.0, "zero speed falls back to the default");
            }
            ref other => panic!("expected waypoint, got {other:?}"),
        }
        assert!(matches!(m.commands[2], Command::Waypoint { speed, .. } if speed == 8.0));
        assert_eq!(m.commands[3], Command::HoldPosition { duration: 30.0 });
        assert!(!m.repeat);
    }

    #[test]
    fn unknown_code_is_rejected_with_line() {
        let csv = "command,param1,param2,param3,param4,lat,lon,alt\n16,0,0,0,0,30,-88,5\n21,0,0,0,0,30,-88,0\n";
        let err = load_mission_reader(Cursor::new(csv), MissionId(0), &source()).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedCommand { code: 21, line: 3 }));
    }

    #[test]
    fn malformed_row_is_a_parse_error() {
        let csv = "command,param1,param2,param3,param4,lat,lon,alt\n16,fast,0,0,0,30,-88,5\n";
        let err = load_mission_reader(Cursor::new(csv), MissionId(0), &source()).unwrap_err();
        assert!(matches!(err, LoaderError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_mission_csv(std::path::Path::new("/nonexistent/mission.csv"), MissionId(0), &source())
            .unwrap_err();
        assert!(matches!(err, LoaderError::Io(_)));
    }
}
