//! Unit tests for sky-agent.

use std::sync::Arc;

use sky_command::{ChargePoint, ChargePoints, FlightModel};
use sky_core::{
    Address, AgentId, Command, Coord, FleetConfig, Message, Mission, MissionCursor, MissionId,
    RecordingSubstrate, SimTime, StationId,
};
use sky_energy::{Battery, ChargeModel, CurrentProfile, CurrentSample};

use crate::{Agent, AgentContext, AgentError, Forecast};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// 3600 mA at every angle with no spread: one mAh per second of flight, so
/// every forecast in these tests is exact integer arithmetic.
fn flat_model() -> Arc<FlightModel> {
    let flat = CurrentSample::new(3_600.0, 0.0);
    Arc::new(FlightModel {
        current:               CurrentProfile { climb: [flat; 11], hover: flat },
        takeoff_speed:         2.0,
        return_speed:          10.0,
        charge_target_percent: 99.0,
    })
}

/// A single station at the origin.
fn home_station() -> ChargePoints {
    let alg = ChargeModel::default().build().unwrap();
    ChargePoints::new(vec![ChargePoint::new(StationId(0), Coord::ORIGIN, alg)])
}

fn wp(x: f64) -> Command {
    Command::Waypoint { x, y: 0.0, z: 0.0, speed: 10.0 }
}

/// Three legs of 100 m heading away from the station: each costs 10 mAh,
/// the returns from their end points cost 10, 20 and 30 mAh.
fn three_waypoints() -> Mission {
    Mission::new(MissionId(1), vec![wp(100.0), wp(200.0), wp(300.0)], false)
}

fn agent_with(id: u32, remaining: f64) -> Agent {
    Agent::new(AgentId(id), Coord::ORIGIN, Battery::new(1_000.0, remaining), flat_model())
}

/// Run one-second updates from `from` up to (excluding) `to`.
fn run(agent: &mut Agent, ctx: &AgentContext<'_>, sub: &mut RecordingSubstrate, from: u32, to: u32) {
    for t in from..to {
        sub.now = SimTime(t as f64);
        agent.update(1.0, ctx, sub).unwrap();
    }
}

// ── Forecast ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod forecast {
    use super::*;

    #[test]
    fn exact_battery_covers_everything() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut a = agent_with(0, 60.0);
        a.handle_message(Message::StartMission { mission: three_waypoints() }, &ctx, &mut sub).unwrap();
        assert_eq!(a.end_of_operation(&ctx, SimTime::ZERO).unwrap(), Forecast::Sufficient);
    }

    #[test]
    fn one_unit_short_makes_last_waypoint_infeasible() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut a = agent_with(0, 59.0);
        a.handle_message(Message::StartMission { mission: three_waypoints() }, &ctx, &mut sub).unwrap();
        assert_eq!(
            a.end_of_operation(&ctx, SimTime(100.0)).unwrap(),
            Forecast::Depleted { feasible: Coord::new(200.0, 0.0, 0.0), handoff: SimTime(120.0) },
        );
    }

    #[test]
    fn no_mission_is_sufficient() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        assert_eq!(agent_with(0, 1.0).end_of_operation(&ctx, SimTime::ZERO).unwrap(), Forecast::Sufficient);
    }

    #[test]
    fn non_mission_work_first_is_undetermined() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut a = agent_with(0, 500.0);
        a.handle_message(Message::StartMission { mission: three_waypoints() }, &ctx, &mut sub).unwrap();
        a.inject(Command::HoldPosition { duration: 10.0 });
        assert_eq!(a.end_of_operation(&ctx, SimTime::ZERO).unwrap(), Forecast::Undetermined);
    }

    #[test]
    fn free_repeating_lap_is_sufficient() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mission = Mission::new(MissionId(2), vec![Command::HoldPosition { duration: 0.0 }], true);
        let mut a = agent_with(0, 5.0);
        a.handle_message(Message::StartMission { mission }, &ctx, &mut sub).unwrap();
        assert_eq!(a.end_of_operation(&ctx, SimTime::ZERO).unwrap(), Forecast::Sufficient);
    }

    #[test]
    fn costly_repeating_mission_eventually_depletes() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        // Out and back: 20 mAh per lap.
        let mission = Mission::new(MissionId(3), vec![wp(100.0), wp(0.0)], true);
        let mut a = agent_with(0, 75.0);
        a.handle_message(Message::StartMission { mission }, &ctx, &mut sub).unwrap();
        assert!(a.end_of_operation(&ctx, SimTime::ZERO).unwrap().is_depleted());
    }

    #[test]
    fn infinite_battery_is_always_sufficient() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut a = Agent::new(AgentId(0), Coord::ORIGIN, Battery::infinite(), flat_model());
        a.handle_message(Message::StartMission { mission: three_waypoints() }, &ctx, &mut sub).unwrap();
        assert_eq!(a.end_of_operation(&ctx, SimTime::ZERO).unwrap(), Forecast::Sufficient);
    }
}

// ── Selection / energy guard ──────────────────────────────────────────────────

#[cfg(test)]
mod selection {
    use super::*;

    #[test]
    fn insufficient_energy_waits_for_replacement() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(7.0);

        // First leg needs 10 + 10 return.
        let mut a = agent_with(4, 15.0);
        a.handle_message(Message::StartMission { mission: three_waypoints() }, &ctx, &mut sub).unwrap();
        a.select_next_command(&ctx, &mut sub).unwrap();

        let active = a.active_command().unwrap();
        assert!(matches!(active.command(), Command::Exchange { peer: None, initiator: false, .. }));
        assert!(!active.is_mission());
        assert_eq!(a.mission().unwrap().next, 0, "the command was pushed back");
        assert_eq!(a.stats().replacement_requests, 1);

        let to_scheduler = sub.sent_to(Address::Scheduler);
        assert_eq!(to_scheduler.len(), 1);
        match to_scheduler[0] {
            Message::CommandCompleted { source, replacement: Some(r), .. } => {
                assert_eq!(*source, AgentId(4));
                assert_eq!(r.node_to_replace, AgentId(4));
                assert_eq!(r.time_of_replacement, SimTime(7.0));
                assert_eq!(r.position, Coord::ORIGIN);
                assert!(r.replacing_node.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn sufficient_energy_proceeds() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut a = agent_with(0, 20.0);
        a.handle_message(Message::StartMission { mission: three_waypoints() }, &ctx, &mut sub).unwrap();
        a.select_next_command(&ctx, &mut sub).unwrap();
        assert!(a.active_command().unwrap().is_mission());
        assert!(sub.sent.is_empty());
    }

    #[test]
    fn forecast_triggers_request_then_agent_waits_at_last_feasible_point() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut a = agent_with(0, 59.0);
        a.handle_message(Message::StartMission { mission: three_waypoints() }, &ctx, &mut sub).unwrap();

        // First leg done at t = 10: the forecast sees the third leg fail.
        run(&mut a, &ctx, &mut sub, 0, 10);
        assert_eq!(a.position(), Coord::new(100.0, 0.0, 0.0));
        assert_eq!(a.battery().remaining(), 49.0);
        match sub.sent_to(Address::Scheduler).last() {
            Some(Message::CommandCompleted { replacement: Some(r), .. }) => {
                assert_eq!(r.position, Coord::new(200.0, 0.0, 0.0));
                assert_eq!(r.time_of_replacement, SimTime(20.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(a.replacement_requested());

        // Second leg, then the guard stops the third: no relief shows up, so
        // the agent hovers at x = 200 instead of flying out of range.
        run(&mut a, &ctx, &mut sub, 10, 31);
        assert_eq!(a.position(), Coord::new(200.0, 0.0, 0.0));
        let active = a.active_command().unwrap();
        assert!(matches!(active.command(), Command::Exchange { peer: None, initiator: false, .. }));
        assert_eq!(a.mission().unwrap().next, 2, "third leg pushed back");

        // 200 m home at 10 m/s costs 20 mAh.
        assert!(a.battery().remaining() >= 20.0);
        assert_eq!(a.stats().commands_completed, 2);

        // The forecast already asked for relief: the guard does not ask again.
        assert_eq!(a.stats().replacement_requests, 1);
        assert_eq!(sub.sent_to(Address::Scheduler).len(), 2);
    }

    #[test]
    fn waiting_agent_hands_over_the_pushed_back_command() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut a = agent_with(0, 59.0);
        a.handle_message(Message::StartMission { mission: three_waypoints() }, &ctx, &mut sub).unwrap();
        run(&mut a, &ctx, &mut sub, 0, 25);
        sub.clear();

        a.handle_message(Message::ExchangeRequest { initiator: AgentId(5) }, &ctx, &mut sub).unwrap();
        match sub.sent_to(Address::Agent(AgentId(5))).as_slice() {
            [Message::ExchangeData { mission: Some(cursor), .. }] => assert_eq!(cursor.next, 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!a.replacement_requested());
        assert_eq!(a.queued(), 1, "charge trip queued");
    }

    #[test]
    fn empty_battery_is_reported_once() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mission = Mission::new(MissionId(1), vec![Command::HoldPosition { duration: 60.0 }], false);
        let mut a = agent_with(2, 0.5);
        a.handle_message(Message::StartMission { mission }, &ctx, &mut sub).unwrap();
        run(&mut a, &ctx, &mut sub, 0, 5);

        let depleted = sub
            .sent_to(Address::Scheduler)
            .into_iter()
            .filter(|m| matches!(m, Message::NodeDepleted { .. }))
            .count();
        assert_eq!(depleted, 1);
        assert_eq!(a.stats().depletion_failures, 1);
    }
}

// ── Mission lifecycle ─────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn finished_mission_reports_and_heads_to_charge() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mission = Mission::new(MissionId(9), vec![wp(50.0)], false);
        let mut a = agent_with(1, 500.0);
        a.handle_message(Message::StartMission { mission }, &ctx, &mut sub).unwrap();
        run(&mut a, &ctx, &mut sub, 0, 5);

        assert!(a.mission().is_none());
        assert_eq!(a.queued(), 1);
        assert!(sub.sent_to(Address::Scheduler).iter().any(|m| matches!(
            m,
            Message::MissionCompleted { agent: AgentId(1), mission: MissionId(9) }
        )));
    }

    #[test]
    fn charge_trip_docks_and_undocks() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut a = Agent::new(AgentId(3), Coord::new(20.0, 0.0, 0.0), Battery::new(1_000.0, 985.0), flat_model());
        a.inject(Command::Charge { station: StationId(0) });
        run(&mut a, &ctx, &mut sub, 0, 2);
        assert_eq!(a.docked_station(), Some(StationId(0)));
        assert_eq!(sub.sent_to(Address::Station(StationId(0))), vec![&Message::Dock { agent: AgentId(3) }]);

        run(&mut a, &ctx, &mut sub, 2, 1_000);
        assert!(a.is_idle());
        assert!(a.battery().remaining_percentage() >= 99.0);
        assert_eq!(
            sub.sent_to(Address::Station(StationId(0))).last(),
            Some(&&Message::Undock { agent: AgentId(3) }),
        );
    }

    #[test]
    fn new_mission_while_docked_undocks() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut a = Agent::new(AgentId(3), Coord::ORIGIN, Battery::new(1_000.0, 500.0), flat_model());
        a.inject(Command::Charge { station: StationId(0) });
        run(&mut a, &ctx, &mut sub, 0, 3);
        assert!(a.docked_station().is_some());

        a.handle_message(Message::StartMission { mission: three_waypoints() }, &ctx, &mut sub).unwrap();
        assert!(a.docked_station().is_none());
        assert!(sub.sent_to(Address::Station(StationId(0))).contains(&&Message::Undock { agent: AgentId(3) }));
    }
}

// ── Hand-off ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod handoff {
    use super::*;

    #[test]
    fn replaced_agent_hands_over_rewound_cursor() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut a = agent_with(0, 1_000.0);
        a.handle_message(Message::StartMission { mission: three_waypoints() }, &ctx, &mut sub).unwrap();
        run(&mut a, &ctx, &mut sub, 0, 3); // mid first leg
        sub.clear();

        a.handle_message(Message::ExchangeRequest { initiator: AgentId(5) }, &ctx, &mut sub).unwrap();

        match sub.sent_to(Address::Agent(AgentId(5))).as_slice() {
            [Message::ExchangeData { from, mission: Some(cursor) }] => {
                assert_eq!(*from, AgentId(0));
                assert_eq!(cursor.next, 0, "in-flight leg is handed over too");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            sub.sent_to(Address::Scheduler),
            vec![&Message::ExchangeCompleted { replaced: AgentId(0), replacing: AgentId(5) }],
        );
        assert!(a.mission().is_none());
        assert!(a.active_command().is_none());
        assert_eq!(a.queued(), 1, "charge trip queued");
    }

    #[test]
    fn replacing_agent_flies_out_and_takes_over() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut b = agent_with(5, 1_000.0);
        b.handle_message(
            Message::ReplaceAgent { replaced: AgentId(0), handoff: Coord::new(50.0, 0.0, 0.0) },
            &ctx,
            &mut sub,
        )
        .unwrap();
        assert_eq!(b.queued(), 2);

        // 50 m at the default provisioning speed of 10 m/s.
        run(&mut b, &ctx, &mut sub, 0, 6);
        assert_eq!(b.position(), Coord::new(50.0, 0.0, 0.0));
        assert_eq!(
            sub.sent_to(Address::Agent(AgentId(0))),
            vec![&Message::ExchangeRequest { initiator: AgentId(5) }],
        );

        let mut cursor = MissionCursor::new(three_waypoints());
        cursor.next = 1;
        b.handle_message(Message::ExchangeData { from: AgentId(0), mission: Some(cursor) }, &ctx, &mut sub)
            .unwrap();
        assert_eq!(b.mission_id(), Some(MissionId(1)));

        run(&mut b, &ctx, &mut sub, 6, 8);
        let active = b.active_command().unwrap();
        assert!(active.is_mission());
        assert_eq!(active.target(), Coord::new(200.0, 0.0, 0.0));
    }

    #[test]
    fn exchange_request_without_mission_keeps_current_work() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        // Agent 0 is on its way to relieve agent 7 when a replacement sent
        // for its own, already finished mission catches up with it.
        let mut a = agent_with(0, 1_000.0);
        a.handle_message(
            Message::ReplaceAgent { replaced: AgentId(7), handoff: Coord::new(500.0, 0.0, 0.0) },
            &ctx,
            &mut sub,
        )
        .unwrap();
        run(&mut a, &ctx, &mut sub, 0, 3);
        sub.clear();

        a.handle_message(Message::ExchangeRequest { initiator: AgentId(5) }, &ctx, &mut sub).unwrap();

        assert_eq!(
            sub.sent_to(Address::Agent(AgentId(5))),
            vec![&Message::ExchangeData { from: AgentId(0), mission: None }],
        );
        assert_eq!(
            sub.sent_to(Address::Scheduler),
            vec![&Message::ExchangeCompleted { replaced: AgentId(0), replacing: AgentId(5) }],
        );
        let active = a.active_command().unwrap();
        assert_eq!(active.target(), Coord::new(500.0, 0.0, 0.0));
        assert_eq!(a.queued(), 1, "exchange with agent 7 still queued");

        // The flight carries on and the exchange with agent 7 still happens.
        run(&mut a, &ctx, &mut sub, 3, 51);
        assert!(sub.sent_to(Address::Agent(AgentId(7))).contains(&&Message::ExchangeRequest { initiator: AgentId(0) }));
    }

    #[test]
    fn exchange_data_without_exchange_is_an_error() {
        let points = home_station();
        let config = FleetConfig::default();
        let ctx = AgentContext::new(&points, &config);
        let mut sub = RecordingSubstrate::at(0.0);

        let mut b = agent_with(5, 1_000.0);
        let err = b
            .handle_message(Message::ExchangeData { from: AgentId(0), mission: None }, &ctx, &mut sub)
            .unwrap_err();
        assert!(matches!(err, AgentError::NoActiveCommand(AgentId(5))));
    }
}
