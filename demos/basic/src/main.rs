//! basic — smallest runnable scenario for the skyfleet scheduler.
//!
//! A handful of UAVs share one charging station.  One of them flies a
//! repeating survey loop loaded from an embedded mission CSV, which forces
//! periodic hand-offs; a few short random missions compete for the rest of
//! the fleet.
//!
//! ```text
//! cargo run -p basic                     # embedded scenario
//! cargo run -p basic -- scenario.json    # override any field from JSON
//! RUST_LOG=debug cargo run -p basic      # forecasts and timer re-arms
//! ```

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sky_command::{MissionSource, load_mission_csv, load_mission_reader};
use sky_core::{Command, Coord, FleetConfig, GeoOrigin, Mission, MissionId, SimRng, SimTime};
use sky_energy::{Battery, ChargeModel, CurrentProfile};
use sky_output::{CsvWriter, SimOutputObserver};
use sky_sim::FleetSimBuilder;

// ── Embedded survey mission ───────────────────────────────────────────────────

// MAVLink codes: 22 takeoff, 16 waypoint (param1 = speed, 0 = default),
// 19 hold (param1 = seconds).
const SURVEY_CSV: &str = "\
command,param1,param2,param3,param4,lat,lon,alt\n\
22,0,0,0,0,52.0000,4.3600,30\n\
16,8,0,0,0,52.0015,4.3600,30\n\
16,8,0,0,0,52.0015,4.3625,30\n\
16,8,0,0,0,52.0000,4.3625,30\n\
19,20,0,0,0,52.0000,4.3625,30\n\
16,0,0,0,0,52.0000,4.3600,30\n\
";

// ── Scenario ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Scenario {
    config:          FleetConfig,
    charge_model:    ChargeModel,
    current_profile: CurrentProfile,
    origin:          GeoOrigin,
    stations:        Vec<Coord>,
    agents:          usize,
    battery_mah:     f64,
    /// Survey mission file; the embedded one when absent.
    survey_csv:      Option<PathBuf>,
    random_missions: usize,
    /// Half-width of the square random missions are drawn from, in metres.
    area_half_m:     f64,
    output_dir:      PathBuf,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            config:          FleetConfig { end_secs: 7_200.0, ..FleetConfig::default() },
            charge_model:    ChargeModel::default(),
            current_profile: CurrentProfile::default(),
            origin:          GeoOrigin::new(52.0, 4.36),
            stations:        vec![Coord::ORIGIN],
            agents:          4,
            battery_mah:     5_400.0,
            survey_csv:      None,
            random_missions: 3,
            area_half_m:     400.0,
            output_dir:      PathBuf::from("output/basic"),
        }
    }
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", p.display()))
        }
        None => Ok(Scenario::default()),
    }
}

/// Short one-shot missions around the first station, submitted at random
/// times in the first half of the run.
fn random_missions(scenario: &Scenario, rng: &mut SimRng) -> Vec<(SimTime, Mission)> {
    let home = scenario.stations.first().copied().unwrap_or(Coord::ORIGIN);
    let center = Coord::new(home.x, home.y, 25.0);
    let latest = (scenario.config.end_secs - scenario.config.start_secs) / 2.0;
    (0..scenario.random_missions)
        .map(|i| {
            let legs = rng.gen_range(2..=5);
            let commands = (0..legs)
                .map(|_| Command::waypoint(rng.coord_around(center, scenario.area_half_m), 6.0))
                .collect();
            let at = scenario.config.start_time().offset(rng.gen_range(0.0..latest.max(1.0)));
            (at, Mission::new(MissionId(i as u32 + 1), commands, false))
        })
        .collect()
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let arg = std::env::args().nth(1).map(PathBuf::from);
    let scenario = load_scenario(arg.as_deref())?;
    scenario.config.validate()?;

    println!("=== basic — skyfleet UAV scheduler ===");
    println!(
        "Agents: {}  |  Stations: {}  |  Horizon: {} s  |  Seed: {}",
        scenario.agents,
        scenario.stations.len(),
        scenario.config.end_secs - scenario.config.start_secs,
        scenario.config.seed
    );

    // 1. Survey mission.
    let source = MissionSource {
        origin:        scenario.origin,
        default_speed: scenario.config.default_waypoint_speed,
        repeat:        true,
    };
    let survey = match &scenario.survey_csv {
        Some(p) => load_mission_csv(p, MissionId(0), &source)
            .with_context(|| format!("loading mission {}", p.display()))?,
        None => load_mission_reader(Cursor::new(SURVEY_CSV), MissionId(0), &source)?,
    };
    println!("Survey mission: {} commands, repeating", survey.commands.len());

    // 2. Fleet.
    let home = scenario.stations.first().copied().unwrap_or(Coord::ORIGIN);
    let mut builder = FleetSimBuilder::new(scenario.config.clone())
        .charge_model(scenario.charge_model.clone())
        .current_profile(scenario.current_profile.clone())
        .mission(scenario.config.start_time(), survey);
    for &s in &scenario.stations {
        builder = builder.station(s);
    }
    for _ in 0..scenario.agents {
        builder = builder.agent(home, Battery::full(scenario.battery_mah));
    }

    // 3. Random missions.
    let mut rng = SimRng::new(scenario.config.seed);
    for (at, mission) in random_missions(&scenario, &mut rng) {
        builder = builder.mission(at, mission);
    }
    let mut sim = builder.build()?;

    // 4. Output.
    let writer = CsvWriter::new(&scenario.output_dir)?;
    let mut observer = SimOutputObserver::new(writer);

    // 5. Run.
    let started = Instant::now();
    let stats = sim.run(&mut observer)?;
    if let Some(e) = observer.take_error() {
        return Err(e).context("writing output");
    }
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "run complete");

    println!();
    println!(
        "Missions       assigned {:>4}  deferred {:>4}  completed {:>4}  backlog {:>4}",
        stats.scheduler.missions_assigned,
        stats.scheduler.missions_deferred,
        stats.scheduler.missions_completed,
        stats.backlog
    );
    println!(
        "Replacements   scheduled {:>3}  completed {:>4}  degraded {:>5}",
        stats.scheduler.replacements_scheduled,
        stats.scheduler.replacements_completed,
        stats.scheduler.degraded_provisionings
    );
    println!(
        "Agents         depleted {:>4}  dead {:>8}  commands {:>5}",
        stats.depletion_failures, stats.scheduler.dead_agents, stats.commands_completed
    );
    println!("Output written to {}", scenario.output_dir.display());
    Ok(())
}
