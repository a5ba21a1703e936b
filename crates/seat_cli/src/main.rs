use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use seat_control::{apply_action, InformedRider, RiderPolicy, UninformedRider};
use seat_core::{
    seed_grid_waiters, tick, EventLevel, InfoMode, SeatChoice, SeatId, Session, SimConstants,
};
use seat_feeds::{ArrivalBoard, CongestionSource, MockArrivalBoard, StatisticalCongestion};
use seat_world::{load_content, scenario_route, WorldContent};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "seat_cli", about = "Subway seat turnover simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ride one episode end to end, printing the boarding screens and
    /// every simulation event.
    Ride {
        /// Scenario index from scenarios.json.
        #[arg(long, default_value_t = 0)]
        scenario: usize,
        #[arg(long, default_value = "rich", value_parser = ["rich", "hidden"])]
        mode: String,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long, default_value_t = 200)]
        max_ticks: u64,
        #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
        event_level: String,
        /// Replace the seeded crowd with one coin flip per seat slot.
        #[arg(long)]
        grid_waiters: bool,
    },
    /// Run seeded rich/hidden episode pairs and compare standing times.
    Compare {
        /// Scenario index from scenarios.json.
        #[arg(long, default_value_t = 0)]
        scenario: usize,
        /// Number of rich/hidden pairs to run.
        #[arg(long, default_value_t = 10)]
        pairs: u64,
        /// Seed for the first pair; pair k uses seed + k.
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long, default_value_t = 500)]
        max_ticks: u64,
        /// Write the comparison summary as JSON to this path.
        #[arg(long)]
        out: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Episode driver
// ---------------------------------------------------------------------------

fn parse_mode(raw: &str) -> InfoMode {
    match raw {
        "hidden" => InfoMode::Hidden,
        _ => InfoMode::Rich,
    }
}

/// Drive one episode with the mode's policy until the rider is seated or the
/// budget runs out. Returns the standing count on success.
fn drive_episode(
    session: &mut Session,
    constants: &SimConstants,
    mode: InfoMode,
    rng: &mut ChaCha8Rng,
    max_ticks: u64,
    event_level: EventLevel,
    verbose: bool,
) -> Result<Option<u32>> {
    let mut informed = InformedRider;
    let mut uninformed = UninformedRider;

    for _ in 0..max_ticks {
        let action = match mode {
            InfoMode::Rich => informed.next_action(session, constants),
            InfoMode::Hidden => uninformed.next_action(session, constants),
        };
        match apply_action(session, action).context("applying rider action")? {
            Some(SeatChoice::Seated { standing_count }) => return Ok(Some(standing_count)),
            Some(SeatChoice::Waiting(seat)) if verbose => println!("  rider queues at {seat}"),
            _ => {}
        }
        let outcome = tick(session, constants, rng, event_level).context("advancing the ride")?;
        if verbose {
            for envelope in &outcome.events {
                println!("  [{}] {:?}", envelope.id.0, envelope.event);
            }
            print_status(session);
        }
        if let Some(standing_count) = outcome.ended {
            return Ok(Some(standing_count));
        }
    }
    Ok(None)
}

fn print_status(session: &Session) {
    let Some(episode) = &session.episode else {
        return;
    };
    println!(
        "[tick={:03}] station={} place={:?} standing_count={}",
        episode.ticks,
        episode.route.current_station(),
        episode.rider.place,
        episode.rider.standing_count,
    );
}

// ---------------------------------------------------------------------------
// ride
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn ride(
    content: &WorldContent,
    scenario_idx: usize,
    mode: InfoMode,
    seed: u64,
    max_ticks: u64,
    event_level: EventLevel,
    grid_waiters: bool,
) -> Result<()> {
    let scenario = scenario_for(content, scenario_idx)?;
    let route = scenario_route(content, scenario)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    println!(
        "Boarding at {} ({} {}), seed={seed}, mode={mode:?}",
        scenario.station, scenario.line.0, scenario.direction_label,
    );
    print_platform_screens(&scenario.station, &mut rng);

    let mut session = Session::new();
    session.start_episode(route, mode, &content.constants, &mut rng);

    if grid_waiters {
        session.select_car(1).context("boarding car 1")?;
        let episode = session.episode.as_mut().context("episode just started")?;
        let car = &mut episode.cars[0];
        for id in SeatId::all() {
            car.seat_mut(id).waiting = None;
        }
        seed_grid_waiters(
            car,
            mode,
            &content.constants,
            &mut session.counters,
            &mut rng,
        );
    }

    println!("{}", "-".repeat(72));
    let result = drive_episode(
        &mut session,
        &content.constants,
        mode,
        &mut rng,
        max_ticks,
        event_level,
        true,
    )?;
    println!("{}", "-".repeat(72));
    match result {
        Some(standing_count) => println!("Seated after standing through {standing_count} stops."),
        None => println!("Never seated within {max_ticks} ticks."),
    }
    Ok(())
}

fn print_platform_screens(station: &str, rng: &mut ChaCha8Rng) {
    let board = MockArrivalBoard::default();
    println!("Arrivals at {station}:");
    for arrival in board.arrivals(station, rng) {
        println!(
            "  {} {} in {} (now near {})",
            arrival.line_name, arrival.direction, arrival.headline, arrival.approaching_station,
        );
    }

    let congestion = StatisticalCongestion;
    println!("Train congestion by car:");
    let line = seat_core::LineId("line-2".to_owned());
    for car in congestion.car_congestion(&line, station, "", rng) {
        println!(
            "  car {:2}: {:3}% ({}) seated={} standing={} app_users={}",
            car.car_no.0, car.percent, car.level, car.seated, car.standing, car.app_users,
        );
    }
}

// ---------------------------------------------------------------------------
// compare
// ---------------------------------------------------------------------------

fn compare(
    content: &WorldContent,
    scenario_idx: usize,
    pairs: u64,
    seed: u64,
    max_ticks: u64,
    out: Option<&str>,
) -> Result<()> {
    let scenario = scenario_for(content, scenario_idx)?;
    let mut session = Session::new();
    let mut results: Vec<serde_json::Value> = Vec::new();
    let mut completed: [Vec<u32>; 2] = [Vec::new(), Vec::new()];
    let mut timeouts = 0u64;

    println!(
        "Comparing {pairs} seeded pairs at {} ({} {})",
        scenario.station, scenario.line.0, scenario.direction_label,
    );
    println!("{}", "-".repeat(72));

    for pair in 0..pairs {
        let pair_seed = seed + pair;
        let mut pair_result = serde_json::Map::new();
        pair_result.insert("seed".into(), pair_seed.into());

        for mode in [InfoMode::Rich, InfoMode::Hidden] {
            let route = scenario_route(content, scenario)?;
            let mut rng = ChaCha8Rng::seed_from_u64(pair_seed);
            session.start_episode(route, mode, &content.constants, &mut rng);
            let standing = drive_episode(
                &mut session,
                &content.constants,
                mode,
                &mut rng,
                max_ticks,
                EventLevel::Normal,
                false,
            )?;
            let key = match mode {
                InfoMode::Rich => "rich",
                InfoMode::Hidden => "hidden",
            };
            match standing {
                Some(count) => {
                    completed[usize::from(mode == InfoMode::Hidden)].push(count);
                    pair_result.insert(key.into(), count.into());
                }
                None => {
                    timeouts += 1;
                    pair_result.insert(key.into(), serde_json::Value::Null);
                }
            }
        }

        println!(
            "pair {pair:02} seed={pair_seed}: rich={} hidden={}",
            pair_result.get("rich").cloned().unwrap_or_default(),
            pair_result.get("hidden").cloned().unwrap_or_default(),
        );
        results.push(serde_json::Value::Object(pair_result));
    }

    let [rich_all, hidden_all] = &completed;
    let rich_avg = average(rich_all);
    let hidden_avg = average(hidden_all);
    println!("{}", "-".repeat(72));
    println!("rich: {} rides, avg standing {rich_avg:.2} stops", rich_all.len());
    println!(
        "hidden: {} rides, avg standing {hidden_avg:.2} stops",
        hidden_all.len(),
    );
    if timeouts > 0 {
        println!("{timeouts} episodes hit the tick budget and were discarded.");
    }

    if let Some(path) = out {
        let summary = serde_json::json!({
            "scenario": {
                "line": scenario.line.0,
                "direction": scenario.direction_label,
                "station": scenario.station,
                "max_stops": scenario.max_stops,
            },
            "content_version": content.content_version,
            "pairs": results,
            "rich_avg": rich_avg,
            "hidden_avg": hidden_avg,
            "timeouts": timeouts,
        });
        let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
        serde_json::to_writer_pretty(file, &summary)
            .with_context(|| format!("writing {path}"))?;
        println!("Summary written to {path}");
    }
    Ok(())
}

fn average(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    f64::from(values.iter().sum::<u32>()) / values.len() as f64
}

fn scenario_for(content: &WorldContent, idx: usize) -> Result<&seat_core::Scenario> {
    if idx >= content.scenarios.len() {
        bail!(
            "scenario index {idx} out of range ({} scenarios loaded)",
            content.scenarios.len(),
        );
    }
    Ok(&content.scenarios[idx])
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Ride {
            scenario,
            mode,
            seed,
            content_dir,
            max_ticks,
            event_level,
            grid_waiters,
        } => {
            let content = load_content(&content_dir)?;
            let level = match event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            ride(
                &content,
                scenario,
                parse_mode(&mode),
                seed,
                max_ticks,
                level,
                grid_waiters,
            )?;
        }
        Commands::Compare {
            scenario,
            pairs,
            seed,
            content_dir,
            max_ticks,
            out,
        } => {
            let content = load_content(&content_dir)?;
            compare(&content, scenario, pairs, seed, max_ticks, out.as_deref())?;
        }
    }
    Ok(())
}
