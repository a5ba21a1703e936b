//! Line/scenario content loading and route construction shared by the CLI.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use seat_core::{direction_of, terminal_idx, Direction, LineId, Route, Scenario, SimConstants};
use std::collections::HashSet;
use std::path::Path;

/// One ride span over a line's station list. `start_idx > end_idx` means the
/// branch runs in reverse station order.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchDef {
    pub label: String,
    pub start_idx: usize,
    /// Exclusive bound, mirroring [`Route::end_idx`].
    pub end_idx: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineDef {
    pub id: LineId,
    pub name: String,
    pub stations: Vec<String>,
    pub branches: Vec<BranchDef>,
}

#[derive(Debug, Clone)]
pub struct WorldContent {
    pub content_version: String,
    pub lines: Vec<LineDef>,
    pub scenarios: Vec<Scenario>,
    pub constants: SimConstants,
}

#[derive(Deserialize)]
struct LinesFile {
    content_version: String,
    lines: Vec<LineDef>,
}

#[derive(Deserialize)]
struct ScenariosFile {
    scenarios: Vec<Scenario>,
}

/// Validates cross-references in loaded content, panicking on any authoring
/// error: a branch span outside its line's station list, a scenario naming an
/// unknown line or branch, a boarding station the branch never visits.
pub fn validate_content(content: &WorldContent) {
    let line_ids: HashSet<&LineId> = content.lines.iter().map(|l| &l.id).collect();
    assert_eq!(
        line_ids.len(),
        content.lines.len(),
        "duplicate line id in lines.json"
    );

    for line in &content.lines {
        assert!(
            !line.stations.is_empty(),
            "line '{}' has no stations",
            line.id.0,
        );
        for branch in &line.branches {
            assert!(
                branch.start_idx < line.stations.len(),
                "line '{}' branch '{}' starts outside the station list",
                line.id.0,
                branch.label,
            );
            assert!(
                branch.start_idx != branch.end_idx,
                "line '{}' branch '{}' is empty",
                line.id.0,
                branch.label,
            );
            if branch.start_idx < branch.end_idx {
                assert!(
                    branch.end_idx <= line.stations.len(),
                    "line '{}' branch '{}' ends outside the station list",
                    line.id.0,
                    branch.label,
                );
            }
        }
    }

    for scenario in &content.scenarios {
        let line = content
            .lines
            .iter()
            .find(|l| l.id == scenario.line)
            .unwrap_or_else(|| panic!("scenario references unknown line '{}'", scenario.line.0));
        let branch = line
            .branches
            .iter()
            .find(|b| b.label == scenario.direction_label)
            .unwrap_or_else(|| {
                panic!(
                    "scenario on line '{}' references unknown branch '{}'",
                    line.id.0, scenario.direction_label,
                )
            });
        assert!(
            branch_station_idx(line, branch, &scenario.station).is_some(),
            "scenario station '{}' is not ridable on line '{}' branch '{}'",
            scenario.station,
            line.id.0,
            branch.label,
        );
        assert!(
            scenario.max_stops > 0,
            "scenario at '{}' allows zero stops",
            scenario.station,
        );
    }

    assert!(
        content.constants.car_count > 0,
        "constants.json: car_count must be positive"
    );
    assert!(
        content.constants.car_waiters_min <= content.constants.car_waiters_max,
        "constants.json: waiter band is inverted"
    );
    for p in [
        content.constants.app_user_ratio,
        content.constants.attrition_probability,
        content.constants.replenish_probability,
    ] {
        assert!((0.0..=1.0).contains(&p), "constants.json: probability {p} out of range");
    }
}

pub fn load_content(content_dir: &str) -> Result<WorldContent> {
    let dir = Path::new(content_dir);
    let lines_file: LinesFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("lines.json")).context("reading lines.json")?,
    )
    .context("parsing lines.json")?;
    let scenarios_file: ScenariosFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("scenarios.json")).context("reading scenarios.json")?,
    )
    .context("parsing scenarios.json")?;
    let constants: SimConstants = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;

    let content = WorldContent {
        content_version: lines_file.content_version,
        lines: lines_file.lines,
        scenarios: scenarios_file.scenarios,
        constants,
    };
    validate_content(&content);
    Ok(content)
}

/// Index of `station` on the line, but only if the branch still has at least
/// one stop to ride from there.
fn branch_station_idx(line: &LineDef, branch: &BranchDef, station: &str) -> Option<usize> {
    let idx = line.stations.iter().position(|s| s == station)?;
    let terminal = terminal_idx(
        direction_of(branch.start_idx, branch.end_idx),
        branch.end_idx,
    );
    let span_ok = if branch.start_idx < branch.end_idx {
        idx >= branch.start_idx && idx < terminal
    } else {
        idx <= branch.start_idx && idx > terminal
    };
    span_ok.then_some(idx)
}

/// Build the route for boarding `station` on the given line and branch.
/// User-facing inputs, so unknown names are errors rather than panics.
pub fn build_route(
    content: &WorldContent,
    line_id: &LineId,
    branch_label: &str,
    station: &str,
) -> Result<Route> {
    let line = content
        .lines
        .iter()
        .find(|l| l.id == *line_id)
        .with_context(|| format!("unknown line '{}'", line_id.0))?;
    let branch = line
        .branches
        .iter()
        .find(|b| b.label == branch_label)
        .with_context(|| format!("line '{}' has no branch '{}'", line.id.0, branch_label))?;
    let Some(current_idx) = branch_station_idx(line, branch, station) else {
        bail!(
            "station '{station}' is not a boarding point on line '{}' branch '{branch_label}'",
            line.id.0,
        );
    };
    Ok(Route {
        line: line.id.clone(),
        direction_label: branch.label.clone(),
        direction: direction_of(branch.start_idx, branch.end_idx),
        stations: line.stations.clone(),
        start_idx: branch.start_idx,
        end_idx: branch.end_idx,
        current_idx,
    })
}

/// Build a scenario's route with its ride horizon applied: the route end is
/// pulled in so at most `max_stops` hops remain from the boarding station.
pub fn scenario_route(content: &WorldContent, scenario: &Scenario) -> Result<Route> {
    let mut route = build_route(
        content,
        &scenario.line,
        &scenario.direction_label,
        &scenario.station,
    )?;
    match route.direction {
        Direction::Forward => {
            route.end_idx = route.end_idx.min(route.current_idx + scenario.max_stops + 1);
        }
        Direction::Reverse => {
            route.end_idx = route
                .end_idx
                .max(route.current_idx.saturating_sub(scenario.max_stops + 1));
        }
    }
    Ok(route)
}
