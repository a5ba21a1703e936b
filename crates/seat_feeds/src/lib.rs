//! Station-level information feeds: upcoming train arrivals and per-car
//! congestion. These dress the boarding screens; nothing in the tick engine
//! depends on them.
//!
//! The congestion feed infers per-car load from time-of-day ridership
//! patterns rather than a live endpoint. The clock reading is an explicit
//! argument so the bands can be tested at fixed hours.

use chrono::{Datelike, Local, Timelike, Weekday};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use seat_core::{CarNo, LineId};

/// Seats per car; matches the simulated layout.
const CAR_SEATS: u32 = 14;
/// Seats plus nominal standing room per car.
const CAR_CAPACITY: u32 = 34;
/// Share of riders assumed to have the app open at the platform.
const APP_SHARE: f64 = 0.6;

// ---------------------------------------------------------------------------
// Arrivals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrival {
    pub line: LineId,
    pub line_name: String,
    pub direction: String,
    pub eta_seconds: u32,
    /// Ready-to-print countdown, e.g. "4 min 30 s".
    pub headline: String,
    pub approaching_station: String,
    pub train_no: String,
    pub destination: String,
    pub express: bool,
}

pub trait ArrivalBoard {
    /// Upcoming trains at `station`, soonest first.
    fn arrivals(&self, station: &str, rng: &mut dyn RngCore) -> Vec<Arrival>;
}

/// Stand-in arrival feed: two or three trains, alternating between the two
/// branch directions, spaced a few minutes apart.
#[derive(Debug, Clone)]
pub struct MockArrivalBoard {
    pub line: LineId,
    pub line_name: String,
    pub directions: [String; 2],
    pub approaching: Vec<String>,
    pub destination: String,
}

impl Default for MockArrivalBoard {
    fn default() -> Self {
        Self {
            line: LineId("line-2".to_owned()),
            line_name: "Line 2".to_owned(),
            directions: [
                "outer loop (City Hall)".to_owned(),
                "inner loop (Euljiro)".to_owned(),
            ],
            approaching: vec![
                "Seolleung".to_owned(),
                "Yeoksam".to_owned(),
                "Gangnam".to_owned(),
            ],
            destination: "City Hall".to_owned(),
        }
    }
}

impl ArrivalBoard for MockArrivalBoard {
    fn arrivals(&self, _station: &str, rng: &mut dyn RngCore) -> Vec<Arrival> {
        let train_count = rng.gen_range(2..=3u32);
        let mut arrivals: Vec<Arrival> = (0..train_count)
            .map(|i| {
                // Successive trains run 2 to 5 minutes apart.
                let eta_seconds = (i + 1) * rng.gen_range(120..=300);
                Arrival {
                    line: self.line.clone(),
                    line_name: self.line_name.clone(),
                    direction: self.directions[(i % 2) as usize].clone(),
                    eta_seconds,
                    headline: format!("{} min {} s", eta_seconds / 60, eta_seconds % 60),
                    approaching_station: self.approaching
                        [(i as usize) % self.approaching.len()]
                    .clone(),
                    train_no: format!("224{i}"),
                    destination: self.destination.clone(),
                    express: false,
                }
            })
            .collect();
        arrivals.sort_by_key(|a| a.eta_seconds);
        arrivals
    }
}

// ---------------------------------------------------------------------------
// Congestion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CongestionLevel {
    Light,
    Moderate,
    Crowded,
}

impl CongestionLevel {
    fn from_percent(percent: u32) -> Self {
        match percent {
            0..=49 => Self::Light,
            50..=74 => Self::Moderate,
            _ => Self::Crowded,
        }
    }
}

impl std::fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Crowded => "crowded",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarCongestion {
    pub car_no: CarNo,
    pub level: CongestionLevel,
    pub percent: u32,
    pub seated: u32,
    pub standing: u32,
    pub app_users: u32,
    pub capacity: u32,
}

pub trait CongestionSource {
    /// Per-car congestion for a ten-car train at `station`, front to back.
    fn car_congestion(
        &self,
        line: &LineId,
        station: &str,
        direction: &str,
        rng: &mut dyn RngCore,
    ) -> Vec<CarCongestion>;
}

/// Transit-authority ridership statistics rendered per car: a time-of-day
/// base load, a weekend discount, and per-car position weights (end cars run
/// light, the escalator-adjacent middle runs heavy).
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticalCongestion;

impl StatisticalCongestion {
    /// The base-load band (inclusive) for an hour of the day.
    fn base_band(hour: u32) -> (u32, u32) {
        match hour {
            7..=9 | 18..=20 => (75, 90),
            10..=17 => (55, 70),
            21..=23 => (45, 60),
            _ => (20, 40),
        }
    }

    fn position_weight(car_no: u8) -> f64 {
        match car_no {
            1 | 10 => 0.75,
            2 | 9 => 0.85,
            5 | 6 => 1.15,
            _ => 1.0,
        }
    }

    /// Congestion for an explicit clock reading; the trait impl feeds in the
    /// local time.
    pub fn congestion_at(
        hour: u32,
        is_weekend: bool,
        rng: &mut dyn RngCore,
    ) -> Vec<CarCongestion> {
        let (lo, hi) = Self::base_band(hour);
        let mut base = rng.gen_range(lo..=hi);
        if is_weekend {
            base = (f64::from(base) * 0.7) as u32;
        }

        (1..=10u8)
            .map(|car_no| {
                let weighted = (f64::from(base) * Self::position_weight(car_no)) as u32;
                let mut percent = weighted.clamp(10, 100);
                // Small per-car wobble so identical weights don't render flat.
                percent = percent
                    .saturating_add_signed(rng.gen_range(-5i32..=5))
                    .clamp(10, 100);

                let seated = (CAR_SEATS * percent / 100).min(CAR_SEATS);
                let total = CAR_CAPACITY * percent / 100;
                let standing = total.saturating_sub(seated);
                let app_users = (f64::from(seated + standing) * APP_SHARE) as u32;
                CarCongestion {
                    car_no: CarNo(car_no),
                    level: CongestionLevel::from_percent(percent),
                    percent,
                    seated,
                    standing,
                    app_users,
                    capacity: CAR_CAPACITY,
                }
            })
            .collect()
    }
}

impl CongestionSource for StatisticalCongestion {
    fn car_congestion(
        &self,
        _line: &LineId,
        _station: &str,
        _direction: &str,
        rng: &mut dyn RngCore,
    ) -> Vec<CarCongestion> {
        let now = Local::now();
        let is_weekend = matches!(now.weekday(), Weekday::Sat | Weekday::Sun);
        Self::congestion_at(now.hour(), is_weekend, rng)
    }
}
