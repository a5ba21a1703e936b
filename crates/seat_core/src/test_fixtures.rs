//! Shared fixtures for unit and integration tests. Enabled in-crate for
//! `cfg(test)` and for downstream crates via the `test-support` feature.

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{Direction, InfoMode, Route, Session, SimConstants};

/// Fixed-seed RNG so every test replays the same episode.
#[must_use]
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

#[must_use]
pub fn base_constants() -> SimConstants {
    SimConstants {
        car_count: 10,
        car_capacity: 34,
        min_seeded_ride: 5,
        app_user_ratio: 0.3,
        car_waiters_min: 5,
        car_waiters_max: 15,
        attrition_probability: 0.3,
        replenish_probability: 0.8,
    }
}

/// A 20-stop forward route, currently at the first stop.
#[must_use]
pub fn base_route() -> Route {
    let stations = (1..=20).map(|n| format!("Station {n}")).collect();
    Route {
        line: crate::LineId("line-2".to_owned()),
        direction_label: "outer loop".to_owned(),
        direction: Direction::Forward,
        stations,
        start_idx: 0,
        end_idx: 20,
        current_idx: 0,
    }
}

/// A session with one freshly seeded episode in the given mode, car 1
/// boarded, rider standing.
#[must_use]
pub fn base_session(mode: InfoMode) -> Session {
    let constants = base_constants();
    let mut rng = make_rng();
    let mut session = Session::new();
    session.start_episode(base_route(), mode, &constants, &mut rng);
    session.select_car(1).expect("car 1 exists");
    session
}
