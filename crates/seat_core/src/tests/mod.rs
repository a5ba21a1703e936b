//! Unit tests for the simulation core. Pure geometry and route math are
//! tested inline in their modules; everything stateful lives here.

use crate::test_fixtures::{base_constants, base_route};
use crate::{Car, CarNo, Episode, InfoMode, RiderState, Session, SimConstants};

mod recommend;
mod seeding;
mod tick;

/// Constants with both random phases switched off, so a tick is fully
/// determined by the state that goes in.
fn frozen_constants() -> SimConstants {
    SimConstants {
        attrition_probability: 0.0,
        replenish_probability: 0.0,
        ..base_constants()
    }
}

/// A session around one hand-built empty car, car 1 boarded. Tests fill in
/// occupants and waiters directly.
fn single_car_session(mode: InfoMode) -> Session {
    let mut session = Session::new();
    session.episode = Some(Episode {
        mode,
        route: base_route(),
        cars: vec![Car::default()],
        active_car: Some(CarNo(1)),
        rider: RiderState::default(),
        ticks: 0,
    });
    session
}
