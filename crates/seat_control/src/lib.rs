use serde::{Deserialize, Serialize};

use seat_core::{
    RiderPlace, SeatActionError, SeatChoice, SeatId, Session, SimConstants,
};

/// One move a rider policy wants to make before the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiderAction {
    BoardCar(u8),
    ChooseSeat(u8),
    /// Nothing worth doing; just ride the tick out.
    Hold,
}

/// Decides the rider's next move from the observable session state.
/// Implementations must be deterministic; any randomness belongs to the
/// simulation itself.
pub trait RiderPolicy {
    fn next_action(&mut self, session: &Session, constants: &SimConstants) -> RiderAction;
}

/// Plays the rich-information regime:
/// 1. Board the least-crowded car.
/// 2. Queue at the recommended seat.
/// 3. Re-queue whenever the recommendation beats the current wait.
pub struct InformedRider;

/// Plays the hidden-information regime: board the first car, queue at the
/// lowest-numbered seat with an open slot, and never move again.
pub struct UninformedRider;

/// Apply a policy action to the session. `Hold` does nothing; a seat choice
/// that lands on a free seat ends the episode and surfaces the outcome.
pub fn apply_action(
    session: &mut Session,
    action: RiderAction,
) -> Result<Option<SeatChoice>, SeatActionError> {
    match action {
        RiderAction::BoardCar(car_no) => {
            session.select_car(car_no)?;
            Ok(None)
        }
        RiderAction::ChooseSeat(seat_raw) => session.choose_seat(seat_raw).map(Some),
        RiderAction::Hold => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Lowest car number with the smallest occupancy percentage.
fn emptiest_car(session: &Session, constants: &SimConstants) -> Option<u8> {
    let episode = session.episode.as_ref()?;
    episode
        .car_numbers()
        .min_by_key(|&no| {
            let percent = episode
                .car(no)
                .map_or(u32::MAX, |car| car.occupancy(constants).occupancy_percent);
            (percent, no.0)
        })
        .map(|no| no.0)
}

/// Lowest seat id whose waiting slot is open (and occupied, so queueing
/// there can pay off).
fn first_open_slot(session: &Session) -> Option<SeatId> {
    let car = session.episode.as_ref()?.active_car()?;
    car.seats()
        .find(|(_, seat)| seat.accepts_waiter())
        .map(|(id, _)| id)
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

impl RiderPolicy for InformedRider {
    fn next_action(&mut self, session: &Session, constants: &SimConstants) -> RiderAction {
        let Some(episode) = session.episode.as_ref() else {
            return RiderAction::Hold;
        };
        if episode.active_car.is_none() {
            return emptiest_car(session, constants).map_or(RiderAction::Hold, RiderAction::BoardCar);
        }
        // recommended_seat() already filters to seats that free strictly
        // sooner than the rider's current wait.
        match session.recommended_seat() {
            Some(seat) => RiderAction::ChooseSeat(seat.get()),
            None => RiderAction::Hold,
        }
    }
}

impl RiderPolicy for UninformedRider {
    fn next_action(&mut self, session: &Session, _constants: &SimConstants) -> RiderAction {
        let Some(episode) = session.episode.as_ref() else {
            return RiderAction::Hold;
        };
        if episode.active_car.is_none() {
            return RiderAction::BoardCar(1);
        }
        if episode.rider.place != RiderPlace::Standing {
            return RiderAction::Hold;
        }
        first_open_slot(session).map_or(RiderAction::Hold, |seat| RiderAction::ChooseSeat(seat.get()))
    }
}
