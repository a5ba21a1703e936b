//! The single-session aggregate and the rider-facing operations.
//!
//! Everything lives in one owned `Session` value and every operation takes
//! `&mut self`. Callers that need concurrent access should wrap the whole
//! session in one mutual-exclusion boundary, since matching correctness
//! depends on seeing every waiting slot at once.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::seeding::seed_car;
use crate::{
    Car, CarNo, Counters, HistorySnapshot, InfoMode, Occupant, OccupancySummary, RiderPlace,
    RiderState, Route, SeatActionError, SeatId, SimConstants, StandingHistory, Waiter,
};

/// One in-flight ride. Created by [`Session::start_episode`], discarded when
/// the rider gets seated or the session is reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub mode: InfoMode,
    pub route: Route,
    /// Cars 1..=`car_count`; index `car_no - 1`.
    pub cars: Vec<Car>,
    /// The car the rider boarded. Only this car is ticked.
    pub active_car: Option<CarNo>,
    pub rider: RiderState,
    /// Ticks elapsed in this episode.
    pub ticks: u64,
}

impl Episode {
    pub fn car(&self, no: CarNo) -> Option<&Car> {
        self.cars.get(usize::from(no.0.checked_sub(1)?))
    }

    pub fn active_car(&self) -> Option<&Car> {
        self.car(self.active_car?)
    }

    pub fn car_numbers(&self) -> impl Iterator<Item = CarNo> {
        (1..=self.cars.len() as u8).map(CarNo)
    }
}

/// Everything the simulation owns: the current episode (if any), the
/// per-mode standing-time history, and id counters. Histories survive
/// episode resets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub episode: Option<Episode>,
    pub history: StandingHistory,
    pub counters: Counters,
}

/// Result of [`Session::choose_seat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatChoice {
    /// The rider now holds this seat's waiting slot.
    Waiting(SeatId),
    /// The seat was free: immediate seating, episode over.
    Seated { standing_count: u32 },
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin an episode: seed every car of the train along `route` and put
    /// the rider standing with a zeroed count. Any previous episode is
    /// discarded; history is kept.
    pub fn start_episode(
        &mut self,
        route: Route,
        mode: InfoMode,
        constants: &SimConstants,
        rng: &mut impl Rng,
    ) {
        let cars = (0..constants.car_count)
            .map(|_| seed_car(&route, mode, constants, &mut self.counters, rng))
            .collect();
        self.episode = Some(Episode {
            mode,
            route,
            cars,
            active_car: None,
            rider: RiderState::default(),
            ticks: 0,
        });
    }

    /// Board a car. Rich-mode callers pick from occupancy summaries; the
    /// hidden-mode flow boards a random car. Moving to a different car
    /// releases whatever seat or waiting slot the rider held in the old one,
    /// so the rider never occupies two cars at once.
    pub fn select_car(&mut self, car_no: u8) -> Result<(), SeatActionError> {
        let episode = self.episode.as_mut().ok_or(SeatActionError::NoActiveEpisode)?;
        if car_no == 0 || usize::from(car_no) > episode.cars.len() {
            return Err(SeatActionError::InvalidCar(car_no));
        }
        if episode.active_car != Some(CarNo(car_no)) {
            clear_rider_association(episode);
        }
        episode.active_car = Some(CarNo(car_no));
        Ok(())
    }

    /// Rider selects a seat in the active car.
    ///
    /// Free seat with an empty slot: immediate seating. The episode ends
    /// and the standing count is recorded, exactly as a matched win.
    /// Occupied seat with an empty slot: the rider takes the waiting slot
    /// (any prior waiting or seated association is cleared first). A slot
    /// held by someone else rejects the choice without touching state.
    pub fn choose_seat(&mut self, seat_raw: u8) -> Result<SeatChoice, SeatActionError> {
        let seat_id = SeatId::new(seat_raw).ok_or(SeatActionError::InvalidSeatId(seat_raw))?;
        let episode = self.episode.as_mut().ok_or(SeatActionError::NoActiveEpisode)?;
        let car_no = episode.active_car.ok_or(SeatActionError::NoActiveEpisode)?;
        let car_idx = usize::from(car_no.0 - 1);

        let target = episode.cars[car_idx].seat(seat_id);
        let seat_free = target.is_free();
        let slot = target.waiting;
        if seat_free && slot.is_none() {
            clear_rider_association(episode);
            let standing_count = episode.rider.standing_count;
            let mode = episode.mode;
            self.history.record(mode, standing_count);
            self.episode = None;
            return Ok(SeatChoice::Seated { standing_count });
        }
        match slot {
            None => {
                clear_rider_association(episode);
                episode.cars[car_idx].seat_mut(seat_id).waiting = Some(Waiter::Rider);
                episode.rider.place = RiderPlace::WaitingAt(seat_id);
                Ok(SeatChoice::Waiting(seat_id))
            }
            // Re-selecting the seat the rider already waits at is a no-op.
            Some(Waiter::Rider) if episode.rider.place == RiderPlace::WaitingAt(seat_id) => {
                Ok(SeatChoice::Waiting(seat_id))
            }
            Some(_) => Err(SeatActionError::SeatUnavailable(seat_id)),
        }
    }

    /// Rider sits down in a free seat for a ride to a chosen station, like
    /// any other occupant: the countdown runs and the rider is stood back up
    /// when it hits zero. The episode continues.
    pub fn sit_with_destination(
        &mut self,
        seat_raw: u8,
        station_idx: usize,
    ) -> Result<(), SeatActionError> {
        let seat_id = SeatId::new(seat_raw).ok_or(SeatActionError::InvalidSeatId(seat_raw))?;
        let episode = self.episode.as_mut().ok_or(SeatActionError::NoActiveEpisode)?;
        let car_no = episode.active_car.ok_or(SeatActionError::NoActiveEpisode)?;
        let car_idx = usize::from(car_no.0 - 1);

        let target = episode.cars[car_idx].seat(seat_id);
        if !target.is_free() || target.waiting.is_some() {
            return Err(SeatActionError::SeatUnavailable(seat_id));
        }
        let stops_left = episode
            .route
            .stops_until(station_idx)
            .ok_or(SeatActionError::InvalidDestination(station_idx))?;

        clear_rider_association(episode);
        episode.cars[car_idx].seat_mut(seat_id).occupant = Some(Occupant {
            stops_left,
            destination_idx: station_idx,
            app_user: false,
        });
        episode.rider.place = RiderPlace::SeatedAt(seat_id);
        episode.rider.destination_idx = Some(station_idx);
        Ok(())
    }

    /// Record where the rider intends to alight. Display/notification data
    /// only; the tick engine's arrival hook is deliberately inert.
    pub fn choose_destination(&mut self, station_idx: usize) -> Result<(), SeatActionError> {
        let episode = self.episode.as_mut().ok_or(SeatActionError::NoActiveEpisode)?;
        if !episode.route.is_ahead(station_idx) {
            return Err(SeatActionError::InvalidDestination(station_idx));
        }
        episode.rider.destination_idx = Some(station_idx);
        Ok(())
    }

    /// The seat expected to free soonest (rich mode only); see
    /// [`crate::recommended_seat`].
    pub fn recommended_seat(&self) -> Option<SeatId> {
        crate::recommended_seat(self.episode.as_ref()?)
    }

    /// Back-navigation: drop the episode (rider association dies with the
    /// cars) but keep the history.
    pub fn reset(&mut self) {
        self.episode = None;
    }

    pub fn history_snapshot(&self) -> HistorySnapshot {
        self.history.snapshot()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn car_occupancy(
        &self,
        car_no: u8,
        constants: &SimConstants,
    ) -> Result<OccupancySummary, SeatActionError> {
        let episode = self.episode.as_ref().ok_or(SeatActionError::NoActiveEpisode)?;
        let car = episode
            .car(CarNo(car_no))
            .ok_or(SeatActionError::InvalidCar(car_no))?;
        Ok(car.occupancy(constants))
    }

    /// For each of the next `n` stations ahead: station index, name, and how
    /// many occupants of the active car alight there. Display only.
    pub fn upcoming_exits(&self, n: usize) -> Result<Vec<(usize, String, u32)>, SeatActionError> {
        let episode = self.episode.as_ref().ok_or(SeatActionError::NoActiveEpisode)?;
        let car = episode.active_car().ok_or(SeatActionError::NoActiveEpisode)?;
        Ok(episode
            .route
            .upcoming(n)
            .into_iter()
            .map(|idx| {
                let count = car
                    .seats()
                    .filter(|(_, seat)| {
                        seat.occupant
                            .as_ref()
                            .is_some_and(|o| o.destination_idx == idx)
                    })
                    .count() as u32;
                (idx, episode.route.stations[idx].clone(), count)
            })
            .collect())
    }
}

/// Detach the rider from whatever seat it holds (waiting slot or occupancy)
/// in the active car, returning it to Standing.
pub(crate) fn clear_rider_association(episode: &mut Episode) {
    let Some(car_no) = episode.active_car else {
        episode.rider.place = RiderPlace::Standing;
        return;
    };
    let car_idx = usize::from(car_no.0 - 1);
    match episode.rider.place {
        RiderPlace::WaitingAt(seat_id) => {
            let seat = episode.cars[car_idx].seat_mut(seat_id);
            if seat.waiting == Some(Waiter::Rider) {
                seat.waiting = None;
            }
        }
        RiderPlace::SeatedAt(seat_id) => {
            // The rider was the occupant; standing up frees the seat.
            episode.cars[car_idx].seat_mut(seat_id).occupant = None;
        }
        RiderPlace::Standing => {}
    }
    episode.rider.place = RiderPlace::Standing;
}
