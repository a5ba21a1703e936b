//! Weighted-distance nearest-waiter selection for a freed seat.

use crate::layout::weighted_distance;
use crate::{Car, SeatId, Waiter};

/// Pick the waiter to seat at `free_seat` from every seat's waiting slot.
///
/// The winner has the minimum weighted distance to the freed seat; ties
/// break to the lowest origin seat id, independent of how the waiters were
/// inserted. Returns the winner and its origin seat, without mutating the
/// car. `None` when nobody is waiting anywhere.
pub fn nearest_waiter(car: &Car, free_seat: SeatId) -> Option<(SeatId, Waiter)> {
    car.seats()
        .filter_map(|(origin, seat)| {
            seat.waiting
                .map(|waiter| (origin, waiter, weighted_distance(origin, free_seat)))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.0.cmp(&b.0)))
        .map(|(origin, waiter, _)| (origin, waiter))
}
