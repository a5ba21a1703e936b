//! Physical seat layout: two facing rows of seven.

use crate::SeatId;

/// `(row, col)` of a seat: ids 1..=7 are row 0, cols 0..=6; ids 8..=14 are
/// row 1, cols 0..=6.
pub fn seat_position(seat: SeatId) -> (u8, u8) {
    let raw = seat.get();
    if raw <= 7 {
        (0, raw - 1)
    } else {
        (1, raw - 8)
    }
}

/// Walking cost between two seats. Same-row moves cost the column gap;
/// crossing the aisle adds a flat 1.5.
pub fn weighted_distance(a: SeatId, b: SeatId) -> f32 {
    let (row_a, col_a) = seat_position(a);
    let (row_b, col_b) = seat_position(b);

    let col_distance = f32::from(col_a.abs_diff(col_b));
    let row_penalty = if row_a == row_b { 0.0 } else { 1.5 };
    col_distance + row_penalty
}
