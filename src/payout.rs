//! Payout: popped tiles × wager × per-tile factor.

#[inline]
pub fn payout(popped: u32, wager: f64, per_tile_factor: f64) -> f64 {
    f64::from(popped) * wager * per_tile_factor
}
