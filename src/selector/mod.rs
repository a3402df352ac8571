use crate::error::{Error, Result};
use rand::Rng;

pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Jellyfin runtime ticks to whole minutes, truncating.
pub fn ticks_to_minutes(ticks: i64) -> i64 {
    ticks / TICKS_PER_SECOND / 60
}

/// Uniform pick over the whole slice.
pub fn pick_random<T>(items: &[T]) -> Result<&T> {
    pick_with(&mut rand::thread_rng(), items)
}

fn pick_with<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Result<&'a T> {
    if items.is_empty() {
        return Err(Error::NoMovies);
    }
    let index = rng.gen_range(0..items.len());
    Ok(&items[index])
}
