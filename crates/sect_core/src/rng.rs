//! Seeded xorshift32 random numbers.
//!
//! There is no global generator. Every randomized outcome reads the seed
//! stored in [`GameState`](crate::state::GameState), draws from it and writes
//! the advanced seed back, so a replay from the same seed with the same inputs
//! reproduces every roll.

/// One draw from the generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomDraw {
    /// Uniform value in `[0, 1)`.
    pub value: f64,
    /// Seed to use for the next draw.
    pub next_seed: u32,
}

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Advance the xorshift32 permutation (13/17/5) by one step.
///
/// A zero seed is coerced to 1, since zero is a fixed point of xorshift.
#[must_use]
pub const fn next_random(seed: u32) -> RandomDraw {
    let mut x = if seed == 0 { 1 } else { seed };
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    RandomDraw {
        value: x as f64 / TWO_POW_32,
        next_seed: x,
    }
}

/// Draw a value and advance `seed` in place.
pub fn draw(seed: &mut u32) -> f64 {
    let RandomDraw { value, next_seed } = next_random(*seed);
    *seed = next_seed;
    value
}

/// Pick an index in `0..len` uniformly. Returns `None` for an empty range.
pub fn pick_index(seed: &mut u32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let idx = (draw(seed) * len as f64) as usize;
    Some(idx.min(len - 1))
}

/// Cumulative-weight selection over `entries`.
///
/// Entries with non-positive weight are never chosen. Returns `None` if no
/// entry has positive weight. Always consumes exactly one draw.
pub fn pick_weighted<'a, T>(
    seed: &mut u32,
    entries: &'a [T],
    weight: impl Fn(&T) -> f64,
) -> Option<&'a T> {
    let roll = draw(seed);
    let total: f64 = entries.iter().map(|e| weight(e).max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }

    let target = roll * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for entry in entries {
        let w = weight(entry);
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(entry);
        if target < cumulative {
            return Some(entry);
        }
    }
    // Rounding can leave target == total.
    last_positive
}
