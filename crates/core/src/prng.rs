//! Seedable pseudo-random source for particle spawning.
//!
//! Every random draw the field makes (position, radius, velocity) goes
//! through [`Xorshift64`], so a headless run with a fixed seed reproduces the
//! exact same particle set on every platform.

/// Xorshift64 generator with the (13, 7, 17) shift triple.
///
/// A zero seed is a fixed point of xorshift, so it is replaced by a
/// non-zero constant.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const ZERO_SEED_REPLACEMENT: u64 = 0x9E37_79B9_7F4A_7C15;

    /// Creates a generator from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 {
                Self::ZERO_SEED_REPLACEMENT
            } else {
                seed
            },
        }
    }

    /// Creates a generator from a weak entropy source such as a wall-clock
    /// timestamp in milliseconds.
    ///
    /// The value is scrambled with a splitmix64 finalizer so that nearby
    /// timestamps still produce unrelated streams.
    pub fn from_entropy(entropy: f64) -> Self {
        let mut z = entropy.to_bits().wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self::new(z ^ (z >> 31))
    }

    /// Advances the state and returns the next raw value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform f64 in [0, 1) built from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform f64 in [min, max). Returns `min` when the range is empty.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        let v = min + self.next_f64() * (max - min);
        // Rounding can land exactly on `max` for wide ranges.
        if v >= max {
            min
        } else {
            v
        }
    }

    /// Uniform f64 in [-amplitude, amplitude).
    pub fn next_symmetric(&mut self, amplitude: f64) -> f64 {
        self.next_range(-amplitude, amplitude)
    }
}
