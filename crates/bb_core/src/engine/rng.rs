//! Immutable, splittable random generator.
//!
//! Every draw consumes the generator and hands back its successor, so the
//! stream has to be threaded explicitly through the call chain:
//!
//! ```rust
//! use bb_core::engine::rng::Generator;
//!
//! let gen = Generator::create(7);
//! let (a, gen) = gen.next_f64();
//! let (b, _gen) = gen.next_f64();
//! assert!(a != b);
//! ```
//!
//! The underlying algorithm is ChaCha8. Seeds are avalanched with SplitMix64
//! first so that small consecutive integers (game ids, series numbers) do not
//! start from related states.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

/// SplitMix64 finalizer.
#[inline]
pub fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Derive an independent seed from a base seed and a stable key.
#[inline]
pub fn derive_seed(base_seed: u64, key: u64) -> u64 {
    splitmix64(base_seed ^ splitmix64(key))
}

#[derive(Debug, Clone)]
pub struct Generator {
    inner: ChaCha8Rng,
}

/// Lossless snapshot of a [`Generator`] used by save/resume collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorState {
    pub seed: [u8; 32],
    pub stream: u64,
    /// Word position split into halves so every serde format can carry it.
    pub word_pos_hi: u64,
    pub word_pos_lo: u64,
}

impl Generator {
    pub fn create(seed: u64) -> Self {
        Self { inner: ChaCha8Rng::seed_from_u64(splitmix64(seed)) }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_f64(self) -> (f64, Self) {
        let mut inner = self.inner;
        let value: f64 = inner.gen();
        (value, Self { inner })
    }

    pub fn next_u64(self) -> (u64, Self) {
        let mut inner = self.inner;
        let value = inner.next_u64();
        (value, Self { inner })
    }

    /// Integer in `[lo, hi]` (inclusive). Collapses to `lo` when the range is empty.
    pub fn int_range(self, lo: i64, hi: i64) -> (i64, Self) {
        if hi <= lo {
            return (lo, self);
        }
        let mut inner = self.inner;
        let value = inner.gen_range(lo..=hi);
        (value, Self { inner })
    }

    /// Float in `[lo, hi)`.
    pub fn float_range(self, lo: f64, hi: f64) -> (f64, Self) {
        let (u, next) = self.next_f64();
        if !(hi > lo) {
            return (lo, next);
        }
        (lo + (hi - lo) * u, next)
    }

    /// Normal draw via `rand_distr::StandardNormal` (ziggurat, not Box-Muller).
    ///
    /// The number of words consumed varies with the draw, but the result and
    /// the returned generator are fixed by the current state.
    pub fn gaussian(self, mean: f64, std_dev: f64) -> (f64, Self) {
        let mut inner = self.inner;
        let z: f64 = StandardNormal.sample(&mut inner);
        (mean + std_dev * z, Self { inner })
    }

    pub fn clamped_gaussian(self, mean: f64, std_dev: f64, lo: f64, hi: f64) -> (f64, Self) {
        let (value, next) = self.gaussian(mean, std_dev);
        (value.clamp(lo, hi), next)
    }

    /// Bernoulli trial. Always consumes exactly one draw.
    pub fn chance(self, p: f64) -> (bool, Self) {
        let (u, next) = self.next_f64();
        (u < p, next)
    }

    /// Index into `weights` proportional to weight. Non-finite or negative
    /// weights count as zero; an all-zero slice yields index 0.
    pub fn choose_weighted(self, weights: &[f64]) -> (usize, Self) {
        let (u, next) = self.next_f64();
        (pick_cumulative(weights, u), next)
    }

    /// Fork an independent child stream, returning `(parent', child)`.
    pub fn split(self) -> (Self, Self) {
        let (seed, parent) = self.next_u64();
        (parent, Generator::create(seed))
    }

    pub fn state(&self) -> GeneratorState {
        let word_pos = self.inner.get_word_pos();
        GeneratorState {
            seed: self.inner.get_seed(),
            stream: self.inner.get_stream(),
            word_pos_hi: (word_pos >> 64) as u64,
            word_pos_lo: word_pos as u64,
        }
    }

    pub fn from_state(state: &GeneratorState) -> Self {
        let mut inner = ChaCha8Rng::from_seed(state.seed);
        inner.set_stream(state.stream);
        inner.set_word_pos(((state.word_pos_hi as u128) << 64) | state.word_pos_lo as u128);
        Self { inner }
    }
}

impl PartialEq for Generator {
    fn eq(&self, other: &Self) -> bool {
        self.state() == other.state()
    }
}

impl Serialize for Generator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.state().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Generator {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let state = GeneratorState::deserialize(deserializer)?;
        Ok(Generator::from_state(&state))
    }
}

/// Walk the cumulative distribution of `weights` with a uniform `u`.
pub(crate) fn pick_cumulative(weights: &[f64], u: f64) -> usize {
    let total: f64 = weights.iter().map(|w| sanitize_weight(*w)).sum();
    if weights.is_empty() || total <= 0.0 {
        return 0;
    }
    let target = u * total;
    let mut acc = 0.0;
    let mut last_positive = 0;
    for (idx, w) in weights.iter().enumerate() {
        let w = sanitize_weight(*w);
        if w <= 0.0 {
            continue;
        }
        acc += w;
        last_positive = idx;
        if target < acc {
            return idx;
        }
    }
    last_positive
}

#[inline]
fn sanitize_weight(w: f64) -> f64 {
    if w.is_finite() && w > 0.0 {
        w
    } else {
        0.0
    }
}
