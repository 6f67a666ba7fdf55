use rand::{rngs::StdRng, SeedableRng};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// An opaque deterministic seed.
///
/// A `Seed` is consumed at initialization time only: layers draw their
/// initial parameter values from it, and `split` derives independent child
/// seeds so that sibling layers never share a random stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(u64);

impl Seed {
    /// Creates a new `Seed` from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Deterministically derives two independent child seeds.
    ///
    /// Splitting the same seed twice yields the same pair; the two children
    /// never coincide with each other or with the parent.
    pub fn split(self) -> (Seed, Seed) {
        let a = self.0.wrapping_add(GOLDEN_GAMMA);
        let b = self.0.wrapping_add(GOLDEN_GAMMA.wrapping_mul(2));
        (Seed(mix(a)), Seed(mix(b)))
    }

    /// Realizes this seed as a random number generator.
    pub fn rng(self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }
}

// SplitMix64 finalizer.
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
