/// Deterministic RNG helpers.
///
/// Every random draw of a run comes from one explicitly threaded generator, so a seed fully
/// determines the run. This is **not** cryptographic.

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform value in [0, 1) with 53 bits of precision.
    fn next_f64_unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }

    /// Uniform integer in `0..bound`, rejection-sampled to avoid modulo bias.
    fn next_below(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "empty range");
        let bound = bound as u64;
        let threshold = u64::MAX - (u64::MAX % bound);
        loop {
            let x = self.next_u64();
            if x < threshold {
                return (x % bound) as usize;
            }
        }
    }

    /// One draw; true with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64_unit() < p
    }
}

/// SplitMix64: good seeding RNG and small deterministic generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from OS entropy; used only when a run is configured without a seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.step()
    }
}

/// Uniform choice from a slice; `None` (and no draw) when empty.
pub fn choose<'a, T, R>(rng: &mut R, items: &'a [T]) -> Option<&'a T>
where
    R: DeterministicRng + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    items.get(rng.next_below(items.len()))
}

/// Draws distinct items from a pool without replacement (incremental Fisher-Yates).
///
/// Items not yet drawn stay available to later draws, so one sampler can serve several
/// placement phases that must not overlap.
#[derive(Debug, Clone)]
pub struct DistinctSampler<T> {
    pool: Vec<T>,
    drawn: usize,
}

impl<T: Copy> DistinctSampler<T> {
    pub fn new(pool: Vec<T>) -> Self {
        Self { pool, drawn: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.pool.len() - self.drawn
    }

    pub fn draw<R>(&mut self, rng: &mut R) -> Option<T>
    where
        R: DeterministicRng + ?Sized,
    {
        if self.remaining() == 0 {
            return None;
        }
        let pick = self.drawn + rng.next_below(self.remaining());
        self.pool.swap(self.drawn, pick);
        self.drawn += 1;
        Some(self.pool[self.drawn - 1])
    }

    pub fn draw_many<R>(&mut self, rng: &mut R, count: usize) -> Vec<T>
    where
        R: DeterministicRng + ?Sized,
    {
        (0..count).map_while(|_| self.draw(rng)).collect()
    }
}
