use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Hands out independent named ChaCha8 streams derived from one master
/// seed. Streams are created on first use, in call order, so a fixed
/// system registration order keeps runs reproducible while decoupling the
/// systems' draw sequences from each other.
pub struct RngManager {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| derive_stream(&mut self.master));
        SystemRng { inner: entry }
    }
}

fn derive_stream(master: &mut ChaCha8Rng) -> ChaCha8Rng {
    let mut seed = [0u8; 32];
    master.fill_bytes(&mut seed);
    ChaCha8Rng::from_seed(seed)
}

/// Borrowed view of one named stream, passed to a system for the tick.
pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
