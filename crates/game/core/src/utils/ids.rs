//! Session-scoped id generation and uniqueness tracking.
//!
//! Every logic node, action and effect claims its id here when it is built.
//! Ids are never released during a session; [`IdRegistry::reset`] exists so
//! tests and fresh sessions can start from a clean slate.
//!
//! Generation is deterministic: the same seed always yields the same id
//! sequence, which keeps replays and tests stable.

use std::collections::HashSet;

use crate::config::SohlConfig;

/// Registry of ids seen during a session plus the generator that mints new ones.
#[derive(Clone, Debug)]
pub struct IdRegistry {
    seen: HashSet<String>,
    seed: u64,
    state: u64,
    length: usize,
}

impl IdRegistry {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self::with_length(seed, SohlConfig::DEFAULT_ID_LENGTH)
    }

    pub fn with_length(seed: u64, length: usize) -> Self {
        Self {
            seen: HashSet::new(),
            seed,
            state: seed,
            length: length.max(1),
        }
    }

    pub fn from_config(config: &SohlConfig) -> Self {
        Self::with_length(config.id_seed, config.id_length)
    }

    /// Checks whether `id` was already seen, optionally recording it.
    ///
    /// Returns `true` if the id was present before this call.
    pub fn in_id_cache(&mut self, id: &str, save: bool) -> bool {
        if self.seen.contains(id) {
            return true;
        }
        if save {
            self.seen.insert(id.to_string());
        }
        false
    }

    /// Records `id` as used. Returns `true` if it was already known.
    pub fn claim(&mut self, id: &str) -> bool {
        self.in_id_cache(id, true)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Mints a fresh id that has not been seen in this session and claims it.
    pub fn generate_unique_id(&mut self) -> String {
        loop {
            let candidate: String = (0..self.length).map(|_| self.next_char()).collect();
            if !self.in_id_cache(&candidate, true) {
                return candidate;
            }
        }
    }

    /// Forgets every claimed id and rewinds the generator to its seed.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.state = self.seed;
    }

    fn next_char(&mut self) -> char {
        self.state = Self::pcg_step(self.state);
        let alphabet = SohlConfig::ID_ALPHABET;
        let index = Self::pcg_output(self.state) as usize % alphabet.len();
        alphabet[index] as char
    }

    /// `state' = (state * multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::from_config(&SohlConfig::default())
    }
}
