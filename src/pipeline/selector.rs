//! Keyword selection for article generation.

use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Mutex;

/// Chooses which keyword of a site gets an article.
pub trait KeywordSelector: Send + Sync {
    /// Pick one entry, or `None` when `keywords` is empty.
    fn select<'a>(&self, keywords: &'a [String]) -> Option<&'a String>;
}

/// Uniform choice using the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformSelector;

impl KeywordSelector for UniformSelector {
    fn select<'a>(&self, keywords: &'a [String]) -> Option<&'a String> {
        keywords.choose(&mut rand::rng())
    }
}

/// Uniform choice from a seeded generator, reproducible across runs.
#[derive(Debug)]
pub struct SeededSelector {
    rng: Mutex<ChaCha8Rng>,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl KeywordSelector for SeededSelector {
    fn select<'a>(&self, keywords: &'a [String]) -> Option<&'a String> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        keywords.choose(&mut *rng)
    }
}

/// Always picks the entry at `index`, falling back to the last one.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedSelector {
    index: usize,
}

impl FixedSelector {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl KeywordSelector for FixedSelector {
    fn select<'a>(&self, keywords: &'a [String]) -> Option<&'a String> {
        keywords.get(self.index).or_else(|| keywords.last())
    }
}
