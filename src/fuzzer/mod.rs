// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Payload Engine
 * Fuzz value generation by mutation, dictionary, permutation and
 * boundary strategies, with context-aware smart fuzzing
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod dictionaries;
mod generators;
mod mutations;
mod smart;

pub use dictionaries::{Dictionaries, DictionaryCategory};

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;

/// Hard cap on the engine's output, applied after deduplication.
/// Truncation happens in generation order (no category re-balancing).
pub const MAX_FUZZ_VALUES: usize = 1000;

/// Entries taken from each dictionary category by the dictionary strategy
const DICT_ENTRIES_PER_CATEGORY: usize = 10;

/// Random cross-category token combinations emitted per run
const DICT_COMBINATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzStrategy {
    Mutation,
    Generation,
    Dictionary,
    Permutation,
    Boundary,
    All,
}

/// Payload engine. Every randomized strategy draws from the explicit RNG
/// handle, so identical seeds reproduce identical output.
#[derive(Debug, Default)]
pub struct AdvancedFuzzer {
    dictionaries: Dictionaries,
}

impl AdvancedFuzzer {
    pub fn new() -> Self {
        Self {
            dictionaries: Dictionaries::new(),
        }
    }

    pub fn dictionaries(&self) -> &Dictionaries {
        &self.dictionaries
    }

    /// Generate fuzz values for a base input. Output preserves generation
    /// order, is duplicate-free and capped at [`MAX_FUZZ_VALUES`].
    pub fn generate_fuzz_values(
        &self,
        base_value: &str,
        strategy: FuzzStrategy,
        rng: &mut StdRng,
    ) -> Vec<String> {
        let mut values = Vec::new();

        if matches!(strategy, FuzzStrategy::All | FuzzStrategy::Mutation) {
            values.extend(mutations::mutation_fuzzing(base_value, &self.dictionaries, rng));
        }

        if matches!(strategy, FuzzStrategy::All | FuzzStrategy::Generation) {
            values.extend(generators::generation_fuzzing(rng));
        }

        if matches!(strategy, FuzzStrategy::All | FuzzStrategy::Dictionary) {
            values.extend(self.dictionary_fuzzing(base_value, rng));
        }

        if matches!(strategy, FuzzStrategy::All | FuzzStrategy::Permutation) {
            values.extend(generators::permutation_fuzzing(base_value, rng));
        }

        if matches!(strategy, FuzzStrategy::All | FuzzStrategy::Boundary) {
            values.extend(generators::boundary_fuzzing());
        }

        dedup_capped(values)
    }

    /// Dictionary strategy: leading entries of every category alone and
    /// concatenated around the base, plus random cross-category combos.
    fn dictionary_fuzzing(&self, base_value: &str, rng: &mut StdRng) -> Vec<String> {
        let mut fuzzed = Vec::new();
        let base_chars: Vec<char> = base_value.chars().collect();

        for category in DictionaryCategory::ALL {
            for entry in self
                .dictionaries
                .entries(category)
                .iter()
                .take(DICT_ENTRIES_PER_CATEGORY)
            {
                fuzzed.push(entry.to_string());
                fuzzed.push(format!("{}{}", base_value, entry));
                fuzzed.push(format!("{}{}", entry, base_value));

                if base_chars.len() > 2 {
                    let mid = base_chars.len() / 2;
                    let mut spliced: String = base_chars[..mid].iter().collect();
                    spliced.push_str(entry);
                    spliced.extend(&base_chars[mid..]);
                    fuzzed.push(spliced);
                }
            }
        }

        for _ in 0..DICT_COMBINATIONS {
            let mut combo = String::new();
            for _ in 0..rng.random_range(2..=5) {
                let category = *DictionaryCategory::ALL.choose(rng).unwrap();
                combo.push_str(self.dictionaries.entries(category).choose(rng).unwrap());
            }
            fuzzed.push(combo);
        }

        fuzzed
    }

    /// Context-aware fuzzing keyed off the inferred input shape
    pub fn smart_fuzz(&self, value: &str, rng: &mut StdRng) -> Vec<String> {
        let values = if value.contains('@') {
            smart::fuzz_email(value)
        } else if value.contains("http") {
            smart::fuzz_url(value)
        } else if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
            smart::fuzz_number(value)
        } else if value.len() == 10 && value.matches('-').count() == 2 {
            smart::fuzz_date(value)
        } else if value.starts_with('{') {
            smart::fuzz_json(value)
        } else {
            return self.generate_fuzz_values(value, FuzzStrategy::All, rng);
        };

        dedup_capped(values)
    }
}

/// Deduplicate preserving first-seen order, then truncate to the cap
fn dedup_capped(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for value in values {
        if seen.insert(value.clone()) {
            unique.push(value);
            if unique.len() >= MAX_FUZZ_VALUES {
                break;
            }
        }
    }

    unique
}
