// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Mutation Strategies
 * Byte- and character-level mutations applied to a base value
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::dictionaries::{Dictionaries, DictionaryCategory};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Canonical replacement/append set used by the interesting-values strategy
const INTERESTING_VALUES: &[&str] = &[
    "", "0", "1", "-1", "null", "undefined", "NaN",
    "true", "false", "[]", "{}", "None", "nil",
    "\0", "\u{ff}", " ", "\t", "\n", "\r\n",
];

/// Special characters spliced in by the per-position replacement pass
const SPECIAL_CHARS: &[char] = &['<', '>', '"', '\'', '&', ';', '|', '\0', '\n'];

/// Mutate the base value: the six randomized strategies plus the
/// deterministic character/length/case/encoding passes.
pub fn mutation_fuzzing(base: &str, dicts: &Dictionaries, rng: &mut StdRng) -> Vec<String> {
    let mut mutations = Vec::new();

    for strategy in [
        bit_flip, byte_flip, arithmetic, interesting_values,
    ] {
        let mutated = strategy(base, rng);
        if !mutated.is_empty() && mutated != base {
            mutations.push(mutated);
        }
    }

    let inserted = dictionary_insert(base, dicts, rng);
    if inserted != base {
        mutations.push(inserted);
    }

    let havoced = havoc(base, rng);
    if havoced != base {
        mutations.push(havoced);
    }

    let chars: Vec<char> = base.chars().collect();

    // Character mutations on the first 10 positions
    for i in 0..chars.len().min(10) {
        if chars.len() > 1 {
            let mut deleted = chars.clone();
            deleted.remove(i);
            mutations.push(deleted.into_iter().collect());
        }

        let mut duplicated = chars.clone();
        duplicated.insert(i, chars[i]);
        mutations.push(duplicated.into_iter().collect());

        for &special in SPECIAL_CHARS {
            let mut replaced = chars.clone();
            replaced[i] = special;
            mutations.push(replaced.into_iter().collect());
        }
    }

    // Length mutations
    mutations.push(base.repeat(2));
    mutations.push(base.repeat(10));
    mutations.push(base.repeat(100));
    mutations.push(chars[..chars.len() / 2].iter().collect());
    mutations.push(String::new());

    // Case mutations
    mutations.push(base.to_uppercase());
    mutations.push(base.to_lowercase());
    mutations.push(swap_case(base));

    // Encoding mutations
    let encoded = urlencoding::encode(base).into_owned();
    mutations.push(urlencoding::encode(&encoded).into_owned());
    mutations.push(encoded);
    mutations.push(base.replace(' ', "+"));
    mutations.push(base.replace(' ', "%20"));

    mutations
}

/// Flip one random bit; invalid UTF-8 re-enters text lossily
pub fn bit_flip(value: &str, rng: &mut StdRng) -> String {
    if value.is_empty() {
        return value.to_string();
    }

    let mut bytes = value.as_bytes().to_vec();
    let byte_idx = rng.random_range(0..bytes.len());
    let bit_idx = rng.random_range(0..8);
    bytes[byte_idx] ^= 1 << bit_idx;

    String::from_utf8_lossy(&bytes).into_owned()
}

/// XOR one random byte with 0xFF
pub fn byte_flip(value: &str, rng: &mut StdRng) -> String {
    if value.is_empty() {
        return value.to_string();
    }

    let mut bytes = value.as_bytes().to_vec();
    let byte_idx = rng.random_range(0..bytes.len());
    bytes[byte_idx] ^= 0xFF;

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Arithmetic on integer-shaped values
pub fn arithmetic(value: &str, rng: &mut StdRng) -> String {
    let Ok(num) = value.parse::<i64>() else {
        return value.to_string();
    };

    let delta = rng.random_range(1..=100);
    let factor = rng.random_range(2..=10);
    let candidates = [
        num.wrapping_add(delta),
        num.wrapping_sub(delta),
        num.wrapping_mul(factor),
        if num > 1 { num / 2 } else { 1 },
        num.wrapping_neg(),
    ];

    candidates.choose(rng).unwrap().to_string()
}

/// Replace with, prepend, or append a member of the canonical set
pub fn interesting_values(value: &str, rng: &mut StdRng) -> String {
    let pick = *INTERESTING_VALUES.choose(rng).unwrap();

    if rng.random_bool(0.3) {
        pick.to_string()
    } else if rng.random_bool(0.5) {
        format!("{}{}", value, pick)
    } else {
        format!("{}{}", pick, value)
    }
}

/// Splice a random dictionary token at a random character position
pub fn dictionary_insert(value: &str, dicts: &Dictionaries, rng: &mut StdRng) -> String {
    let category = *DictionaryCategory::ALL.choose(rng).unwrap();
    let token = *dicts.entries(category).choose(rng).unwrap();

    if value.is_empty() {
        return token.to_string();
    }

    let chars: Vec<char> = value.chars().collect();
    let pos = rng.random_range(0..=chars.len());
    let mut out: String = chars[..pos].iter().collect();
    out.push_str(token);
    out.extend(&chars[pos..]);
    out
}

/// Compose 1-5 random transforms
pub fn havoc(value: &str, rng: &mut StdRng) -> String {
    if value.is_empty() {
        return value.to_string();
    }

    let mut mutated = value.to_string();
    let rounds = rng.random_range(1..=5);

    for _ in 0..rounds {
        mutated = match rng.random_range(0..11) {
            0 => mutated.repeat(2),
            1 => mutated.chars().rev().collect(),
            2 => mutated.to_uppercase(),
            3 => mutated.to_lowercase(),
            4 => mutated.replace(' ', ""),
            5 => {
                // Interleave spaces between characters
                let mut spaced = String::with_capacity(mutated.len() * 2);
                for (i, c) in mutated.chars().enumerate() {
                    if i > 0 {
                        spaced.push(' ');
                    }
                    spaced.push(c);
                }
                spaced
            }
            6 => urlencoding::encode(&mutated).into_owned(),
            7 => format!("{}\0", mutated),
            8 => format!("<{}>", mutated),
            9 => mutated.chars().skip(1).collect(),
            _ => {
                let mut chars: Vec<char> = mutated.chars().collect();
                if chars.len() > 1 {
                    chars.pop();
                }
                chars.into_iter().collect()
            }
        };
    }

    mutated
}

fn swap_case(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_uppercase() {
                c.to_lowercase().next().unwrap_or(c)
            } else if c.is_lowercase() {
                c.to_uppercase().next().unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_bit_flip_changes_one_bit() {
        let mut rng = rng();
        let flipped = bit_flip("abcd", &mut rng);
        assert_ne!(flipped, "abcd");
    }

    #[test]
    fn test_bit_flip_empty_is_noop() {
        let mut rng = rng();
        assert_eq!(bit_flip("", &mut rng), "");
    }

    #[test]
    fn test_arithmetic_only_touches_integers() {
        let mut rng = rng();
        assert_eq!(arithmetic("hello", &mut rng), "hello");
        let mutated = arithmetic("100", &mut rng);
        assert!(mutated.parse::<i64>().is_ok());
        assert_ne!(mutated, "100");
    }

    #[test]
    fn test_dictionary_insert_on_empty_base() {
        let mut rng = rng();
        let dicts = Dictionaries::new();
        assert!(!dictionary_insert("", &dicts, &mut rng).is_empty());
    }

    #[test]
    fn test_mutation_fuzzing_emits_deterministic_families() {
        let mut rng = rng();
        let dicts = Dictionaries::new();
        let mutations = mutation_fuzzing("hello world", &dicts, &mut rng);

        assert!(mutations.contains(&"HELLO WORLD".to_string()));
        assert!(mutations.contains(&String::new()));
        assert!(mutations.contains(&"hello+world".to_string()));
        assert!(mutations.contains(&"hello%20world".to_string()));
        assert!(mutations.contains(&"hello worldhello world".to_string()));
    }

    #[test]
    fn test_swap_case() {
        assert_eq!(swap_case("AbC1"), "aBc1");
    }

    #[test]
    fn test_havoc_is_deterministic_per_seed() {
        let dicts = Dictionaries::new();
        let _ = dicts;
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(havoc("payload", &mut a), havoc("payload", &mut b));
    }
}
