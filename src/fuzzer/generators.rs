// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Generation, Boundary and Permutation Strategies
 * Fuzz values produced from scratch or by rearranging the base value
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

const RANDOM_STRING_LENGTHS: &[usize] = &[1, 10, 100, 1000, 10000];

const OVERFLOW_SIZES: &[usize] = &[100, 255, 256, 1023, 1024, 4095, 4096, 65535, 65536];

const FORMAT_SPECIFIERS: &[&str] = &["%s", "%d", "%x", "%n", "%p"];

/// Generate fuzz values from scratch: runs, random strings, format
/// strings, overflow buffers, sentinels and unicode edge cases.
pub fn generation_fuzzing(rng: &mut StdRng) -> Vec<String> {
    let mut generated = Vec::new();

    let printable: Vec<char> = (0x20u8..0x7f).map(|b| b as char).collect();
    let alphanumeric: Vec<char> = ('a'..='z').chain('A'..='Z').chain('0'..='9').collect();

    for &length in RANDOM_STRING_LENGTHS {
        generated.push("A".repeat(length));
        generated.push((0..length).map(|_| *printable.choose(rng).unwrap()).collect());
        generated.push((0..length).map(|_| *alphanumeric.choose(rng).unwrap()).collect());
    }

    // Format strings
    for spec in FORMAT_SPECIFIERS {
        generated.push(spec.to_string());
    }
    generated.push("%s".repeat(100));
    generated.push("%n".repeat(10));

    // Buffer overflow attempts
    for &size in OVERFLOW_SIZES {
        generated.push("A".repeat(size));
        generated.push("\0".repeat(size));
    }

    // Sentinel patterns
    generated.push(format!("{}{}", "A".repeat(100), "B".repeat(100)));
    generated.push("AAAA".to_string());
    generated.push("\u{de}\u{ad}\u{be}\u{ef}".to_string());

    // Null bytes and terminators
    generated.push("\0".to_string());
    generated.push("%00".to_string());
    generated.push("test\0test".to_string());

    // Unicode edge cases. Unpaired surrogates cannot exist in Rust
    // strings, so the surrogate boundary is represented by the adjacent
    // valid scalars on either side of the range.
    generated.push("\u{1F4A9}".to_string());
    generated.push("\u{202e}".to_string());
    generated.push("\u{feff}".to_string());
    generated.push("\u{d7ff}".to_string());
    generated.push("\u{e000}".to_string());
    generated.push("\u{0}".to_string());
    generated.push("\u{ffff}".to_string());

    generated
}

/// Boundary test values: integer edges at 8/16/32/64 bit widths, IEEE-754
/// edges, power-of-two string lengths and calendar edges.
pub fn boundary_fuzzing() -> Vec<String> {
    let mut boundaries: Vec<String> = Vec::new();

    let integer_edges: &[i128] = &[
        0, -1, 1,
        127, 128, -128, -129,
        255, 256, -255, -256,
        32767, 32768, -32768, -32769,
        65535, 65536, -65535, -65536,
        2147483647, 2147483648, -2147483648, -2147483649,
        4294967295, 4294967296,
        9223372036854775807, -9223372036854775808,
    ];
    boundaries.extend(integer_edges.iter().map(|n| n.to_string()));

    boundaries.extend(
        [
            "0.0", "-0.0", "inf", "-inf", "nan",
            "1.7976931348623157e308", "2.2250738585072014e-308",
            "1e308", "-1e308",
        ]
        .iter()
        .map(|s| s.to_string()),
    );

    // String lengths at powers of two, plus/minus one
    for i in 0..20u32 {
        let length = 2usize.pow(i);
        boundaries.push("A".repeat(length.saturating_sub(1)));
        boundaries.push("A".repeat(length));
        boundaries.push("A".repeat(length + 1));
    }

    boundaries.extend(
        [
            "1970-01-01", "2038-01-19",
            "0000-00-00", "9999-12-31",
            "00:00:00", "23:59:59",
        ]
        .iter()
        .map(|s| s.to_string()),
    );

    boundaries
}

/// Permutations of the base value: character-level for short strings,
/// word-level for 2-5 word strings, delimiter swaps, reverse and shuffles.
pub fn permutation_fuzzing(base: &str, rng: &mut StdRng) -> Vec<String> {
    let mut permutations = Vec::new();

    let chars: Vec<char> = base.chars().collect();
    if chars.len() <= 6 {
        for perm in permute(&chars, 100) {
            permutations.push(perm.into_iter().collect());
        }
    }

    let words: Vec<&str> = base.split_whitespace().collect();
    if (2..=5).contains(&words.len()) {
        for perm in permute(&words, 120) {
            permutations.push(perm.join(" "));
        }
    }

    for delimiter in [" ", "-", "_", ".", "/", "\\", "|", ",", ";"] {
        permutations.push(base.replace(' ', delimiter));
    }

    permutations.push(base.chars().rev().collect());

    for _ in 0..10 {
        let mut shuffled = chars.clone();
        shuffled.shuffle(rng);
        permutations.push(shuffled.into_iter().collect());
    }

    permutations
}

/// All permutations of `items`, stopping at `cap` results
fn permute<T: Clone>(items: &[T], cap: usize) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    let mut work = items.to_vec();
    permute_into(&mut work, 0, cap, &mut out);
    out
}

fn permute_into<T: Clone>(items: &mut Vec<T>, start: usize, cap: usize, out: &mut Vec<Vec<T>>) {
    if out.len() >= cap {
        return;
    }
    if start == items.len() {
        out.push(items.clone());
        return;
    }
    for i in start..items.len() {
        items.swap(start, i);
        permute_into(items, start + 1, cap, out);
        items.swap(start, i);
        if out.len() >= cap {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_generation_includes_overflow_buffers() {
        let mut rng = StdRng::seed_from_u64(1);
        let generated = generation_fuzzing(&mut rng);
        assert!(generated.contains(&"A".repeat(65536)));
        assert!(generated.contains(&"AAAA".to_string()));
        assert!(generated.contains(&"%00".to_string()));
    }

    #[test]
    fn test_generation_covers_surrogate_boundary_scalars() {
        let mut rng = StdRng::seed_from_u64(1);
        let generated = generation_fuzzing(&mut rng);
        assert!(generated.contains(&"\u{d7ff}".to_string()));
        assert!(generated.contains(&"\u{e000}".to_string()));
    }

    #[test]
    fn test_boundary_integer_edges() {
        let boundaries = boundary_fuzzing();
        assert!(boundaries.contains(&"2147483647".to_string()));
        assert!(boundaries.contains(&"-9223372036854775808".to_string()));
        assert!(boundaries.contains(&"1970-01-01".to_string()));
        assert!(boundaries.contains(&"nan".to_string()));
    }

    #[test]
    fn test_char_permutations_capped_at_100() {
        // 6! = 720 raw permutations; the enumeration itself stops at 100
        let perms = permute(&"abcdef".chars().collect::<Vec<_>>(), 100);
        assert_eq!(perms.len(), 100);
    }

    #[test]
    fn test_word_permutations() {
        let mut rng = StdRng::seed_from_u64(1);
        let perms = permutation_fuzzing("alpha beta", &mut rng);
        assert!(perms.contains(&"beta alpha".to_string()));
        assert!(perms.contains(&"alpha-beta".to_string()));
    }

    #[test]
    fn test_reverse_present() {
        let mut rng = StdRng::seed_from_u64(1);
        let perms = permutation_fuzzing("abcdefgh", &mut rng);
        assert!(perms.contains(&"hgfedcba".to_string()));
    }
}
