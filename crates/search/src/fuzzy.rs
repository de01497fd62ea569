//! Fuzzy query expansion
//!
//! Generates a bounded candidate set of near-variants of a query: wildcard
//! forms, single-character deletions and single-character substitutions over
//! a fixed alphabet. This is an explicit approximation of edit-distance-1
//! matching; for a query of n characters the set is at most
//! `1 + 3 + n + 25n` variants, so it stays small for reasonable query
//! lengths but is combinatorially expensive enough that callers gate it
//! behind an explicit fuzzy flag.

use std::collections::HashSet;

const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Wildcard forms require more than this many characters
const WILDCARD_MIN_CHARS: usize = 2;
/// Deletions/substitutions require more than this many characters
const EDIT_MIN_CHARS: usize = 3;

/// Expand a query into its deduplicated variant set, base query first
pub fn expand(query: &str) -> Vec<String> {
    let mut variants = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |variant: String, variants: &mut Vec<String>| {
        if seen.insert(variant.clone()) {
            variants.push(variant);
        }
    };

    push(query.to_string(), &mut variants);

    let chars: Vec<char> = query.chars().collect();
    let n = chars.len();

    if n > WILDCARD_MIN_CHARS {
        push(format!("*{query}*"), &mut variants);
        push(format!("{query}*"), &mut variants);
        push(format!("*{query}"), &mut variants);
    }

    if n > EDIT_MIN_CHARS {
        // Single-character deletions
        for i in 0..n {
            let deleted: String = chars[..i].iter().chain(&chars[i + 1..]).collect();
            if deleted.chars().count() > 1 {
                push(deleted, &mut variants);
            }
        }

        // Single-character substitutions over the fixed alphabet
        for i in 0..n {
            for &c in ALPHABET {
                if c != chars[i] {
                    let substituted: String = chars[..i]
                        .iter()
                        .chain(std::iter::once(&c))
                        .chain(&chars[i + 1..])
                        .collect();
                    push(substituted, &mut variants);
                }
            }
        }
    }

    variants
}

/// Upper bound on the variant count for a query of `n` characters
pub fn max_variants(n: usize) -> usize {
    let wildcards = if n > WILDCARD_MIN_CHARS { 3 } else { 0 };
    let edits = if n > EDIT_MIN_CHARS {
        n + n * (ALPHABET.len() - 1)
    } else {
        0
    };
    1 + wildcards + edits
}
