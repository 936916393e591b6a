//! Maven version ordering.
//!
//! Used to pick a single catalog version when modules declare different
//! versions of the same artifact.

use std::cmp::Ordering;

/// Rank of a release without qualifier (`1.0`, `1.0.Final`, `1.0-GA`).
const RELEASE_RANK: u8 = 6;

/// Compares two Maven version strings.
///
/// Splits on `.`, `-` and digit/letter transitions. Numeric segments
/// compare numerically; qualifiers follow Maven's order
/// `alpha < beta < milestone < rc < snapshot < release < sp`, with unknown
/// qualifiers sorting after `sp` and lexically among themselves.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = split_version(a);
    let b_parts = split_version(b);

    let max_len = a_parts.len().max(b_parts.len());
    for i in 0..max_len {
        let ord = compare_segment(
            a_parts.get(i).map(String::as_str),
            b_parts.get(i).map(String::as_str),
        );
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

fn split_version(v: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for chunk in v.trim().split(['.', '-', '_']).filter(|s| !s.is_empty()) {
        let mut current = String::new();
        let mut numeric = None;
        for c in chunk.chars() {
            let is_digit = c.is_ascii_digit();
            if numeric.is_some_and(|n| n != is_digit) {
                parts.push(std::mem::take(&mut current));
            }
            numeric = Some(is_digit);
            current.push(c);
        }
        parts.push(current);
    }
    parts
}

fn compare_segment(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(a), None) => compare_to_missing(a),
        (None, Some(b)) => compare_to_missing(b).reverse(),
        (Some(a), Some(b)) => match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(an), Ok(bn)) => an.cmp(&bn),
            (Ok(_), Err(_)) => Ordering::Greater,
            (Err(_), Ok(_)) => Ordering::Less,
            (Err(_), Err(_)) => qualifier_rank(a)
                .cmp(&qualifier_rank(b))
                .then_with(|| a.to_lowercase().cmp(&b.to_lowercase())),
        },
    }
}

/// Ordering of a trailing segment against a version that has already ended.
fn compare_to_missing(segment: &str) -> Ordering {
    match segment.parse::<u64>() {
        Ok(0) => Ordering::Equal,
        Ok(_) => Ordering::Greater,
        Err(_) => qualifier_rank(segment).cmp(&RELEASE_RANK),
    }
}

fn qualifier_rank(qualifier: &str) -> u8 {
    match qualifier.to_lowercase().as_str() {
        "alpha" | "a" => 1,
        "beta" | "b" => 2,
        "milestone" | "m" => 3,
        "rc" | "cr" => 4,
        "snapshot" => 5,
        "" | "ga" | "final" | "release" => RELEASE_RANK,
        "sp" => 7,
        _ => 8,
    }
}
