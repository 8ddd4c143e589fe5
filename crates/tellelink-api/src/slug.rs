//! Public identifiers for posts.
//!
//! A slug is the lowercased title with every run of non-alphanumeric
//! characters collapsed into a single hyphen, followed by a short random
//! suffix. The suffix makes collisions unlikely enough that no lookup is done
//! up front; the database's UNIQUE constraint catches the rest.

use rand::Rng;

const SUFFIX_LEN: usize = 6;
const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const MAX_BASE_LEN: usize = 60;
const MAX_SLUG_LEN: usize = MAX_BASE_LEN + 1 + SUFFIX_LEN;

pub fn generate_slug(title: &str) -> String {
    let base = slugify(title);
    let suffix = random_suffix(&mut rand::rng());
    if base.is_empty() {
        suffix
    } else {
        format!("{}-{}", base, suffix)
    }
}

/// The deterministic part of a slug. May be empty.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len().min(MAX_BASE_LEN));
    let mut gap = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if gap && !out.is_empty() {
                out.push('-');
            }
            gap = false;
            out.push(c);
        } else {
            gap = true;
        }
    }

    // Only ASCII was pushed, so byte truncation is safe.
    if out.len() > MAX_BASE_LEN {
        out.truncate(MAX_BASE_LEN);
        while out.ends_with('-') {
            out.pop();
        }
    }
    out
}

fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Whether `s` has the shape of a generated slug.
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_SLUG_LEN
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
