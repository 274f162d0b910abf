//! Slug generation for tenants.
//!
//! Slugs are URL-safe, derived from the couple's names, and made
//! globally unique by a random lowercase-alphanumeric suffix. A unique
//! index on the slug column is the backstop; on a collision the caller
//! regenerates with a fresh suffix.

use rand::Rng;

const SUFFIX_LEN: usize = 5;
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Build a slug like `amy-ben-x1y2z` from the couple's names.
pub fn generate_slug(bride_name: &str, groom_name: &str) -> String {
    let base = format!("{}-{}", slugify(bride_name), slugify(groom_name));
    let base = base.trim_matches('-');
    if base.is_empty() {
        format!("wedding-{}", random_suffix())
    } else {
        format!("{base}-{}", random_suffix())
    }
}

/// Lowercase, keep alphanumerics, collapse everything else to single
/// hyphens.
fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_hyphen = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            out.push('-');
            last_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_url_safe_and_suffixed() {
        let slug = generate_slug("Amy O'Hara", "Ben van Dijk");
        assert!(slug.starts_with("amy-o-hara-ben-van-dijk-"));
        let suffix = slug.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn identical_names_yield_distinct_slugs() {
        let a = generate_slug("Amy", "Ben");
        let b = generate_slug("Amy", "Ben");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_names_still_produce_a_slug() {
        let slug = generate_slug("", "");
        assert!(slug.starts_with("wedding-"));
    }
}
