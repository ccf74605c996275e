//! Glob matching for cache keys.
//!
//! Patterns support a single wildcard, `*`, matching any (possibly empty)
//! sequence of characters. Everything else matches literally.

/// Checks if a cache key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use recipebox_core::cache::pattern_matches;
///
/// assert!(pattern_matches("post:p1", "post:p1"));
/// assert!(pattern_matches("public_*", "public_20_first"));
/// assert!(pattern_matches("edge:like:post:*:p1", "edge:like:post:u7:p1"));
/// assert!(!pattern_matches("public_*", "user_posts_u1_20_first"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let pattern = pattern.as_bytes();
    let key = key.as_bytes();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key index it was tried against.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, k));
            p += 1;
        } else if p < pattern.len() && pattern[p] == key[k] {
            p += 1;
            k += 1;
        } else if let Some((star, matched)) = backtrack {
            // Let the last wildcard swallow one more character and retry.
            p = star + 1;
            k = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}
