//! Case-insensitive glob matching used by namespace/kind filters and the
//! result filter's ignore-key globs (§4.6).
//!
//! `*X` ends-with, `X*` starts-with, `*X*` contains, bare `X` equals.

/// True iff `value` matches `pattern` under the glob rules above.
pub fn matches(value: &str, pattern: &str) -> bool {
  let value = value.to_lowercase();
  let pattern = pattern.to_lowercase();

  let starts = pattern.starts_with('*');
  let ends = pattern.ends_with('*');

  match (starts, ends) {
    (true, true) if pattern.len() >= 2 => value.contains(&pattern[1..pattern.len() - 1]),
    (true, _) => value.ends_with(&pattern[1..]),
    (false, true) => value.starts_with(&pattern[..pattern.len() - 1]),
    _ => value == pattern,
  }
}

/// True iff `key` matches any element of `patterns` — exact case-insensitive
/// match or [`matches`].
pub fn contains(key: &str, patterns: &[String]) -> bool {
  patterns.iter().any(|pattern| matches(key, pattern))
}
