//! Total ordering over Kubernetes API version strings.
//!
//! A version string looks like `v1`, `v1beta1`, `v2alpha3`, or carries a
//! group prefix such as `extensions/v1beta1`. The `extensions` group is a
//! historical holdover and always sorts before every non-extensions group,
//! regardless of its own version component.

const MAX_MINOR: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
  Alpha,
  Beta,
  Ga,
}

/// Returns true iff `lhs` sorts strictly before `rhs` in migration order.
///
/// Never panics: a version string that cannot be parsed compares as
/// not-smaller (a stable fallback rather than an error).
pub fn is_smaller(lhs: &str, rhs: &str) -> bool {
  if lhs == rhs {
    return false;
  }

  let lhs_ext = is_extension(lhs);
  let rhs_ext = is_extension(rhs);
  if lhs_ext != rhs_ext {
    return lhs_ext;
  }

  let (Some(l), Some(r)) = (parse(lhs), parse(rhs)) else {
    return false;
  };
  l < r
}

fn is_extension(s: &str) -> bool {
  s.to_lowercase().contains("extensions")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Parsed {
  major: u32,
  stage: Stage,
  minor: u32,
}

/// Parses `v<major>(alpha|beta)?<minor>?` out of a bare or group-prefixed
/// version string. Returns `None` when the leading `v<digits>` cannot be
/// found.
fn parse(version: &str) -> Option<Parsed> {
  let version = version.rsplit('/').next().unwrap_or(version);
  let bytes = version.as_bytes();
  if bytes.first() != Some(&b'v') {
    return None;
  }

  let mut idx = 1;
  let start = idx;
  while idx < bytes.len() && bytes[idx].is_ascii_digit() {
    idx += 1;
  }
  if idx == start {
    return None;
  }
  let major: u32 = version[start..idx].parse().ok()?;

  let rest = &version[idx..];
  let (stage, minor_str) = if let Some(tail) = rest.strip_prefix("alpha") {
    (Stage::Alpha, tail)
  } else if let Some(tail) = rest.strip_prefix("beta") {
    (Stage::Beta, tail)
  } else {
    (Stage::Ga, rest)
  };

  let minor = if minor_str.is_empty() {
    MAX_MINOR
  } else {
    minor_str.parse().ok()?
  };

  Some(Parsed { major, stage, minor })
}

/// True iff `version` matches the GA pattern — no `alpha`/`beta` substring.
pub fn is_ga(version: &str) -> bool {
  match parse(version) {
    Some(p) => p.stage == Stage::Ga,
    None => !version.to_lowercase().contains("alpha") && !version.to_lowercase().contains("beta"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn orders_alpha_beta_ga() {
    assert!(is_smaller("v1alpha1", "v1beta1"));
    assert!(is_smaller("v1beta1", "v1"));
    assert!(is_smaller("v1alpha1", "v1"));
    assert!(!is_smaller("v1", "v1alpha1"));
  }

  #[test]
  fn orders_minor_within_stage() {
    assert!(is_smaller("v1alpha1", "v1alpha2"));
    assert!(is_smaller("v1beta1", "v1beta2"));
    assert!(!is_smaller("v1beta2", "v1beta1"));
  }

  #[test]
  fn orders_major_first() {
    assert!(is_smaller("v1", "v2alpha1"));
    assert!(is_smaller("v1beta2", "v2"));
  }

  #[test]
  fn equal_strings_are_not_smaller() {
    assert!(!is_smaller("v1", "v1"));
    assert!(!is_smaller("extensions/v1beta1", "extensions/v1beta1"));
  }

  #[test]
  fn extensions_group_sorts_first_unconditionally() {
    assert!(is_smaller("extensions/v1beta1", "v1alpha1"));
    assert!(is_smaller("extensions/v1beta1", "apps/v1"));
    assert!(!is_smaller("apps/v1", "extensions/v1beta1"));
  }

  #[test]
  fn totality_over_the_documented_set() {
    let versions = [
      "v1alpha1",
      "v1alpha2",
      "v1beta1",
      "v1beta2",
      "v1",
      "v2alpha1",
      "v2",
      "extensions/v1beta1",
    ];
    for &a in &versions {
      for &b in &versions {
        if a == b {
          continue;
        }
        assert_ne!(is_smaller(a, b), is_smaller(b, a), "not antisymmetric for {a} vs {b}");
      }
    }
    for &v in &versions {
      if v != "extensions/v1beta1" {
        assert!(is_smaller("extensions/v1beta1", v), "{v} should sort after extensions");
      }
    }
  }

  #[test]
  fn unparseable_versions_fall_back_to_not_smaller() {
    assert!(!is_smaller("garbage", "v1"));
    assert!(!is_smaller("v1", "garbage"));
    assert!(!is_smaller("garbage", "also-garbage"));
  }

  #[test]
  fn ga_detection() {
    assert!(is_ga("v1"));
    assert!(is_ga("apps/v1"));
    assert!(!is_ga("v1beta1"));
    assert!(!is_ga("v2alpha3"));
  }
}
