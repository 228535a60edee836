use std::cmp::Ordering;

use semver::Version;

/// Strip a single leading 'v' or 'V' from a release tag.
///
/// Only the first character is considered: "vv1.0" becomes "v1.0" and
/// "1.0v" is left untouched.
pub fn strip_tag_prefix(tag: &str) -> &str {
    tag.strip_prefix(['v', 'V']).unwrap_or(tag)
}

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros.
/// Does NOT strip 'v' prefix (use `strip_tag_prefix` first if needed).
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim();
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Compare the installed version against a remote release tag.
///
/// Returns `Less` when the local version is older than the tag. The tag may
/// carry a "v"/"V" prefix; the local version is expected to be bare.
/// Strings that are not valid semver fall back to a segment-wise comparison
/// (numeric where both segments are numbers, lexical otherwise), so this
/// never fails.
pub fn compare(local: &str, remote_tag: &str) -> Ordering {
    let remote = strip_tag_prefix(remote_tag.trim());

    match (parse_version(local), parse_version(remote)) {
        (Some(local), Some(remote)) => local.cmp_precedence(&remote),
        _ => compare_segments(local.trim(), remote),
    }
}

fn compare_segments(left: &str, right: &str) -> Ordering {
    let left = segments(left);
    let right = segments(right);

    (0..left.len().max(right.len()))
        .map(|i| {
            let l = left.get(i).copied().unwrap_or("0");
            let r = right.get(i).copied().unwrap_or("0");
            compare_segment(l, r)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn segments(version: &str) -> Vec<&str> {
    version
        .split(['.', '-', '+', '_'])
        .filter(|s| !s.is_empty())
        .collect()
}

fn compare_segment(left: &str, right: &str) -> Ordering {
    match (left.parse::<u64>(), right.parse::<u64>()) {
        (Ok(l), Ok(r)) => l.cmp(&r),
        _ => left.cmp(right),
    }
}
