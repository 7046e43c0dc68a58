//! Host isolation support checks.
//!
//! Isolation needs an agent on a supported OS running at least
//! [`MIN_ISOLATION_VERSION`].

pub const MIN_ISOLATION_VERSION: &str = "7.14.0";
pub const ISOLATION_SUPPORTED_OSS: [&str; 2] = ["macos", "windows"];

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Parse a dotted version into its numeric segments. Each segment is read
/// from its leading integer, so "13rc" is 13. Segments with no leading digits
/// become `None` and never compare as lower than anything.
fn tokenize(version: &str) -> Vec<Option<i64>> {
    version.split('.').map(leading_integer).collect()
}

/// Optional sign followed by the longest run of ASCII digits, after leading
/// whitespace. Values too large for `i64` saturate.
fn leading_integer(token: &str) -> Option<i64> {
    let token = token.trim_start();
    let (negative, unsigned) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits_end == 0 {
        return None;
    }

    let digits = &unsigned[..digits_end];
    let value = if negative {
        format!("-{}", digits).parse::<i64>().unwrap_or(i64::MIN)
    } else {
        digits.parse::<i64>().unwrap_or(i64::MAX)
    };
    Some(value)
}

/// Returns false if any segment of `current_version` is lower than the
/// segment at the same position of `min_version_required`.
///
/// Only positions present in both versions are compared, and each position is
/// compared on its own: "7" passes against "7.14.0" and "8.0.0" fails against
/// it. Both are known defects that callers currently rely on.
pub fn is_version_supported(current_version: &str, min_version_required: &str) -> bool {
    let parsed_current = if current_version.contains(SNAPSHOT_SUFFIX) {
        let cut = current_version.len().saturating_sub(SNAPSHOT_SUFFIX.len());
        current_version.get(..cut).unwrap_or(current_version)
    } else {
        current_version
    };

    let tokenized_current = tokenize(parsed_current);
    let tokenized_min = tokenize(min_version_required);

    let version_not_supported = tokenized_current
        .iter()
        .zip(tokenized_min.iter())
        .any(|(current, min)| match (current, min) {
            (Some(current), Some(min)) => current < min,
            _ => false,
        });

    !version_not_supported
}

pub fn is_os_supported(current_os: &str, supported_oss: &[&str]) -> bool {
    supported_oss.iter().any(|os| *os == current_os)
}

pub fn is_isolation_supported(os_name: &str, version: &str) -> bool {
    let normalized_os = os_name.to_lowercase();
    is_os_supported(&normalized_os, &ISOLATION_SUPPORTED_OSS)
        && is_version_supported(version, MIN_ISOLATION_VERSION)
}
