//! Identifier normalization — heterogeneous timestamp forms to canonical
//! epoch seconds.

use chrono::NaiveDateTime;

/// Convert a timestamp string to canonical epoch seconds.
///
/// Accepts ISO-8601-like forms (`2014-04-13T13:33:40`, space separator,
/// trailing `Z` or `±HH:MM` offset stripped) and raw epoch-seconds strings
/// (integer or float). Returns `None` when neither form parses — "no
/// canonical value" is a valid state, not an error.
///
/// ISO forms are interpreted as UTC so canonical values are deterministic
/// across machines.
pub fn normalize_timestamp(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let stripped = strip_offset(trimmed);
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(stripped, format) {
            return Some(dt.and_utc().timestamp());
        }
    }

    // Raw epoch seconds, as stored by the catalog. Float form tolerated.
    if let Ok(epoch) = trimmed.parse::<i64>() {
        return Some(epoch);
    }
    if let Ok(epoch) = trimmed.parse::<f64>() {
        if epoch.is_finite() {
            return Some(epoch as i64);
        }
    }

    None
}

/// Drop a trailing `Z` or `±HH:MM` timezone suffix.
fn strip_offset(s: &str) -> &str {
    if let Some(rest) = s.strip_suffix('Z') {
        return rest;
    }
    let bytes = s.as_bytes();
    if s.len() > 6 {
        let tail = &bytes[s.len() - 6..];
        if (tail[0] == b'+' || tail[0] == b'-')
            && tail[1].is_ascii_digit()
            && tail[2].is_ascii_digit()
            && tail[3] == b':'
            && tail[4].is_ascii_digit()
            && tail[5].is_ascii_digit()
        {
            return &s[..s.len() - 6];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_and_epoch_forms_agree() {
        // 1397396020 is the UTC reading of 2014-04-13T13:33:40. Tooling
        // that parses the same string in local time lands an offset away
        // (e.g. 1397392420 at UTC+1); the canonical value is pinned to UTC
        // so it cannot drift with the machine's timezone.
        let from_iso = normalize_timestamp("2014-04-13T13:33:40").unwrap();
        let from_epoch = normalize_timestamp("1397396020").unwrap();
        assert_eq!(from_iso, from_epoch);
    }

    #[test]
    fn space_separator_accepted() {
        assert_eq!(
            normalize_timestamp("2014-04-13 13:33:40"),
            normalize_timestamp("2014-04-13T13:33:40"),
        );
    }

    #[test]
    fn offset_suffixes_stripped() {
        assert_eq!(
            normalize_timestamp("2014-04-13T13:33:40Z"),
            Some(1397396020)
        );
        assert_eq!(
            normalize_timestamp("2014-04-13T13:33:40+02:00"),
            Some(1397396020)
        );
    }

    #[test]
    fn float_epoch_truncates() {
        assert_eq!(normalize_timestamp("1397396020.75"), Some(1397396020));
    }

    #[test]
    fn garbage_has_no_canonical_value() {
        assert_eq!(normalize_timestamp(""), None);
        assert_eq!(normalize_timestamp("not a date"), None);
        assert_eq!(normalize_timestamp("2014-13-45T99:99:99"), None);
    }
}
