//! Compact duration strings (`90s`, `5m`, `1h30m`, `2w`).

use std::time::Duration;

const UNITS: &[(&str, u64)] = &[
    ("y", 365 * 24 * 3_600_000),
    ("w", 7 * 24 * 3_600_000),
    ("d", 24 * 3_600_000),
    ("h", 3_600_000),
    ("m", 60_000),
    ("s", 1_000),
    ("ms", 1),
];

fn unit_millis(unit: &str) -> Option<u64> {
    UNITS.iter().find(|(u, _)| *u == unit).map(|(_, ms)| *ms)
}

/// Parse a duration made of `<int><unit>` components.
///
/// Units are `y w d h m s ms`, each used at most once and in descending
/// order: "1h30m" is valid, "30m1h" and "5" are not.
/// Returns `None` on any malformed input.
pub fn parse_duration(s: &str) -> Option<Duration> {
    if s.is_empty() {
        return None;
    }

    let bytes = s.as_bytes();
    let mut total_ms: u64 = 0;
    let mut last_rank = usize::MAX;
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if start == i {
            return None;
        }
        let n: u64 = s[start..i].parse().ok()?;

        let unit_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let unit = &s[unit_start..i];
        let ms = unit_millis(unit)?;
        let rank = UNITS.iter().position(|(u, _)| *u == unit)?;
        if last_rank != usize::MAX && rank <= last_rank {
            return None;
        }
        last_rank = rank;
        total_ms = total_ms.checked_add(n.checked_mul(ms)?)?;
    }

    Some(Duration::from_millis(total_ms))
}

/// Format a duration in the compact form accepted by [`parse_duration`].
///
/// Zero formats as `0s`.
pub fn format_duration(d: Duration) -> String {
    let mut ms = d.as_millis() as u64;
    if ms == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, size) in UNITS {
        if ms >= *size {
            out.push_str(&format!("{}{}", ms / size, unit));
            ms %= size;
        }
    }
    out
}
