//! Duration grammar shared by the parser and the presentation layer
//!
//! Terraform reports durations as concatenated `<int><unit>` tokens with
//! units `h`, `m` and `s` (`2s`, `1m30s`, `1h0m5s`).

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Parse a duration like `1m30s` into milliseconds
///
/// Returns `None` for empty input, a missing or unknown unit, a token
/// without digits, or overflow.
pub fn parse_duration_ms(text: &str) -> Option<u64> {
    if text.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut rest = text;
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let value: u64 = rest[..digits].parse().ok()?;
        let factor = match rest[digits..].chars().next()? {
            'h' => MS_PER_HOUR,
            'm' => MS_PER_MINUTE,
            's' => MS_PER_SECOND,
            _ => return None,
        };
        total = total.checked_add(value.checked_mul(factor)?)?;
        rest = &rest[digits + 1..];
    }
    Some(total)
}

/// Format whole seconds the way Terraform prints them (`5s`, `1m30s`, `1h0m0s`)
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{secs}s")
    } else if minutes > 0 {
        format!("{minutes}m{secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Format milliseconds, truncated to whole seconds
pub fn format_duration_ms(ms: u64) -> String {
    format_duration(ms / MS_PER_SECOND)
}
