//! PDF date strings (`D:YYYYMMDDHHmmSSOHH'mm'`)

use chrono::{FixedOffset, NaiveDate, SecondsFormat, TimeZone};

/// Convert a PDF date to RFC 3339, `None` when it cannot be parsed.
///
/// Missing trailing fields default to their minimum; a missing offset is
/// read as UTC.
pub fn pdf_date_to_iso(raw: &str) -> Option<String> {
    let s = raw.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, zone) = s.split_at(digits_end);
    if digits.len() < 4 {
        return None;
    }

    let field = |start: usize, len: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + len) {
            Some(part) => part.parse().ok(),
            None => Some(default),
        }
    };
    let year: i32 = digits.get(0..4)?.parse().ok()?;
    let month = field(4, 2, 1)?;
    let day = field(6, 2, 1)?;
    let hour = field(8, 2, 0)?;
    let minute = field(10, 2, 0)?;
    let second = field(12, 2, 0)?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    let offset = parse_offset(zone)?;
    let stamp = offset.from_local_datetime(&naive).single()?;
    Some(stamp.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let zone = zone.trim();
    let sign = match zone.chars().next() {
        None | Some('Z') => return FixedOffset::east_opt(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };
    let parts: Vec<&str> = zone[1..]
        .split('\'')
        .filter(|p| !p.is_empty())
        .collect();
    let hours: u8 = parts.first()?.parse().ok()?;
    let minutes: u8 = match parts.get(1) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (i32::from(hours) * 3600 + i32::from(minutes) * 60))
}
