//! Export timestamp parsing.
//!
//! The export writes every message time in one fixed English layout:
//!
//! ```text
//! Sunday, March 12, 2023 at 4:05pm PST
//! ```
//!
//! The zone abbreviation is resolved against a fixed table of UTC offsets.
//! Abbreviations missing from the table are rejected rather than guessed.

use chrono::{FixedOffset, NaiveDateTime};

use super::error::ParseError;
use crate::models::Timestamp;

/// chrono layout for everything before the zone abbreviation
pub const EXPORT_LAYOUT: &str = "%A, %B %d, %Y at %I:%M%p";

/// Canonical rendering of [`EXPORT_LAYOUT`]; parsed text must reproduce it exactly
const CANONICAL_LAYOUT: &str = "%A, %B %-d, %Y at %-I:%M%P";

/// Abbreviation and its offset east of UTC in hours
const ZONE_OFFSETS: &[(&str, f32)] = &[
    ("UTC", 0.0),
    ("GMT", 0.0),
    ("Z", 0.0),
    ("WET", 0.0),
    ("WEST", 1.0),
    ("BST", 1.0),
    ("CET", 1.0),
    ("CEST", 2.0),
    ("EET", 2.0),
    ("EEST", 3.0),
    ("IST", 5.5),
    ("JST", 9.0),
    ("KST", 9.0),
    ("AEST", 10.0),
    ("AEDT", 11.0),
    ("HST", -10.0),
    ("AKST", -9.0),
    ("AKDT", -8.0),
    ("PST", -8.0),
    ("PDT", -7.0),
    ("MST", -7.0),
    ("MDT", -6.0),
    ("CST", -6.0),
    ("CDT", -5.0),
    ("EST", -5.0),
    ("EDT", -4.0),
];

/// Offset for a zone abbreviation, if it is one we know
pub fn zone_offset(abbreviation: &str) -> Option<FixedOffset> {
    ZONE_OFFSETS
        .iter()
        .find(|(name, _)| *name == abbreviation)
        .and_then(|(_, hours)| FixedOffset::east_opt((hours * 3600.0) as i32))
}

/// Parse a message timestamp in [`EXPORT_LAYOUT`] followed by a zone abbreviation
///
/// # Errors
///
/// Returns [`ParseError::DateFormat`] if the text does not follow the layout
/// character for character (full day and month names, lowercase `am`/`pm`, no
/// padding), names a weekday that disagrees with the date, or ends in an
/// unknown zone.
pub fn parse_timestamp(text: &str) -> Result<Timestamp, ParseError> {
    let fail = |reason: String| ParseError::DateFormat { text: text.to_string(), reason };

    let (local, zone) = text
        .rsplit_once(' ')
        .ok_or_else(|| fail("missing time zone".to_string()))?;

    let offset =
        zone_offset(zone).ok_or_else(|| fail(format!("unknown time zone abbreviation {:?}", zone)))?;

    let naive =
        NaiveDateTime::parse_from_str(local, EXPORT_LAYOUT).map_err(|e| fail(e.to_string()))?;

    // chrono also takes short names, any case of am/pm, and padded fields
    if naive.format(CANONICAL_LAYOUT).to_string() != local {
        return Err(fail("does not match the export layout exactly".to_string()));
    }

    let instant = naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| fail("time does not exist in its zone".to_string()))?;

    Ok(Timestamp::new(instant, zone))
}
