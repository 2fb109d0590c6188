//! Slack message timestamps, which double as message IDs.
//!
//! They're decimal strings of seconds since the epoch with a microsecond
//! fraction, for example `1234567890.123456`. Slack compares them as strings,
//! so a user-supplied `1234567890.5` must be padded before it'll match
//! anything.

use crate::error::Error;
use once_cell::sync::Lazy;
use regex::Regex;

// ASCII digits only; `\d` would also match other scripts' digits.
// This unwrap is exercised by every test below.
static TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<secs>[0-9]+)(?:\.(?P<frac>[0-9]{1,6}))?$").unwrap());

/// Validate a timestamp and normalise it to its canonical six-decimal form.
///
/// ```
/// assert_eq!(normalize("1234567890").unwrap(), "1234567890.000000");
/// assert_eq!(normalize("1234567890.5").unwrap(), "1234567890.500000");
/// ```
pub fn normalize(ts: &str) -> Result<String, Error> {
    let cs = TIMESTAMP
        .captures(ts.trim())
        .ok_or_else(|| Error::InvalidTimestamp(ts.to_owned()))?;

    let secs = &cs["secs"];
    let frac = cs.name("frac").map_or("", |m| m.as_str());

    Ok(format!("{}.{:0<6}", secs, frac))
}

/// Normalise an optional timestamp, passing `None` through.
pub fn normalize_opt(ts: Option<&str>) -> Result<Option<String>, Error> {
    ts.map(normalize).transpose()
}
