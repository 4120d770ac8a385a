use chrono::{DateTime, Datelike, Local, SecondsFormat, TimeZone, Utc};

// Calendar date format used by every blog "date" field.
// chrono formatting reference:
// https://docs.rs/chrono/latest/chrono/format/strftime/index.html
const DATE_FORMAT_ISO_CALENDAR: &'static str = "%Y-%m-%d";

pub fn current_timestamp() -> i64 {
  Local::now().timestamp()
}

// The document store gives us seconds + nanoseconds, the way
// hosted stores usually do. Out of range values just give None,
// callers treat that like a missing timestamp.
// chrono goes way past year 9999 but the ISO strings then get a
// "+" prefix and extra digits, which breaks both parsing them
// back and comparing them as strings. Four digit years only.
pub fn datetime_from_parts(seconds: i64, nanoseconds: u32) -> Option<DateTime<Utc>> {
  Utc.timestamp_opt(seconds, nanoseconds)
    .single()
    .filter(|d| (0..=9999).contains(&d.year()))
}

// Same thing the browser does with toISOString(): milliseconds
// and a "Z" at the end. Listing tiebreaks compare these strings
// so the format has to stay fixed-width.
pub fn iso_string(datetime: &DateTime<Utc>) -> String {
  datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn iso_calendar_date(datetime: &DateTime<Utc>) -> String {
  datetime.format(DATE_FORMAT_ISO_CALENDAR).to_string()
}

// Parses back what iso_string produces (or any RFC 3339 string).
pub fn parse_iso_string(value: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(value)
    .ok()
    .map(|d| d.with_timezone(&Utc))
}
