//! Commit timestamp helpers
//!
//! pgoutput carries timestamps as microseconds since 2000-01-01 00:00:00 UTC.
//! Records print them the way PostgreSQL prints `timestamptz` in a UTC
//! session: `2024-01-11 19:06:40.123+00`.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};

/// Seconds between the Unix epoch and the PostgreSQL epoch (2000-01-01).
pub const PG_EPOCH_OFFSET_SECS: i64 = 946_684_800;

/// Convert a PostgreSQL timestamp (microseconds since 2000-01-01 UTC).
///
/// Out-of-range values saturate to the PostgreSQL epoch.
pub fn from_pg_micros(micros: i64) -> DateTime<Utc> {
    let epoch = Utc
        .timestamp_opt(PG_EPOCH_OFFSET_SECS, 0)
        .single()
        .unwrap_or_default();
    epoch
        .checked_add_signed(Duration::microseconds(micros))
        .unwrap_or(epoch)
}

/// Format like PostgreSQL `timestamptz` output in UTC.
///
/// Fractional seconds are printed to microsecond precision with trailing
/// zeros trimmed, and omitted when zero.
pub fn format_commit_time(ts: &DateTime<Utc>) -> String {
    let mut out = ts.format("%Y-%m-%d %H:%M:%S").to_string();
    let micros = ts.nanosecond() / 1_000 % 1_000_000;
    if micros != 0 {
        let fraction = format!("{:06}", micros);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push_str("+00");
    out
}
