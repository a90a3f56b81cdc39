// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Defensive date normalization at the data-ingestion boundary.
//!
//! The upstream feed is inconsistent about date formats: RFC 3339
//! timestamps, bare `YYYY-MM-DD` dates, and legacy `DD/MM/YYYY` strings
//! all occur. Everything is normalized here, with pure functions, the
//! moment it enters the process; nothing downstream parses dates and no
//! shared formatter is ever patched.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Error, Result};

const CANONICAL_DATE: &str = "%Y-%m-%d";
const LEGACY_DATE: &str = "%d/%m/%Y";

/// Normalize a raw date string to canonical `YYYY-MM-DD`.
///
/// Accepts RFC 3339 timestamps (the date part is kept, in the original
/// offset), canonical dates, and legacy `DD/MM/YYYY`.
pub fn normalize_date(raw: &str) -> Result<String> {
    Ok(parse_naive_date(raw)?.format(CANONICAL_DATE).to_string())
}

/// Normalize a raw date or timestamp string to a UTC instant.
///
/// Date-only input maps to midnight UTC of that day.
pub fn normalize_datetime(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = parse_naive_date(trimmed)?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| invalid(raw))
}

fn parse_naive_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, CANONICAL_DATE) {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, LEGACY_DATE) {
        return Ok(date);
    }
    Err(invalid(raw))
}

fn invalid(raw: &str) -> Error {
    Error::InvalidDate {
        value: raw.to_string(),
    }
}

#[cfg(test)]
#[path = "date_tests.rs"]
mod tests;
