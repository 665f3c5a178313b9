use chrono::{Datelike, NaiveDate};

use crate::DateError;

/// Widest year the four digit `YYYYMMDD` form can carry.
const LAST_ICS_YEAR: i32 = 9999;

/// Parses a `DD/MM/YYYY` date.
///
/// The shape is checked first (two digit day, two digit month, four digit
/// year, `/` separators), then the digit groups are bounded, and finally the
/// date has to exist: `31/04/2026` is refused rather than rolled over into May.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateError> {
    let bytes = input.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return Err(DateError::Malformed);
    }

    let day = digits(&bytes[0..2])?;
    let month = digits(&bytes[3..5])?;
    let year = digits(&bytes[6..10])?;

    if !(1..=31).contains(&day) {
        return Err(DateError::DayOutOfRange(day));
    }
    if !(1..=12).contains(&month) {
        return Err(DateError::MonthOutOfRange(month));
    }

    // at most four digits, always fits
    let year = year as i32;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateError::NonexistentDay { day, month, year })
}

fn digits(group: &[u8]) -> Result<u32, DateError> {
    group.iter().try_fold(0, |acc, byte| {
        if byte.is_ascii_digit() {
            Ok(acc * 10 + u32::from(byte - b'0'))
        } else {
            Err(DateError::Malformed)
        }
    })
}

/// Renders a date back into `DD/MM/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Whole-day iCalendar form, `YYYYMMDD`.
pub fn ics_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn is_ordered(start: NaiveDate, end: NaiveDate) -> bool {
    end >= start
}

/// Number of days covered by an inclusive range; a same-day range counts one.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// First day no longer part of a range ending on `end`, if it can still be
/// written as `YYYYMMDD`.
pub fn exclusive_end(end: NaiveDate) -> Option<NaiveDate> {
    end.succ_opt().filter(|next| next.year() <= LAST_ICS_YEAR)
}
