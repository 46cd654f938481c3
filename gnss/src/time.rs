//! GPS week / UTC calendar arithmetic.

use crate::types::UtcTime;

const SECONDS_PER_WEEK: i64 = 604_800;

/// Cumulative days before each month, common and leap years.
const DAYS_SINCE_MONTH: [[u16; 12]; 2] = [
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334],
    [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335],
];

/// Days from 1980-01-06 to the given calendar date.
///
/// Valid for years 1981..=2099 (the divide-by-4 leap rule). The caller
/// guarantees `time.year != 0`.
fn days_since_gps_epoch(time: &UtcTime) -> i64 {
    let year = i64::from(time.year);
    let leap_days = 1 + (year - 1) / 4;
    let leap = usize::from(time.year % 4 == 0);
    let month = usize::from(time.month.clamp(1, 12)) - 1;
    year * 365 + leap_days + i64::from(DAYS_SINCE_MONTH[leap][month]) + i64::from(time.day) - 1 - 5
}

/// GPS-UTC offset (the accumulated leap seconds) inferred from a week/tow
/// pair and the matching UTC calendar time: GPS time runs ahead of UTC by
/// exactly that many seconds.
pub(crate) fn utc_offset_time(time: &UtcTime, week: u16, tow_ms: u32) -> i16 {
    let gps_seconds = i64::from(week) * SECONDS_PER_WEEK + i64::from((tow_ms + 500) / 1000);
    let utc_seconds = ((days_since_gps_epoch(time) * 24 + i64::from(time.hour)) * 60
        + i64::from(time.minute))
        * 60
        + i64::from(time.second);
    (gps_seconds - utc_seconds) as i16
}

/// Compare the time-of-day parts only; the calendar date never appears in
/// GGA/GST and is irrelevant to the epoch key.
pub(crate) fn same_time_of_day(t0: &UtcTime, t1: &UtcTime) -> bool {
    t0.hour == t1.hour && t0.minute == t1.minute && t0.second == t1.second && t0.millis == t1.millis
}
