//! Calendar-aligned window boundary math.
//!
//! Every computation converts the instant into the configured calendar zone,
//! works on calendar dates, and converts the resulting local midnight back
//! to UTC. Boundaries are never derived by adding fixed 24h spans, so DST
//! shifts cannot move a boundary off midnight.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Local, NaiveDate, TimeZone, Timelike, Utc,
};

use crate::domain::foundation::{Frequency, Timestamp, ValidationError};

/// Calendar zone used to align window boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    /// The device's local timezone, re-read on every call.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl CalendarZone {
    /// Parses an offset such as `"+05:30"`, `"-0800"` or `"Z"`.
    pub fn parse_offset(value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
            return Ok(CalendarZone::Fixed(FixedOffset::east_opt(0).ok_or_else(
                || ValidationError::invalid_format("utc_offset", "zero offset rejected"),
            )?));
        }

        let (sign, rest) = match value.chars().next() {
            Some('+') => (1, &value[1..]),
            Some('-') => (-1, &value[1..]),
            _ => {
                return Err(ValidationError::invalid_format(
                    "utc_offset",
                    format!("'{}' must start with '+' or '-'", value),
                ))
            }
        };

        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "utc_offset",
                format!("'{}' is not in ±HH:MM form", value),
            ));
        }

        let hours: i32 = digits[..2].parse().map_err(|_| {
            ValidationError::invalid_format("utc_offset", "hours are not numeric")
        })?;
        let minutes: i32 = digits[2..].parse().map_err(|_| {
            ValidationError::invalid_format("utc_offset", "minutes are not numeric")
        })?;
        if hours > 23 || minutes > 59 {
            return Err(ValidationError::invalid_format(
                "utc_offset",
                format!("'{}' is out of range", value),
            ));
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(CalendarZone::Fixed)
            .ok_or_else(|| ValidationError::invalid_format("utc_offset", "offset out of range"))
    }
}

/// Computes window boundaries and elapsed-window counts.
///
/// Stateless apart from the calendar zone. Callers always pass "now"
/// explicitly; the calculator never reads a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeframeCalculator {
    zone: CalendarZone,
}

impl TimeframeCalculator {
    pub fn new(zone: CalendarZone) -> Self {
        Self { zone }
    }

    /// Calculator aligned to the device's local timezone.
    pub fn local() -> Self {
        Self::new(CalendarZone::Local)
    }

    /// Calculator aligned to a fixed UTC offset.
    pub fn fixed(offset: FixedOffset) -> Self {
        Self::new(CalendarZone::Fixed(offset))
    }

    pub fn zone(&self) -> CalendarZone {
        self.zone
    }

    /// Start of the next window strictly after `after`.
    ///
    /// A Monday-midnight input still advances a full week. `Frequency::None`
    /// returns the input unchanged, as does the unreachable case of a
    /// boundary beyond chrono's representable range.
    pub fn next_boundary(&self, after: Timestamp, frequency: Frequency) -> Timestamp {
        let boundary = match self.zone {
            CalendarZone::Local => next_boundary_in(&Local, after, frequency),
            CalendarZone::Fixed(offset) => next_boundary_in(&offset, after, frequency),
        };
        boundary.unwrap_or(after)
    }

    /// Start of the window containing `containing`.
    pub fn window_start(&self, containing: Timestamp, frequency: Frequency) -> Timestamp {
        let start = match self.zone {
            CalendarZone::Local => window_start_in(&Local, containing, frequency),
            CalendarZone::Fixed(offset) => window_start_in(&offset, containing, frequency),
        };
        start.unwrap_or(containing)
    }

    /// Whole windows elapsed strictly between `from` and `to`.
    ///
    /// The window containing `from` is not counted as missed, so the result
    /// is the number of whole calendar units minus one, floored at zero.
    pub fn missed_window_count(&self, from: Timestamp, to: Timestamp, frequency: Frequency) -> u32 {
        match self.zone {
            CalendarZone::Local => missed_in(&Local, from, to, frequency),
            CalendarZone::Fixed(offset) => missed_in(&offset, from, to, frequency),
        }
    }

    /// End date for a window opened at `now`; `None` when no cadence applies.
    pub fn window_end(&self, now: Timestamp, frequency: Frequency) -> Option<Timestamp> {
        if frequency.is_none() {
            None
        } else {
            Some(self.next_boundary(now, frequency))
        }
    }
}

fn local_date<Tz: TimeZone>(tz: &Tz, at: Timestamp) -> DateTime<Tz> {
    at.as_datetime().with_timezone(tz)
}

/// First instant of `date` in `tz`.
///
/// If midnight falls inside a DST gap the first existing hour is used; if it
/// is ambiguous the earlier instant wins.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<Timestamp> {
    (0..=3).find_map(|hour| {
        let naive = date.and_hms_opt(hour, 0, 0)?;
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| Timestamp::from_datetime(dt.with_timezone(&Utc)))
    })
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

fn next_boundary_in<Tz: TimeZone>(
    tz: &Tz,
    after: Timestamp,
    frequency: Frequency,
) -> Option<Timestamp> {
    let date = local_date(tz, after).date_naive();
    let target = match frequency {
        Frequency::None => return Some(after),
        Frequency::Daily => date.succ_opt()?,
        Frequency::Weekly => {
            let from_monday = u64::from(date.weekday().num_days_from_monday());
            date.checked_add_days(Days::new(7 - from_monday))?
        }
        Frequency::Monthly => first_of_next_month(date)?,
    };
    start_of_day(tz, target)
}

fn window_start_in<Tz: TimeZone>(
    tz: &Tz,
    containing: Timestamp,
    frequency: Frequency,
) -> Option<Timestamp> {
    let date = local_date(tz, containing).date_naive();
    let target = match frequency {
        Frequency::None => return Some(containing),
        Frequency::Daily => date,
        Frequency::Weekly => {
            let from_monday = u64::from(date.weekday().num_days_from_monday());
            date.checked_sub_days(Days::new(from_monday))?
        }
        Frequency::Monthly => date.with_day(1)?,
    };
    start_of_day(tz, target)
}

fn missed_in<Tz: TimeZone>(tz: &Tz, from: Timestamp, to: Timestamp, frequency: Frequency) -> u32 {
    if frequency.is_none() || !to.is_after(&from) {
        return 0;
    }

    let start = local_date(tz, from);
    let end = local_date(tz, to);
    let elapsed = match frequency {
        Frequency::None => 0,
        Frequency::Daily => whole_days(&start, &end),
        Frequency::Weekly => whole_days(&start, &end) / 7,
        Frequency::Monthly => whole_months(&start, &end),
    };

    u32::try_from((elapsed - 1).max(0)).unwrap_or(u32::MAX)
}

/// Calendar days between two local instants, counting only complete days.
fn whole_days<Tz: TimeZone>(start: &DateTime<Tz>, end: &DateTime<Tz>) -> i64 {
    let mut days = (end.date_naive() - start.date_naive()).num_days();
    if end.time() < start.time() {
        days -= 1;
    }
    days
}

fn whole_months<Tz: TimeZone>(start: &DateTime<Tz>, end: &DateTime<Tz>) -> i64 {
    let mut months = i64::from(end.year() - start.year()) * 12
        + i64::from(end.month()) - i64::from(start.month());
    let end_key = (end.day(), end.num_seconds_from_midnight());
    let start_key = (start.day(), start.num_seconds_from_midnight());
    if end_key < start_key {
        months -= 1;
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacific() -> TimeframeCalculator {
        TimeframeCalculator::fixed(FixedOffset::west_opt(8 * 3600).unwrap())
    }

    fn utc() -> TimeframeCalculator {
        TimeframeCalculator::fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse_rfc3339(s).unwrap()
    }

    #[test]
    fn daily_boundary_is_next_local_midnight() {
        let next = pacific().next_boundary(ts("2024-01-15T08:00:00-08:00"), Frequency::Daily);
        assert_eq!(next, ts("2024-01-16T00:00:00-08:00"));
    }

    #[test]
    fn daily_boundary_uses_local_date_not_utc_date() {
        // 23:30 Pacific is already the next day in UTC.
        let next = pacific().next_boundary(ts("2024-01-15T23:30:00-08:00"), Frequency::Daily);
        assert_eq!(next, ts("2024-01-16T00:00:00-08:00"));
    }

    #[test]
    fn weekly_boundary_from_wednesday_is_following_monday() {
        let next = utc().next_boundary(ts("2024-01-17T12:00:00Z"), Frequency::Weekly);
        assert_eq!(next, ts("2024-01-22T00:00:00Z"));
    }

    #[test]
    fn weekly_boundary_at_monday_midnight_advances_full_week() {
        let next = utc().next_boundary(ts("2024-01-22T00:00:00Z"), Frequency::Weekly);
        assert_eq!(next, ts("2024-01-29T00:00:00Z"));
    }

    #[test]
    fn weekly_boundary_from_sunday_is_next_day() {
        let next = utc().next_boundary(ts("2024-01-21T23:59:59Z"), Frequency::Weekly);
        assert_eq!(next, ts("2024-01-22T00:00:00Z"));
    }

    #[test]
    fn monthly_boundary_is_first_of_next_month() {
        let next = utc().next_boundary(ts("2024-02-29T10:00:00Z"), Frequency::Monthly);
        assert_eq!(next, ts("2024-03-01T00:00:00Z"));
    }

    #[test]
    fn monthly_boundary_rolls_over_year() {
        let next = utc().next_boundary(ts("2024-12-31T23:00:00Z"), Frequency::Monthly);
        assert_eq!(next, ts("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn none_frequency_returns_input_unchanged() {
        let at = ts("2024-01-15T08:00:00Z");
        assert_eq!(utc().next_boundary(at, Frequency::None), at);
        assert_eq!(utc().window_start(at, Frequency::None), at);
        assert_eq!(utc().window_end(at, Frequency::None), None);
    }

    #[test]
    fn window_start_aligns_to_unit_start() {
        let at = ts("2024-01-17T15:45:00-08:00");
        let calc = pacific();

        assert_eq!(calc.window_start(at, Frequency::Daily), ts("2024-01-17T00:00:00-08:00"));
        assert_eq!(calc.window_start(at, Frequency::Weekly), ts("2024-01-15T00:00:00-08:00"));
        assert_eq!(calc.window_start(at, Frequency::Monthly), ts("2024-01-01T00:00:00-08:00"));
    }

    #[test]
    fn window_end_matches_next_boundary() {
        let at = ts("2024-01-17T15:45:00Z");
        assert_eq!(
            utc().window_end(at, Frequency::Weekly),
            Some(ts("2024-01-22T00:00:00Z"))
        );
    }

    #[test]
    fn missed_daily_windows_between_monday_and_thursday() {
        let missed = utc().missed_window_count(
            ts("2024-01-15T00:00:00Z"),
            ts("2024-01-18T15:30:00Z"),
            Frequency::Daily,
        );
        assert_eq!(missed, 2);
    }

    #[test]
    fn missed_count_ignores_partial_days() {
        let missed = utc().missed_window_count(
            ts("2024-01-15T18:00:00Z"),
            ts("2024-01-17T12:00:00Z"),
            Frequency::Daily,
        );
        // One whole day elapsed, which is the window after the last end.
        assert_eq!(missed, 0);
    }

    #[test]
    fn missed_weekly_and_monthly_windows() {
        let calc = utc();
        let from = ts("2024-01-01T00:00:00Z");

        assert_eq!(
            calc.missed_window_count(from, ts("2024-01-29T00:00:00Z"), Frequency::Weekly),
            3
        );
        assert_eq!(
            calc.missed_window_count(from, ts("2024-04-15T00:00:00Z"), Frequency::Monthly),
            2
        );
    }

    #[test]
    fn missed_count_is_zero_for_none_or_reversed_range() {
        let calc = utc();
        let early = ts("2024-01-01T00:00:00Z");
        let late = ts("2024-03-01T00:00:00Z");

        assert_eq!(calc.missed_window_count(early, late, Frequency::None), 0);
        assert_eq!(calc.missed_window_count(late, early, Frequency::Daily), 0);
        assert_eq!(calc.missed_window_count(early, early, Frequency::Daily), 0);
    }

    #[test]
    fn parse_offset_accepts_common_forms() {
        assert_eq!(
            CalendarZone::parse_offset("-08:00").unwrap(),
            CalendarZone::Fixed(FixedOffset::west_opt(8 * 3600).unwrap())
        );
        assert_eq!(
            CalendarZone::parse_offset("+0530").unwrap(),
            CalendarZone::Fixed(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap())
        );
        assert_eq!(
            CalendarZone::parse_offset("Z").unwrap(),
            CalendarZone::Fixed(FixedOffset::east_opt(0).unwrap())
        );
    }

    #[test]
    fn parse_offset_rejects_garbage() {
        assert!(CalendarZone::parse_offset("08:00").is_err());
        assert!(CalendarZone::parse_offset("+8").is_err());
        assert!(CalendarZone::parse_offset("+25:00").is_err());
        assert!(CalendarZone::parse_offset("+ab:cd").is_err());
    }

    #[test]
    fn local_zone_boundary_is_strictly_later() {
        let at = ts("2024-03-10T06:30:00Z");
        for frequency in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            let next = TimeframeCalculator::local().next_boundary(at, frequency);
            assert!(next.is_after(&at));
        }
    }
}
