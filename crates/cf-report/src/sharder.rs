//! Time-range sharding over pre-aggregated tables
//!
//! A range is covered by the coarsest aggregates that fit inside it: whole
//! months, then whole days at its edges, then whole hours, then single
//! minutes. Every instant of the range falls into exactly one shard.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::Serialize;

const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M:00";
const HOUR_FORMAT: &str = "%Y-%m-%d %H:00:00";
const DAY_FORMAT: &str = "%Y-%m-%d 00:00:00";

/// Inclusive range of aggregate buckets, as bucket start times
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shard {
    pub from: String,
    pub to: String,
}

impl Shard {
    fn new(from: NaiveDateTime, to: NaiveDateTime, format: &str) -> Self {
        Self {
            from: from.format(format).to_string(),
            to: to.format(format).to_string(),
        }
    }
}

/// Shards per aggregation level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeShards {
    pub minute: Vec<Shard>,
    pub hour: Vec<Shard>,
    pub day: Vec<Shard>,
    pub month: Vec<Shard>,
}

impl TimeShards {
    pub fn is_empty(&self) -> bool {
        self.minute.is_empty()
            && self.hour.is_empty()
            && self.day.is_empty()
            && self.month.is_empty()
    }
}

fn end_of(start_of_next: NaiveDateTime) -> NaiveDateTime {
    start_of_next - Duration::microseconds(1)
}

fn start_of_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.date()
        .and_time(NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(NaiveTime::MIN))
}

fn end_of_minute(t: NaiveDateTime) -> NaiveDateTime {
    end_of(start_of_minute(t) + Duration::minutes(1))
}

fn start_of_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.date()
        .and_time(NaiveTime::from_hms_opt(t.hour(), 0, 0).unwrap_or(NaiveTime::MIN))
}

fn end_of_hour(t: NaiveDateTime) -> NaiveDateTime {
    end_of(start_of_hour(t) + Duration::hours(1))
}

fn start_of_day(t: NaiveDateTime) -> NaiveDateTime {
    t.date().and_time(NaiveTime::MIN)
}

fn end_of_day(t: NaiveDateTime) -> NaiveDateTime {
    end_of(start_of_day(t) + Duration::days(1))
}

fn start_of_month(t: NaiveDateTime) -> NaiveDateTime {
    t.date().with_day(1).unwrap_or(t.date()).and_time(NaiveTime::MIN)
}

fn end_of_month(t: NaiveDateTime) -> NaiveDateTime {
    let (year, month) = if t.month() == 12 {
        (t.year() + 1, 1)
    } else {
        (t.year(), t.month() + 1)
    };
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(next) => end_of(next.and_time(NaiveTime::MIN)),
        None => end_of_day(t),
    }
}

/// Splits a time range into minute, hour, day and month shards
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeSharder;

impl TimeSharder {
    pub fn new() -> Self {
        Self
    }

    /// Shard `[from, to]` against the current UTC time
    pub fn shard(&self, from: NaiveDateTime, to: NaiveDateTime) -> TimeShards {
        self.shard_at(from, to, Utc::now().naive_utc())
    }

    /// Shard `[from, to]`, treating `now` as the end of available data
    ///
    /// `from` is truncated to its minute and `to` extended to the end of
    /// its minute; the bounds are swapped if reversed, and `to` is clamped
    /// to `now`. A range starting after `now` has no shards.
    pub fn shard_at(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
        now: NaiveDateTime,
    ) -> TimeShards {
        let mut from = start_of_minute(from);
        let mut to = end_of_minute(to);
        if from > to {
            std::mem::swap(&mut from, &mut to);
            from = start_of_minute(from);
            to = end_of_minute(to);
        }
        if to > now {
            to = now;
        }

        let mut shards = TimeShards::default();
        if from > to {
            return shards;
        }

        shards.minute = minute_shards(&mut from, &mut to);
        shards.hour = hour_shards(&mut from, &mut to);
        shards.day = day_shards(&mut from, &mut to);
        shards.month = month_shards(from, to);
        shards
    }
}

/// Minutes before the first whole hour and after the last one
///
/// Narrows the range to whole hours.
fn minute_shards(from: &mut NaiveDateTime, to: &mut NaiveDateTime) -> Vec<Shard> {
    let mut shards = Vec::new();

    if end_of_hour(*from) > *to {
        shards.push(Shard::new(*from, *to, MINUTE_FORMAT));
        return shards;
    }

    if *from != start_of_hour(*from) {
        shards.push(Shard::new(*from, end_of_hour(*from), MINUTE_FORMAT));
        *from = start_of_hour(*from) + Duration::hours(1);
    }
    if *to != end_of_hour(*to) {
        shards.push(Shard::new(start_of_hour(*to), *to, MINUTE_FORMAT));
        *to = end_of(start_of_hour(*to));
    }
    shards
}

/// Hours before the first whole day and after the last one
///
/// Narrows the range to whole days.
fn hour_shards(from: &mut NaiveDateTime, to: &mut NaiveDateTime) -> Vec<Shard> {
    let mut shards = Vec::new();
    if *from > *to {
        return shards;
    }

    if *to - *from < Duration::hours(1) {
        if *from == start_of_hour(*from) && *to == end_of_hour(*from) {
            shards.push(Shard::new(*from, *to, HOUR_FORMAT));
        }
        return shards;
    }

    if end_of_day(*from) > *to {
        shards.push(Shard::new(*from, *to, HOUR_FORMAT));
        return shards;
    }

    if *from != start_of_day(*from) {
        shards.push(Shard::new(*from, end_of_day(*from), HOUR_FORMAT));
        *from = start_of_day(*from) + Duration::days(1);
    }
    if *to != end_of_day(*to) {
        shards.push(Shard::new(start_of_day(*to), *to, HOUR_FORMAT));
        *to = end_of(start_of_day(*to));
    }
    shards
}

/// Days before the first whole month and after the last one
///
/// Narrows the range to whole months.
fn day_shards(from: &mut NaiveDateTime, to: &mut NaiveDateTime) -> Vec<Shard> {
    let mut shards = Vec::new();
    if *from > *to {
        return shards;
    }

    if *to - *from < Duration::days(1) {
        if *from == start_of_day(*from) && *to == end_of_day(*from) {
            shards.push(Shard::new(*from, *to, DAY_FORMAT));
        }
        return shards;
    }

    if end_of_month(*from) > *to {
        shards.push(Shard::new(*from, *to, DAY_FORMAT));
        return shards;
    }

    if *from != start_of_month(*from) {
        shards.push(Shard::new(*from, end_of_month(*from), DAY_FORMAT));
        *from = end_of_month(*from) + Duration::microseconds(1);
    }
    if *to != end_of_month(*to) {
        shards.push(Shard::new(start_of_month(*to), *to, DAY_FORMAT));
        *to = end_of(start_of_month(*to));
    }
    shards
}

/// Whole months left in the range
fn month_shards(from: NaiveDateTime, to: NaiveDateTime) -> Vec<Shard> {
    if from <= to && from == start_of_month(from) && to == end_of_month(to) {
        vec![Shard::new(from, start_of_month(to), DAY_FORMAT)]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "sharder_test.rs"]
mod tests;
