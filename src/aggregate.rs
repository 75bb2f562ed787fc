use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::models::{Bucket, Granularity};

/// Truncate an instant to the start date of its bucket, in UTC.
///
/// Weeks are anchored on Monday: a Wednesday rolls back two days, a Sunday
/// rolls back six.
pub fn truncate_to_bucket(ts: DateTime<Utc>, granularity: Granularity) -> NaiveDate {
    let day = ts.date_naive();
    match granularity {
        Granularity::Day => day,
        Granularity::Week => day - Duration::days(day.weekday().num_days_from_monday() as i64),
        Granularity::Month => day.with_day(1).unwrap_or(day),
    }
}

/// Group an unordered set of star timestamps into an ascending series of
/// per-bucket counts. One bucket per distinct truncated date; dates with no
/// stars are not filled in.
pub fn bucket_by_period(mut timestamps: Vec<DateTime<Utc>>, granularity: Granularity) -> Vec<Bucket> {
    timestamps.sort_unstable();

    let mut buckets: Vec<Bucket> = Vec::new();
    for ts in timestamps {
        let date = truncate_to_bucket(ts, granularity);
        // Input is sorted, so a repeated date is always the tail bucket.
        match buckets.last_mut() {
            Some(last) if last.date == date => last.count += 1,
            _ => buckets.push(Bucket { date, count: 1 }),
        }
    }

    buckets
}

/// Drop the final bucket of the series unconditionally.
///
/// The most recent bucket is still accumulating at query time, so charting
/// it would show a misleading dip. An empty series stays empty.
pub fn drop_open_bucket(mut buckets: Vec<Bucket>) -> Vec<Bucket> {
    buckets.pop();
    buckets
}

/// Roll the per-bucket counts up into running totals, for charts that plot
/// the star count over time rather than stars per period.
pub fn cumulative(buckets: &[Bucket]) -> Vec<Bucket> {
    let mut total = 0u64;
    buckets
        .iter()
        .map(|bucket| {
            total += bucket.count;
            Bucket {
                date: bucket.date,
                count: total,
            }
        })
        .collect()
}
