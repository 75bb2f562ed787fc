use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use github_star_history::aggregate::{
    bucket_by_period, cumulative, drop_open_bucket, truncate_to_bucket,
};
use github_star_history::models::{Bucket, Granularity};

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_daily_bucketing() {
    let events = vec![ts(2022, 1, 1, 10, 0), ts(2022, 1, 1, 12, 0), ts(2022, 1, 2, 15, 0)];

    let buckets = bucket_by_period(events, Granularity::Day);
    assert_eq!(
        buckets,
        vec![
            Bucket { date: date(2022, 1, 1), count: 2 },
            Bucket { date: date(2022, 1, 2), count: 1 },
        ]
    );

    let trimmed = drop_open_bucket(buckets);
    assert_eq!(trimmed, vec![Bucket { date: date(2022, 1, 1), count: 2 }]);
}

#[test]
fn test_week_truncation() {
    // 2024-01-08 was a Monday.
    let wednesday = ts(2024, 1, 10, 9, 30);
    assert_eq!(
        truncate_to_bucket(wednesday, Granularity::Week),
        date(2024, 1, 8)
    );

    // A Sunday belongs to the week that started six days earlier.
    let sunday = ts(2024, 1, 14, 23, 59);
    assert_eq!(
        truncate_to_bucket(sunday, Granularity::Week),
        date(2024, 1, 8)
    );

    let monday = ts(2024, 1, 8, 0, 0);
    assert_eq!(
        truncate_to_bucket(monday, Granularity::Week),
        date(2024, 1, 8)
    );
}

#[test]
fn test_month_truncation() {
    assert_eq!(
        truncate_to_bucket(ts(2022, 3, 15, 18, 45), Granularity::Month),
        date(2022, 3, 1)
    );
    assert_eq!(
        truncate_to_bucket(ts(2022, 12, 31, 23, 59), Granularity::Month),
        date(2022, 12, 1)
    );
}

#[test]
fn test_day_truncation_is_utc() {
    assert_eq!(
        truncate_to_bucket(ts(2022, 7, 4, 0, 0), Granularity::Day),
        date(2022, 7, 4)
    );
    assert_eq!(
        truncate_to_bucket(ts(2022, 7, 4, 23, 59), Granularity::Day),
        date(2022, 7, 4)
    );
}

#[test]
fn test_weekly_bucketing_groups_across_days() {
    // Wed Jan 10 and Sun Jan 14 share the week of Mon Jan 8; Mon Jan 15
    // starts the next week.
    let events = vec![ts(2024, 1, 10, 8, 0), ts(2024, 1, 14, 20, 0), ts(2024, 1, 15, 1, 0)];

    let buckets = bucket_by_period(events, Granularity::Week);
    assert_eq!(
        buckets,
        vec![
            Bucket { date: date(2024, 1, 8), count: 2 },
            Bucket { date: date(2024, 1, 15), count: 1 },
        ]
    );
}

#[test]
fn test_sort_independence() {
    let events = vec![
        ts(2022, 1, 2, 15, 0),
        ts(2022, 1, 1, 12, 0),
        ts(2022, 2, 1, 8, 0),
        ts(2022, 1, 1, 10, 0),
    ];

    let reference = drop_open_bucket(bucket_by_period(events.clone(), Granularity::Day));

    // Any permutation of the same multiset yields the identical series.
    let mut rotated = events.clone();
    for _ in 0..events.len() {
        rotated.rotate_left(1);
        let series = drop_open_bucket(bucket_by_period(rotated.clone(), Granularity::Day));
        assert_eq!(series, reference);
    }

    let mut reversed = events;
    reversed.reverse();
    let series = drop_open_bucket(bucket_by_period(reversed, Granularity::Day));
    assert_eq!(series, reference);
}

#[test]
fn test_empty_input() {
    let buckets = bucket_by_period(Vec::new(), Granularity::Day);
    assert!(buckets.is_empty());
    assert!(drop_open_bucket(buckets).is_empty());
}

#[test]
fn test_single_event_trims_to_empty() {
    let buckets = bucket_by_period(vec![ts(2022, 5, 5, 5, 5)], Granularity::Month);
    assert_eq!(buckets.len(), 1);

    let trimmed = drop_open_bucket(buckets);
    assert!(trimmed.is_empty());
}

#[test]
fn test_no_gap_filling() {
    // A quiet week between two active days produces two buckets, not nine.
    let events = vec![ts(2022, 1, 1, 10, 0), ts(2022, 1, 9, 10, 0)];
    let buckets = bucket_by_period(events, Granularity::Day);
    assert_eq!(buckets.len(), 2);
}

#[test]
fn test_cumulative_rollup() {
    let buckets = vec![
        Bucket { date: date(2022, 1, 1), count: 2 },
        Bucket { date: date(2022, 1, 3), count: 5 },
        Bucket { date: date(2022, 2, 1), count: 1 },
    ];

    let rolled = cumulative(&buckets);
    assert_eq!(
        rolled,
        vec![
            Bucket { date: date(2022, 1, 1), count: 2 },
            Bucket { date: date(2022, 1, 3), count: 7 },
            Bucket { date: date(2022, 2, 1), count: 8 },
        ]
    );
}
