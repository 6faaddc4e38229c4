use chrono::{DateTime, Duration, TimeZone, Utc};

/// Finds the first wall-clock instant strictly after `datetime` whose epoch offset is a
/// whole multiple of `interval`, e.g. the next :00, :10, :20 ... for a ten minute interval.
///
/// A non-positive interval has no grid, so `datetime` is returned unchanged.
pub fn next_boundary(datetime: &DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    let step = interval.num_milliseconds();
    if step <= 0 {
        return *datetime;
    }

    let now = datetime.timestamp_millis();
    let next = (now.div_euclid(step) + 1) * step;
    Utc.timestamp_millis_opt(next).single().unwrap_or(*datetime)
}

/// Time left until the next boundary, never negative.
pub fn until_next_boundary(datetime: &DateTime<Utc>, interval: Duration) -> Duration {
    next_boundary(datetime, interval) - *datetime
}

#[cfg(test)]
mod test {
    use crate::tools::date::{next_boundary, until_next_boundary};
    use chrono::Duration;

    #[test]
    fn test_next_ten_minute_boundary() {
        use chrono::prelude::*;

        let datetime = Utc.with_ymd_and_hms(2024, 1, 1, 10, 3, 27).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 10, 0).unwrap();

        assert_eq!(next_boundary(&datetime, Duration::minutes(10)), expected);
        assert_eq!(
            until_next_boundary(&datetime, Duration::minutes(10)),
            Duration::seconds(6 * 60 + 33)
        );
    }

    #[test]
    fn test_boundary_is_strictly_after() {
        use chrono::prelude::*;

        let datetime = Utc.with_ymd_and_hms(2024, 1, 1, 23, 55, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        assert_eq!(next_boundary(&datetime, Duration::minutes(5)), expected);
    }

    #[test]
    fn test_zero_interval_has_no_grid() {
        use chrono::prelude::*;

        let datetime = Utc.with_ymd_and_hms(2024, 1, 1, 10, 3, 27).unwrap();
        assert_eq!(next_boundary(&datetime, Duration::zero()), datetime);
    }
}
