use chrono::{SubsecRound, Utc};

use crate::models::ticket::{Ticket, Timestamp};

const MILLIS_PER_MINUTE: i64 = 60_000;
const MINUTES_PER_HOUR: i64 = 60;

/// Whole minutes between `entry` and `exit`, rounded down.
///
/// Negative when `exit` precedes `entry`.
pub fn duration(entry: &Timestamp, exit: &Timestamp) -> i64 {
    (*exit - *entry)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_MINUTE)
}

/// Every started hour is billed in full. Amounts saturate at `u64::MAX`.
pub fn price(entry: &Timestamp, exit: &Timestamp, price_per_hour: u64) -> u64 {
    price_for_minutes(duration(entry, exit), price_per_hour)
}

pub fn price_for_minutes(minutes: i64, price_per_hour: u64) -> u64 {
    if minutes < 0 {
        log::warn!("negative duration of {minutes} minutes priced as zero");
        return 0;
    }
    billed_hours(minutes)
        .checked_mul(price_per_hour)
        .unwrap_or_else(|| {
            log::warn!("amount for {minutes} minutes at {price_per_hour}/h saturated");
            u64::MAX
        })
}

fn billed_hours(minutes: i64) -> u64 {
    (minutes as u64).div_ceil(MINUTES_PER_HOUR as u64)
}

/// Current instant, truncated to the millisecond precision stored timestamps use.
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Elapsed time and amount due so far for a ticket that is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveQuote {
    pub minutes: i64,
    pub amount: u64,
}

impl LiveQuote {
    pub fn at(ticket: &Ticket, now: &Timestamp) -> Self {
        let minutes = duration(&ticket.entry_time, now);
        Self {
            minutes,
            amount: price_for_minutes(minutes, ticket.price_per_hour),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rand::Rng;
    use uuid::Uuid;

    use super::*;

    fn entry() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 11, 29, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_duration_floors_partial_minutes() {
        let exit = entry() + Duration::seconds(119);
        assert_eq!(1, duration(&entry(), &exit));
        assert_eq!(0, duration(&entry(), &entry()));
    }

    #[test]
    fn test_duration_negative_when_exit_precedes_entry() {
        let exit = entry() - Duration::seconds(30);
        assert_eq!(-1, duration(&entry(), &exit));
    }

    #[test]
    fn test_duration_never_negative_for_ordered_timestamps() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let exit = entry() + Duration::milliseconds(rng.gen_range(0..10_000_000_000));
            assert!(duration(&entry(), &exit) >= 0);
        }
    }

    #[test]
    fn test_started_hour_is_fully_due() {
        let at = |minutes| entry() + Duration::minutes(minutes);
        assert_eq!(0, price(&entry(), &entry(), 100));
        assert_eq!(100, price(&entry(), &at(1), 100));
        assert_eq!(100, price(&entry(), &at(60), 100));
        assert_eq!(200, price(&entry(), &at(61), 100));
        assert_eq!(150, price(&entry(), &at(125), 50));
    }

    #[test]
    fn test_zero_duration_is_free_for_any_rate() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let rate = rng.gen_range(1..1_000_000);
            assert_eq!(0, price(&entry(), &entry(), rate));
        }
    }

    #[test]
    fn test_negative_duration_is_free() {
        let exit = entry() - Duration::minutes(5);
        assert_eq!(0, price(&entry(), &exit, 100));
    }

    #[test]
    fn test_huge_rate_saturates() {
        let rate = i64::MAX as u64;
        let exit = entry() + Duration::minutes(121);
        assert_eq!(u64::MAX, price(&entry(), &exit, rate));
        assert_eq!(rate, price(&entry(), &(entry() + Duration::minutes(1)), rate));

        let ticket = Ticket::new(Uuid::new_v4(), "Marché", entry(), rate);
        assert_eq!(u64::MAX, LiveQuote::at(&ticket, &exit).amount);
    }

    #[test]
    fn test_now_has_millisecond_precision() {
        assert_eq!(0, now().timestamp_subsec_nanos() % 1_000_000);
    }

    #[test]
    fn test_live_quote() {
        let ticket = Ticket::new(Uuid::new_v4(), "Marché", entry(), 50);
        let quote = LiveQuote::at(&ticket, &(entry() + Duration::minutes(90)));
        assert_eq!(LiveQuote { minutes: 90, amount: 100 }, quote);
    }
}
