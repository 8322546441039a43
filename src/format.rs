//! Display strings for durations, amounts and timestamps.
//!
//! Timestamps are rendered in whatever zone they carry; convert to the device
//! zone (`with_timezone(&Local)`) before formatting for display.

use chrono::{DateTime, Datelike, TimeZone, Timelike};

use crate::config::CurrencyConfig;

const MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Juin", "Juil", "Août", "Sep", "Oct", "Nov", "Déc",
];

/// `"2h 30min"`, `"2h"` or `"45min"`; negative input renders as `"0min"`.
pub fn format_duration(minutes: i64) -> String {
    if minutes < 0 {
        return "0min".to_string();
    }
    let hours = minutes / 60;
    let remainder = minutes % 60;
    match (hours, remainder) {
        (0, _) => format!("{remainder}min"),
        (_, 0) => format!("{hours}h"),
        _ => format!("{hours}h {remainder}min"),
    }
}

pub fn format_amount(amount: u64) -> String {
    format_amount_with(amount, &CurrencyConfig::default())
}

pub fn format_amount_with(amount: u64, currency: &CurrencyConfig) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() * 2);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(currency.group_separator);
        }
        grouped.push(digit);
    }
    format!("{grouped} {}", currency.suffix)
}

/// `09h05`
pub fn format_time<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
    format!("{:02}h{:02}", timestamp.hour(), timestamp.minute())
}

/// `29/11/2025`
pub fn format_short_date<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
    format!(
        "{:02}/{:02}/{}",
        timestamp.day(),
        timestamp.month(),
        timestamp.year()
    )
}

/// `29 Nov 2025 à 14h20`
pub fn format_full_date<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
    format!(
        "{:02} {} {} à {}",
        timestamp.day(),
        MONTHS[timestamp.month0() as usize],
        timestamp.year(),
        format_time(timestamp)
    )
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!("0min", format_duration(-12));
        assert_eq!("0min", format_duration(0));
        assert_eq!("45min", format_duration(45));
        assert_eq!("1h", format_duration(60));
        assert_eq!("1h 30min", format_duration(90));
        assert_eq!("3h", format_duration(180));
        assert_eq!("26h 1min", format_duration(1561));
    }

    #[test]
    fn test_format_duration_matches_a_known_shape() {
        for minutes in -5..2000 {
            let text = format_duration(minutes);
            let shape_ok = match text.split_once('h') {
                None => text.ends_with("min") && text[..text.len() - 3].parse::<u64>().is_ok(),
                Some((hours, "")) => hours.parse::<u64>().is_ok(),
                Some((hours, rest)) => {
                    hours.parse::<u64>().is_ok()
                        && rest.starts_with(' ')
                        && rest.ends_with("min")
                        && rest[1..rest.len() - 3]
                            .parse::<u64>()
                            .is_ok_and(|m| (1..60).contains(&m))
                }
            };
            assert!(shape_ok, "{minutes} -> {text}");
        }
    }

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!("0 FCFA", format_amount(0));
        assert_eq!("150 FCFA", format_amount(150));
        assert_eq!("1\u{202F}500 FCFA", format_amount(1500));
        assert_eq!("12\u{202F}345\u{202F}678 FCFA", format_amount(12_345_678));
        assert_eq!("100\u{202F}000 FCFA", format_amount(100_000));
    }

    #[test]
    fn test_format_amount_with_custom_currency() {
        let currency = CurrencyConfig {
            suffix: "XOF".to_string(),
            group_separator: ' ',
        };
        assert_eq!("1 500 XOF", format_amount_with(1500, &currency));
    }

    #[test]
    fn test_format_time_pads() {
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 3, 9, 5, 59).unwrap();
        assert_eq!("09h05", format_time(&timestamp));
    }

    #[test]
    fn test_dates_use_the_given_zone() {
        let timestamp = Utc.with_ymd_and_hms(2025, 11, 30, 23, 20, 0).unwrap();
        let plus_one = timestamp.with_timezone(&FixedOffset::east_opt(3600).unwrap());
        assert_eq!("30/11/2025", format_short_date(&timestamp));
        assert_eq!("01/12/2025", format_short_date(&plus_one));
        assert_eq!("01 Déc 2025 à 00h20", format_full_date(&plus_one));
    }

    #[test]
    fn test_full_date() {
        let timestamp = Utc.with_ymd_and_hms(2025, 8, 29, 14, 20, 0).unwrap();
        assert_eq!("29 Août 2025 à 14h20", format_full_date(&timestamp));
    }
}
