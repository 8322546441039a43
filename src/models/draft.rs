use std::{error::Error, fmt};

use chrono::{DateTime, Utc};

use super::ticket::Timestamp;

/// Raw form input for a new ticket, as typed by the user or pre-filled from a QR code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketDraft {
    pub parking_name: String,
    pub price_per_hour: String,
    /// `None` means "use the current time".
    pub entry_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub parking_name: String,
    pub price_per_hour: u64,
    pub entry_time: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyParkingName,
    InvalidRate(String),
    NonPositiveRate(i64),
    InvalidEntryTime(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptyParkingName => write!(f, "Parking name is required"),
            Self::InvalidRate(rate) => write!(f, "Hourly rate is not a number: {rate}"),
            Self::NonPositiveRate(rate) => write!(f, "Hourly rate must be positive: {rate}"),
            Self::InvalidEntryTime(time) => write!(f, "Entry time is not ISO-8601: {time}"),
        }
    }
}

impl Error for ValidationError {}

impl TicketDraft {
    pub fn new(parking_name: impl Into<String>, price_per_hour: impl Into<String>) -> Self {
        Self {
            parking_name: parking_name.into(),
            price_per_hour: price_per_hour.into(),
            entry_time: None,
        }
    }

    pub fn with_entry_time(mut self, entry_time: impl Into<String>) -> Self {
        self.entry_time = Some(entry_time.into());
        self
    }

    pub fn validate(&self) -> Result<ValidDraft, ValidationError> {
        let parking_name = self.parking_name.trim();
        if parking_name.is_empty() {
            return Err(ValidationError::EmptyParkingName);
        }

        let rate = self.price_per_hour.trim();
        let price_per_hour = match leading_integer(rate).parse::<i64>() {
            Ok(value) if value > 0 => value as u64,
            Ok(value) => return Err(ValidationError::NonPositiveRate(value)),
            Err(_) => return Err(ValidationError::InvalidRate(rate.to_string())),
        };

        let entry_time = self
            .entry_time
            .as_deref()
            .map(|time| {
                DateTime::parse_from_rfc3339(time.trim())
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .map_err(|_| ValidationError::InvalidEntryTime(time.to_string()))
            })
            .transpose()?;

        Ok(ValidDraft {
            parking_name: parking_name.to_string(),
            price_per_hour,
            entry_time,
        })
    }
}

/// Sign and digits at the start of `text`; `"12.5"` yields `"12"`.
fn leading_integer(text: &str) -> &str {
    let sign = usize::from(text.starts_with(['+', '-']));
    let digits = text[sign..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len() - sign);
    &text[..sign + digits]
}
