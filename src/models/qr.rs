use std::{error::Error, fmt};

use serde::Deserialize;
use serde_json::Value;

use super::draft::TicketDraft;

/// Payload printed on a parking's QR code.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QrPayload {
    #[serde(default)]
    parking_name: Option<String>,
    #[serde(default)]
    price_per_hour: Option<Value>,
}

#[derive(Debug)]
pub enum QrError {
    Malformed(serde_json::Error),
    MissingParkingName,
    MissingPricePerHour,
}

impl fmt::Display for QrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "Invalid QR code: {e}"),
            Self::MissingParkingName => write!(f, "Invalid QR code: parkingName missing"),
            Self::MissingPricePerHour => write!(f, "Invalid QR code: pricePerHour missing"),
        }
    }
}

impl Error for QrError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for QrError {
    fn from(value: serde_json::Error) -> Self {
        QrError::Malformed(value)
    }
}

/// Decodes scanned text into a draft with name and rate pre-filled.
///
/// The rate may be encoded as a number or as text; the draft still has to be
/// validated before a ticket is opened from it.
pub fn parse_qr_payload(scanned: &str) -> Result<TicketDraft, QrError> {
    let payload: QrPayload = serde_json::from_str(scanned.trim())?;

    let parking_name = payload
        .parking_name
        .filter(|name| !name.is_empty())
        .ok_or(QrError::MissingParkingName)?;

    let price_per_hour = match payload.price_per_hour {
        Some(Value::Number(rate)) if rate.as_f64() != Some(0.0) => rate.to_string(),
        Some(Value::String(rate)) if !rate.is_empty() => rate,
        _ => return Err(QrError::MissingPricePerHour),
    };

    Ok(TicketDraft::new(parking_name, price_per_hour))
}
