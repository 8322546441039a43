use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TicketId = Uuid;
pub type Timestamp = DateTime<Utc>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub parking_name: String,
    pub entry_time: Timestamp,
    pub price_per_hour: u64,
    pub status: TicketStatus,
    pub exit_time: Option<Timestamp>,
    pub total_amount: Option<u64>,
}

impl Ticket {
    pub fn new(
        id: TicketId,
        parking_name: impl Into<String>,
        entry_time: Timestamp,
        price_per_hour: u64,
    ) -> Self {
        Self {
            id,
            parking_name: parking_name.into(),
            entry_time,
            price_per_hour,
            status: TicketStatus::Active,
            exit_time: None,
            total_amount: None,
        }
    }

    /// Stamps the exit fields and flips the status.
    pub fn close(self, exit_time: Timestamp, total_amount: u64) -> Self {
        Self {
            status: TicketStatus::Closed,
            exit_time: Some(exit_time),
            total_amount: Some(total_amount),
            ..self
        }
    }
}
