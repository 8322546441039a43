use std::sync::{Arc, RwLock};

use chrono::Duration;
use uuid::Uuid;

use crate::{
    models::ticket::{TicketId, Timestamp},
    pricing,
};

pub trait Clock {
    fn now(&self) -> Timestamp;
}

pub trait IdGenerator {
    fn next_id(&self) -> TicketId;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        pricing::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<RwLock<Timestamp>>,
}

impl FixedClock {
    pub fn new(instant: Timestamp) -> Self {
        Self {
            instant: Arc::new(RwLock::new(instant)),
        }
    }

    pub fn set(&self, instant: Timestamp) {
        *self.instant.write().unwrap_or_else(|e| e.into_inner()) = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut instant = self.instant.write().unwrap_or_else(|e| e.into_inner());
        *instant += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.instant.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> TicketId {
        Uuid::new_v4()
    }
}
