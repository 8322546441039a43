use std::{error::Error, fmt};

use chrono::{DateTime, TimeZone};
use tokio::sync::Mutex;

use crate::{
    clock::{Clock, IdGenerator, SystemClock, UuidGenerator},
    models::{
        draft::ValidDraft,
        ticket::{Ticket, TicketId, Timestamp},
    },
    persisters::persister::{KeyValuePersister, PersistError},
    pricing::{self, LiveQuote},
    stats::{DailySummary, HistorySummary},
};

pub const ACTIVE_TICKETS_KEY: &str = "active_tickets";
pub const HISTORY_TICKETS_KEY: &str = "history_tickets";

#[derive(Debug)]
pub enum StoreError {
    NotFound(TicketId),
    Persist(PersistError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Ticket not found: {id}"),
            Self::Persist(e) => write!(f, "Ticket store failed: {e}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persist(e) => Some(e),
            Self::NotFound(_) => None,
        }
    }
}

impl From<PersistError> for StoreError {
    fn from(value: PersistError) -> Self {
        StoreError::Persist(value)
    }
}

/// Owns the active and history collections.
///
/// Each collection is stored as one JSON array under its own key and every
/// mutation rewrites the whole array. Mutations are serialized through a single
/// async mutex, so overlapping calls never interleave their read-modify-write
/// cycles; of two concurrent `close` calls for one id exactly one succeeds.
pub struct TicketStore<P, C = SystemClock, G = UuidGenerator> {
    persister: P,
    clock: C,
    ids: G,
    writes: Mutex<()>,
}

impl<P> TicketStore<P>
where
    P: KeyValuePersister + Send + Sync,
{
    pub fn new(persister: P) -> Self {
        Self::with_collaborators(persister, SystemClock, UuidGenerator)
    }
}

impl<P, C, G> TicketStore<P, C, G>
where
    P: KeyValuePersister + Send + Sync,
    C: Clock + Send + Sync,
    G: IdGenerator + Send + Sync,
{
    pub fn with_collaborators(persister: P, clock: C, ids: G) -> Self {
        Self {
            persister,
            clock,
            ids,
            writes: Mutex::new(()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub async fn list_active(&self) -> Vec<Ticket> {
        self.list(ACTIVE_TICKETS_KEY).await
    }

    pub async fn list_history(&self) -> Vec<Ticket> {
        self.list(HISTORY_TICKETS_KEY).await
    }

    /// History with the most recently closed tickets first.
    pub async fn list_history_by_exit(&self) -> Vec<Ticket> {
        let mut history = self.list_history().await;
        history.sort_by(|a, b| b.exit_time.cmp(&a.exit_time));
        history
    }

    pub async fn history_summary(&self) -> HistorySummary {
        HistorySummary::from_history(&self.list_history().await)
    }

    pub async fn daily_summary<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DailySummary {
        let active = self.list_active().await;
        let history = self.list_history().await;
        DailySummary::compute(&active, &history, now)
    }

    /// Appends to the active collection without validating the ticket.
    pub async fn create(&self, ticket: Ticket) -> Result<(), StoreError> {
        let _guard = self.writes.lock().await;
        log::trace!("create ticket {}", ticket.id);
        let mut active = self.load(ACTIVE_TICKETS_KEY).await.map_err(absorb("create"))?;
        active.push(ticket);
        self.save(ACTIVE_TICKETS_KEY, &active)
            .await
            .map_err(absorb("create"))
    }

    /// Opens a ticket from a validated draft, stamping id and entry time.
    pub async fn open(&self, draft: ValidDraft) -> Result<Ticket, StoreError> {
        let entry_time = draft.entry_time.unwrap_or_else(|| self.clock.now());
        let ticket = Ticket::new(
            self.ids.next_id(),
            draft.parking_name,
            entry_time,
            draft.price_per_hour,
        );
        self.create(ticket.clone()).await?;
        Ok(ticket)
    }

    /// Looks up active tickets only.
    pub async fn get_by_id(&self, id: TicketId) -> Option<Ticket> {
        self.list_active()
            .await
            .into_iter()
            .find(|ticket| ticket.id == id)
    }

    /// Elapsed time and amount due right now for an active ticket.
    pub async fn quote(&self, id: TicketId) -> Option<LiveQuote> {
        let ticket = self.get_by_id(id).await?;
        Some(LiveQuote::at(&ticket, &self.clock.now()))
    }

    /// Moves the ticket from active to history with the given exit stamp.
    ///
    /// Both collections are written in one batch: on failure neither changes.
    pub async fn close(
        &self,
        id: TicketId,
        exit_time: Timestamp,
        total_amount: u64,
    ) -> Result<Ticket, StoreError> {
        self.close_with(id, |_| (exit_time, total_amount)).await
    }

    /// Closes at the current instant, pricing the stay with the started-hour rule.
    pub async fn close_now(&self, id: TicketId) -> Result<Ticket, StoreError> {
        let exit_time = self.clock.now();
        self.close_with(id, |ticket| {
            let amount = pricing::price(&ticket.entry_time, &exit_time, ticket.price_per_hour);
            (exit_time, amount)
        })
        .await
    }

    async fn close_with<F>(&self, id: TicketId, stamp: F) -> Result<Ticket, StoreError>
    where
        F: FnOnce(&Ticket) -> (Timestamp, u64) + Send,
    {
        let _guard = self.writes.lock().await;
        log::trace!("close ticket {id}");
        let mut active = self.load(ACTIVE_TICKETS_KEY).await.map_err(absorb("close"))?;
        let position = active
            .iter()
            .position(|ticket| ticket.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let mut history = self.load(HISTORY_TICKETS_KEY).await.map_err(absorb("close"))?;

        let ticket = active.remove(position);
        let (exit_time, total_amount) = stamp(&ticket);
        if exit_time < ticket.entry_time {
            log::warn!(
                "ticket {id} closed at {exit_time} before its entry {}",
                ticket.entry_time
            );
        }
        let closed = ticket.close(exit_time, total_amount);
        history.push(closed.clone());

        let entries = vec![
            (
                ACTIVE_TICKETS_KEY.to_string(),
                serialize(&active).map_err(absorb("close"))?,
            ),
            (
                HISTORY_TICKETS_KEY.to_string(),
                serialize(&history).map_err(absorb("close"))?,
            ),
        ];
        self.persister
            .set_many(entries)
            .await
            .map_err(absorb("close"))?;
        Ok(closed)
    }

    /// Removes a history ticket; an unknown id is not an error.
    pub async fn delete_from_history(&self, id: TicketId) -> Result<(), StoreError> {
        let _guard = self.writes.lock().await;
        log::trace!("delete history ticket {id}");
        let mut history = self
            .load(HISTORY_TICKETS_KEY)
            .await
            .map_err(absorb("delete"))?;
        let before = history.len();
        history.retain(|ticket| ticket.id != id);
        if history.len() == before {
            return Ok(());
        }
        self.save(HISTORY_TICKETS_KEY, &history)
            .await
            .map_err(absorb("delete"))
    }

    /// Empties the history and returns how many tickets were removed.
    pub async fn clear_history(&self) -> Result<usize, StoreError> {
        let _guard = self.writes.lock().await;
        let history = self
            .load(HISTORY_TICKETS_KEY)
            .await
            .map_err(absorb("clear history"))?;
        self.save(HISTORY_TICKETS_KEY, &[])
            .await
            .map_err(absorb("clear history"))?;
        Ok(history.len())
    }

    async fn list(&self, key: &str) -> Vec<Ticket> {
        match self.load(key).await {
            Ok(tickets) => tickets,
            Err(e) => {
                log::error!("unable to read {key}: {e}");
                Vec::new()
            }
        }
    }

    async fn load(&self, key: &str) -> Result<Vec<Ticket>, PersistError> {
        match self.persister.get(key).await? {
            Some(value) => Ok(serde_json::from_str(&value)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, key: &str, tickets: &[Ticket]) -> Result<(), PersistError> {
        self.persister.set(key, serialize(tickets)?).await
    }
}

fn serialize(tickets: &[Ticket]) -> Result<String, PersistError> {
    Ok(serde_json::to_string(tickets)?)
}

fn absorb(operation: &'static str) -> impl Fn(PersistError) -> StoreError {
    move |e| {
        log::error!("{operation} failed: {e}");
        StoreError::Persist(e)
    }
}
