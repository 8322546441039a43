use chrono::{DateTime, Datelike, NaiveDate, TimeZone};

use crate::models::ticket::Ticket;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub count: usize,
    pub total: u64,
    /// Rounded half up; zero for an empty history. Totals saturate at `u64::MAX`.
    pub average: u64,
}

impl HistorySummary {
    pub fn from_history(history: &[Ticket]) -> Self {
        let count = history.len();
        let total = total_amount(history.iter());
        let average = if count == 0 {
            0
        } else {
            total.saturating_add(count as u64 / 2) / count as u64
        };
        Self {
            count,
            total,
            average,
        }
    }
}

/// Figures for the home screen, relative to the local day and month of `now`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailySummary {
    pub active_count: usize,
    pub today_count: usize,
    pub today_total: u64,
    pub month_total: u64,
}

impl DailySummary {
    pub fn compute<Tz: TimeZone>(
        active: &[Ticket],
        history: &[Ticket],
        now: &DateTime<Tz>,
    ) -> Self {
        let zone = now.timezone();
        let today = now.date_naive();
        let local_exits: Vec<(&Ticket, NaiveDate)> = history
            .iter()
            .filter_map(|ticket| {
                let exit = ticket.exit_time?;
                Some((ticket, exit.with_timezone(&zone).date_naive()))
            })
            .collect();

        let today_tickets: Vec<&Ticket> = local_exits
            .iter()
            .filter(|(_, date)| *date == today)
            .map(|(ticket, _)| *ticket)
            .collect();
        let month_total = total_amount(
            local_exits
                .iter()
                .filter(|(_, date)| date.year() == today.year() && date.month() == today.month())
                .map(|(ticket, _)| *ticket),
        );

        Self {
            active_count: active.len(),
            today_count: today_tickets.len(),
            today_total: total_amount(today_tickets.into_iter()),
            month_total,
        }
    }
}

fn total_amount<'a>(tickets: impl Iterator<Item = &'a Ticket>) -> u64 {
    tickets
        .filter_map(|ticket| ticket.total_amount)
        .fold(0, u64::saturating_add)
}
