//! Per-account ordering of audit emission.
//!
//! A ticket is drawn while the account lock is held, so ticket order
//! equals mutation order. Emission happens after the lock is released
//! and waits only for earlier tickets of the same account.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use meshgate_core::models::activity::ActivityEvent;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Default)]
struct Progress {
    /// Every ticket below this number has completed.
    done: u64,
    /// Tickets dropped before their turn, skipped once reached.
    abandoned: BTreeSet<u64>,
}

impl Progress {
    fn finish(&mut self, number: u64) {
        if self.done != number {
            self.abandoned.insert(number);
            return;
        }
        self.done += 1;
        while self.abandoned.remove(&self.done) {
            self.done += 1;
        }
    }
}

#[derive(Debug)]
struct Sequencer {
    next: AtomicU64,
    progress: watch::Sender<Progress>,
    last_timestamp: Mutex<DateTime<Utc>>,
}

impl Sequencer {
    fn new() -> Self {
        let (progress, _) = watch::channel(Progress::default());
        Self {
            next: AtomicU64::new(0),
            progress,
            last_timestamp: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    async fn wait_for(&self, number: u64) {
        let mut rx = self.progress.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|p| p.done >= number).await;
    }

    /// Mark `number` finished. Out of turn it is parked until every
    /// earlier ticket has finished.
    fn finish(&self, number: u64) {
        self.progress.send_modify(|p| p.finish(number));
    }
}

/// Issues audit tickets, one sequence per account.
#[derive(Debug, Default)]
pub(crate) struct AuditOrder {
    sequencers: DashMap<String, Arc<Sequencer>>,
}

impl AuditOrder {
    fn sequencer(&self, account_id: &str) -> Arc<Sequencer> {
        self.sequencers
            .entry(account_id.to_owned())
            .or_insert_with(|| Arc::new(Sequencer::new()))
            .clone()
    }

    /// Must be called while holding the account lock.
    pub(crate) fn ticket(&self, account_id: &str) -> AuditTicket {
        let sequencer = self.sequencer(account_id);
        let number = sequencer.next.fetch_add(1, Ordering::SeqCst);
        AuditTicket {
            sequencer,
            number,
            done: false,
        }
    }

    /// Keep each account's event timestamps non-decreasing even if the
    /// wall clock steps back. Must be called while holding the account
    /// lock.
    pub(crate) fn order_timestamps(&self, events: &mut [ActivityEvent]) {
        for event in events {
            let sequencer = self.sequencer(&event.account_id);
            let mut last = sequencer
                .last_timestamp
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if event.timestamp < *last {
                debug!(
                    account_id = %event.account_id,
                    clock = %event.timestamp,
                    "clock behind last activity event, reusing its timestamp"
                );
                event.timestamp = *last;
            } else {
                *last = event.timestamp;
            }
        }
    }
}

/// A reserved slot in an account's audit sequence.
#[derive(Debug)]
pub(crate) struct AuditTicket {
    sequencer: Arc<Sequencer>,
    number: u64,
    done: bool,
}

impl AuditTicket {
    /// Wait until every earlier ticket of the account has completed.
    pub(crate) async fn wait_turn(&self) {
        self.sequencer.wait_for(self.number).await;
    }

    pub(crate) fn complete(mut self) {
        self.done = true;
        self.sequencer.finish(self.number);
    }
}

impl Drop for AuditTicket {
    fn drop(&mut self) {
        // Abandoned ticket (caller future dropped): release the slot in
        // order so later tickets are not stuck.
        if !self.done {
            self.sequencer.finish(self.number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use meshgate_core::models::activity::{Activity, EventMeta};
    use std::time::Duration;

    fn event(account_id: &str, timestamp: DateTime<Utc>) -> ActivityEvent {
        ActivityEvent {
            timestamp,
            ..ActivityEvent::new(Activity::GroupUpdated, "u", "g", account_id, EventMeta::new())
        }
    }

    #[tokio::test]
    async fn later_ticket_waits_for_earlier() {
        let order = AuditOrder::default();
        let first = order.ticket("acc");
        let second = order.ticket("acc");

        let blocked = tokio::time::timeout(Duration::from_millis(50), second.wait_turn()).await;
        assert!(blocked.is_err());

        first.wait_turn().await;
        first.complete();
        tokio::time::timeout(Duration::from_millis(50), second.wait_turn())
            .await
            .unwrap();
        second.complete();
    }

    #[tokio::test]
    async fn accounts_are_independent() {
        let order = AuditOrder::default();
        let _a = order.ticket("a");
        let b = order.ticket("b");
        tokio::time::timeout(Duration::from_millis(50), b.wait_turn())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dropped_ticket_releases_its_slot() {
        let order = AuditOrder::default();
        let first = order.ticket("acc");
        let second = order.ticket("acc");
        let third = order.ticket("acc");

        // Abandon the second while the first is still pending.
        drop(second);
        first.complete();

        tokio::time::timeout(Duration::from_millis(200), third.wait_turn())
            .await
            .unwrap();
    }

    #[test]
    fn ticket_dropped_outside_a_runtime_is_skipped() {
        let order = AuditOrder::default();
        let first = order.ticket("acc");
        let second = order.ticket("acc");
        let third = order.ticket("acc");

        drop(second);
        let sequencer = order.sequencer("acc");
        assert_eq!(sequencer.progress.borrow().done, 0);

        first.complete();
        assert_eq!(sequencer.progress.borrow().done, 2);
        drop(third);
        assert_eq!(sequencer.progress.borrow().done, 3);
    }

    #[test]
    fn timestamps_never_go_backwards_per_account() {
        let order = AuditOrder::default();
        let now = Utc::now();
        let earlier = now - ChronoDuration::seconds(30);

        let mut first = [event("acc", now)];
        order.order_timestamps(&mut first);
        let mut second = [event("acc", earlier), event("other", earlier)];
        order.order_timestamps(&mut second);

        assert_eq!(first[0].timestamp, now);
        assert_eq!(second[0].timestamp, now);
        assert_eq!(second[1].timestamp, earlier);
    }
}
