use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::calendar_event::EventType;
use crate::entities::consumption_log::TransactionKind;

/// Per-item summary of what a reconciliation pass wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileCounts {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ReconcileCounts {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the consumer is gone.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping domain event: {}", e);
        }
    }
}

// Things that happen to a household's inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ItemCreated {
        user_id: Uuid,
        item_id: Uuid,
    },
    ItemUpdated {
        user_id: Uuid,
        item_id: Uuid,
    },
    ItemDeleted {
        user_id: Uuid,
        item_id: Uuid,
    },
    ItemsImported {
        user_id: Uuid,
        count: usize,
    },
    ItemQuantityChanged {
        user_id: Uuid,
        item_id: Uuid,
        kind: TransactionKind,
        old_quantity: f64,
        new_quantity: f64,
    },
    ItemEventsReconciled {
        item_id: Uuid,
        counts: ReconcileCounts,
    },
    CalendarEventCreated {
        user_id: Uuid,
        event_id: Uuid,
        event_type: EventType,
        date: NaiveDate,
    },
    CalendarEventCompleted {
        user_id: Uuid,
        event_id: Uuid,
    },
}

/// Drains the channel until every sender has been dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        debug!("Received event: {:?}", event);

        match event {
            Event::ItemCreated { user_id, item_id } => {
                info!(%user_id, %item_id, "Item created");
            }
            Event::ItemUpdated { user_id, item_id } => {
                info!(%user_id, %item_id, "Item updated");
            }
            Event::ItemDeleted { user_id, item_id } => {
                info!(%user_id, %item_id, "Item deleted");
            }
            Event::ItemsImported { user_id, count } => {
                info!(%user_id, count, "Items imported");
            }
            Event::ItemQuantityChanged {
                user_id,
                item_id,
                kind,
                old_quantity,
                new_quantity,
            } => {
                info!(
                    %user_id,
                    %item_id,
                    kind = kind.as_ref(),
                    old_quantity,
                    new_quantity,
                    "Item quantity changed"
                );
            }
            Event::ItemEventsReconciled { item_id, counts } => {
                if !counts.is_noop() {
                    info!(
                        %item_id,
                        created = counts.created,
                        updated = counts.updated,
                        deleted = counts.deleted,
                        "Item calendar events reconciled"
                    );
                }
            }
            Event::CalendarEventCreated {
                user_id,
                event_id,
                event_type,
                date,
            } => {
                info!(
                    %user_id,
                    %event_id,
                    event_type = event_type.as_str(),
                    %date,
                    "Calendar event created"
                );
            }
            Event::CalendarEventCompleted { user_id, event_id } => {
                info!(%user_id, %event_id, "Calendar event completed");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        drop(rx);

        let result = sender
            .send(Event::ItemDeleted {
                user_id: Uuid::new_v4(),
                item_id: Uuid::new_v4(),
            })
            .await;
        assert!(result.is_err());
        // Logged, not propagated
        sender
            .send_or_log(Event::ItemsImported {
                user_id: Uuid::new_v4(),
                count: 0,
            })
            .await;
    }

    #[tokio::test]
    async fn process_events_exits_when_senders_close() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender
            .send(Event::ItemEventsReconciled {
                item_id: Uuid::new_v4(),
                counts: ReconcileCounts {
                    created: 1,
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        drop(sender);

        process_events(rx).await;
    }
}
