use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::chain::ProductiveBlock;
use crate::chain::model::{IntegrityReport, MathematicalWork, NetworkMetrics};
use crate::engine::operation::{MiningOperation, OperationStatus};
use crate::engine::security::SecurityStatus;

/// Broadcast channel capacity. Slow clients beyond this lag and drop
/// messages instead of applying backpressure.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Server-to-client events, tagged by `type` on the wire.
///
/// `initial_data` is built per connection by the WebSocket server; the
/// remaining variants flow through the hub to every connected client
/// identically. At-most-once, possibly lossy.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    InitialData {
        blocks: Vec<ProductiveBlock>,
        discoveries: Vec<MathematicalWork>,
        operations: Vec<MiningOperation>,
        metrics: NetworkMetrics,
    },
    MiningProgress {
        operation_id: u64,
        progress: f64,
        status: OperationStatus,
        timestamp: DateTime<Utc>,
    },
    DiscoveryMade {
        discovery: MathematicalWork,
    },
    BlockMined {
        block: ProductiveBlock,
    },
    MetricsUpdate {
        metrics: NetworkMetrics,
    },
    IntegrityUpdate {
        report: IntegrityReport,
    },
    SecurityAlert {
        status: SecurityStatus,
    },
}

/// Fan-out hub over a tokio broadcast channel. Cloning is cheap; every
/// clone feeds the same channel.
#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<ServerMessage>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.tx.subscribe()
    }

    /// Broadcast to all current subscribers; a no-op without listeners.
    pub fn send(&self, message: ServerMessage) {
        if self.tx.receiver_count() > 0 {
            if let Err(e) = self.tx.send(message) {
                warn!("WS - failed to broadcast event: {e}");
            }
        }
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}
