pub mod block;
pub mod model;

pub use block::ProductiveBlock;
pub use model::Ledger;

/// previousHash of the first block in the chain.
pub const CHAIN_SEED_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Server-side cap for the `limit` query parameter.
pub const MAX_PAGE_LIMIT: usize = 500;

/// How many metrics snapshots to retain in memory.
pub const METRICS_HISTORY_LIMIT: usize = 100;
