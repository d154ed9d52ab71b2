use log::{info, warn};
use rand::Rng;

use super::BLOCK_BATCH_SIZE;
use crate::api::models::AppState;
use crate::chain::ProductiveBlock;
use crate::chain::block::merkle_root;
use crate::ws::hub::ServerMessage;

/// One scheduler tick over the block pipeline: bundle unlinked
/// discoveries, oldest first, into blocks of `BLOCK_BATCH_SIZE` and
/// broadcast each as `block_mined`. Leftovers below a full batch wait
/// for the next tick.
pub fn aggregation_tick(state: &AppState, rng: &mut impl Rng) -> Vec<ProductiveBlock> {
    let mut minted = Vec::new();

    {
        let mut ledger = state.ledger.lock().expect("mutex poisoned");
        loop {
            let batch: Vec<_> = ledger
                .unlinked_discoveries()
                .into_iter()
                .take(BLOCK_BATCH_SIZE)
                .cloned()
                .collect();
            if batch.len() < BLOCK_BATCH_SIZE {
                break;
            }

            let work_ids: Vec<u64> = batch.iter().map(|w| w.id).collect();
            let signatures: Vec<&str> = batch.iter().map(|w| w.signature.as_str()).collect();
            let difficulty = batch.iter().map(|w| w.difficulty).max().unwrap_or(1);
            let total_scientific_value: f64 = batch.iter().map(|w| w.scientific_value).sum();
            // Stored efficiency metric back to kWh.
            let energy_consumed: f64 =
                batch.iter().map(|w| w.energy_efficiency / 1000.0).sum();
            let miner_id = batch
                .iter()
                .max_by(|a, b| {
                    a.scientific_value
                        .partial_cmp(&b.scientific_value)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|w| w.worker_id.clone())
                .unwrap_or_default();

            let block = ProductiveBlock::seal(
                ledger.next_block_index(),
                ledger.latest_block_hash(),
                merkle_root(&signatures),
                difficulty,
                rng.r#gen::<u64>(),
                miner_id,
                total_scientific_value,
                energy_consumed,
                batch.len() as u32,
            );

            match ledger.append_block(block, &work_ids) {
                Ok(stored) => minted.push(stored),
                Err(e) => {
                    warn!("AGGREGATOR - block rejected: {e}");
                    break;
                }
            }
        }
    }

    for block in &minted {
        info!(
            "BLOCK - sealed block #{} ({} discoveries, ${:.2})",
            block.index, block.knowledge_created, block.total_scientific_value
        );
        state.hub.send(ServerMessage::BlockMined {
            block: block.clone(),
        });
    }

    minted
}
