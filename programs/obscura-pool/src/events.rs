//! Events for the Obscura privacy pool
//!
//! Each state change emits one serializable event as a structured
//! `tracing` record on the `obscura_pool::events` target. Subscribers that
//! index pool activity filter on that target and parse the `payload` field.

use serde::{Deserialize, Serialize};

pub const EVENT_TARGET: &str = "obscura_pool::events";

pub trait Event: Serialize {
    const NAME: &'static str;
}

/// Emit `event` as a JSON payload on [`EVENT_TARGET`].
pub fn emit<E: Event>(event: &E) {
    match serde_json::to_string(event) {
        Ok(payload) => {
            tracing::info!(target: EVENT_TARGET, event = E::NAME, %payload);
        }
        Err(e) => {
            tracing::warn!(target: EVENT_TARGET, event = E::NAME, error = %e, "event serialization failed");
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCreated {
    pub pool_id: u64,
    pub min_delay: u64,
    pub max_delay: u64,
    pub merkle_depth: u8,
    pub initial_root: String,
    pub timestamp: i64,
}

impl Event for PoolCreated {
    const NAME: &'static str = "PoolCreated";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPaused {
    pub pool_id: u64,
    pub timestamp: i64,
}

impl Event for PoolPaused {
    const NAME: &'static str = "PoolPaused";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUnpaused {
    pub pool_id: u64,
    pub timestamp: i64,
}

impl Event for PoolUnpaused {
    const NAME: &'static str = "PoolUnpaused";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub pool_id: u64,
    pub commitment: String,
    pub leaf_index: u64,
    pub amount: u64,
    pub timestamp: i64,
}

impl Event for DepositEvent {
    const NAME: &'static str = "Deposit";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawEvent {
    pub pool_id: u64,
    pub nullifier_hash: String,
    pub recipient: String,
    pub amount: u64,
    pub timestamp: i64,
}

impl Event for WithdrawEvent {
    const NAME: &'static str = "Withdraw";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleRootUpdated {
    pub pool_id: u64,
    pub root: String,
    pub history_len: usize,
    pub timestamp: i64,
}

impl Event for MerkleRootUpdated {
    const NAME: &'static str = "MerkleRootUpdated";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_event_json_shape() {
        let event = DepositEvent {
            pool_id: 1,
            commitment: "0xab".into(),
            leaf_index: 0,
            amount: 100,
            timestamp: 42,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["pool_id"], 1);
        assert_eq!(value["commitment"], "0xab");
        assert_eq!(value["amount"], 100);
        let back: DepositEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_emit_without_subscriber() {
        emit(&PoolPaused {
            pool_id: 3,
            timestamp: 0,
        });
    }
}
