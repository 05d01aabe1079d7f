//! The singleton/launcher/transaction store traits (SPEC_FULL.md §5) and
//! in-memory implementations used for testing.
//!
//! Grounded on `chia-wallet/src/coin_store.rs`'s find-or-replace `update()`
//! idiom. The real stores are persistent and owned by the embedder; this
//! crate only defines the trait surface plus a test double.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{DataLayerError, Result};
use crate::record::{LauncherInfo, SingletonRecord};
use crate::transaction::TransactionRecord;
use crate::types::Bytes32;

#[async_trait]
pub trait SingletonStore: Send + Sync {
    async fn get_latest_singleton(
        &self,
        launcher_id: Bytes32,
        only_confirmed: bool,
    ) -> Option<SingletonRecord>;

    async fn get_singleton_record(&self, coin_id: Bytes32) -> Option<SingletonRecord>;

    async fn get_all_singletons_for_launcher(
        &self,
        launcher_id: Bytes32,
        min_generation: Option<u32>,
        max_generation: Option<u32>,
        limit: Option<usize>,
    ) -> Vec<SingletonRecord>;

    async fn get_unconfirmed_singletons(&self, launcher_id: Bytes32) -> Vec<SingletonRecord>;

    async fn get_singletons_by_root(
        &self,
        launcher_id: Bytes32,
        root: Bytes32,
    ) -> Vec<SingletonRecord>;

    async fn get_all_launchers(&self) -> Vec<Bytes32>;

    /// Inserts a new record. Enforces invariant (2): at most one confirmed
    /// record per `(launcher_id, generation)`. Violating it is a store
    /// corruption, not a recoverable authoring error.
    async fn add_singleton_record(&self, record: SingletonRecord) -> Result<()>;

    async fn set_confirmed(&self, coin_id: Bytes32, height: u32, timestamp: u64) -> Result<()>;

    async fn delete_singleton_record(&self, coin_id: Bytes32);

    async fn delete_singleton_records_by_launcher_id(&self, launcher_id: Bytes32);

    async fn add_launcher(&self, info: LauncherInfo) -> Result<()>;

    async fn get_launcher(&self, launcher_id: Bytes32) -> Option<LauncherInfo>;

    async fn delete_launcher(&self, launcher_id: Bytes32);
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, tx: TransactionRecord);
    async fn delete(&self, name: Bytes32);
    async fn get(&self, name: Bytes32) -> Option<TransactionRecord>;
    async fn get_unconfirmed_for_standard_wallet(&self) -> Vec<TransactionRecord>;
}

/// In-memory [`SingletonStore`], used by tests and by the scenario suite.
#[derive(Default)]
pub struct InMemorySingletonStore {
    records: Mutex<Vec<SingletonRecord>>,
    launchers: Mutex<Vec<LauncherInfo>>,
}

impl InMemorySingletonStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SingletonStore for InMemorySingletonStore {
    async fn get_latest_singleton(
        &self,
        launcher_id: Bytes32,
        only_confirmed: bool,
    ) -> Option<SingletonRecord> {
        let records = self.records.lock().await;
        records
            .iter()
            .filter(|r| r.launcher_id == launcher_id && (!only_confirmed || r.confirmed))
            .max_by_key(|r| r.generation)
            .copied()
    }

    async fn get_singleton_record(&self, coin_id: Bytes32) -> Option<SingletonRecord> {
        let records = self.records.lock().await;
        records.iter().find(|r| r.coin_id == coin_id).copied()
    }

    async fn get_all_singletons_for_launcher(
        &self,
        launcher_id: Bytes32,
        min_generation: Option<u32>,
        max_generation: Option<u32>,
        limit: Option<usize>,
    ) -> Vec<SingletonRecord> {
        let records = self.records.lock().await;
        let mut matched: Vec<SingletonRecord> = records
            .iter()
            .filter(|r| {
                r.launcher_id == launcher_id
                    && min_generation.is_none_or(|min| r.generation >= min)
                    && max_generation.is_none_or(|max| r.generation <= max)
            })
            .copied()
            .collect();
        matched.sort_by_key(|r| r.generation);
        if let Some(limit) = limit {
            matched.truncate(limit);
        }
        matched
    }

    async fn get_unconfirmed_singletons(&self, launcher_id: Bytes32) -> Vec<SingletonRecord> {
        let records = self.records.lock().await;
        let mut matched: Vec<SingletonRecord> = records
            .iter()
            .filter(|r| r.launcher_id == launcher_id && !r.confirmed)
            .copied()
            .collect();
        matched.sort_by_key(|r| r.generation);
        matched
    }

    async fn get_singletons_by_root(
        &self,
        launcher_id: Bytes32,
        root: Bytes32,
    ) -> Vec<SingletonRecord> {
        let records = self.records.lock().await;
        records
            .iter()
            .filter(|r| r.launcher_id == launcher_id && r.root == root)
            .copied()
            .collect()
    }

    async fn get_all_launchers(&self) -> Vec<Bytes32> {
        let launchers = self.launchers.lock().await;
        launchers.iter().map(|l| l.launcher_id).collect()
    }

    async fn add_singleton_record(&self, record: SingletonRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        if record.confirmed
            && records.iter().any(|r| {
                r.launcher_id == record.launcher_id
                    && r.generation == record.generation
                    && r.confirmed
                    && r.coin_id != record.coin_id
            })
        {
            return Err(DataLayerError::InvariantViolation(format!(
                "launcher {} already has a confirmed record at generation {}",
                record.launcher_id, record.generation
            )));
        }
        if let Some(existing) = records.iter_mut().find(|r| r.coin_id == record.coin_id) {
            *existing = record;
        } else {
            records.push(record);
        }
        Ok(())
    }

    async fn set_confirmed(&self, coin_id: Bytes32, height: u32, timestamp: u64) -> Result<()> {
        let mut records = self.records.lock().await;
        let record = records
            .iter_mut()
            .find(|r| r.coin_id == coin_id)
            .ok_or_else(|| {
                DataLayerError::InvariantViolation(format!(
                    "set_confirmed on unknown coin {coin_id}"
                ))
            })?;
        record.set_confirmed(height, timestamp);
        Ok(())
    }

    async fn delete_singleton_record(&self, coin_id: Bytes32) {
        let mut records = self.records.lock().await;
        records.retain(|r| r.coin_id != coin_id);
    }

    async fn delete_singleton_records_by_launcher_id(&self, launcher_id: Bytes32) {
        let mut records = self.records.lock().await;
        records.retain(|r| r.launcher_id != launcher_id);
    }

    async fn add_launcher(&self, info: LauncherInfo) -> Result<()> {
        let mut launchers = self.launchers.lock().await;
        if !launchers.iter().any(|l| l.launcher_id == info.launcher_id) {
            launchers.push(info);
        }
        Ok(())
    }

    async fn get_launcher(&self, launcher_id: Bytes32) -> Option<LauncherInfo> {
        let launchers = self.launchers.lock().await;
        launchers
            .iter()
            .find(|l| l.launcher_id == launcher_id)
            .copied()
    }

    async fn delete_launcher(&self, launcher_id: Bytes32) {
        let mut launchers = self.launchers.lock().await;
        launchers.retain(|l| l.launcher_id != launcher_id);
    }
}

/// In-memory [`TransactionStore`].
#[derive(Default)]
pub struct InMemoryTransactionStore {
    txs: Mutex<Vec<TransactionRecord>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, tx: TransactionRecord) {
        let mut txs = self.txs.lock().await;
        txs.push(tx);
    }

    async fn delete(&self, name: Bytes32) {
        let mut txs = self.txs.lock().await;
        txs.retain(|t| t.name != name);
    }

    async fn get(&self, name: Bytes32) -> Option<TransactionRecord> {
        let txs = self.txs.lock().await;
        txs.iter().find(|t| t.name == name).cloned()
    }

    async fn get_unconfirmed_for_standard_wallet(&self) -> Vec<TransactionRecord> {
        let txs = self.txs.lock().await;
        txs.iter().filter(|t| !t.confirmed).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LineageProof;

    fn genesis_record(launcher_id: Bytes32) -> SingletonRecord {
        SingletonRecord::new(
            launcher_id,
            Bytes32::new([1; 32]),
            Bytes32::new([2; 32]),
            1,
            LineageProof {
                parent_name: launcher_id,
                parent_inner_puzzle_hash: None,
                parent_amount: 1,
            },
            0,
            true,
            10,
            1000,
            false,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn add_then_get_latest() {
        let store = InMemorySingletonStore::new();
        let launcher_id = Bytes32::new([9; 32]);
        let record = genesis_record(launcher_id);
        store.add_singleton_record(record).await.unwrap();
        let latest = store.get_latest_singleton(launcher_id, true).await.unwrap();
        assert_eq!(latest.coin_id, record.coin_id);
    }

    #[tokio::test]
    async fn rejects_double_confirmed_generation() {
        let store = InMemorySingletonStore::new();
        let launcher_id = Bytes32::new([9; 32]);
        let record = genesis_record(launcher_id);
        store.add_singleton_record(record).await.unwrap();

        let mut other = record;
        other.root = Bytes32::new([7; 32]);
        other.coin_id = Bytes32::new([8; 32]);
        let err = store.add_singleton_record(other).await.unwrap_err();
        assert!(matches!(err, DataLayerError::InvariantViolation(_)));
    }
}
