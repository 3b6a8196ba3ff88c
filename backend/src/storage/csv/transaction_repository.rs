//! # CSV Transaction Repository
//!
//! Stores each user's transactions in `{user_directory}/transactions.csv`:
//!
//! ```csv
//! id,kind,amount,category,description,date,created_at
//! transaction::income::9f1c…,income,180.0,receita,"Corridas do dia",2024-05-15T22:00:00+00:00,2024-05-15T22:01:13+00:00
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::connection::{parse_timestamp, read_records, write_records, CsvConnection};
use crate::domain::models::transaction::{Transaction, TransactionKind};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::{TransactionFilter, TransactionStorage};

const COLLECTION: &str = "transactions";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TransactionRecord {
    id: String,
    kind: String,
    amount: f64,
    category: String,
    description: String,
    date: String,
    created_at: String,
}

impl From<&Transaction> for TransactionRecord {
    fn from(transaction: &Transaction) -> Self {
        TransactionRecord {
            id: transaction.id.clone(),
            kind: transaction.kind.to_string(),
            amount: transaction.amount,
            category: transaction.category.clone(),
            description: transaction.description.clone(),
            date: transaction.date.to_rfc3339(),
            created_at: transaction.created_at.to_rfc3339(),
        }
    }
}

impl TransactionRecord {
    fn into_transaction(self, path: &Path) -> StorageResult<Transaction> {
        let kind = TransactionKind::from_string(&self.kind).map_err(|reason| StorageError::Corrupt {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Transaction {
            date: parse_timestamp(path, &self.date)?,
            created_at: parse_timestamp(path, &self.created_at)?,
            id: self.id,
            kind,
            amount: self.amount,
            category: self.category,
            description: self.description,
        })
    }
}

#[derive(Clone)]
pub struct TransactionRepository {
    connection: CsvConnection,
}

impl TransactionRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_transactions(&self, owner_id: &str) -> StorageResult<Vec<Transaction>> {
        let path = self.connection.collection_path(owner_id, COLLECTION);
        read_records::<TransactionRecord>(&path)?
            .into_iter()
            .map(|record| record.into_transaction(&path))
            .collect()
    }

    fn write_transactions(&self, owner_id: &str, transactions: &[Transaction]) -> StorageResult<()> {
        let path = self.connection.collection_path(owner_id, COLLECTION);
        let records: Vec<TransactionRecord> = transactions.iter().map(TransactionRecord::from).collect();
        write_records(&path, &records)
    }
}

#[async_trait]
impl TransactionStorage for TransactionRepository {
    async fn store_transaction(&self, owner_id: &str, transaction: &Transaction) -> StorageResult<()> {
        let _guard = self.connection.lock_writes().await;

        let mut transactions = self.read_transactions(owner_id)?;
        if transactions.iter().any(|t| t.id == transaction.id) {
            return Err(StorageError::AlreadyExists(transaction.id.clone()));
        }
        transactions.push(transaction.clone());
        self.write_transactions(owner_id, &transactions)?;
        info!("Stored transaction: {}", transaction.id);
        Ok(())
    }

    async fn put_transaction(&self, owner_id: &str, transaction: &Transaction) -> StorageResult<()> {
        let _guard = self.connection.lock_writes().await;

        let mut transactions = self.read_transactions(owner_id)?;
        match transactions.iter_mut().find(|t| t.id == transaction.id) {
            Some(existing) => *existing = transaction.clone(),
            None => transactions.push(transaction.clone()),
        }
        self.write_transactions(owner_id, &transactions)
    }

    async fn get_transaction(&self, owner_id: &str, transaction_id: &str) -> StorageResult<Option<Transaction>> {
        Ok(self
            .read_transactions(owner_id)?
            .into_iter()
            .find(|t| t.id == transaction_id))
    }

    async fn list_transactions(&self, owner_id: &str, filter: &TransactionFilter) -> StorageResult<Vec<Transaction>> {
        Ok(filter.apply(self.read_transactions(owner_id)?))
    }

    async fn delete_transaction(&self, owner_id: &str, transaction_id: &str) -> StorageResult<bool> {
        let _guard = self.connection.lock_writes().await;

        let mut transactions = self.read_transactions(owner_id)?;
        let before = transactions.len();
        transactions.retain(|t| t.id != transaction_id);
        if transactions.len() == before {
            return Ok(false);
        }
        self.write_transactions(owner_id, &transactions)?;
        Ok(true)
    }
}
