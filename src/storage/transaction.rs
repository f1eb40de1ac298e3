// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # Transactions
//!
//! Writes always take the open [`Transaction`] explicitly. Reads take an
//! optional one and fall back to the shared connection when none is given.
//!
//! [`TransactionContext`] tracks the transaction of a single request:
//!
//! ```text
//! NoTx -> Active -> { Committed, RolledBack }
//! ```
use sea_orm::DatabaseTransaction;
use tracing::warn;

use crate::error::DbContextExt;
use crate::storage::memory::MemoryTransaction;
use crate::storage::{StorageBackend, StorageError};

/// Open storage transaction.
///
/// Dropping the transaction without committing rolls it back.
pub enum Transaction {
    /// SQL database transaction.
    Sql(DatabaseTransaction),
    /// In-memory working copy.
    Memory(MemoryTransaction),
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sql(_) => f.write_str("Transaction::Sql"),
            Self::Memory(_) => f.write_str("Transaction::Memory"),
        }
    }
}

impl Transaction {
    pub async fn commit(self) -> Result<(), StorageError> {
        match self {
            Self::Sql(txn) => txn.commit().await.context("committing transaction")?,
            Self::Memory(txn) => txn.commit().await,
        }
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), StorageError> {
        match self {
            Self::Sql(txn) => txn.rollback().await.context("rolling back transaction")?,
            Self::Memory(txn) => drop(txn),
        }
        Ok(())
    }

    /// Commit when the result is `Ok`, roll back otherwise.
    pub async fn finish<T, E>(self, res: Result<T, E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        match res {
            Ok(val) => {
                self.commit().await?;
                Ok(val)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!("rolling back transaction failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }
}

#[derive(Debug, Default)]
enum TransactionState {
    #[default]
    NoTx,
    Active(Transaction),
    Committed,
    RolledBack,
}

/// Request scoped transaction holder.
#[derive(Debug, Default)]
pub struct TransactionContext {
    state: TransactionState,
}

impl TransactionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the transaction. Fails when one is already active.
    pub async fn begin(&mut self, storage: &dyn StorageBackend) -> Result<(), StorageError> {
        if self.is_active() {
            return Err(StorageError::Transaction(
                "transaction is already active".into(),
            ));
        }
        self.state = TransactionState::Active(storage.begin().await?);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TransactionState::Active(_))
    }

    /// Active transaction for reads.
    pub fn active(&self) -> Option<&Transaction> {
        match &self.state {
            TransactionState::Active(txn) => Some(txn),
            _ => None,
        }
    }

    /// Active transaction for writes.
    pub fn active_mut(&mut self) -> Result<&mut Transaction, StorageError> {
        match &mut self.state {
            TransactionState::Active(txn) => Ok(txn),
            _ => Err(StorageError::Transaction("no active transaction".into())),
        }
    }

    fn take_active(&mut self) -> Result<Transaction, StorageError> {
        match std::mem::take(&mut self.state) {
            TransactionState::Active(txn) => Ok(txn),
            other => {
                self.state = other;
                Err(StorageError::Transaction("no active transaction".into()))
            }
        }
    }

    pub async fn commit(&mut self) -> Result<(), StorageError> {
        let txn = self.take_active()?;
        self.state = TransactionState::Committed;
        txn.commit().await
    }

    pub async fn rollback(&mut self) -> Result<(), StorageError> {
        let txn = self.take_active()?;
        self.state = TransactionState::RolledBack;
        txn.rollback().await
    }

    /// Commit when the result is `Ok`, roll back otherwise.
    pub async fn finish<T, E>(&mut self, res: Result<T, E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let txn = self.take_active()?;
        match res {
            Ok(_) => self.state = TransactionState::Committed,
            Err(_) => self.state = TransactionState::RolledBack,
        }
        txn.finish(res).await
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.state, TransactionState::Committed)
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self.state, TransactionState::RolledBack)
    }
}

impl Drop for TransactionContext {
    fn drop(&mut self) {
        if self.is_active() {
            warn!("transaction context dropped with an active transaction, rolling back");
        }
    }
}
