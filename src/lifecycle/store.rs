use crate::domain::transaction::Transaction;
use crate::errors::PaymentError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub type TransactionCell = Arc<Mutex<Transaction>>;

#[derive(Clone, Default)]
pub struct TransactionStore {
    inner: Arc<RwLock<HashMap<Uuid, TransactionCell>>>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, tx: Transaction) -> TransactionCell {
        let id = tx.id;
        let cell = Arc::new(Mutex::new(tx));
        self.inner.write().await.insert(id, cell.clone());
        cell
    }

    pub async fn cell(&self, id: Uuid) -> Result<TransactionCell, PaymentError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(PaymentError::UnknownTransaction(id))
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<Transaction, PaymentError> {
        let cell = self.cell(id).await?;
        let guard = cell.lock().await;
        Ok(guard.clone())
    }
}
