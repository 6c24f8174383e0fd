use crate::domain::transaction::PaymentOutcome;
use crate::service::orchestrator::OrderRepository;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    inner: Arc<RwLock<HashMap<String, Vec<PaymentOutcome>>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self, order_id: &str) -> Vec<PaymentOutcome> {
        self.inner
            .read()
            .await
            .get(order_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn save_count(&self, order_id: &str) -> usize {
        self.records(order_id).await.len()
    }
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order_id: &str, outcome: &PaymentOutcome) -> Result<()> {
        self.inner
            .write()
            .await
            .entry(order_id.to_string())
            .or_default()
            .push(outcome.clone());
        Ok(())
    }
}
