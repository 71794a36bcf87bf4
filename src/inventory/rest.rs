//! REST 库存写入端：向 `pantry_items` 表批量 POST
//!
//! 行格式沿用后端表结构，owner_ref 落在 `user_id` 列。

use async_trait::async_trait;
use serde::Serialize;

use super::{InventoryRecord, InventorySink, SinkError};

#[derive(Serialize)]
struct PantryRow<'a> {
    user_id: &'a str,
    name: &'a str,
    category: &'a str,
    quantity: &'a str,
}

impl<'a> From<&'a InventoryRecord> for PantryRow<'a> {
    fn from(r: &'a InventoryRecord) -> Self {
        Self {
            user_id: &r.owner_ref,
            name: &r.name,
            category: &r.category,
            quantity: &r.quantity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestInventorySink {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RestInventorySink {
    /// endpoint 为完整表地址，如 `https://xyz.example.co/rest/v1/pantry_items`
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl InventorySink for RestInventorySink {
    async fn insert(&self, records: Vec<InventoryRecord>) -> Result<(), SinkError> {
        let rows: Vec<PantryRow<'_>> = records.iter().map(PantryRow::from).collect();
        let mut request = self
            .http
            .post(&self.endpoint)
            .header("Prefer", "return=minimal")
            .json(&rows);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected(format!("{}: {}", status, body)));
        }
        tracing::debug!("Inserted {} pantry rows", rows.len());
        Ok(())
    }
}
