//! Storage handle for captured webhooks
//!
//! [`WebhookStore`] wraps the connection pool opened at startup. It is cheap to
//! clone and is the only way the rest of the application reaches the database.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::entities::webhook::{self, Column, Summary};
use crate::entities::Webhook;
use crate::error::StoreError;
use crate::id::RecordId;
use crate::page::{Page, PageRequest};

/// A request ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWebhook {
    pub method: String,
    pub pathname: String,
    pub ip: String,
    pub status_code: i32,
    pub content_type: Option<String>,
    pub content_length: Option<i32>,
    pub query_params: Option<BTreeMap<String, String>>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl NewWebhook {
    pub fn new(method: impl Into<String>, pathname: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            pathname: pathname.into(),
            ip: ip.into(),
            status_code: 200,
            content_type: None,
            content_length: None,
            query_params: None,
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookStore {
    db: DatabaseConnection,
}

impl WebhookStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Persist a captured request under a freshly generated id
    pub async fn insert(&self, webhook: NewWebhook) -> Result<webhook::Model, StoreError> {
        let id = RecordId::generate();
        self.insert_with(id, Utc::now(), webhook).await
    }

    /// Persist a record with a historical creation time.
    ///
    /// The id is derived from `created_at` so id order keeps following time order.
    pub async fn insert_at(
        &self,
        webhook: NewWebhook,
        created_at: DateTime<Utc>,
    ) -> Result<webhook::Model, StoreError> {
        self.insert_with(RecordId::at(created_at), created_at, webhook)
            .await
    }

    async fn insert_with(
        &self,
        id: RecordId,
        created_at: DateTime<Utc>,
        webhook: NewWebhook,
    ) -> Result<webhook::Model, StoreError> {
        let query_params = webhook
            .query_params
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let headers = serde_json::to_string(&webhook.headers)?;

        let record = webhook::ActiveModel {
            id: Set(id.to_string()),
            method: Set(webhook.method),
            pathname: Set(webhook.pathname),
            ip: Set(webhook.ip),
            status_code: Set(webhook.status_code),
            content_type: Set(webhook.content_type),
            content_length: Set(webhook.content_length),
            query_params: Set(query_params),
            headers: Set(headers),
            body: Set(webhook.body),
            created_at: Set(created_at),
        };

        let model = record.insert(&self.db).await?;
        debug!(id = %model.id, method = %model.method, pathname = %model.pathname, "Stored webhook");

        Ok(model)
    }

    pub async fn find(&self, id: &RecordId) -> Result<Option<webhook::Model>, StoreError> {
        let model = Webhook::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model)
    }

    /// Delete one record. Returns `false` when nothing matched.
    pub async fn delete(&self, id: &RecordId) -> Result<bool, StoreError> {
        let result = Webhook::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;

        debug!(%id, rows = result.rows_affected, "Deleted webhook");
        Ok(result.rows_affected > 0)
    }

    /// Newest-first page of summaries, see [`crate::page`]
    pub async fn list(&self, request: &PageRequest) -> Result<Page<Summary>, StoreError> {
        let mut query = Webhook::find()
            .select_only()
            .columns([Column::Id, Column::Method, Column::Pathname, Column::CreatedAt]);

        if let Some(cursor) = request.cursor {
            query = query.filter(Column::Id.lt(cursor.to_string()));
        }

        let rows = query
            .order_by_desc(Column::Id)
            .limit(request.limit.fetch_size())
            .into_model::<Summary>()
            .all(&self.db)
            .await?;

        Ok(Page::from_rows(rows, request.limit, |row| row.id.clone()))
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        Ok(Webhook::find().count(&self.db).await?)
    }

    /// Remove every record. Returns the number of rows deleted.
    pub async fn clear(&self) -> Result<u64, StoreError> {
        let result = Webhook::delete_many().exec(&self.db).await?;
        info!(rows = result.rows_affected, "Cleared webhooks table");
        Ok(result.rows_affected)
    }

    /// Close the underlying connection pool
    pub async fn close(self) -> Result<(), StoreError> {
        self.db.close().await?;
        Ok(())
    }
}
