//! Webhook entity for storing captured HTTP requests

use sea_orm::entity::prelude::*;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "webhooks")]
pub struct Model {
    /// Canonical UUIDv7 text, see [`crate::RecordId`]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub method: String,
    pub pathname: String,

    /// Client IP address
    pub ip: String,

    #[sea_orm(default_value = 200)]
    pub status_code: i32,

    pub content_type: Option<String>,
    pub content_length: Option<i32>,

    /// JSON-encoded query parameters: BTreeMap<String, String>
    #[sea_orm(column_type = "Text", nullable)]
    pub query_params: Option<String>,

    /// JSON-encoded headers: BTreeMap<String, String>
    #[sea_orm(column_type = "Text")]
    pub headers: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub body: Option<String>,

    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the stored header map
    pub fn header_map(&self) -> Result<BTreeMap<String, String>, serde_json::Error> {
        serde_json::from_str(&self.headers)
    }

    /// Decode the stored query parameters, if any were captured
    pub fn query_param_map(&self) -> Result<Option<BTreeMap<String, String>>, serde_json::Error> {
        self.query_params
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }
}

/// Columns needed to render the list view
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct Summary {
    pub id: String,
    pub method: String,
    pub pathname: String,
    pub created_at: ChronoDateTimeUtc,
}
