//! Notification (connection) API

use serde::{Deserialize, Serialize};

use super::{ApiError, Client};

/// One entry of a provider specific settings list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Field {
    pub fn new(name: &str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub implementation: String,
    #[serde(default)]
    pub config_contract: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub on_grab: bool,
    #[serde(default)]
    pub on_download: bool,
    #[serde(default)]
    pub on_upgrade: bool,
    #[serde(default)]
    pub on_rename: bool,
    #[serde(default)]
    pub on_series_delete: bool,
    #[serde(default)]
    pub on_episode_file_delete: bool,
    #[serde(default)]
    pub on_episode_file_delete_for_upgrade: bool,
    #[serde(default)]
    pub on_health_issue: bool,
    #[serde(default)]
    pub on_application_update: bool,
    #[serde(default)]
    pub include_health_warnings: bool,
}

pub struct NotificationsApi<'a> {
    client: &'a Client,
}

impl<'a> NotificationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /notification
    pub async fn list(&self) -> Result<Vec<NotificationResource>, ApiError> {
        self.client.get("/notification").await
    }

    /// GET /notification/{id}
    pub async fn get(&self, id: i64) -> Result<NotificationResource, ApiError> {
        self.client.get(&format!("/notification/{}", id)).await
    }

    /// POST /notification
    pub async fn create(
        &self,
        notification: &NotificationResource,
    ) -> Result<NotificationResource, ApiError> {
        self.client.post("/notification", notification).await
    }

    /// PUT /notification/{id}
    pub async fn update(
        &self,
        id: i64,
        notification: &NotificationResource,
    ) -> Result<NotificationResource, ApiError> {
        self.client
            .put(&format!("/notification/{}", id), notification)
            .await
    }

    /// DELETE /notification/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/notification/{}", id)).await
    }
}
