//! Root folder API

use serde::{Deserialize, Serialize};

use super::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmappedFolder {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootFolderResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub path: String,
    #[serde(default)]
    pub accessible: bool,
    #[serde(default)]
    pub unmapped_folders: Vec<UnmappedFolder>,
}

/// Request body for POST /rootfolder
#[derive(Debug, Serialize)]
pub struct CreateRootFolderRequest {
    pub path: String,
}

pub struct RootFoldersApi<'a> {
    client: &'a Client,
}

impl<'a> RootFoldersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /rootfolder
    pub async fn list(&self) -> Result<Vec<RootFolderResource>, ApiError> {
        self.client.get("/rootfolder").await
    }

    /// GET /rootfolder/{id}
    pub async fn get(&self, id: i64) -> Result<RootFolderResource, ApiError> {
        self.client.get(&format!("/rootfolder/{}", id)).await
    }

    /// POST /rootfolder
    pub async fn create(
        &self,
        request: &CreateRootFolderRequest,
    ) -> Result<RootFolderResource, ApiError> {
        self.client.post("/rootfolder", request).await
    }

    /// DELETE /rootfolder/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/rootfolder/{}", id)).await
    }
}
