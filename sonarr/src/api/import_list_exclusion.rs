//! Import list exclusion API

use serde::{Deserialize, Serialize};

use super::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportListExclusionResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub tvdb_id: i64,
    #[serde(default)]
    pub title: String,
}

pub struct ImportListExclusionsApi<'a> {
    client: &'a Client,
}

impl<'a> ImportListExclusionsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /importlistexclusion
    pub async fn list(&self) -> Result<Vec<ImportListExclusionResource>, ApiError> {
        self.client.get("/importlistexclusion").await
    }

    /// GET /importlistexclusion/{id}
    pub async fn get(&self, id: i64) -> Result<ImportListExclusionResource, ApiError> {
        self.client.get(&format!("/importlistexclusion/{}", id)).await
    }

    /// POST /importlistexclusion
    pub async fn create(
        &self,
        exclusion: &ImportListExclusionResource,
    ) -> Result<ImportListExclusionResource, ApiError> {
        self.client.post("/importlistexclusion", exclusion).await
    }

    /// PUT /importlistexclusion/{id}
    pub async fn update(
        &self,
        id: i64,
        exclusion: &ImportListExclusionResource,
    ) -> Result<ImportListExclusionResource, ApiError> {
        self.client
            .put(&format!("/importlistexclusion/{}", id), exclusion)
            .await
    }

    /// DELETE /importlistexclusion/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/importlistexclusion/{}", id))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn update_puts_full_object() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v3/importlistexclusion/5")
            .match_body(Matcher::Json(
                serde_json::json!({"id": 5, "tvdbId": 81189, "title": "Breaking Bad"}),
            ))
            .with_status(202)
            .with_body(r#"{"id":5,"tvdbId":81189,"title":"Breaking Bad"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let exclusion = ImportListExclusionResource {
            id: Some(5),
            tvdb_id: 81189,
            title: "Breaking Bad".to_string(),
        };
        let updated = client
            .import_list_exclusions()
            .update(5, &exclusion)
            .await
            .unwrap();

        assert_eq!(updated, exclusion);
        mock.assert_async().await;
    }
}
