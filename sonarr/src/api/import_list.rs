//! Import list API

use serde::{Deserialize, Serialize};

use super::{ApiError, Client, Field};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportListResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enable_automatic_add: bool,
    #[serde(default)]
    pub season_folder: bool,
    #[serde(default)]
    pub quality_profile_id: i64,
    #[serde(default)]
    pub should_monitor: String,
    #[serde(default)]
    pub root_folder_path: String,
    #[serde(default)]
    pub implementation: String,
    #[serde(default)]
    pub config_contract: String,
    #[serde(default)]
    pub series_type: String,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

pub struct ImportListsApi<'a> {
    client: &'a Client,
}

impl<'a> ImportListsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /importlist
    pub async fn list(&self) -> Result<Vec<ImportListResource>, ApiError> {
        self.client.get("/importlist").await
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn list_parses_fields() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v3/importlist")
            .with_body(
                r#"[{"id":3,"name":"trakt","enableAutomaticAdd":true,"seasonFolder":true,
                     "qualityProfileId":1,"shouldMonitor":"all","rootFolderPath":"/tv",
                     "implementation":"TraktListImport","configContract":"TraktListSettings",
                     "seriesType":"standard","tags":[1],"listType":"trakt",
                     "fields":[{"name":"limit","value":100},{"name":"listname","value":"fav"}]}]"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "key").unwrap();
        let lists = client.import_lists().list().await.unwrap();

        assert_eq!(lists[0].name, "trakt");
        assert_eq!(lists[0].fields[0], Field::new("limit", 100));
        assert_eq!(lists[0].series_type, "standard");
    }
}
