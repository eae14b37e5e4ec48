//! Series API

use serde::{Deserialize, Serialize};

use super::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResource {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_slug: String,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub season_folder: bool,
    #[serde(default)]
    pub use_scene_numbering: bool,
    #[serde(default)]
    pub language_profile_id: i64,
    #[serde(default)]
    pub quality_profile_id: i64,
    #[serde(default)]
    pub tvdb_id: i64,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub root_folder_path: String,
    #[serde(default)]
    pub tags: Vec<i64>,
}

pub struct SeriesApi<'a> {
    client: &'a Client,
}

impl<'a> SeriesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /series
    pub async fn list(&self) -> Result<Vec<SeriesResource>, ApiError> {
        self.client.get("/series").await
    }
}
