use crate::api::series::SeriesResource;
use crate::api::Client;
use crate::helpers::{
    call, client_error, configured_client, not_configured, to_state,
    UNEXPECTED_DATA_SOURCE_CONFIGURE_TYPE,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, DynamicValue};

const DATA_SOURCE_NAME: &str = "series";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesList {
    pub id: Option<String>,
    pub series: Option<Vec<Series>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub tags: Option<Vec<i64>>,
    pub title: Option<String>,
    pub title_slug: Option<String>,
    pub path: Option<String>,
    pub root_folder_path: Option<String>,
    pub id: Option<i64>,
    pub tvdb_id: Option<i64>,
    pub quality_profile_id: Option<i64>,
    pub language_profile_id: Option<i64>,
    pub monitored: Option<bool>,
    pub season_folder: Option<bool>,
    pub use_scene_numbering: Option<bool>,
}

impl Series {
    pub fn write(&mut self, api: &SeriesResource) {
        self.tags = Some(api.tags.clone());
        self.title = Some(api.title.clone());
        self.title_slug = Some(api.title_slug.clone());
        self.path = Some(api.path.clone());
        self.root_folder_path = Some(api.root_folder_path.clone());
        self.id = Some(api.id);
        self.tvdb_id = Some(api.tvdb_id);
        self.quality_profile_id = Some(api.quality_profile_id);
        self.language_profile_id = Some(api.language_profile_id);
        self.monitored = Some(api.monitored);
        self.season_folder = Some(api.season_folder);
        self.use_scene_numbering = Some(api.use_scene_numbering);
    }
}

fn series_object_type() -> AttributeType {
    AttributeType::object([
        ("id", AttributeType::Number),
        ("title", AttributeType::String),
        ("title_slug", AttributeType::String),
        ("monitored", AttributeType::Bool),
        ("season_folder", AttributeType::Bool),
        ("use_scene_numbering", AttributeType::Bool),
        ("language_profile_id", AttributeType::Number),
        ("quality_profile_id", AttributeType::Number),
        ("tvdb_id", AttributeType::Number),
        ("path", AttributeType::String),
        ("root_folder_path", AttributeType::String),
        ("tags", AttributeType::set(AttributeType::Number)),
    ])
}

/// Every series known to Sonarr
#[derive(Default)]
pub struct AllSeriesDataSource {
    client: Option<Arc<Client>>,
}

impl AllSeriesDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .description("List all available Series.")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Number of series.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("series", AttributeType::set(series_object_type()))
                    .description("Series list.")
                    .computed()
                    .build(),
            )
            .build()
    }

    async fn list(&self, ctx: &Context) -> Result<DynamicValue, Diagnostic> {
        let client = self.client.as_deref().ok_or_else(not_configured)?;

        let response = call(ctx, client.series().list())
            .await
            .map_err(|e| client_error("read", DATA_SOURCE_NAME, e))?;

        tracing::trace!("read {}: {} items", DATA_SOURCE_NAME, response.len());
        let series = response
            .iter()
            .map(|api| {
                let mut series = Series::default();
                series.write(api);
                series
            })
            .collect::<Vec<_>>();

        to_state(&SeriesList {
            id: Some(series.len().to_string()),
            series: Some(series),
        })
    }
}

#[async_trait]
impl DataSource for AllSeriesDataSource {
    fn type_name(&self) -> &str {
        "sonarr_all_series"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        match self.list(&ctx).await {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(diag) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![diag],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for AllSeriesDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        match configured_client(request.provider_data, UNEXPECTED_DATA_SOURCE_CONFIGURE_TYPE) {
            Ok(client) => {
                self.client = client;
                ConfigureDataSourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(diag) => ConfigureDataSourceResponse {
                diagnostics: vec![diag],
            },
        }
    }
}
