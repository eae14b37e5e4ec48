use crate::api::Client;
use crate::helpers::{
    call, client_error, configured_client, data_source_error, find_by, not_configured, to_model,
    to_state, UNEXPECTED_DATA_SOURCE_CONFIGURE_TYPE,
};
use crate::resources::import_list_exclusion::ImportListExclusion;
use async_trait::async_trait;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, DynamicValue};

const DATA_SOURCE_NAME: &str = "import_list_exclusion";

#[derive(Default)]
pub struct ImportListExclusionDataSource {
    client: Option<Arc<Client>>,
}

impl ImportListExclusionDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .description("Single Import List Exclusion.")
            .attribute(
                AttributeBuilder::new("tvdb_id", AttributeType::Number)
                    .description("Series TVDB ID.")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("title", AttributeType::String)
                    .description("Series to be excluded.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Import List Exclusion ID.")
                    .computed()
                    .build(),
            )
            .build()
    }

    async fn find(&self, ctx: &Context, config: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let client = self.client.as_deref().ok_or_else(not_configured)?;
        let mut exclusion: ImportListExclusion = to_model(config)?;
        let tvdb_id = exclusion.tvdb_id.unwrap_or_default();

        let exclusions = call(ctx, client.import_list_exclusions().list())
            .await
            .map_err(|e| client_error("read", DATA_SOURCE_NAME, e))?;

        let found = find_by(exclusions, DATA_SOURCE_NAME, "tvdb_id", &tvdb_id, |e| &e.tvdb_id)
            .map_err(|e| data_source_error(DATA_SOURCE_NAME, &e))?;

        tracing::trace!("read {}: {}", DATA_SOURCE_NAME, tvdb_id);
        exclusion.write(&found);
        to_state(&exclusion)
    }
}

#[async_trait]
impl DataSource for ImportListExclusionDataSource {
    fn type_name(&self) -> &str {
        "sonarr_import_list_exclusion"
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
        match self.find(&ctx, &request.config).await {
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
impl DataSourceWithConfigure for ImportListExclusionDataSource {
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

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::provider_data::SonarrProviderData;
    use mockito::Server;
    use tfplug::types::AttributePath;

    const EXCLUSIONS: &str = r#"[
        {"id": 1, "tvdbId": 79168, "title": "Friends"},
        {"id": 2, "tvdbId": 81189, "title": "Breaking Bad"}
    ]"#;

    async fn read_with(server: &Server, tvdb_id: i64) -> ReadDataSourceResponse {
        let client = Client::new(&server.url(), "secret").unwrap();
        let mut data_source = ImportListExclusionDataSource::new();
        data_source
            .configure(
                Context::new(),
                ConfigureDataSourceRequest {
                    provider_data: Some(Arc::new(SonarrProviderData::new(client))),
                },
            )
            .await;

        let config = to_state(&ImportListExclusion {
            tvdb_id: Some(tvdb_id),
            ..Default::default()
        })
        .unwrap();
        data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "sonarr_import_list_exclusion".to_string(),
                    config,
                },
            )
            .await
    }

    #[tokio::test]
    async fn read_finds_exclusion_by_tvdb_id() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v3/importlistexclusion")
            .with_body(EXCLUSIONS)
            .create_async()
            .await;

        let response = read_with(&server, 81189).await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response.state.get_string(&AttributePath::new("title")).unwrap(),
            "Breaking Bad"
        );
        assert_eq!(response.state.get_i64(&AttributePath::new("id")).unwrap(), 2);
    }

    #[tokio::test]
    async fn read_reports_missing_exclusion() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v3/importlistexclusion")
            .with_body(EXCLUSIONS)
            .create_async()
            .await;

        let response = read_with(&server, 1).await;

        assert!(response.state.is_null());
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Data Source Error");
        assert_eq!(
            response.diagnostics[0].detail,
            "Unable to find import_list_exclusion, got error: data source not found: no import_list_exclusion with tvdb_id '1'"
        );
    }
}
