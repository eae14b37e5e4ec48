pub mod api;
pub mod data_sources;
pub mod helpers;
pub mod provider_data;
pub mod resources;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{DataSourceFactory, ProviderDataSource};
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, Provider, ProviderSchemaRequest,
    ProviderSchemaResponse,
};
use tfplug::resource::{ProviderResource, ResourceFactory};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};

use data_sources::{AllSeriesDataSource, ImportListDataSource, ImportListExclusionDataSource};
use provider_data::SonarrProviderData;
use resources::{
    ImportListExclusionResourceHandler, NotificationMailgunResource, NotificationPlexResource,
    RootFolderResourceHandler,
};

const URL_ENV: &str = "SONARR_URL";
const API_KEY_ENV: &str = "SONARR_API_KEY";

#[derive(Debug, Default, Deserialize)]
struct SonarrProviderModel {
    url: Option<String>,
    api_key: Option<String>,
}

#[derive(Default)]
pub struct SonarrProvider;

impl SonarrProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .description("The Sonarr provider is used to interact with Sonarr.")
            .attribute(
                AttributeBuilder::new("url", AttributeType::String)
                    .description("Full Sonarr URL with protocol and port (e.g. `https://test.sonarr.tv:8989`). You should NOT supply any path (`/api`), the SDK will use the appropriate paths. Can be specified via the `SONARR_URL` environment variable.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_key", AttributeType::String)
                    .description("API key for Sonarr authentication. Can be specified via the `SONARR_API_KEY` environment variable.")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .build()
    }
}

/// Configured value first, then the environment.
fn setting(configured: Option<String>, env: &str) -> Option<String> {
    configured
        .filter(|value| !value.is_empty())
        .or_else(|| std::env::var(env).ok().filter(|value| !value.is_empty()))
}

fn missing_setting(attribute: &str, env: &str) -> Diagnostic {
    Diagnostic::error(
        format!("Missing {} Configuration", attribute),
        format!(
            "While configuring the provider, the {} was not found in the {} environment variable or provider configuration block {} attribute.",
            attribute, env, attribute
        ),
    )
    .with_attribute(AttributePath::new(attribute))
}

#[async_trait]
impl Provider for SonarrProvider {
    fn type_name(&self) -> &str {
        "sonarr"
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut response = ConfigureProviderResponse {
            provider_data: None,
            diagnostics: vec![],
        };

        let config: SonarrProviderModel = match helpers::to_model(&request.config) {
            Ok(config) => config,
            Err(diag) => {
                response.diagnostics.push(diag);
                return response;
            }
        };

        let url = setting(config.url, URL_ENV);
        let api_key = setting(config.api_key, API_KEY_ENV);
        if url.is_none() {
            response.diagnostics.push(missing_setting("url", URL_ENV));
        }
        if api_key.is_none() {
            response.diagnostics.push(missing_setting("api_key", API_KEY_ENV));
        }
        let (Some(url), Some(api_key)) = (url, api_key) else {
            return response;
        };

        match api::Client::new(&url, &api_key) {
            Ok(client) => {
                tracing::debug!("configured sonarr client for {}", client.base_url());
                response.provider_data = Some(Arc::new(SonarrProviderData::new(client)));
            }
            Err(e) => response.diagnostics.push(
                Diagnostic::error(
                    "Unable to Create Sonarr API Client",
                    format!("An unexpected error occurred when creating the Sonarr API client: {}", e),
                )
                .with_attribute(AttributePath::new("url")),
            ),
        }
        response
    }

    fn resources(&self) -> Vec<ResourceFactory> {
        vec![
            new_notification_mailgun,
            new_notification_plex,
            new_root_folder,
            new_import_list_exclusion,
        ]
    }

    fn data_sources(&self) -> Vec<DataSourceFactory> {
        vec![
            new_import_list_data_source,
            new_import_list_exclusion_data_source,
            new_all_series_data_source,
        ]
    }
}

fn new_notification_mailgun() -> Box<dyn ProviderResource> {
    Box::new(NotificationMailgunResource::new())
}

fn new_notification_plex() -> Box<dyn ProviderResource> {
    Box::new(NotificationPlexResource::new())
}

fn new_root_folder() -> Box<dyn ProviderResource> {
    Box::new(RootFolderResourceHandler::new())
}

fn new_import_list_exclusion() -> Box<dyn ProviderResource> {
    Box::new(ImportListExclusionResourceHandler::new())
}

fn new_import_list_data_source() -> Box<dyn ProviderDataSource> {
    Box::new(ImportListDataSource::new())
}

fn new_import_list_exclusion_data_source() -> Box<dyn ProviderDataSource> {
    Box::new(ImportListExclusionDataSource::new())
}

fn new_all_series_data_source() -> Box<dyn ProviderDataSource> {
    Box::new(AllSeriesDataSource::new())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tfplug::types::{Dynamic, DynamicValue};

    fn config(url: Option<&str>, api_key: Option<&str>) -> DynamicValue {
        let value = |v: Option<&str>| v.map_or(Dynamic::Null, |s| Dynamic::String(s.to_string()));
        DynamicValue::new(tfplug::schema::object([
            ("url", value(url)),
            ("api_key", value(api_key)),
        ]))
    }

    async fn configure(config: DynamicValue) -> ConfigureProviderResponse {
        SonarrProvider::new()
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    terraform_version: "1.9.0".to_string(),
                    config,
                },
            )
            .await
    }

    fn clear_env() {
        std::env::remove_var(URL_ENV);
        std::env::remove_var(API_KEY_ENV);
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_from_attributes() {
        clear_env();

        let response = configure(config(Some("http://localhost:8989"), Some("key"))).await;

        assert!(response.diagnostics.is_empty());
        let data = response.provider_data.unwrap();
        let data = data.downcast_ref::<SonarrProviderData>().unwrap();
        assert_eq!(data.client.base_url(), "http://localhost:8989/api/v3");
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_from_env_vars() {
        std::env::set_var(URL_ENV, "http://sonarr:8989");
        std::env::set_var(API_KEY_ENV, "env-key");

        let response = configure(config(None, None)).await;

        assert!(response.diagnostics.is_empty());
        assert!(response.provider_data.is_some());
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_config_wins_over_env_vars() {
        std::env::set_var(URL_ENV, "http://from-env:8989");
        std::env::set_var(API_KEY_ENV, "env-key");

        let response = configure(config(Some("http://from-config:8989"), None)).await;

        let data = response.provider_data.unwrap();
        let data = data.downcast_ref::<SonarrProviderData>().unwrap();
        assert_eq!(data.client.base_url(), "http://from-config:8989/api/v3");
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_url_and_api_key() {
        clear_env();

        let response = configure(config(None, None)).await;

        assert!(response.provider_data.is_none());
        assert_eq!(response.diagnostics.len(), 2);
        assert_eq!(response.diagnostics[0].summary, "Missing url Configuration");
        assert!(response.diagnostics[0].detail.contains("SONARR_URL"));
        assert_eq!(response.diagnostics[1].summary, "Missing api_key Configuration");
        assert!(response.diagnostics[1].detail.contains("SONARR_API_KEY"));
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_rejects_invalid_url() {
        clear_env();

        let response = configure(config(Some("not a url"), Some("key"))).await;

        assert!(response.provider_data.is_none());
        assert_eq!(response.diagnostics[0].summary, "Unable to Create Sonarr API Client");
    }

    #[tokio::test]
    async fn provider_lists_every_type() {
        let provider = SonarrProvider::new();

        let mut resources: Vec<String> = provider
            .resources()
            .iter()
            .map(|factory| factory().type_name().to_string())
            .collect();
        resources.sort();
        assert_eq!(
            resources,
            vec![
                "sonarr_import_list_exclusion",
                "sonarr_notification_mailgun",
                "sonarr_notification_plex",
                "sonarr_root_folder",
            ]
        );

        let mut data_sources: Vec<String> = provider
            .data_sources()
            .iter()
            .map(|factory| factory().type_name().to_string())
            .collect();
        data_sources.sort();
        assert_eq!(
            data_sources,
            vec![
                "sonarr_all_series",
                "sonarr_import_list",
                "sonarr_import_list_exclusion",
            ]
        );
    }

    #[test]
    fn api_key_is_sensitive() {
        let schema = SonarrProvider::schema_static();

        assert!(schema.attribute("api_key").unwrap().sensitive);
        assert!(schema.attribute("url").unwrap().optional);
    }
}
