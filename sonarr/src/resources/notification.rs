//! Generic notification plumbing
//!
//! Every notification variant (Mailgun, Plex, ...) is stored by Sonarr as
//! the same `NotificationResource` with a variant specific `fields` list.
//! Variants convert their Terraform model to and from [`Notification`],
//! which owns the translation to the API shape, and share one resource
//! implementation through [`NotificationHandler`].

use crate::api::notification::NotificationResource;
use crate::api::{Client, Field};
use crate::helpers::{
    call, client_error, configured_client, not_configured, to_model, to_state,
    UNEXPECTED_RESOURCE_CONFIGURE_TYPE,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, ResourceWithImportState, UpdateResourceRequest,
    UpdateResourceResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema};
use tfplug::types::{Diagnostic, DynamicValue};

/// Union of every notification variant's attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub tags: Option<Vec<i64>>,
    pub on_grab: Option<bool>,
    pub on_download: Option<bool>,
    pub on_upgrade: Option<bool>,
    pub on_rename: Option<bool>,
    pub on_series_delete: Option<bool>,
    pub on_episode_file_delete: Option<bool>,
    pub on_episode_file_delete_for_upgrade: Option<bool>,
    pub on_health_issue: Option<bool>,
    pub on_application_update: Option<bool>,
    pub include_health_warnings: Option<bool>,
    // Field values
    pub api_key: Option<String>,
    pub use_eu_endpoint: Option<bool>,
    pub from: Option<String>,
    pub sender_domain: Option<String>,
    pub recipients: Option<Vec<String>>,
    pub host: Option<String>,
    pub port: Option<i64>,
    pub use_ssl: Option<bool>,
    pub auth_token: Option<String>,
    pub update_library: Option<bool>,
}

impl Notification {
    /// Copies an API notification into the generic model.
    pub fn write(&mut self, api: &NotificationResource) {
        self.id = api.id;
        self.name = Some(api.name.clone());
        self.tags = Some(api.tags.clone());
        self.on_grab = Some(api.on_grab);
        self.on_download = Some(api.on_download);
        self.on_upgrade = Some(api.on_upgrade);
        self.on_rename = Some(api.on_rename);
        self.on_series_delete = Some(api.on_series_delete);
        self.on_episode_file_delete = Some(api.on_episode_file_delete);
        self.on_episode_file_delete_for_upgrade = Some(api.on_episode_file_delete_for_upgrade);
        self.on_health_issue = Some(api.on_health_issue);
        self.on_application_update = Some(api.on_application_update);
        self.include_health_warnings = Some(api.include_health_warnings);
        self.write_fields(&api.fields);
    }

    /// Builds the API notification for the given variant.
    pub fn read(&self, implementation: &str, config_contract: &str) -> NotificationResource {
        NotificationResource {
            id: self.id,
            name: self.name.clone().unwrap_or_default(),
            implementation: implementation.to_string(),
            config_contract: config_contract.to_string(),
            fields: self.read_fields(),
            tags: self.tags.clone().unwrap_or_default(),
            on_grab: self.on_grab.unwrap_or_default(),
            on_download: self.on_download.unwrap_or_default(),
            on_upgrade: self.on_upgrade.unwrap_or_default(),
            on_rename: self.on_rename.unwrap_or_default(),
            on_series_delete: self.on_series_delete.unwrap_or_default(),
            on_episode_file_delete: self.on_episode_file_delete.unwrap_or_default(),
            on_episode_file_delete_for_upgrade: self
                .on_episode_file_delete_for_upgrade
                .unwrap_or_default(),
            on_health_issue: self.on_health_issue.unwrap_or_default(),
            on_application_update: self.on_application_update.unwrap_or_default(),
            include_health_warnings: self.include_health_warnings.unwrap_or_default(),
        }
    }

    /// Field values missing from the list stay null.
    pub fn write_fields(&mut self, fields: &[Field]) {
        self.api_key = None;
        self.use_eu_endpoint = None;
        self.from = None;
        self.sender_domain = None;
        self.recipients = None;
        self.host = None;
        self.port = None;
        self.use_ssl = None;
        self.auth_token = None;
        self.update_library = None;

        for field in fields {
            let value = &field.value;
            match field.name.as_str() {
                "apiKey" => self.api_key = string_value(value),
                "useEuEndpoint" => self.use_eu_endpoint = value.as_bool(),
                "from" => self.from = string_value(value),
                "senderDomain" => self.sender_domain = string_value(value),
                "recipients" => self.recipients = string_list(value),
                "host" => self.host = string_value(value),
                "port" => self.port = value.as_i64(),
                "useSsl" => self.use_ssl = value.as_bool(),
                "authToken" => self.auth_token = string_value(value),
                "updateLibrary" => self.update_library = value.as_bool(),
                other => tracing::trace!("ignoring notification field {}", other),
            }
        }
    }

    /// Only set values are sent.
    pub fn read_fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        if let Some(v) = &self.api_key {
            fields.push(Field::new("apiKey", v.as_str()));
        }
        if let Some(v) = self.use_eu_endpoint {
            fields.push(Field::new("useEuEndpoint", v));
        }
        if let Some(v) = &self.from {
            fields.push(Field::new("from", v.as_str()));
        }
        if let Some(v) = &self.sender_domain {
            fields.push(Field::new("senderDomain", v.as_str()));
        }
        if let Some(v) = &self.recipients {
            fields.push(Field::new("recipients", v.clone()));
        }
        if let Some(v) = &self.host {
            fields.push(Field::new("host", v.as_str()));
        }
        if let Some(v) = self.port {
            fields.push(Field::new("port", v));
        }
        if let Some(v) = self.use_ssl {
            fields.push(Field::new("useSsl", v));
        }
        if let Some(v) = &self.auth_token {
            fields.push(Field::new("authToken", v.as_str()));
        }
        if let Some(v) = self.update_library {
            fields.push(Field::new("updateLibrary", v));
        }
        fields
    }
}

fn string_value(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect()
    })
}

/// A Terraform model for one notification implementation.
pub trait NotificationVariant:
    Serialize + DeserializeOwned + Default + Send + Sync + 'static
{
    const TYPE_NAME: &'static str;
    /// Short name used in diagnostics and logs, e.g. `notification_mailgun`
    const KIND: &'static str;
    const IMPLEMENTATION: &'static str;
    const CONFIG_CONTRACT: &'static str;

    fn schema() -> Schema;
    fn id(&self) -> Option<i64>;
    fn to_notification(&self) -> Notification;
    fn from_notification(&mut self, notification: &Notification);

    /// API → model
    fn write(&mut self, api: &NotificationResource) {
        let mut notification = self.to_notification();
        notification.write(api);
        self.from_notification(&notification);
    }

    /// Model → API
    fn read(&self) -> NotificationResource {
        self.to_notification()
            .read(Self::IMPLEMENTATION, Self::CONFIG_CONTRACT)
    }
}

/// Attributes shared by every notification schema.
pub fn base_attributes(kind: &str) -> Vec<Attribute> {
    vec![
        AttributeBuilder::new("name", AttributeType::String)
            .description(&format!("{} name", kind))
            .required()
            .build(),
        AttributeBuilder::new("tags", AttributeType::set(AttributeType::Number))
            .description("List of associated tags")
            .optional()
            .computed()
            .build(),
        AttributeBuilder::new("id", AttributeType::Number)
            .description(&format!("{} ID", kind))
            .computed()
            .plan_modifier(UseStateForUnknown)
            .build(),
    ]
}

pub fn flag(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::Bool)
        .description(description)
        .required()
        .build()
}

/// Resource implementation shared by all notification variants
pub struct NotificationHandler<V> {
    client: Option<Arc<Client>>,
    variant: PhantomData<fn() -> V>,
}

impl<V> Default for NotificationHandler<V> {
    fn default() -> Self {
        Self {
            client: None,
            variant: PhantomData,
        }
    }
}

impl<V: NotificationVariant> NotificationHandler<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.client.as_deref().ok_or_else(not_configured)
    }

    async fn create_notification(
        &self,
        ctx: &Context,
        planned: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let mut model: V = to_model(planned)?;

        let created = call(ctx, client.notifications().create(&model.read()))
            .await
            .map_err(|e| client_error("create", V::KIND, e))?;

        tracing::trace!("created {}: {}", V::KIND, created.id.unwrap_or_default());
        model.write(&created);
        to_state(&model)
    }

    async fn read_notification(
        &self,
        ctx: &Context,
        current: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = self.client()?;
        let mut model: V = to_model(current)?;
        let id = model.id().unwrap_or_default();

        let notification = match call(ctx, client.notifications().get(id)).await {
            Ok(notification) => notification,
            Err(e) if e.is_not_found() => {
                tracing::warn!("{} {} no longer exists, removing from state", V::KIND, id);
                return Ok(None);
            }
            Err(e) => return Err(client_error("read", V::KIND, e)),
        };

        tracing::trace!("read {}: {}", V::KIND, id);
        model.write(&notification);
        to_state(&model).map(Some)
    }

    async fn update_notification(
        &self,
        ctx: &Context,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let prior: V = to_model(prior)?;
        let mut model: V = to_model(planned)?;
        let id = model.id().or(prior.id()).unwrap_or_default();

        let mut notification = model.read();
        notification.id = Some(id);
        let updated = call(ctx, client.notifications().update(id, &notification))
            .await
            .map_err(|e| client_error("update", V::KIND, e))?;

        tracing::trace!("updated {}: {}", V::KIND, id);
        model.write(&updated);
        to_state(&model)
    }

    async fn delete_notification(
        &self,
        ctx: &Context,
        prior: &DynamicValue,
    ) -> Result<(), Diagnostic> {
        let client = self.client()?;
        let model: V = to_model(prior)?;
        let id = model.id().unwrap_or_default();

        match call(ctx, client.notifications().delete(id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(client_error("delete", V::KIND, e)),
        }
        tracing::trace!("deleted {}: {}", V::KIND, id);
        Ok(())
    }
}

#[async_trait]
impl<V: NotificationVariant> Resource for NotificationHandler<V> {
    fn type_name(&self) -> &str {
        V::TYPE_NAME
    }

    async fn schema(&self, _ctx: Context, _request: ResourceSchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: V::schema(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self.create_notification(&ctx, &request.planned_state).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => CreateResourceResponse {
                new_state: DynamicValue::null(),
                diagnostics: vec![diag],
            },
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        match self.read_notification(&ctx, &request.current_state).await {
            Ok(new_state) => ReadResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![diag],
            },
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        match self
            .update_notification(&ctx, &request.prior_state, &request.planned_state)
            .await
        {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diag],
            },
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let diagnostics = match self.delete_notification(&ctx, &request.prior_state).await {
            Ok(()) => vec![],
            Err(diag) => vec![diag],
        };
        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl<V: NotificationVariant> ResourceWithConfigure for NotificationHandler<V> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        match configured_client(request.provider_data, UNEXPECTED_RESOURCE_CONFIGURE_TYPE) {
            Ok(client) => {
                self.client = client;
                ConfigureResourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(diag) => ConfigureResourceResponse {
                diagnostics: vec![diag],
            },
        }
    }
}

#[async_trait]
impl<V: NotificationVariant> ResourceWithImportState for NotificationHandler<V> {
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let response = tfplug::import_state_numeric_id(&request);
        if response.diagnostics.is_empty() {
            tracing::trace!("imported {}: {}", V::KIND, request.id);
        }
        response
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::provider_data::SonarrProviderData;
    use crate::resources::notification_plex::{NotificationPlex, NotificationPlexResource};
    use mockito::{Matcher, Server};
    use tfplug::types::AttributePath;

    const PLEX: &str = r#"{
        "id": 4,
        "name": "plex",
        "implementation": "PlexServer",
        "configContract": "PlexServerSettings",
        "onDownload": true,
        "tags": [],
        "fields": [
            {"name": "host", "value": "plex.lan"},
            {"name": "port", "value": 32400},
            {"name": "useSsl", "value": false},
            {"name": "authToken", "value": "token"},
            {"name": "updateLibrary", "value": true}
        ]
    }"#;

    async fn configured(server: &Server) -> NotificationPlexResource {
        let client = Client::new(&server.url(), "secret").unwrap();
        let mut handler = NotificationPlexResource::new();
        let response = handler
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(Arc::new(SonarrProviderData::new(client))),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
        handler
    }

    fn plex_state(id: Option<i64>, name: &str) -> DynamicValue {
        to_state(&NotificationPlex {
            id,
            name: Some(name.to_string()),
            host: Some("plex.lan".to_string()),
            auth_token: Some("token".to_string()),
            on_download: Some(true),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn read_of_deleted_notification_removes_it() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v3/notification/4")
            .with_status(404)
            .create_async()
            .await;

        let handler = configured(&server).await;
        let response = handler
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "sonarr_notification_plex".to_string(),
                    current_state: plex_state(Some(4), "plex"),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(response.new_state.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn imported_notification_is_filled_by_read() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v3/notification/4")
            .with_body(PLEX)
            .create_async()
            .await;

        let handler = configured(&server).await;
        let imported = handler
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "sonarr_notification_plex".to_string(),
                    id: "4".to_string(),
                },
            )
            .await;
        assert!(imported.diagnostics.is_empty());
        let state = imported.imported_resources[0].state.clone();

        let response = handler
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "sonarr_notification_plex".to_string(),
                    current_state: state,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = response.new_state.unwrap();
        assert_eq!(state.get_string(&AttributePath::new("host")).unwrap(), "plex.lan");
        assert_eq!(state.get_i64(&AttributePath::new("port")).unwrap(), 32400);
        assert_eq!(state.get_string(&AttributePath::new("auth_token")).unwrap(), "token");
        assert!(state.get_bool(&AttributePath::new("update_library")).unwrap());
    }

    #[tokio::test]
    async fn update_sends_prior_id_in_full_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v3/notification/4")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "id": 4,
                "name": "plex2",
                "implementation": "PlexServer",
                "configContract": "PlexServerSettings"
            })))
            .with_body(PLEX.replace(r#""name": "plex""#, r#""name": "plex2""#))
            .create_async()
            .await;

        let handler = configured(&server).await;
        let response = handler
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "sonarr_notification_plex".to_string(),
                    prior_state: plex_state(Some(4), "plex"),
                    planned_state: plex_state(None, "plex2"),
                    config: plex_state(None, "plex2"),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.new_state.get_i64(&AttributePath::new("id")).unwrap(), 4);
        assert_eq!(
            response.new_state.get_string(&AttributePath::new("name")).unwrap(),
            "plex2"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_ignores_missing_notification() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/v3/notification/4")
            .with_status(404)
            .create_async()
            .await;

        let handler = configured(&server).await;
        let response = handler
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "sonarr_notification_plex".to_string(),
                    prior_state: plex_state(Some(4), "plex"),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        mock.assert_async().await;
    }

    fn api_notification() -> NotificationResource {
        NotificationResource {
            id: Some(7),
            name: "plex".to_string(),
            implementation: "PlexServer".to_string(),
            config_contract: "PlexServerSettings".to_string(),
            fields: vec![
                Field::new("host", "plex.lan"),
                Field::new("port", 32400),
                Field::new("useSsl", false),
                Field::new("authToken", Value::Null),
                Field::new("unrelated", "x"),
            ],
            tags: vec![1, 2],
            on_download: true,
            on_rename: true,
            ..Default::default()
        }
    }

    #[test]
    fn write_copies_flags_and_known_fields() {
        let mut notification = Notification::default();
        notification.write(&api_notification());

        assert_eq!(notification.id, Some(7));
        assert_eq!(notification.tags, Some(vec![1, 2]));
        assert_eq!(notification.on_download, Some(true));
        assert_eq!(notification.on_grab, Some(false));
        assert_eq!(notification.host.as_deref(), Some("plex.lan"));
        assert_eq!(notification.port, Some(32400));
        assert_eq!(notification.use_ssl, Some(false));
        assert_eq!(notification.auth_token, None);
        assert_eq!(notification.recipients, None);
    }

    #[test]
    fn write_with_no_tags_yields_empty_set() {
        let mut notification = Notification::default();
        notification.write(&NotificationResource::default());
        assert_eq!(notification.tags, Some(vec![]));
    }

    #[test]
    fn read_emits_only_set_fields_and_injects_contract() {
        let notification = Notification {
            name: Some("mail".to_string()),
            from: Some("sonarr@example.com".to_string()),
            recipients: Some(vec!["me@example.com".to_string()]),
            ..Default::default()
        };

        let api = notification.read("Mailgun", "MailgunSettings");

        assert_eq!(api.implementation, "Mailgun");
        assert_eq!(api.config_contract, "MailgunSettings");
        assert_eq!(
            api.fields,
            vec![
                Field::new("from", "sonarr@example.com"),
                Field::new("recipients", vec!["me@example.com".to_string()]),
            ]
        );
    }

    #[test]
    fn write_fields_resets_previous_values() {
        let mut notification = Notification {
            host: Some("old".to_string()),
            ..Default::default()
        };
        notification.write_fields(&[Field::new("port", 80)]);

        assert_eq!(notification.host, None);
        assert_eq!(notification.port, Some(80));
    }
}
