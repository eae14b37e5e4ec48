//! Import list exclusion resource

use crate::api::import_list_exclusion::ImportListExclusionResource as ExclusionApiModel;
use crate::api::Client;
use crate::helpers::{
    call, client_error, configured_client, not_configured, to_model, to_state,
    UNEXPECTED_RESOURCE_CONFIGURE_TYPE,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
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
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, DynamicValue};

const RESOURCE_NAME: &str = "import_list_exclusion";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportListExclusion {
    pub title: Option<String>,
    pub tvdb_id: Option<i64>,
    pub id: Option<i64>,
}

impl ImportListExclusion {
    pub fn write(&mut self, api: &ExclusionApiModel) {
        self.id = api.id;
        self.title = Some(api.title.clone());
        self.tvdb_id = Some(api.tvdb_id);
    }

    pub fn read(&self) -> ExclusionApiModel {
        ExclusionApiModel {
            id: self.id,
            tvdb_id: self.tvdb_id.unwrap_or_default(),
            title: self.title.clone().unwrap_or_default(),
        }
    }
}

#[derive(Default)]
pub struct ImportListExclusionResourceHandler {
    client: Option<Arc<Client>>,
}

impl ImportListExclusionResourceHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .description("Import List Exclusion resource.")
            .attribute(
                AttributeBuilder::new("tvdb_id", AttributeType::Number)
                    .description("Series TVDB ID.")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("title", AttributeType::String)
                    .description("Series to be excluded.")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Import List Exclusion ID.")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .build()
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.client.as_deref().ok_or_else(not_configured)
    }

    async fn create_exclusion(
        &self,
        ctx: &Context,
        planned: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let mut exclusion: ImportListExclusion = to_model(planned)?;

        let created = call(ctx, client.import_list_exclusions().create(&exclusion.read()))
            .await
            .map_err(|e| client_error("create", RESOURCE_NAME, e))?;

        tracing::trace!("created {}: {}", RESOURCE_NAME, created.id.unwrap_or_default());
        exclusion.write(&created);
        to_state(&exclusion)
    }

    async fn read_exclusion(
        &self,
        ctx: &Context,
        current: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = self.client()?;
        let mut exclusion: ImportListExclusion = to_model(current)?;
        let id = exclusion.id.unwrap_or_default();

        let response = match call(ctx, client.import_list_exclusions().get(id)).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                tracing::warn!("{} {} no longer exists, removing from state", RESOURCE_NAME, id);
                return Ok(None);
            }
            Err(e) => return Err(client_error("read", RESOURCE_NAME, e)),
        };

        tracing::trace!("read {}: {}", RESOURCE_NAME, id);
        exclusion.write(&response);
        to_state(&exclusion).map(Some)
    }

    async fn update_exclusion(
        &self,
        ctx: &Context,
        planned: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let mut exclusion: ImportListExclusion = to_model(planned)?;
        let id = exclusion.id.unwrap_or_default();

        let updated = call(
            ctx,
            client.import_list_exclusions().update(id, &exclusion.read()),
        )
        .await
        .map_err(|e| client_error("update", RESOURCE_NAME, e))?;

        tracing::trace!("updated {}: {}", RESOURCE_NAME, id);
        exclusion.write(&updated);
        to_state(&exclusion)
    }

    async fn delete_exclusion(&self, ctx: &Context, prior: &DynamicValue) -> Result<(), Diagnostic> {
        let client = self.client()?;
        let exclusion: ImportListExclusion = to_model(prior)?;
        let id = exclusion.id.unwrap_or_default();

        match call(ctx, client.import_list_exclusions().delete(id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(client_error("delete", RESOURCE_NAME, e)),
        }
        tracing::trace!("deleted {}: {}", RESOURCE_NAME, id);
        Ok(())
    }
}

#[async_trait]
impl Resource for ImportListExclusionResourceHandler {
    fn type_name(&self) -> &str {
        "sonarr_import_list_exclusion"
    }

    async fn schema(&self, _ctx: Context, _request: ResourceSchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self.create_exclusion(&ctx, &request.planned_state).await {
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
        match self.read_exclusion(&ctx, &request.current_state).await {
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
        match self.update_exclusion(&ctx, &request.planned_state).await {
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
        let diagnostics = match self.delete_exclusion(&ctx, &request.prior_state).await {
            Ok(()) => vec![],
            Err(diag) => vec![diag],
        };
        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ImportListExclusionResourceHandler {
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
impl ResourceWithImportState for ImportListExclusionResourceHandler {
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let response = tfplug::import_state_numeric_id(&request);
        if response.diagnostics.is_empty() {
            tracing::trace!("imported {}: {}", RESOURCE_NAME, request.id);
        }
        response
    }
}
