//! Root folder resource
//!
//! Root folders are immutable in Sonarr: changing `path` replaces the
//! folder.

use crate::api::root_folder::{CreateRootFolderRequest, RootFolderResource, UnmappedFolder};
use crate::api::Client;
use crate::helpers::{
    call, client_error, configured_client, not_configured, to_model, to_state,
    UNEXPECTED_RESOURCE_CONFIGURE_TYPE,
};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
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
use tfplug::validator::StringPatternValidator;

const RESOURCE_NAME: &str = "root_folder";

/// POSIX `/...`, Windows drive `X:\...` or UNC `\\server\...`
const ABSOLUTE_PATH_PATTERN: &str = r"^(/|[A-Za-z]:\\|\\\\)";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootFolder {
    pub unmapped_folders: Option<Vec<Path>>,
    pub path: Option<String>,
    pub accessible: Option<bool>,
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub name: Option<String>,
    pub path: Option<String>,
}

impl RootFolder {
    pub fn write(&mut self, api: &RootFolderResource) {
        self.accessible = Some(api.accessible);
        self.id = api.id;
        self.path = Some(api.path.clone());
        self.unmapped_folders = Some(
            api.unmapped_folders
                .iter()
                .map(|folder| Path {
                    name: Some(folder.name.clone()),
                    path: Some(folder.path.clone()),
                })
                .collect(),
        );
    }

    pub fn read(&self) -> RootFolderResource {
        RootFolderResource {
            id: self.id,
            path: self.path.clone().unwrap_or_default(),
            accessible: self.accessible.unwrap_or_default(),
            unmapped_folders: self
                .unmapped_folders
                .iter()
                .flatten()
                .map(|folder| UnmappedFolder {
                    name: folder.name.clone().unwrap_or_default(),
                    path: folder.path.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }
}

fn absolute_path_validator() -> Option<StringPatternValidator> {
    match Regex::new(ABSOLUTE_PATH_PATTERN) {
        Ok(pattern) => Some(StringPatternValidator::new(
            pattern,
            "must be an absolute path",
        )),
        Err(e) => {
            tracing::error!("invalid root folder path pattern: {}", e);
            None
        }
    }
}

#[derive(Default)]
pub struct RootFolderResourceHandler {
    client: Option<Arc<Client>>,
}

impl RootFolderResourceHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        let mut path = AttributeBuilder::new("path", AttributeType::String)
            .description("Root Folder absolute path.")
            .required()
            .plan_modifier(RequiresReplace);
        if let Some(validator) = absolute_path_validator() {
            path = path.validator(validator);
        }

        SchemaBuilder::new()
            .description("Root Folder resource.")
            .attribute(path.build())
            .attribute(
                AttributeBuilder::new("accessible", AttributeType::Bool)
                    .description("Access flag.")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Root Folder ID.")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "unmapped_folders",
                    AttributeType::set(AttributeType::object([
                        ("name", AttributeType::String),
                        ("path", AttributeType::String),
                    ])),
                )
                .description("List of folders with no associated series.")
                .computed()
                .build(),
            )
            .build()
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.client.as_deref().ok_or_else(not_configured)
    }

    async fn create_folder(
        &self,
        ctx: &Context,
        planned: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let mut folder: RootFolder = to_model(planned)?;

        // Only the path is accepted on creation
        let request = CreateRootFolderRequest {
            path: folder.path.clone().unwrap_or_default(),
        };
        let created = call(ctx, client.root_folders().create(&request))
            .await
            .map_err(|e| client_error("create", RESOURCE_NAME, e))?;

        tracing::trace!("created {}: {}", RESOURCE_NAME, created.id.unwrap_or_default());
        folder.write(&created);
        to_state(&folder)
    }

    async fn read_folder(
        &self,
        ctx: &Context,
        current: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = self.client()?;
        let mut folder: RootFolder = to_model(current)?;
        let id = folder.id.unwrap_or_default();

        let response = match call(ctx, client.root_folders().get(id)).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                tracing::warn!("{} {} no longer exists, removing from state", RESOURCE_NAME, id);
                return Ok(None);
            }
            Err(e) => return Err(client_error("read", RESOURCE_NAME, e)),
        };

        tracing::trace!("read {}: {}", RESOURCE_NAME, id);
        folder.write(&response);
        to_state(&folder).map(Some)
    }

    async fn delete_folder(&self, ctx: &Context, prior: &DynamicValue) -> Result<(), Diagnostic> {
        let client = self.client()?;
        let folder: RootFolder = to_model(prior)?;
        let id = folder.id.unwrap_or_default();

        match call(ctx, client.root_folders().delete(id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(client_error("delete", RESOURCE_NAME, e)),
        }
        tracing::trace!("deleted {}: {}", RESOURCE_NAME, id);
        Ok(())
    }
}

#[async_trait]
impl Resource for RootFolderResourceHandler {
    fn type_name(&self) -> &str {
        "sonarr_root_folder"
    }

    async fn schema(&self, _ctx: Context, _request: ResourceSchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self.create_folder(&ctx, &request.planned_state).await {
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
        match self.read_folder(&ctx, &request.current_state).await {
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

    /// Never called with a changed path since that forces replacement
    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            diagnostics: vec![],
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let diagnostics = match self.delete_folder(&ctx, &request.prior_state).await {
            Ok(()) => vec![],
            Err(diag) => vec![diag],
        };
        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for RootFolderResourceHandler {
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
impl ResourceWithImportState for RootFolderResourceHandler {
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
