//! gRPC service implementation of the Terraform Plugin Protocol v6.9
//!
//! Resources and data sources are created on demand from the provider's
//! factories, configured with the shared provider data and dropped when the
//! RPC completes. Schemas are collected once at startup.

use crate::context::{Context, StopSignal};
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceFactory, DataSourceSchemaRequest, ProviderDataSource,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::error::TfplugError;
use crate::plan_modifier::PlanModifyRequest;
use crate::proto::{self, ProviderService};
use crate::provider::{
    ConfigureProviderRequest, Provider, ProviderSchemaRequest, ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ProviderResource, ReadResourceRequest, ResourceFactory,
    ResourceSchemaRequest, UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::schema::{Attribute, Schema, StringKind};
use crate::types::{
    has_errors, AttributePath, AttributePathStep, Diagnostic, DiagnosticSeverity, Dynamic,
    DynamicValue,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Request, Response, Status};

type ProviderData = Arc<dyn Any + Send + Sync>;
type RpcResult<T> = std::result::Result<Response<T>, Status>;

pub struct GrpcProviderServer<P: Provider> {
    provider: Arc<P>,
    provider_schema: Schema,
    resources: HashMap<String, (ResourceFactory, Schema)>,
    data_sources: HashMap<String, (DataSourceFactory, Schema)>,
    init_diagnostics: Vec<Diagnostic>,
    provider_data: RwLock<Option<ProviderData>>,
    stop: StopSignal,
}

impl<P: Provider + 'static> GrpcProviderServer<P> {
    /// Instantiates every factory once to collect type names and schemas.
    pub async fn new(provider: P) -> Self {
        let stop = StopSignal::new();
        let mut init_diagnostics = Vec::new();

        let response = provider
            .schema(stop.context("GetProviderSchema"), ProviderSchemaRequest)
            .await;
        init_diagnostics.extend(response.diagnostics);
        let provider_schema = response.schema;

        let mut resources = HashMap::new();
        for factory in provider.resources() {
            let resource = factory();
            let type_name = resource.type_name().to_string();
            let ctx = stop
                .context("GetProviderSchema")
                .with_type_name(&type_name);
            let response = resource.schema(ctx, ResourceSchemaRequest).await;
            init_diagnostics.extend(response.diagnostics);
            resources.insert(type_name, (factory, response.schema));
        }

        let mut data_sources = HashMap::new();
        for factory in provider.data_sources() {
            let data_source = factory();
            let type_name = data_source.type_name().to_string();
            let ctx = stop
                .context("GetProviderSchema")
                .with_type_name(&type_name);
            let response = data_source.schema(ctx, DataSourceSchemaRequest).await;
            init_diagnostics.extend(response.diagnostics);
            data_sources.insert(type_name, (factory, response.schema));
        }

        tracing::debug!(
            provider = provider.type_name(),
            resources = resources.len(),
            data_sources = data_sources.len(),
            "collected provider schemas"
        );

        Self {
            provider: Arc::new(provider),
            provider_schema,
            resources,
            data_sources,
            init_diagnostics,
            provider_data: RwLock::new(None),
            stop,
        }
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    fn context(&self, rpc: &'static str, type_name: &str) -> Context {
        self.stop.context(rpc).with_type_name(type_name)
    }

    fn resource_entry(&self, type_name: &str) -> Result<&(ResourceFactory, Schema), Status> {
        self.resources
            .get(type_name)
            .ok_or_else(|| TfplugError::ResourceNotFound(type_name.to_string()).into())
    }

    fn data_source_entry(&self, type_name: &str) -> Result<&(DataSourceFactory, Schema), Status> {
        self.data_sources
            .get(type_name)
            .ok_or_else(|| TfplugError::DataSourceNotFound(type_name.to_string()).into())
    }

    async fn configured_resource(
        &self,
        ctx: &Context,
        factory: ResourceFactory,
    ) -> (Box<dyn ProviderResource>, Vec<Diagnostic>) {
        let mut resource = factory();
        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(ctx.clone(), ConfigureResourceRequest { provider_data })
            .await;
        (resource, response.diagnostics)
    }

    async fn configured_data_source(
        &self,
        ctx: &Context,
        factory: DataSourceFactory,
    ) -> (Box<dyn ProviderDataSource>, Vec<Diagnostic>) {
        let mut data_source = factory();
        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;
        (data_source, response.diagnostics)
    }
}

#[tonic::async_trait]
impl<P: Provider + 'static> ProviderService for GrpcProviderServer<P> {
    async fn get_metadata(
        &self,
        _request: Request<proto::get_metadata::Request>,
    ) -> RpcResult<proto::get_metadata::Response> {
        let mut resources: Vec<_> = self
            .resources
            .keys()
            .map(|type_name| proto::get_metadata::ResourceMetadata {
                type_name: type_name.clone(),
            })
            .collect();
        resources.sort_by(|a, b| a.type_name.cmp(&b.type_name));

        let mut data_sources: Vec<_> = self
            .data_sources
            .keys()
            .map(|type_name| proto::get_metadata::DataSourceMetadata {
                type_name: type_name.clone(),
            })
            .collect();
        data_sources.sort_by(|a, b| a.type_name.cmp(&b.type_name));

        Ok(Response::new(proto::get_metadata::Response {
            server_capabilities: Some(server_capabilities()),
            diagnostics: diagnostics_to_proto(self.init_diagnostics.clone()),
            data_sources,
            resources,
            functions: vec![],
            ephemeral_resources: vec![],
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<proto::get_provider_schema::Request>,
    ) -> RpcResult<proto::get_provider_schema::Response> {
        let resource_schemas = self
            .resources
            .iter()
            .map(|(name, (_, schema))| (name.clone(), schema_to_proto(schema)))
            .collect();
        let data_source_schemas = self
            .data_sources
            .iter()
            .map(|(name, (_, schema))| (name.clone(), schema_to_proto(schema)))
            .collect();

        Ok(Response::new(proto::get_provider_schema::Response {
            provider: Some(schema_to_proto(&self.provider_schema)),
            resource_schemas,
            data_source_schemas,
            diagnostics: diagnostics_to_proto(self.init_diagnostics.clone()),
            provider_meta: None,
            server_capabilities: Some(server_capabilities()),
            functions: HashMap::new(),
            ephemeral_resource_schemas: HashMap::new(),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<proto::validate_provider_config::Request>,
    ) -> RpcResult<proto::validate_provider_config::Response> {
        let req = request.into_inner();
        let config = decode_value(req.config.as_ref())?;

        let mut diagnostics = check_config(&self.provider_schema, &config);
        let ctx = self.context("ValidateProviderConfig", self.provider.type_name());
        let response = self
            .provider
            .validate(ctx, ValidateProviderConfigRequest { config })
            .await;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_provider_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<proto::validate_resource_config::Request>,
    ) -> RpcResult<proto::validate_resource_config::Response> {
        let req = request.into_inner();
        let (factory, schema) = self.resource_entry(&req.type_name)?;
        let config = decode_value(req.config.as_ref())?;

        let mut diagnostics = check_config(schema, &config);
        let ctx = self.context("ValidateResourceConfig", &req.type_name);
        let response = factory()
            .validate(
                ctx,
                ValidateResourceConfigRequest {
                    type_name: req.type_name,
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<proto::validate_data_resource_config::Request>,
    ) -> RpcResult<proto::validate_data_resource_config::Response> {
        let req = request.into_inner();
        let (factory, schema) = self.data_source_entry(&req.type_name)?;
        let config = decode_value(req.config.as_ref())?;

        let mut diagnostics = check_config(schema, &config);
        let ctx = self.context("ValidateDataResourceConfig", &req.type_name);
        let response = factory()
            .validate(
                ctx,
                ValidateDataSourceConfigRequest {
                    type_name: req.type_name,
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        Ok(Response::new(proto::validate_data_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<proto::upgrade_resource_state::Request>,
    ) -> RpcResult<proto::upgrade_resource_state::Response> {
        let req = request.into_inner();
        let (_, schema) = self.resource_entry(&req.type_name)?;

        let raw = req.raw_state.unwrap_or_default();
        if raw.json.is_empty() && !raw.flatmap.is_empty() {
            return Ok(Response::new(proto::upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_to_proto(vec![Diagnostic::error(
                    "Unable to Upgrade Resource State",
                    format!(
                        "Flatmap state from schema version {} is not supported for {}.",
                        req.version, req.type_name
                    ),
                )]),
            }));
        }

        // Only one schema version exists, so upgrading re-shapes the stored JSON.
        let state = DynamicValue::decode_json(&raw.json)?;
        let upgraded = DynamicValue::new(schema.normalize(state.value));
        tracing::trace!(type_name = %req.type_name, version = req.version, "upgraded state");

        Ok(Response::new(proto::upgrade_resource_state::Response {
            upgraded_state: Some(encode_value(&upgraded)?),
            diagnostics: vec![],
        }))
    }

    async fn get_resource_identity_schemas(
        &self,
        _request: Request<proto::get_resource_identity_schemas::Request>,
    ) -> RpcResult<proto::get_resource_identity_schemas::Response> {
        Ok(Response::new(proto::get_resource_identity_schemas::Response {
            identity_schemas: HashMap::new(),
            diagnostics: vec![],
        }))
    }

    async fn upgrade_resource_identity(
        &self,
        request: Request<proto::upgrade_resource_identity::Request>,
    ) -> RpcResult<proto::upgrade_resource_identity::Response> {
        let req = request.into_inner();
        Ok(Response::new(proto::upgrade_resource_identity::Response {
            upgraded_identity: None,
            diagnostics: unsupported("Resource identity", &req.type_name),
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<proto::configure_provider::Request>,
    ) -> RpcResult<proto::configure_provider::Response> {
        let req = request.into_inner();
        let config = decode_value(req.config.as_ref())?;
        tracing::debug!(terraform_version = %req.terraform_version, "configuring provider");

        let ctx = self.context("ConfigureProvider", self.provider.type_name());
        let response = self
            .provider
            .configure(
                ctx,
                ConfigureProviderRequest {
                    terraform_version: req.terraform_version,
                    config,
                },
            )
            .await;

        if !has_errors(&response.diagnostics) {
            *self.provider_data.write().await = response.provider_data;
        }

        Ok(Response::new(proto::configure_provider::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<proto::read_resource::Request>,
    ) -> RpcResult<proto::read_resource::Response> {
        let req = request.into_inner();
        let (factory, schema) = self.resource_entry(&req.type_name)?;
        let current_state = decode_value(req.current_state.as_ref())?;

        let mut response = proto::read_resource::Response {
            new_state: req.current_state.clone(),
            diagnostics: vec![],
            private: req.private,
            deferred: None,
            new_identity: None,
        };
        if current_state.is_null() {
            return Ok(Response::new(response));
        }

        let ctx = self.context("ReadResource", &req.type_name);
        let (resource, mut diagnostics) = self.configured_resource(&ctx, *factory).await;
        if !has_errors(&diagnostics) {
            let read = resource
                .read(
                    ctx,
                    ReadResourceRequest {
                        type_name: req.type_name.clone(),
                        current_state,
                    },
                )
                .await;
            let failed = has_errors(&read.diagnostics);
            diagnostics.extend(read.diagnostics);
            if !failed {
                // None removes the resource from state.
                let new_state = read
                    .new_state
                    .map(|state| DynamicValue::new(schema.normalize(state.value)))
                    .unwrap_or_else(DynamicValue::null);
                response.new_state = Some(encode_value(&new_state)?);
            }
        }

        response.diagnostics = diagnostics_to_proto(diagnostics);
        Ok(Response::new(response))
    }

    async fn plan_resource_change(
        &self,
        request: Request<proto::plan_resource_change::Request>,
    ) -> RpcResult<proto::plan_resource_change::Response> {
        let req = request.into_inner();
        let (_, schema) = self.resource_entry(&req.type_name)?;
        let prior_state = decode_value(req.prior_state.as_ref())?;
        let proposed_new_state = decode_value(req.proposed_new_state.as_ref())?;
        let config = decode_value(req.config.as_ref())?;

        let planned = plan_change(
            schema,
            &prior_state.value,
            proposed_new_state.value,
            &config.value,
        );
        tracing::trace!(
            type_name = %req.type_name,
            replace = planned.requires_replace.len(),
            "planned resource change"
        );

        Ok(Response::new(proto::plan_resource_change::Response {
            planned_state: Some(encode_value(&DynamicValue::new(planned.state))?),
            requires_replace: planned.requires_replace.iter().map(path_to_proto).collect(),
            planned_private: req.prior_private,
            diagnostics: diagnostics_to_proto(planned.diagnostics),
            legacy_type_system: false,
            deferred: None,
            planned_identity: None,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<proto::apply_resource_change::Request>,
    ) -> RpcResult<proto::apply_resource_change::Response> {
        let req = request.into_inner();
        let (factory, schema) = self.resource_entry(&req.type_name)?;
        let prior_state = decode_value(req.prior_state.as_ref())?;
        let planned_state = decode_value(req.planned_state.as_ref())?;
        let config = decode_value(req.config.as_ref())?;

        let ctx = self.context("ApplyResourceChange", &req.type_name);
        let (resource, mut diagnostics) = self.configured_resource(&ctx, *factory).await;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::apply_resource_change::Response {
                new_state: Some(encode_value(&prior_state)?),
                private: req.planned_private,
                diagnostics: diagnostics_to_proto(diagnostics),
                legacy_type_system: false,
                new_identity: None,
            }));
        }

        let type_name = req.type_name.clone();
        let new_state = if planned_state.is_null() {
            let response = resource
                .delete(
                    ctx,
                    DeleteResourceRequest {
                        type_name,
                        prior_state: prior_state.clone(),
                    },
                )
                .await;
            let failed = has_errors(&response.diagnostics);
            diagnostics.extend(response.diagnostics);
            if failed {
                prior_state
            } else {
                DynamicValue::null()
            }
        } else if prior_state.is_null() {
            let response = resource
                .create(
                    ctx,
                    CreateResourceRequest {
                        type_name,
                        planned_state,
                        config,
                    },
                )
                .await;
            let failed = has_errors(&response.diagnostics);
            diagnostics.extend(response.diagnostics);
            if failed {
                DynamicValue::null()
            } else {
                DynamicValue::new(schema.normalize(response.new_state.value))
            }
        } else {
            let response = resource
                .update(
                    ctx,
                    UpdateResourceRequest {
                        type_name,
                        prior_state: prior_state.clone(),
                        planned_state,
                        config,
                    },
                )
                .await;
            let failed = has_errors(&response.diagnostics);
            diagnostics.extend(response.diagnostics);
            if failed {
                prior_state
            } else {
                DynamicValue::new(schema.normalize(response.new_state.value))
            }
        };

        Ok(Response::new(proto::apply_resource_change::Response {
            new_state: Some(encode_value(&new_state)?),
            private: req.planned_private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
            new_identity: None,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<proto::import_resource_state::Request>,
    ) -> RpcResult<proto::import_resource_state::Response> {
        let req = request.into_inner();
        let (factory, schema) = self.resource_entry(&req.type_name)?;

        let ctx = self.context("ImportResourceState", &req.type_name);
        let (resource, mut diagnostics) = self.configured_resource(&ctx, *factory).await;
        let mut imported_resources = Vec::new();
        if !has_errors(&diagnostics) {
            let response = resource
                .import_state(
                    ctx,
                    ImportResourceStateRequest {
                        type_name: req.type_name,
                        id: req.id,
                    },
                )
                .await;
            diagnostics.extend(response.diagnostics);
            for imported in response.imported_resources {
                let state = DynamicValue::new(schema.normalize(imported.state.value));
                imported_resources.push(proto::import_resource_state::ImportedResource {
                    type_name: imported.type_name,
                    state: Some(encode_value(&state)?),
                    private: vec![],
                    identity: None,
                });
            }
        }

        Ok(Response::new(proto::import_resource_state::Response {
            imported_resources,
            diagnostics: diagnostics_to_proto(diagnostics),
            deferred: None,
        }))
    }

    async fn move_resource_state(
        &self,
        request: Request<proto::move_resource_state::Request>,
    ) -> RpcResult<proto::move_resource_state::Response> {
        let req = request.into_inner();
        Ok(Response::new(proto::move_resource_state::Response {
            target_state: None,
            diagnostics: unsupported("Moving resource state", &req.target_type_name),
            target_private: vec![],
            target_identity: None,
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<proto::read_data_source::Request>,
    ) -> RpcResult<proto::read_data_source::Response> {
        let req = request.into_inner();
        let (factory, schema) = self.data_source_entry(&req.type_name)?;
        let config = decode_value(req.config.as_ref())?;

        let ctx = self.context("ReadDataSource", &req.type_name);
        let (data_source, mut diagnostics) = self.configured_data_source(&ctx, *factory).await;
        let mut state = DynamicValue::null();
        if !has_errors(&diagnostics) {
            let response = data_source
                .read(
                    ctx,
                    ReadDataSourceRequest {
                        type_name: req.type_name,
                        config,
                    },
                )
                .await;
            if !has_errors(&response.diagnostics) {
                state = DynamicValue::new(schema.normalize(response.state.value));
            }
            diagnostics.extend(response.diagnostics);
        }

        Ok(Response::new(proto::read_data_source::Response {
            state: Some(encode_value(&state)?),
            diagnostics: diagnostics_to_proto(diagnostics),
            deferred: None,
        }))
    }

    async fn get_functions(
        &self,
        _request: Request<proto::get_functions::Request>,
    ) -> RpcResult<proto::get_functions::Response> {
        Ok(Response::new(proto::get_functions::Response {
            functions: HashMap::new(),
            diagnostics: vec![],
        }))
    }

    async fn call_function(
        &self,
        request: Request<proto::call_function::Request>,
    ) -> RpcResult<proto::call_function::Response> {
        let req = request.into_inner();
        Ok(Response::new(proto::call_function::Response {
            result: None,
            error: Some(proto::FunctionError {
                text: format!("Function {} is not defined by this provider", req.name),
                function_argument: None,
            }),
        }))
    }

    async fn validate_ephemeral_resource_config(
        &self,
        request: Request<proto::validate_ephemeral_resource_config::Request>,
    ) -> RpcResult<proto::validate_ephemeral_resource_config::Response> {
        let req = request.into_inner();
        Ok(Response::new(
            proto::validate_ephemeral_resource_config::Response {
                diagnostics: unsupported("Ephemeral resource", &req.type_name),
            },
        ))
    }

    async fn open_ephemeral_resource(
        &self,
        request: Request<proto::open_ephemeral_resource::Request>,
    ) -> RpcResult<proto::open_ephemeral_resource::Response> {
        let req = request.into_inner();
        Ok(Response::new(proto::open_ephemeral_resource::Response {
            diagnostics: unsupported("Ephemeral resource", &req.type_name),
            renew_at: None,
            result: None,
            private: None,
            deferred: None,
        }))
    }

    async fn renew_ephemeral_resource(
        &self,
        request: Request<proto::renew_ephemeral_resource::Request>,
    ) -> RpcResult<proto::renew_ephemeral_resource::Response> {
        let req = request.into_inner();
        Ok(Response::new(proto::renew_ephemeral_resource::Response {
            diagnostics: unsupported("Ephemeral resource", &req.type_name),
            renew_at: None,
            private: None,
        }))
    }

    async fn close_ephemeral_resource(
        &self,
        _request: Request<proto::close_ephemeral_resource::Request>,
    ) -> RpcResult<proto::close_ephemeral_resource::Response> {
        Ok(Response::new(proto::close_ephemeral_resource::Response {
            diagnostics: vec![],
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<proto::stop_provider::Request>,
    ) -> RpcResult<proto::stop_provider::Response> {
        tracing::info!("stop requested, cancelling in-flight operations");
        self.stop.stop();
        Ok(Response::new(proto::stop_provider::Response {
            error: String::new(),
        }))
    }
}

/// Result of planning one resource instance.
#[derive(Debug)]
pub(crate) struct PlannedChange {
    pub state: Dynamic,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

pub(crate) fn plan_change(
    schema: &Schema,
    prior: &Dynamic,
    proposed: Dynamic,
    config: &Dynamic,
) -> PlannedChange {
    let mut change = PlannedChange {
        state: Dynamic::Null,
        requires_replace: Vec::new(),
        diagnostics: Vec::new(),
    };
    // Destroy plans pass the null through.
    if proposed.is_null() {
        return change;
    }

    let mut planned = schema.normalize(proposed);
    let prior = schema.normalize(prior.clone());
    let configured = |name: &str| config.get(name).is_some_and(|v| !v.is_null());

    if let Dynamic::Map(fields) = &mut planned {
        if prior.is_null() || prior != Dynamic::Map(fields.clone()) {
            for attr in schema.block.attributes.iter().filter(|a| a.computed) {
                if !configured(&attr.name) {
                    fields.insert(attr.name.clone(), Dynamic::Unknown);
                }
            }
        }

        for attr in schema
            .block
            .attributes
            .iter()
            .filter(|a| !a.plan_modifiers.is_empty())
        {
            let path = AttributePath::new(&attr.name);
            let mut value = fields.remove(&attr.name).unwrap_or(Dynamic::Null);
            for modifier in &attr.plan_modifiers {
                let response = modifier.modify_plan(PlanModifyRequest {
                    state: prior.get(&attr.name).cloned().unwrap_or(Dynamic::Null),
                    plan: value,
                    config: config.get(&attr.name).cloned().unwrap_or(Dynamic::Null),
                    attribute_path: path.clone(),
                });
                value = response.plan_value;
                if response.requires_replace && !change.requires_replace.contains(&path) {
                    change.requires_replace.push(path.clone());
                }
                change.diagnostics.extend(response.diagnostics);
            }
            fields.insert(attr.name.clone(), value);
        }
    }

    change.state = planned;
    change
}

/// Framework checks shared by all validate RPCs.
pub(crate) fn check_config(schema: &Schema, config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for attr in &schema.block.attributes {
        let value = config.value.get(&attr.name).unwrap_or(&Dynamic::Null);
        let path = AttributePath::new(&attr.name);

        if attr.required && value.is_null() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing Configuration for Required Attribute",
                    format!(
                        "Must set a configuration value for the {} attribute as the provider has marked it as required.",
                        attr.name
                    ),
                )
                .with_attribute(path),
            );
            continue;
        }
        if attr.is_read_only() && !value.is_null() {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid Configuration for Read-Only Attribute",
                    format!(
                        "Cannot set value for the {} attribute as the provider has marked it as read-only. Remove the configuration line setting the value.",
                        attr.name
                    ),
                )
                .with_attribute(path),
            );
            continue;
        }
        if !value.is_null() && value.is_fully_known() {
            for validator in &attr.validators {
                validator.validate(value, &path, &mut diagnostics);
            }
        }
    }
    diagnostics
}

fn unsupported(feature: &str, type_name: &str) -> Vec<proto::Diagnostic> {
    diagnostics_to_proto(vec![Diagnostic::error(
        "Unsupported Operation",
        format!("{} is not supported by this provider ({}).", feature, type_name),
    )])
}

fn server_capabilities() -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: true,
        get_provider_schema_optional: false,
        move_resource_state: false,
    }
}

#[allow(clippy::result_large_err)]
fn decode_value(value: Option<&proto::DynamicValue>) -> std::result::Result<DynamicValue, Status> {
    let Some(value) = value else {
        return Ok(DynamicValue::null());
    };
    let decoded = if !value.msgpack.is_empty() {
        DynamicValue::decode_msgpack(&value.msgpack)?
    } else {
        DynamicValue::decode_json(&value.json)?
    };
    Ok(decoded)
}

#[allow(clippy::result_large_err)]
fn encode_value(value: &DynamicValue) -> std::result::Result<proto::DynamicValue, Status> {
    Ok(proto::DynamicValue {
        msgpack: value.encode_msgpack()?,
        json: vec![],
    })
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<proto::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|d| proto::Diagnostic {
            severity: match d.severity {
                DiagnosticSeverity::Invalid => proto::diagnostic::Severity::Invalid,
                DiagnosticSeverity::Error => proto::diagnostic::Severity::Error,
                DiagnosticSeverity::Warning => proto::diagnostic::Severity::Warning,
            } as i32,
            attribute: d.attribute.as_ref().map(path_to_proto),
            summary: d.summary,
            detail: d.detail,
        })
        .collect()
}

fn path_to_proto(path: &AttributePath) -> proto::AttributePath {
    use proto::attribute_path::step::Selector;
    proto::AttributePath {
        steps: path
            .steps
            .iter()
            .map(|step| proto::attribute_path::Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name.clone()),
                    AttributePathStep::ElementKeyString(key) => {
                        Selector::ElementKeyString(key.clone())
                    }
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(*idx),
                }),
            })
            .collect(),
    }
}

fn string_kind(kind: StringKind) -> i32 {
    match kind {
        StringKind::Plain => proto::StringKind::Plain as i32,
        StringKind::Markdown => proto::StringKind::Markdown as i32,
    }
}

fn attribute_to_proto(attr: &Attribute) -> proto::schema::Attribute {
    proto::schema::Attribute {
        name: attr.name.clone(),
        r#type: attr.r#type.to_bytes(),
        nested_type: None,
        description: attr.description.clone(),
        required: attr.required,
        optional: attr.optional,
        computed: attr.computed,
        sensitive: attr.sensitive,
        description_kind: string_kind(StringKind::Plain),
        deprecated: attr.deprecated,
        write_only: false,
    }
}

fn schema_to_proto(schema: &Schema) -> proto::Schema {
    proto::Schema {
        version: schema.version,
        block: Some(proto::schema::Block {
            version: schema.block.version,
            attributes: schema.block.attributes.iter().map(attribute_to_proto).collect(),
            block_types: vec![],
            description: schema.block.description.clone(),
            description_kind: string_kind(schema.block.description_kind),
            deprecated: schema.block.deprecated,
        }),
    }
}
