//! Single import list lookup
//!
//! Import lists carry their implementation specific settings as a field
//! list; every known field is flattened into its own computed attribute.

use crate::api::import_list::ImportListResource;
use crate::api::{Client, Field};
use crate::helpers::{
    call, client_error, configured_client, data_source_error, find_by, not_configured, to_model,
    to_state, UNEXPECTED_DATA_SOURCE_CONFIGURE_TYPE,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, DynamicValue};

const DATA_SOURCE_NAME: &str = "import_list";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportList {
    pub tags: Option<Vec<i64>>,
    pub language_profile_ids: Option<Vec<i64>>,
    pub quality_profile_ids: Option<Vec<i64>>,
    pub tag_ids: Option<Vec<i64>>,
    pub name: Option<String>,
    pub should_monitor: Option<String>,
    pub root_folder_path: Option<String>,
    pub implementation: Option<String>,
    pub config_contract: Option<String>,
    pub series_type: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub api_key: Option<String>,
    pub auth_user: Option<String>,
    pub username: Option<String>,
    pub rating: Option<String>,
    pub base_url: Option<String>,
    pub url: Option<String>,
    pub expires: Option<String>,
    pub listname: Option<String>,
    pub list_id: Option<String>,
    pub genres: Option<String>,
    pub years: Option<String>,
    pub trakt_additional_parameters: Option<String>,
    pub quality_profile_id: Option<i64>,
    pub id: Option<i64>,
    pub limit: Option<i64>,
    pub trakt_list_type: Option<i64>,
    pub list_type: Option<i64>,
    pub enable_automatic_add: Option<bool>,
    pub season_folder: Option<bool>,
}

impl ImportList {
    pub fn write(&mut self, api: &ImportListResource) {
        self.id = api.id;
        self.name = Some(api.name.clone());
        self.enable_automatic_add = Some(api.enable_automatic_add);
        self.season_folder = Some(api.season_folder);
        self.quality_profile_id = Some(api.quality_profile_id);
        self.should_monitor = Some(api.should_monitor.clone());
        self.root_folder_path = Some(api.root_folder_path.clone());
        self.implementation = Some(api.implementation.clone());
        self.config_contract = Some(api.config_contract.clone());
        self.series_type = Some(api.series_type.clone());
        self.tags = Some(api.tags.clone());
        self.write_fields(&api.fields);
    }

    pub fn read(&self) -> ImportListResource {
        ImportListResource {
            id: self.id,
            name: self.name.clone().unwrap_or_default(),
            enable_automatic_add: self.enable_automatic_add.unwrap_or_default(),
            season_folder: self.season_folder.unwrap_or_default(),
            quality_profile_id: self.quality_profile_id.unwrap_or_default(),
            should_monitor: self.should_monitor.clone().unwrap_or_default(),
            root_folder_path: self.root_folder_path.clone().unwrap_or_default(),
            implementation: self.implementation.clone().unwrap_or_default(),
            config_contract: self.config_contract.clone().unwrap_or_default(),
            series_type: self.series_type.clone().unwrap_or_default(),
            tags: self.tags.clone().unwrap_or_default(),
            fields: self.read_fields(),
        }
    }

    /// Fields missing from the list stay null.
    fn write_fields(&mut self, fields: &[Field]) {
        self.access_token = None;
        self.refresh_token = None;
        self.api_key = None;
        self.auth_user = None;
        self.username = None;
        self.rating = None;
        self.base_url = None;
        self.url = None;
        self.expires = None;
        self.listname = None;
        self.list_id = None;
        self.genres = None;
        self.years = None;
        self.trakt_additional_parameters = None;
        self.limit = None;
        self.trakt_list_type = None;
        self.list_type = None;
        self.language_profile_ids = None;
        self.quality_profile_ids = None;
        self.tag_ids = None;

        for field in fields {
            let value = &field.value;
            match field.name.as_str() {
                "accessToken" => self.access_token = string_value(value),
                "refreshToken" => self.refresh_token = string_value(value),
                "apiKey" => self.api_key = string_value(value),
                "authUser" => self.auth_user = string_value(value),
                "username" => self.username = string_value(value),
                "rating" => self.rating = string_value(value),
                "baseUrl" => self.base_url = string_value(value),
                "url" => self.url = string_value(value),
                "expires" => self.expires = string_value(value),
                "listname" => self.listname = string_value(value),
                "listId" => self.list_id = string_value(value),
                "genres" => self.genres = string_value(value),
                "years" => self.years = string_value(value),
                "traktAdditionalParameters" => {
                    self.trakt_additional_parameters = string_value(value)
                }
                "limit" => self.limit = value.as_i64(),
                "traktListType" => self.trakt_list_type = value.as_i64(),
                "listType" => self.list_type = value.as_i64(),
                "languageProfileIds" => self.language_profile_ids = number_list(value),
                "qualityProfileIds" => self.quality_profile_ids = number_list(value),
                "tagIds" => self.tag_ids = number_list(value),
                other => tracing::trace!("ignoring import list field {}", other),
            }
        }
    }

    fn read_fields(&self) -> Vec<Field> {
        let strings = [
            ("accessToken", &self.access_token),
            ("refreshToken", &self.refresh_token),
            ("apiKey", &self.api_key),
            ("authUser", &self.auth_user),
            ("username", &self.username),
            ("rating", &self.rating),
            ("baseUrl", &self.base_url),
            ("url", &self.url),
            ("expires", &self.expires),
            ("listname", &self.listname),
            ("listId", &self.list_id),
            ("genres", &self.genres),
            ("years", &self.years),
            ("traktAdditionalParameters", &self.trakt_additional_parameters),
        ];
        let numbers = [
            ("limit", self.limit),
            ("traktListType", self.trakt_list_type),
            ("listType", self.list_type),
        ];
        let lists = [
            ("languageProfileIds", &self.language_profile_ids),
            ("qualityProfileIds", &self.quality_profile_ids),
            ("tagIds", &self.tag_ids),
        ];

        let mut fields = Vec::new();
        for (name, value) in strings {
            if let Some(v) = value {
                fields.push(Field::new(name, v.as_str()));
            }
        }
        for (name, value) in numbers {
            if let Some(v) = value {
                fields.push(Field::new(name, v));
            }
        }
        for (name, value) in lists {
            if let Some(v) = value {
                fields.push(Field::new(name, v.clone()));
            }
        }
        fields
    }
}

fn string_value(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn number_list(value: &Value) -> Option<Vec<i64>> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
}

fn computed(name: &str, type_: AttributeType, description: &str) -> Attribute {
    AttributeBuilder::new(name, type_)
        .description(description)
        .computed()
        .build()
}

fn computed_sensitive(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .computed()
        .sensitive()
        .build()
}

#[derive(Default)]
pub struct ImportListDataSource {
    client: Option<Arc<Client>>,
}

impl ImportListDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        use AttributeType::{Bool, Number, String as Text};
        let number_set = || AttributeType::set(Number);

        SchemaBuilder::new()
            .description("Single Import List.")
            .attribute(computed("enable_automatic_add", Bool, "Enable automatic add flag."))
            .attribute(computed("season_folder", Bool, "Season folder flag."))
            .attribute(computed("quality_profile_id", Number, "Quality profile ID."))
            .attribute(computed("should_monitor", Text, "Should monitor."))
            .attribute(computed("root_folder_path", Text, "Root folder path."))
            .attribute(computed("implementation", Text, "ImportList implementation name."))
            .attribute(computed("config_contract", Text, "ImportList configuration template."))
            .attribute(computed("series_type", Text, "Series type."))
            .attribute(computed("tags", number_set(), "List of associated tags."))
            .attribute(
                AttributeBuilder::new("name", Text)
                    .description("Import List name.")
                    .required()
                    .build(),
            )
            .attribute(computed("id", Number, "Import List ID."))
            .attribute(computed("limit", Number, "Limit."))
            .attribute(computed("trakt_list_type", Number, "Trakt list type."))
            .attribute(computed("list_type", Number, "List type."))
            .attribute(computed_sensitive("access_token", "Access token."))
            .attribute(computed_sensitive("refresh_token", "Refresh token."))
            .attribute(computed_sensitive("api_key", "API key."))
            .attribute(computed("auth_user", Text, "Auth user."))
            .attribute(computed("username", Text, "Username."))
            .attribute(computed("rating", Text, "Rating."))
            .attribute(computed("base_url", Text, "Base URL."))
            .attribute(computed("url", Text, "URL."))
            .attribute(computed("expires", Text, "Expires."))
            .attribute(computed("listname", Text, "List name."))
            .attribute(computed("list_id", Text, "List ID."))
            .attribute(computed("genres", Text, "Genres."))
            .attribute(computed("years", Text, "Years."))
            .attribute(computed(
                "trakt_additional_parameters",
                Text,
                "Trakt additional parameters.",
            ))
            .attribute(computed("language_profile_ids", number_set(), "Language profile IDs."))
            .attribute(computed("quality_profile_ids", number_set(), "Quality profile IDs."))
            .attribute(computed("tag_ids", number_set(), "Tag IDs."))
            .build()
    }

    async fn find(&self, ctx: &Context, config: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let client = self.client.as_deref().ok_or_else(not_configured)?;
        let wanted: ImportList = to_model(config)?;
        let name = wanted.name.unwrap_or_default();

        let lists = call(ctx, client.import_lists().list())
            .await
            .map_err(|e| client_error("read", DATA_SOURCE_NAME, e))?;

        let found = find_by(lists, DATA_SOURCE_NAME, "name", name.as_str(), |l| {
            l.name.as_str()
        })
        .map_err(|e| data_source_error(DATA_SOURCE_NAME, &e))?;

        tracing::trace!("read {}: {}", DATA_SOURCE_NAME, name);
        let mut list = ImportList::default();
        list.write(&found);
        to_state(&list)
    }
}

#[async_trait]
impl DataSource for ImportListDataSource {
    fn type_name(&self) -> &str {
        "sonarr_import_list"
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
impl DataSourceWithConfigure for ImportListDataSource {
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
