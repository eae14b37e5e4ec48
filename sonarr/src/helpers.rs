//! Shared plumbing for resources and data sources: diagnostics, client
//! injection, cancellation and the collection lookup.

use crate::api::{ApiError, Client};
use crate::provider_data::SonarrProviderData;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::types::{Diagnostic, DynamicValue};

pub const CLIENT_ERROR: &str = "Client Error";
pub const DATA_SOURCE_ERROR: &str = "Data Source Error";
pub const UNEXPECTED_RESOURCE_CONFIGURE_TYPE: &str = "Unexpected Resource Configure Type";
pub const UNEXPECTED_DATA_SOURCE_CONFIGURE_TYPE: &str = "Unexpected Data Source Configure Type";
pub const PROVIDER_NOT_CONFIGURED: &str = "Provider Not Configured";
pub const VALUE_CONVERSION_ERROR: &str = "Value Conversion Error";

/// `Unable to {operation} {kind}, got error: {err}`
pub fn client_error(operation: &str, kind: &str, err: impl Display) -> Diagnostic {
    Diagnostic::error(
        CLIENT_ERROR,
        format!("Unable to {} {}, got error: {}", operation, kind, err),
    )
}

pub fn data_source_error(kind: &str, err: &NotFoundError) -> Diagnostic {
    Diagnostic::error(
        DATA_SOURCE_ERROR,
        format!("Unable to find {}, got error: {}", kind, err),
    )
}

pub fn not_configured() -> Diagnostic {
    Diagnostic::error(
        PROVIDER_NOT_CONFIGURED,
        "The provider has not been configured. Please configure the sonarr provider before using its resources.",
    )
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("data source not found: no {kind} with {field} '{value}'")]
pub struct NotFoundError {
    pub kind: String,
    pub field: String,
    pub value: String,
}

/// Returns the first item whose key equals `wanted`.
pub fn find_by<T, K, F>(
    items: impl IntoIterator<Item = T>,
    kind: &str,
    field: &str,
    wanted: &K,
    key: F,
) -> Result<T, NotFoundError>
where
    K: PartialEq + Display + ?Sized,
    F: Fn(&T) -> &K,
{
    items
        .into_iter()
        .find(|item| key(item) == wanted)
        .ok_or_else(|| NotFoundError {
            kind: kind.to_string(),
            field: field.to_string(),
            value: wanted.to_string(),
        })
}

/// Extracts the API client from provider data handed to `configure`.
///
/// `Ok(None)` means the provider has not been configured yet, which
/// Terraform does for validation and planning.
pub fn configured_client(
    provider_data: Option<Arc<dyn Any + Send + Sync>>,
    summary: &str,
) -> Result<Option<Arc<Client>>, Diagnostic> {
    let Some(data) = provider_data else {
        return Ok(None);
    };
    match data.downcast_ref::<SonarrProviderData>() {
        Some(data) => Ok(Some(data.client.clone())),
        None => Err(Diagnostic::error(
            summary,
            "Expected SonarrProviderData. Please report this issue to the provider developers.",
        )),
    }
}

/// Runs an API call under the request context.
pub async fn call<T, F>(ctx: &Context, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    ctx.run(fut).await.unwrap_or(Err(ApiError::Cancelled))
}

pub fn to_model<T: DeserializeOwned>(value: &DynamicValue) -> Result<T, Diagnostic> {
    value
        .to_model()
        .map_err(|e| Diagnostic::error(VALUE_CONVERSION_ERROR, e.to_string()))
}

pub fn to_state<T: Serialize>(model: &T) -> Result<DynamicValue, Diagnostic> {
    DynamicValue::from_model(model)
        .map_err(|e| Diagnostic::error(VALUE_CONVERSION_ERROR, e.to_string()))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item {
        id: i64,
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: 1,
                name: "alpha".to_string(),
            },
            Item {
                id: 2,
                name: "beta".to_string(),
            },
            Item {
                id: 3,
                name: "beta".to_string(),
            },
        ]
    }

    #[test]
    fn find_by_returns_first_match() {
        let found = find_by(items(), "import_list", "name", "beta", |i| i.name.as_str()).unwrap();
        assert_eq!(found.id, 2);
    }

    #[test]
    fn find_by_numeric_key() {
        let found = find_by(items(), "item", "id", &3, |i| &i.id).unwrap();
        assert_eq!(found.id, 3);
    }

    #[test]
    fn find_by_reports_kind_field_and_value() {
        let err = find_by(items(), "import_list", "name", "gamma", |i| i.name.as_str())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "data source not found: no import_list with name 'gamma'"
        );
        assert_eq!(
            data_source_error("import_list", &err).detail,
            "Unable to find import_list, got error: data source not found: no import_list with name 'gamma'"
        );
    }

    #[test]
    fn find_by_on_empty_collection_is_not_found() {
        let err = find_by(Vec::<Item>::new(), "import_list_exclusion", "tvdb_id", &42, |i| &i.id)
            .unwrap_err();
        assert_eq!(err.value, "42");
    }

    #[test]
    fn client_error_detail() {
        let diag = client_error("create", "root_folder", "boom");
        assert_eq!(diag.summary, CLIENT_ERROR);
        assert_eq!(diag.detail, "Unable to create root_folder, got error: boom");
    }

    #[test]
    fn configured_client_accepts_missing_data() {
        assert!(configured_client(None, UNEXPECTED_RESOURCE_CONFIGURE_TYPE)
            .unwrap()
            .is_none());
    }

    #[test]
    fn configured_client_rejects_foreign_data() {
        let data: Arc<dyn Any + Send + Sync> = Arc::new(5u8);
        let err = configured_client(Some(data), UNEXPECTED_DATA_SOURCE_CONFIGURE_TYPE)
            .err()
            .unwrap();
        assert_eq!(err.summary, UNEXPECTED_DATA_SOURCE_CONFIGURE_TYPE);
    }

    #[test]
    fn configured_client_extracts_client() {
        let client = Client::new("http://localhost:8989", "key").unwrap();
        let data: Arc<dyn Any + Send + Sync> = Arc::new(SonarrProviderData::new(client));
        let client = configured_client(Some(data), UNEXPECTED_RESOURCE_CONFIGURE_TYPE)
            .unwrap()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8989/api/v3");
    }

    #[tokio::test]
    async fn call_reports_cancellation() {
        let signal = tfplug::StopSignal::new();
        let ctx = signal.context("ReadResource");
        signal.stop();

        let result: Result<(), ApiError> = call(&ctx, async { Ok(()) }).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[test]
    fn call_passes_api_errors_through() {
        let ctx = Context::new();
        let result: Result<(), ApiError> = tokio_test::block_on(call(&ctx, async {
            Err(ApiError::NotFound("/rootfolder/1".to_string()))
        }));
        assert!(result.unwrap_err().is_not_found());
    }
}
