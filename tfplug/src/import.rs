//! Import helpers for simplifying resource import implementations

use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{Diagnostic, Dynamic, DynamicValue};

pub const UNEXPECTED_IMPORT_IDENTIFIER: &str = "Unexpected Import Identifier";

/// Imports a resource whose only identifier is a numeric remote ID
///
/// Example: ID "42" -> state.id = 42. Anything that is not a decimal
/// integer produces an error diagnostic and no imported resource.
pub fn import_state_numeric_id(request: &ImportResourceStateRequest) -> ImportResourceStateResponse {
    let mut response = ImportResourceStateResponse {
        imported_resources: Vec::new(),
        diagnostics: Vec::new(),
    };

    let id = match request.id.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            response.diagnostics.push(Diagnostic::error(
                UNEXPECTED_IMPORT_IDENTIFIER,
                format!(
                    "Expected import identifier with format: ID. Got: {:?}",
                    request.id
                ),
            ));
            return response;
        }
    };

    let mut state = DynamicValue::null();
    if let Err(e) = state.set("id", Dynamic::Number(id as f64)) {
        response
            .diagnostics
            .push(Diagnostic::error("Failed to set import ID", e.to_string()));
        return response;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
    response
}
