//! Generated Terraform Plugin Protocol v6.9 types
//!
//! `tonic_build` compiles `proto/tfplugin6.9.proto` at build time. RPC
//! messages live in snake_case modules (`read_resource::Request`,
//! `plan_resource_change::Response`); nested messages in sub-modules
//! (`diagnostic::Severity`).
//!
//! Several generated names collide with framework types (`DynamicValue`,
//! `Diagnostic`, `Schema`, `AttributePath`), so refer to these through the
//! `proto::` prefix.

include!(concat!(env!("OUT_DIR"), "/tfplugin6.rs"));

pub use provider_server::{Provider as ProviderService, ProviderServer};
