//! Sonarr v3 REST API
//!
//! Entity modules expose a borrowing `XxxApi` handle obtained from
//! [`Client`], e.g. `client.root_folders().get(1)`.

pub mod client;
pub mod error;
pub mod import_list;
pub mod import_list_exclusion;
pub mod notification;
pub mod root_folder;
pub mod series;

pub use client::Client;
pub use error::ApiError;
pub use notification::Field;
