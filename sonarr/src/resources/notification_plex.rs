//! Plex Media Server notification resource

use super::notification::{
    base_attributes, flag, Notification, NotificationHandler, NotificationVariant,
};
use serde::{Deserialize, Serialize};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::validator::NumberRangeValidator;

pub type NotificationPlexResource = NotificationHandler<NotificationPlex>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPlex {
    pub tags: Option<Vec<i64>>,
    pub auth_token: Option<String>,
    pub host: Option<String>,
    pub name: Option<String>,
    pub id: Option<i64>,
    pub port: Option<i64>,
    pub use_ssl: Option<bool>,
    pub update_library: Option<bool>,
    pub on_download: Option<bool>,
    pub on_upgrade: Option<bool>,
    pub on_rename: Option<bool>,
    pub on_series_delete: Option<bool>,
    pub on_episode_file_delete: Option<bool>,
    pub on_episode_file_delete_for_upgrade: Option<bool>,
    pub include_health_warnings: Option<bool>,
}

impl NotificationVariant for NotificationPlex {
    const TYPE_NAME: &'static str = "sonarr_notification_plex";
    const KIND: &'static str = "notification_plex";
    const IMPLEMENTATION: &'static str = "PlexServer";
    const CONFIG_CONTRACT: &'static str = "PlexServerSettings";

    fn schema() -> Schema {
        let mut builder = SchemaBuilder::new()
            .description("Notification Plex Media Server resource.")
            .attribute(flag("on_download", "On download flag."))
            .attribute(flag("on_upgrade", "On upgrade flag."))
            .attribute(flag("on_rename", "On rename flag."))
            .attribute(flag("on_series_delete", "On series delete flag."))
            .attribute(flag("on_episode_file_delete", "On episode file delete flag."))
            .attribute(flag(
                "on_episode_file_delete_for_upgrade",
                "On episode file delete for upgrade flag.",
            ))
            .attribute(flag("include_health_warnings", "Include health warnings."));

        for attribute in base_attributes("Notification") {
            builder = builder.attribute(attribute);
        }

        builder
            .attribute(
                AttributeBuilder::new("host", AttributeType::String)
                    .description("Host.")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("port", AttributeType::Number)
                    .description("Port.")
                    .optional()
                    .computed()
                    .validator(NumberRangeValidator::between(1.0, 65535.0))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("use_ssl", AttributeType::Bool)
                    .description("Use SSL flag.")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("auth_token", AttributeType::String)
                    .description("Auth Token.")
                    .required()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("update_library", AttributeType::Bool)
                    .description("Update library flag.")
                    .optional()
                    .computed()
                    .build(),
            )
            .build()
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn to_notification(&self) -> Notification {
        Notification {
            tags: self.tags.clone(),
            auth_token: self.auth_token.clone(),
            host: self.host.clone(),
            port: self.port,
            use_ssl: self.use_ssl,
            update_library: self.update_library,
            name: self.name.clone(),
            id: self.id,
            on_download: self.on_download,
            on_upgrade: self.on_upgrade,
            on_rename: self.on_rename,
            on_series_delete: self.on_series_delete,
            on_episode_file_delete: self.on_episode_file_delete,
            on_episode_file_delete_for_upgrade: self.on_episode_file_delete_for_upgrade,
            include_health_warnings: self.include_health_warnings,
            ..Default::default()
        }
    }

    fn from_notification(&mut self, notification: &Notification) {
        self.tags = notification.tags.clone();
        self.auth_token = notification.auth_token.clone();
        self.host = notification.host.clone();
        self.port = notification.port;
        self.use_ssl = notification.use_ssl;
        self.update_library = notification.update_library;
        self.name = notification.name.clone();
        self.id = notification.id;
        self.on_download = notification.on_download;
        self.on_upgrade = notification.on_upgrade;
        self.on_rename = notification.on_rename;
        self.on_series_delete = notification.on_series_delete;
        self.on_episode_file_delete = notification.on_episode_file_delete;
        self.on_episode_file_delete_for_upgrade = notification.on_episode_file_delete_for_upgrade;
        self.include_health_warnings = notification.include_health_warnings;
    }
}
