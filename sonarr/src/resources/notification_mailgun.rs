//! Mailgun notification resource

use super::notification::{
    base_attributes, flag, Notification, NotificationHandler, NotificationVariant,
};
use serde::{Deserialize, Serialize};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};

pub type NotificationMailgunResource = NotificationHandler<NotificationMailgun>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationMailgun {
    pub tags: Option<Vec<i64>>,
    pub recipients: Option<Vec<String>>,
    pub name: Option<String>,
    pub id: Option<i64>,
    pub from: Option<String>,
    pub api_key: Option<String>,
    pub sender_domain: Option<String>,
    pub use_eu_endpoint: Option<bool>,
    pub on_grab: Option<bool>,
    pub on_download: Option<bool>,
    pub on_upgrade: Option<bool>,
    pub on_series_delete: Option<bool>,
    pub on_episode_file_delete: Option<bool>,
    pub on_episode_file_delete_for_upgrade: Option<bool>,
    pub on_health_issue: Option<bool>,
    pub on_application_update: Option<bool>,
    pub include_health_warnings: Option<bool>,
}

impl NotificationVariant for NotificationMailgun {
    const TYPE_NAME: &'static str = "sonarr_notification_mailgun";
    const KIND: &'static str = "notification_mailgun";
    const IMPLEMENTATION: &'static str = "Mailgun";
    const CONFIG_CONTRACT: &'static str = "MailgunSettings";

    fn schema() -> Schema {
        let mut builder = SchemaBuilder::new()
            .description("Notification Mailgun resource.")
            .attribute(flag("on_grab", "On grab flag."))
            .attribute(flag("on_download", "On download flag."))
            .attribute(flag("on_upgrade", "On upgrade flag."))
            .attribute(flag("on_series_delete", "On series delete flag."))
            .attribute(flag("on_episode_file_delete", "On episode file delete flag."))
            .attribute(flag(
                "on_episode_file_delete_for_upgrade",
                "On episode file delete for upgrade flag.",
            ))
            .attribute(flag("on_health_issue", "On health issue flag."))
            .attribute(flag("on_application_update", "On application update flag."))
            .attribute(flag("include_health_warnings", "Include health warnings."));

        for attribute in base_attributes("Notification") {
            builder = builder.attribute(attribute);
        }

        builder
            .attribute(
                AttributeBuilder::new("use_eu_endpoint", AttributeType::Bool)
                    .description("Use EU endpoint flag.")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_key", AttributeType::String)
                    .description("API key.")
                    .optional()
                    .computed()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("from", AttributeType::String)
                    .description("From.")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("sender_domain", AttributeType::String)
                    .description("Sender domain.")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("recipients", AttributeType::set(AttributeType::String))
                    .description("Recipients.")
                    .required()
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
            recipients: self.recipients.clone(),
            api_key: self.api_key.clone(),
            from: self.from.clone(),
            sender_domain: self.sender_domain.clone(),
            use_eu_endpoint: self.use_eu_endpoint,
            name: self.name.clone(),
            id: self.id,
            on_grab: self.on_grab,
            on_download: self.on_download,
            on_upgrade: self.on_upgrade,
            on_series_delete: self.on_series_delete,
            on_episode_file_delete: self.on_episode_file_delete,
            on_episode_file_delete_for_upgrade: self.on_episode_file_delete_for_upgrade,
            on_health_issue: self.on_health_issue,
            on_application_update: self.on_application_update,
            include_health_warnings: self.include_health_warnings,
            ..Default::default()
        }
    }

    fn from_notification(&mut self, notification: &Notification) {
        self.tags = notification.tags.clone();
        self.recipients = notification.recipients.clone();
        self.api_key = notification.api_key.clone();
        self.from = notification.from.clone();
        self.sender_domain = notification.sender_domain.clone();
        self.use_eu_endpoint = notification.use_eu_endpoint;
        self.name = notification.name.clone();
        self.id = notification.id;
        self.on_grab = notification.on_grab;
        self.on_download = notification.on_download;
        self.on_upgrade = notification.on_upgrade;
        self.on_series_delete = notification.on_series_delete;
        self.on_episode_file_delete = notification.on_episode_file_delete;
        self.on_episode_file_delete_for_upgrade = notification.on_episode_file_delete_for_upgrade;
        self.on_health_issue = notification.on_health_issue;
        self.on_application_update = notification.on_application_update;
        self.include_health_warnings = notification.include_health_warnings;
    }
}
