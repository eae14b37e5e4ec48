pub mod import_list_exclusion;
pub mod notification;
pub mod notification_mailgun;
pub mod notification_plex;
pub mod root_folder;

pub use import_list_exclusion::ImportListExclusionResourceHandler;
pub use notification_mailgun::NotificationMailgunResource;
pub use notification_plex::NotificationPlexResource;
pub use root_folder::RootFolderResourceHandler;
