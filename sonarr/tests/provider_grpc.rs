//! Drives the Sonarr provider through the gRPC service against a mock Sonarr

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use mockito::{Matcher, Server};
use sonarr::SonarrProvider;
use tfplug::proto::{self, ProviderService};
use tfplug::schema::object;
use tfplug::types::{Dynamic, DynamicValue};
use tfplug::GrpcProviderServer;
use tonic::Request;

fn encode(value: Dynamic) -> Option<proto::DynamicValue> {
    Some(proto::DynamicValue {
        msgpack: DynamicValue::new(value).encode_msgpack().unwrap(),
        json: vec![],
    })
}

fn decode(value: Option<proto::DynamicValue>) -> Dynamic {
    DynamicValue::decode_msgpack(&value.unwrap().msgpack)
        .unwrap()
        .value
}

fn string(s: &str) -> Dynamic {
    Dynamic::String(s.to_string())
}

async fn configured_server(server: &Server) -> GrpcProviderServer<SonarrProvider> {
    let provider = GrpcProviderServer::new(SonarrProvider::new()).await;
    let response = provider
        .configure_provider(Request::new(proto::configure_provider::Request {
            terraform_version: "1.9.0".to_string(),
            config: encode(object([
                ("url", string(&server.url())),
                ("api_key", string("secret")),
            ])),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(response.diagnostics.is_empty());
    provider
}

async fn plan(
    provider: &GrpcProviderServer<SonarrProvider>,
    type_name: &str,
    prior: Dynamic,
    config: Dynamic,
) -> proto::plan_resource_change::Response {
    provider
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: type_name.to_string(),
            prior_state: encode(prior),
            proposed_new_state: encode(config.clone()),
            config: encode(config),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
            prior_identity: None,
        }))
        .await
        .unwrap()
        .into_inner()
}

async fn apply(
    provider: &GrpcProviderServer<SonarrProvider>,
    type_name: &str,
    prior: Dynamic,
    planned: Dynamic,
    config: Dynamic,
) -> proto::apply_resource_change::Response {
    provider
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: type_name.to_string(),
            prior_state: encode(prior),
            planned_state: encode(planned),
            config: encode(config),
            planned_private: vec![],
            provider_meta: None,
            planned_identity: None,
        }))
        .await
        .unwrap()
        .into_inner()
}

async fn read(
    provider: &GrpcProviderServer<SonarrProvider>,
    type_name: &str,
    state: Dynamic,
) -> proto::read_resource::Response {
    provider
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: type_name.to_string(),
            current_state: encode(state),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
            current_identity: None,
        }))
        .await
        .unwrap()
        .into_inner()
}

fn root_folder_config(path: &str) -> Dynamic {
    object([
        ("path", string(path)),
        ("accessible", Dynamic::Null),
        ("id", Dynamic::Null),
        ("unmapped_folders", Dynamic::Null),
    ])
}

#[tokio::test]
async fn metadata_lists_sonarr_types() {
    let provider = GrpcProviderServer::new(SonarrProvider::new()).await;
    let response = provider
        .get_metadata(Request::new(proto::get_metadata::Request {}))
        .await
        .unwrap()
        .into_inner();

    let resources: Vec<_> = response.resources.iter().map(|r| r.type_name.as_str()).collect();
    assert_eq!(
        resources,
        vec![
            "sonarr_import_list_exclusion",
            "sonarr_notification_mailgun",
            "sonarr_notification_plex",
            "sonarr_root_folder",
        ]
    );
    assert_eq!(response.data_sources.len(), 3);
}

#[tokio::test]
async fn root_folder_plan_create_read() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/api/v3/rootfolder")
        .match_header("x-api-key", "secret")
        .match_body(Matcher::Json(serde_json::json!({"path": "/tv"})))
        .with_body(r#"{"id":1,"path":"/tv","accessible":true,"unmappedFolders":[{"name":"Lost","path":"/tv/Lost"}]}"#)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/v3/rootfolder/1")
        .with_body(r#"{"id":1,"path":"/tv","accessible":true,"unmappedFolders":[]}"#)
        .create_async()
        .await;
    let provider = configured_server(&server).await;

    let config = root_folder_config("/tv");
    let planned = plan(&provider, "sonarr_root_folder", Dynamic::Null, config.clone()).await;
    assert!(planned.diagnostics.is_empty());
    let planned_state = decode(planned.planned_state);
    assert!(planned_state.get("id").unwrap().is_unknown());
    assert!(planned_state.get("unmapped_folders").unwrap().is_unknown());

    let created = apply(&provider, "sonarr_root_folder", Dynamic::Null, planned_state, config).await;
    assert!(created.diagnostics.is_empty());
    let state = decode(created.new_state);
    assert_eq!(state.get("path"), Some(&string("/tv")));
    assert_eq!(state.get("id"), Some(&Dynamic::Number(1.0)));
    assert_eq!(state.get("accessible"), Some(&Dynamic::Bool(true)));

    let refreshed = read(&provider, "sonarr_root_folder", state).await;
    assert!(refreshed.diagnostics.is_empty());
    let refreshed = decode(refreshed.new_state);
    assert_eq!(refreshed.get("path"), Some(&string("/tv")));
    assert_eq!(refreshed.get("unmapped_folders"), Some(&Dynamic::List(vec![])));

    create.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn root_folder_path_change_requires_replace() {
    let server = Server::new_async().await;
    let provider = configured_server(&server).await;

    let prior = object([
        ("path", string("/tv")),
        ("accessible", Dynamic::Bool(true)),
        ("id", Dynamic::Number(1.0)),
        ("unmapped_folders", Dynamic::List(vec![])),
    ]);
    let response = plan(&provider, "sonarr_root_folder", prior, root_folder_config("/series")).await;

    assert_eq!(response.requires_replace.len(), 1);
    let planned = decode(response.planned_state);
    assert_eq!(planned.get("id"), Some(&Dynamic::Number(1.0)));
}

#[tokio::test]
async fn root_folder_rejects_relative_path() {
    let provider = GrpcProviderServer::new(SonarrProvider::new()).await;
    let response = provider
        .validate_resource_config(Request::new(proto::validate_resource_config::Request {
            type_name: "sonarr_root_folder".to_string(),
            config: encode(root_folder_config("media/tv")),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Invalid Attribute Value Match");
}

#[tokio::test]
async fn removed_root_folder_leaves_state() {
    let mut server = Server::new_async().await;
    let _get = server
        .mock("GET", "/api/v3/rootfolder/5")
        .with_status(404)
        .create_async()
        .await;
    let provider = configured_server(&server).await;

    let state = object([
        ("path", string("/tv")),
        ("accessible", Dynamic::Bool(true)),
        ("id", Dynamic::Number(5.0)),
        ("unmapped_folders", Dynamic::List(vec![])),
    ]);
    let response = read(&provider, "sonarr_root_folder", state).await;

    assert!(response.diagnostics.is_empty());
    assert!(decode(response.new_state).is_null());
}

#[tokio::test]
async fn mailgun_notification_create_keeps_configured_fields() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/api/v3/notification")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "mail",
            "implementation": "Mailgun",
            "configContract": "MailgunSettings"
        })))
        .with_body(
            r#"{
                "id": 12,
                "name": "mail",
                "implementation": "Mailgun",
                "configContract": "MailgunSettings",
                "onGrab": true,
                "includeHealthWarnings": false,
                "tags": [],
                "fields": [
                    {"name": "apiKey", "value": "key-1"},
                    {"name": "useEuEndpoint", "value": false},
                    {"name": "from", "value": "sonarr@example.com"},
                    {"name": "senderDomain", "value": "mg.example.com"},
                    {"name": "recipients", "value": ["ops@example.com"]}
                ]
            }"#,
        )
        .create_async()
        .await;
    let provider = configured_server(&server).await;

    let flag = |b: bool| Dynamic::Bool(b);
    let config = object([
        ("on_grab", flag(true)),
        ("on_download", flag(false)),
        ("on_upgrade", flag(false)),
        ("on_series_delete", flag(false)),
        ("on_episode_file_delete", flag(false)),
        ("on_episode_file_delete_for_upgrade", flag(false)),
        ("on_health_issue", flag(false)),
        ("on_application_update", flag(false)),
        ("include_health_warnings", flag(false)),
        ("name", string("mail")),
        ("tags", Dynamic::Null),
        ("id", Dynamic::Null),
        ("use_eu_endpoint", Dynamic::Null),
        ("api_key", string("key-1")),
        ("from", string("sonarr@example.com")),
        ("sender_domain", string("mg.example.com")),
        ("recipients", Dynamic::List(vec![string("ops@example.com")])),
    ]);

    let planned = plan(&provider, "sonarr_notification_mailgun", Dynamic::Null, config.clone()).await;
    assert!(planned.diagnostics.is_empty());
    let planned_state = decode(planned.planned_state);
    assert!(planned_state.get("tags").unwrap().is_unknown());

    let created = apply(
        &provider,
        "sonarr_notification_mailgun",
        Dynamic::Null,
        planned_state,
        config,
    )
    .await;
    assert!(created.diagnostics.is_empty());
    let state = decode(created.new_state);
    assert_eq!(state.get("id"), Some(&Dynamic::Number(12.0)));
    assert_eq!(state.get("from"), Some(&string("sonarr@example.com")));
    assert_eq!(state.get("recipients"), Some(&Dynamic::List(vec![string("ops@example.com")])));
    assert_eq!(state.get("tags"), Some(&Dynamic::List(vec![])));
    assert_eq!(state.get("use_eu_endpoint"), Some(&Dynamic::Bool(false)));

    create.assert_async().await;
}

fn plex_config(name: &str) -> Dynamic {
    let flag = |b: bool| Dynamic::Bool(b);
    object([
        ("on_download", flag(true)),
        ("on_upgrade", flag(false)),
        ("on_rename", flag(false)),
        ("on_series_delete", flag(false)),
        ("on_episode_file_delete", flag(false)),
        ("on_episode_file_delete_for_upgrade", flag(false)),
        ("include_health_warnings", flag(false)),
        ("name", string(name)),
        ("tags", Dynamic::Null),
        ("id", Dynamic::Null),
        ("host", string("plex.lan")),
        ("port", Dynamic::Null),
        ("use_ssl", Dynamic::Null),
        ("auth_token", string("token")),
        ("update_library", Dynamic::Null),
    ])
}

fn plex_response(name: &str) -> String {
    format!(
        r#"{{
            "id": 12,
            "name": "{}",
            "implementation": "PlexServer",
            "configContract": "PlexServerSettings",
            "onDownload": true,
            "tags": [],
            "fields": [
                {{"name": "host", "value": "plex.lan"}},
                {{"name": "port", "value": 32400}},
                {{"name": "useSsl", "value": false}},
                {{"name": "authToken", "value": "token"}},
                {{"name": "updateLibrary", "value": false}}
            ]
        }}"#,
        name
    )
}

#[tokio::test]
async fn plex_notification_lifecycle() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/api/v3/notification")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "plex",
            "implementation": "PlexServer",
            "configContract": "PlexServerSettings"
        })))
        .with_body(plex_response("plex"))
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/api/v3/notification/12")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "id": 12,
            "name": "plex2",
            "implementation": "PlexServer"
        })))
        .with_body(plex_response("plex2"))
        .create_async()
        .await;
    let gone = server
        .mock("GET", "/api/v3/notification/12")
        .with_status(404)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/v3/notification/12")
        .create_async()
        .await;
    let provider = configured_server(&server).await;
    let type_name = "sonarr_notification_plex";

    let config = plex_config("plex");
    let planned = plan(&provider, type_name, Dynamic::Null, config.clone()).await;
    assert!(planned.diagnostics.is_empty());
    let created = apply(&provider, type_name, Dynamic::Null, decode(planned.planned_state), config).await;
    assert!(created.diagnostics.is_empty());
    let state = decode(created.new_state);
    assert_eq!(state.get("id"), Some(&Dynamic::Number(12.0)));
    assert_eq!(state.get("port"), Some(&Dynamic::Number(32400.0)));

    let config = plex_config("plex2");
    let planned = plan(&provider, type_name, state.clone(), config.clone()).await;
    assert!(planned.diagnostics.is_empty());
    assert!(planned.requires_replace.is_empty());
    let planned_state = decode(planned.planned_state);
    assert_eq!(planned_state.get("id"), Some(&Dynamic::Number(12.0)));
    let updated = apply(&provider, type_name, state, planned_state, config).await;
    assert!(updated.diagnostics.is_empty());
    let state = decode(updated.new_state);
    assert_eq!(state.get("name"), Some(&string("plex2")));
    assert_eq!(state.get("id"), Some(&Dynamic::Number(12.0)));

    let refreshed = read(&provider, type_name, state.clone()).await;
    assert!(refreshed.diagnostics.is_empty());
    assert!(decode(refreshed.new_state).is_null());

    let destroyed = apply(&provider, type_name, state, Dynamic::Null, Dynamic::Null).await;
    assert!(destroyed.diagnostics.is_empty());
    assert!(decode(destroyed.new_state).is_null());

    create.assert_async().await;
    update.assert_async().await;
    gone.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn import_then_read_fills_exclusion() {
    let mut server = Server::new_async().await;
    let _get = server
        .mock("GET", "/api/v3/importlistexclusion/3")
        .with_body(r#"{"id":3,"tvdbId":79168,"title":"Friends"}"#)
        .create_async()
        .await;
    let provider = configured_server(&server).await;

    let imported = provider
        .import_resource_state(Request::new(proto::import_resource_state::Request {
            type_name: "sonarr_import_list_exclusion".to_string(),
            id: "3".to_string(),
            client_capabilities: None,
            identity: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(imported.diagnostics.is_empty());
    let state = decode(imported.imported_resources[0].state.clone());
    assert_eq!(state.get("title"), Some(&Dynamic::Null));

    let refreshed = decode(read(&provider, "sonarr_import_list_exclusion", state).await.new_state);
    assert_eq!(refreshed.get("title"), Some(&string("Friends")));
    assert_eq!(refreshed.get("tvdb_id"), Some(&Dynamic::Number(79168.0)));
}

#[tokio::test]
async fn import_rejects_non_numeric_identifier() {
    let server = Server::new_async().await;
    let provider = configured_server(&server).await;

    let response = provider
        .import_resource_state(Request::new(proto::import_resource_state::Request {
            type_name: "sonarr_root_folder".to_string(),
            id: "abc".to_string(),
            client_capabilities: None,
            identity: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.imported_resources.is_empty());
    assert_eq!(response.diagnostics[0].summary, "Unexpected Import Identifier");
    assert_eq!(
        response.diagnostics[0].detail,
        r#"Expected import identifier with format: ID. Got: "abc""#
    );
}

#[tokio::test]
async fn import_list_data_source_reports_missing_name() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("GET", "/api/v3/importlist")
        .with_body("[]")
        .create_async()
        .await;
    let provider = configured_server(&server).await;

    let response = provider
        .read_data_source(Request::new(proto::read_data_source::Request {
            type_name: "sonarr_import_list".to_string(),
            config: encode(object([("name", string("Trakt"))])),
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(decode(response.state).is_null());
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Data Source Error");
    assert_eq!(
        response.diagnostics[0].detail,
        "Unable to find import_list, got error: data source not found: no import_list with name 'Trakt'"
    );
}

#[tokio::test]
async fn concurrent_reads_share_one_client() {
    let mut server = Server::new_async().await;
    let mut mocks = Vec::new();
    for id in 1..=3 {
        mocks.push(
            server
                .mock("GET", format!("/api/v3/rootfolder/{}", id).as_str())
                .with_body(format!(
                    r#"{{"id":{},"path":"/tv{}","accessible":true,"unmappedFolders":[]}}"#,
                    id, id
                ))
                .create_async()
                .await,
        );
    }
    let provider = configured_server(&server).await;

    let reads = (1..=3).map(|id| {
        let state = object([
            ("path", Dynamic::Null),
            ("accessible", Dynamic::Null),
            ("id", Dynamic::Number(id as f64)),
            ("unmapped_folders", Dynamic::Null),
        ]);
        read(&provider, "sonarr_root_folder", state)
    });
    let responses = futures::future::join_all(reads).await;

    for (id, response) in (1..=3).zip(responses) {
        assert!(response.diagnostics.is_empty());
        let state = decode(response.new_state);
        assert_eq!(state.get("path"), Some(&string(&format!("/tv{}", id))));
    }
    for mock in mocks {
        mock.assert_async().await;
    }
}
