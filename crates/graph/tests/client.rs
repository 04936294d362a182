use std::sync::Arc;

use docbridge_core::{
    EntityId, GraphCredentials, LibraryLocation, NonEmptyText, SequenceId, ServiceConfig,
};
use graph_client::{encode_sharing_url, CopyOutcome, GraphClient, GraphError};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn text(value: &str) -> NonEmptyText {
    NonEmptyText::new(value).unwrap()
}

fn client_for(server: &MockServer) -> GraphClient {
    let cfg = ServiceConfig::new(
        GraphCredentials {
            tenant_id: text("tenant-1"),
            client_id: text("client-1"),
            client_secret: text("secret-1"),
        },
        LibraryLocation {
            site_id: text("site-1"),
            list_id: text("Documents"),
            drive_id: text("drive-1"),
        },
        None,
        &server.uri(),
        &server.uri(),
        "https://graph.microsoft.com/.default",
    )
    .unwrap();
    GraphClient::new(Arc::new(cfg))
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_secret=secret-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": TOKEN
        })))
        .mount(server)
        .await;
}

fn bearer() -> impl wiremock::Match {
    header("authorization", format!("Bearer {TOKEN}").as_str())
}

#[tokio::test]
async fn test_acquire_token() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let token = client_for(&server).acquire_token().await.unwrap();
    assert_eq!(token, TOKEN);
}

#[tokio::test]
async fn test_acquire_token_failure_reports_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).acquire_token().await.unwrap_err();
    match err {
        GraphError::Token(message) => {
            assert!(message.contains("Invalid client secret"));
            assert!(message.contains("401"));
        }
        other => panic!("expected token error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_items_follows_next_link() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/sites/site-1/lists/Documents/items"))
        .and(query_param("expand", "fields"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "@odata.etag": "\"A,1\"", "id": "1", "fields": { "FileLeafRef": "Root" } }
            ],
            "@odata.nextLink": format!("{}/next-page?token=2", server.uri())
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next-page"))
        .and(query_param("token", "2"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {
                    "@odata.etag": "\"B,3\"",
                    "id": "2",
                    "parentReference": { "id": "A" },
                    "fields": { "FileLeafRef": "Child" }
                }
            ]
        })))
        .mount(&server)
        .await;

    let items = client_for(&server).list_items().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].entity_id().as_str(), "A");
    assert_eq!(items[1].display_name(), Some("Child"));
    assert_eq!(items[1].parent_entity_id().map(EntityId::as_str), Some("A"));
}

#[tokio::test]
async fn test_list_items_maps_upstream_errors() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/sites/site-1/lists/Documents/items"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "code": "serviceNotAvailable", "message": "Try again later" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).list_items().await.unwrap_err();
    assert!(
        matches!(err, GraphError::Api { status: 503, ref body } if body == "Try again later"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_drive_item_for_entity_bridges_through_sequence_id() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/sites/site-1/lists/Documents/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "@odata.etag": "\"A,1\"", "id": "7" },
                { "@odata.etag": "\"NOSEQ,1\"" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/site-1/lists/Documents/items/7/driveItem"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "01DRIVEITEM",
            "name": "Report.docx",
            "webUrl": "https://contoso.sharepoint.com/Report.docx",
            "parentReference": { "id": "01PARENT", "driveId": "drive-1" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let item = client
        .drive_item_for_entity(&EntityId::new("A"))
        .await
        .unwrap();
    assert_eq!(item.id, "01DRIVEITEM");
    assert_eq!(item.parent_id(), Some("01PARENT"));

    let direct = client.drive_item_for(SequenceId::new(7)).await.unwrap();
    assert_eq!(direct, item);

    let missing = client
        .drive_item_for_entity(&EntityId::new("ZZZ"))
        .await
        .unwrap_err();
    assert!(matches!(missing, GraphError::NotFound(_)));

    let no_sequence = client
        .drive_item_for_entity(&EntityId::new("NOSEQ"))
        .await
        .unwrap_err();
    assert!(matches!(no_sequence, GraphError::NotFound(_)));
}

#[tokio::test]
async fn test_drive_item_for_entity_uses_last_duplicate() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/sites/site-1/lists/Documents/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "@odata.etag": "\"A,1\"", "id": "3" },
                { "@odata.etag": "\"A,2\"", "id": "8" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/site-1/lists/Documents/items/8/driveItem"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "01LATER",
            "name": "Later.docx"
        })))
        .mount(&server)
        .await;

    let item = client_for(&server)
        .drive_item_for_entity(&EntityId::new("A"))
        .await
        .unwrap();
    assert_eq!(item.id, "01LATER");
}

#[tokio::test]
async fn test_create_folder_and_conflict() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/drives/drive-1/items/01PARENT/children"))
        .and(body_string_contains("\"name\":\"Invoices\""))
        .and(body_string_contains("\"@microsoft.graph.conflictBehavior\":\"fail\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "01NEW",
            "name": "Invoices",
            "webUrl": "https://contoso.sharepoint.com/Invoices"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/drives/drive-1/items/01PARENT/children"))
        .and(body_string_contains("\"name\":\"Existing\""))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": { "code": "nameAlreadyExists", "message": "Name already exists" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = client.create_folder("01PARENT", "Invoices").await.unwrap();
    assert_eq!(created.id, "01NEW");
    assert_eq!(created.web_url.as_deref(), Some("https://contoso.sharepoint.com/Invoices"));

    let err = client.create_folder("01PARENT", "Existing").await.unwrap_err();
    assert!(matches!(err, GraphError::Conflict(msg) if msg == "Name already exists"));
}

#[tokio::test]
async fn test_copy_item_outcomes() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/drives/drive-1/items/01TEMPLATE/copy"))
        .and(body_string_contains("\"id\":\"01DEST\""))
        .and(body_string_contains("\"name\":\"Client X\""))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("Location", "https://monitor.example/jobs/42"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/drives/drive-1/items/01SMALL/copy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "01COPY" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let accepted = client
        .copy_item("01TEMPLATE", "01DEST", Some("Client X"))
        .await
        .unwrap();
    assert_eq!(
        accepted,
        CopyOutcome::Accepted {
            monitor_url: Some("https://monitor.example/jobs/42".to_string())
        }
    );

    let completed = client.copy_item("01SMALL", "01DEST", None).await.unwrap();
    assert_eq!(completed, CopyOutcome::Completed);
}

#[tokio::test]
async fn test_upload_file_puts_content() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("PUT"))
        .and(path("/drives/drive-1/items/01FOLDER:/notes.pdf:/content"))
        .and(bearer())
        .and(body_string_contains("%PDF-fake"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "01UPLOADED",
            "name": "notes.pdf",
            "webUrl": "https://contoso.sharepoint.com/notes.pdf"
        })))
        .mount(&server)
        .await;

    let uploaded = client_for(&server)
        .upload_file("01FOLDER", "notes.pdf", b"%PDF-fake".to_vec())
        .await
        .unwrap();
    assert_eq!(uploaded.web_url.as_deref(), Some("https://contoso.sharepoint.com/notes.pdf"));
}

#[tokio::test]
async fn test_resolve_share_url_and_delete() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    let web_url = "https://contoso.sharepoint.com/sites/x/Shared%20Documents/notes.pdf";
    Mock::given(method("GET"))
        .and(path(format!("/shares/{}/driveItem", encode_sharing_url(web_url))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "01NOTES" })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/drives/drive-1/items/01NOTES"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/drives/drive-1/items/01GONE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "itemNotFound", "message": "The resource could not be found." }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let item = client.resolve_share_url(web_url).await.unwrap();
    assert_eq!(item.id, "01NOTES");
    client.delete_item(&item.id).await.unwrap();

    let err = client.delete_item("01GONE").await.unwrap_err();
    assert!(matches!(err, GraphError::NotFound(_)));
}

#[tokio::test]
async fn test_resolve_unknown_share_url_is_not_found() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .resolve_share_url("https://contoso.sharepoint.com/missing.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::NotFound(_)));
}

#[tokio::test]
async fn test_render_pdf_follows_redirect() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/drives/drive-1/items/01DOC/content"))
        .and(query_param("format", "pdf"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/rendered/01DOC.pdf", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rendered/01DOC.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.5 rendered".to_vec()))
        .mount(&server)
        .await;

    let bytes = client_for(&server).render_pdf("01DOC").await.unwrap();
    assert_eq!(bytes, b"%PDF-1.5 rendered");
}

#[tokio::test]
async fn test_render_pdf_not_renderable() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/drives/drive-1/items/01ZIP/content"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "error": { "code": "notSupported", "message": "Conversion not supported" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).render_pdf("01ZIP").await.unwrap_err();
    assert!(matches!(err, GraphError::NotRenderable(msg) if msg == "Conversion not supported"));
}
