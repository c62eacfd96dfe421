use devsync_engine::{Contact, ContactService, ContactServiceConfig, HttpContactService, SyncError};
use devsync_types::{
    ChannelMetadata, ContactId, ConversationAppendRequest, ConversationMetadata, ConversationType,
    Direction, EpochMillis,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer, token: Option<&str>) -> HttpContactService {
    HttpContactService::new(ContactServiceConfig {
        api_base_url: server.uri(),
        auth_token: token.map(str::to_string),
        ..Default::default()
    })
    .unwrap()
}

fn call_request(contact_id: &str) -> ConversationAppendRequest {
    ConversationAppendRequest {
        contact_id: ContactId::new(contact_id),
        kind: ConversationType::Call,
        direction: Direction::Incoming,
        preview_content: "Incoming call (42s)".into(),
        metadata: ConversationMetadata {
            detail: ChannelMetadata::Call {
                duration: 42,
                call_type: "INCOMING".into(),
            },
            synced_from_device: true,
            original_timestamp: EpochMillis::new(1_700_000_000_000),
        },
    }
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn config_defaults() {
    let cfg = ContactServiceConfig::default();
    assert_eq!(cfg.api_base_url, "http://localhost:5000");
    assert!(cfg.auth_token.is_none());
    assert_eq!(cfg.timeout_secs, 30);
}

#[test]
fn config_debug_redacts_token() {
    let cfg = ContactServiceConfig {
        auth_token: Some("secret-token".into()),
        ..Default::default()
    };
    let debug = format!("{:?}", cfg);
    assert!(debug.contains("<redacted>"));
    assert!(!debug.contains("secret-token"));
}

#[test]
fn config_partial_json_uses_defaults() {
    let cfg: ContactServiceConfig =
        serde_json::from_str(r#"{"api_base_url": "https://api.example.com"}"#).unwrap();
    assert_eq!(cfg.api_base_url, "https://api.example.com");
    assert_eq!(cfg.timeout_secs, 30);
}

#[test]
fn contact_wire_shape() {
    let contact: Contact = serde_json::from_value(json!({
        "_id": "c1",
        "name": "Ada",
        "phone": "555-123-4567",
        "alternatePhones": ["", "555-000-1111"],
        "notes": "ignored",
    }))
    .unwrap();

    assert_eq!(contact.id, ContactId::new("c1"));
    assert_eq!(
        contact.phones().collect::<Vec<_>>(),
        vec!["555-123-4567", "555-000-1111"]
    );
}

// ── Contact list ────────────────────────────────────────────────

#[tokio::test]
async fn get_contacts_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mobile/contacts"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "contacts": [
                { "_id": "c1", "name": "Ada", "phone": "+15551234567" },
                { "_id": "c2", "name": "Grace" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let contacts = service(&server, Some("tok")).get_contacts().await.unwrap();

    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0].phone, "+15551234567");
    assert_eq!(contacts[1].phone, "");
}

#[tokio::test]
async fn get_contacts_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mobile/contacts"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = service(&server, None).get_contacts().await.unwrap_err();
    match err {
        SyncError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "unauthorized");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn get_contacts_unsuccessful_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mobile/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "account suspended"
        })))
        .mount(&server)
        .await;

    let err = service(&server, None).get_contacts().await.unwrap_err();
    assert!(matches!(err, SyncError::Api { ref message, .. } if message == "account suspended"));
}

#[tokio::test]
async fn get_contacts_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mobile/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = service(&server, None).get_contacts().await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

#[tokio::test]
async fn get_contacts_unreachable() {
    let service = HttpContactService::new(ContactServiceConfig {
        api_base_url: "http://127.0.0.1:1".into(),
        timeout_secs: 2,
        ..Default::default()
    })
    .unwrap();

    let err = service.get_contacts().await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

// ── Conversation append ─────────────────────────────────────────

#[tokio::test]
async fn add_conversation_posts_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/mobile/contacts/c1/conversation"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({
            "type": "call",
            "direction": "incoming",
            "content": "Incoming call (42s)",
            "metadata": {
                "duration": 42,
                "callType": "INCOMING",
                "syncedFromDevice": true,
                "originalTimestamp": 1_700_000_000_000i64
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    service(&server, Some("tok"))
        .add_conversation(&call_request("c1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn add_conversation_encodes_contact_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/mobile/contacts/a%2Fb/conversation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    service(&server, None)
        .add_conversation(&call_request("a/b"))
        .await
        .unwrap();
}

#[tokio::test]
async fn add_conversation_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = service(&server, None)
        .add_conversation(&call_request("c1"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Api { status: 500, .. }));
}

#[tokio::test]
async fn add_conversation_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "contact not found"
        })))
        .mount(&server)
        .await;

    let err = service(&server, None)
        .add_conversation(&call_request("gone"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "api error (200): contact not found");
}

#[tokio::test]
async fn trailing_slash_in_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mobile/contacts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "contacts": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = HttpContactService::new(ContactServiceConfig {
        api_base_url: format!("{}/", server.uri()),
        ..Default::default()
    })
    .unwrap();
    assert!(service.get_contacts().await.unwrap().is_empty());
}
