use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use dictdoc_auth::{OAuthIdentity, TokenProvider};
use dictdoc_config::auth::AuthConfig;
use dictdoc_docs::fake::{FAKE_TOKEN, FakeGoogle};
use dictdoc_types::HostMessage;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::service::{SaveService, request_save};

fn identity(token: Option<&str>) -> Arc<OAuthIdentity> {
    let config = AuthConfig {
        access_token: token.map(str::to_string),
        ..AuthConfig::default()
    };
    Arc::new(OAuthIdentity::new(&config))
}

fn service(google: &FakeGoogle, token: Option<&str>) -> SaveService {
    SaveService::new(
        TokenProvider::new(identity(token)),
        google.store(),
        "My Dictionary".to_string(),
    )
}

fn message(content: &str) -> HostMessage {
    HostMessage::SaveToGoogleDocs {
        content: content.to_string(),
        word: "ubiquitous".to_string(),
    }
}

#[tokio::test]
async fn test_first_save_creates_document_once() {
    let google = FakeGoogle::start().await.unwrap();
    let service = service(&google, Some(FAKE_TOKEN));

    let response = service.handle(message("Word: ubiquitous")).await;

    let receipt = response.into_result().unwrap();
    assert_eq!(google.create_calls(), 1);
    assert_eq!(google.append_calls(), 1);
    assert_eq!(google.documents_titled("My Dictionary"), vec![receipt.doc_id.clone()]);
    assert_eq!(
        google.document_text(&receipt.doc_id).unwrap(),
        "\nWord: ubiquitous\n"
    );
}

#[tokio::test]
async fn test_second_save_reuses_document_and_appends_again() {
    let google = FakeGoogle::start().await.unwrap();
    let service = service(&google, Some(FAKE_TOKEN));

    let first = service.handle(message("Word: cat")).await.into_result().unwrap();
    let second = service.handle(message("Word: cat")).await.into_result().unwrap();

    assert_eq!(first.doc_id, second.doc_id);
    assert_eq!(google.create_calls(), 1);
    assert_eq!(google.document_count(), 1);
    let text = google.document_text(&first.doc_id).unwrap();
    assert_eq!(text.matches("Word: cat").count(), 2);
}

#[tokio::test]
async fn test_existing_document_is_not_recreated() {
    let google = FakeGoogle::start().await.unwrap();
    let existing = google.insert_document("My Dictionary", "earlier entries");
    let service = service(&google, Some(FAKE_TOKEN));

    let receipt = service.handle(message("Word: dog")).await.into_result().unwrap();

    assert_eq!(receipt.doc_id, existing);
    assert_eq!(google.create_calls(), 0);
    assert_eq!(
        google.document_text(&existing).unwrap(),
        "earlier entries\nWord: dog\n"
    );
}

#[tokio::test]
async fn test_missing_grant_fails_before_any_request() {
    let google = FakeGoogle::start().await.unwrap();
    let service = service(&google, None);

    let response = service.handle(message("Word: dog")).await;

    assert!(!response.success);
    assert!(response.error.unwrap().starts_with("Authentication failed"));
    assert_eq!(google.search_calls(), 0);
    assert_eq!(google.document_count(), 0);
}

#[tokio::test]
async fn test_rejected_token_fails_the_save() {
    let google = FakeGoogle::start().await.unwrap();
    let service = service(&google, Some("expired"));

    let response = service.handle(message("Word: dog")).await;

    let error = response.into_result().unwrap_err();
    assert!(error.contains("Access token was rejected"), "{error}");
    assert_eq!(google.create_calls(), 0);
}

#[tokio::test]
async fn test_save_after_rejected_token_uses_fresh_one() {
    let google = FakeGoogle::start().await.unwrap();
    let exchanges = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/token",
            post(|State(exchanges): State<Arc<AtomicUsize>>| async move {
                exchanges.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "access_token": FAKE_TOKEN, "expires_in": 3599 }))
            }),
        )
        .with_state(exchanges.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let identity = OAuthIdentity::new(&AuthConfig {
        access_token: Some("expired".to_string()),
        refresh_token: Some("refresh".to_string()),
        client_id: Some("client".to_string()),
        client_secret: Some("secret".to_string()),
        token_url: format!("http://{addr}/token"),
    });
    let service = SaveService::new(
        TokenProvider::new(Arc::new(identity)),
        google.store(),
        "My Dictionary".to_string(),
    );

    let first = service.handle(message("Word: dog")).await;
    assert!(!first.success);
    assert_eq!(exchanges.load(Ordering::SeqCst), 0);

    let second = service.handle(message("Word: dog")).await;
    let receipt = second.into_result().unwrap();
    assert_eq!(exchanges.load(Ordering::SeqCst), 1);
    assert_eq!(google.document_text(&receipt.doc_id).unwrap(), "\nWord: dog\n");
}

#[tokio::test]
async fn test_request_round_trip_over_host_channel() {
    let google = FakeGoogle::start().await.unwrap();
    let service = Arc::new(service(&google, Some(FAKE_TOKEN)));
    let (host_tx, host_rx) = kanal::bounded_async(4);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(service.run(host_rx, cancel.clone()));

    let response = request_save(&host_tx, message("Word: owl")).await;

    assert!(response.success);
    assert_eq!(google.append_calls(), 1);

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_request_without_service_fails() {
    let (host_tx, host_rx) = kanal::bounded_async(1);
    drop(host_rx);

    let response = request_save(&host_tx, message("Word: owl")).await;

    assert_eq!(response.error.as_deref(), Some("Save service unavailable"));
}
