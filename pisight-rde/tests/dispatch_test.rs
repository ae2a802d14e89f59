//! Dispatch tests against a mock backend

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use image::{Rgb, RgbImage};
use mockito::{Matcher, Server};
use pisight_core::{FaultKind, Mode};
use pisight_eye::CapturedImage;
use pisight_rde::{
    DispatchError, Dispatcher, NotificationEvent, Notifier, RemoteConfig, RetryConfig,
    TextDetectionType, VisionApiClient, VisionApiConfig,
};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn config_for(base_url: String) -> RemoteConfig {
    RemoteConfig {
        base_url,
        timeout_secs: 5,
        retry: RetryConfig {
            max_retries: 1,
            retry_delay_ms: 0,
        },
        ..RemoteConfig::default()
    }
}

fn frame() -> CapturedImage {
    CapturedImage::new(RgbImage::from_pixel(32, 24, Rgb([200, 40, 40])), Utc::now())
}

#[tokio::test]
async fn test_color_dispatch() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/detect_color")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("k".into(), "3".into()),
            Matcher::UrlEncoded("socket_emit_path".into(), "iOS_results".into()),
        ]))
        .match_header("content-type", "image/jpeg")
        .with_status(200)
        .with_body("red")
        .expect(1)
        .create_async()
        .await;

    let dispatcher = Dispatcher::from_config(&config_for(server.url()), 90).unwrap();
    let outcome = dispatcher.dispatch(&frame(), Mode::Color).await.unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.mode, Mode::Color);
    assert_eq!(outcome.route, "/detect_color");
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.attempts, 1);
    assert!(outcome.payload_bytes > 0);
}

#[tokio::test]
async fn test_text_dispatch_sends_base64() {
    let mut server = Server::new_async().await;
    let dispatcher = Dispatcher::from_config(&config_for(server.url()), 90).unwrap();
    let request = dispatcher.prepare(&frame(), Mode::Text).unwrap();
    let expected_body = STANDARD.encode(request.jpeg());

    let mock = server
        .mock("POST", "/ocr")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("type".into(), "TEXT_DETECTION".into()),
            Matcher::UrlEncoded("socket_emit_path".into(), "iOS_results".into()),
        ]))
        .match_body(Matcher::Exact(expected_body))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    dispatcher.send(&request).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_document_dispatch() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/ocr")
        .match_query(Matcher::UrlEncoded(
            "type".into(),
            "DOCUMENT_TEXT_DETECTION".into(),
        ))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let dispatcher = Dispatcher::from_config(&config_for(server.url()), 90).unwrap();
    dispatcher.dispatch(&frame(), Mode::Document).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_money_dispatch() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/classify_money")
        .match_query(Matcher::UrlEncoded(
            "socket_emit_path".into(),
            "iOS_results".into(),
        ))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let dispatcher = Dispatcher::from_config(&config_for(server.url()), 90).unwrap();
    let outcome = dispatcher.dispatch(&frame(), Mode::Money).await.unwrap();
    mock.assert_async().await;
    assert_eq!(outcome.route, "/classify_money");
}

#[tokio::test]
async fn test_server_error_retried_once() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/detect_color")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let dispatcher = Dispatcher::from_config(&config_for(server.url()), 90).unwrap();
    let err = dispatcher.dispatch(&frame(), Mode::Color).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, DispatchError::BadResponse { status: 503, .. }));
    assert_eq!(err.kind(), Some(FaultKind::BadResponse));
}

#[tokio::test]
async fn test_client_error_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/classify_money")
        .match_query(Matcher::Any)
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let dispatcher = Dispatcher::from_config(&config_for(server.url()), 90).unwrap();
    let err = dispatcher.dispatch(&frame(), Mode::Money).await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.kind(), Some(FaultKind::BadResponse));
}

#[tokio::test]
async fn test_non_200_success_code_is_bad_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/detect_color")
        .match_query(Matcher::Any)
        .with_status(201)
        .create_async()
        .await;

    let dispatcher = Dispatcher::from_config(&config_for(server.url()), 90).unwrap();
    let err = dispatcher.dispatch(&frame(), Mode::Color).await.unwrap_err();
    assert!(matches!(err, DispatchError::BadResponse { status: 201, .. }));
}

/// Accept one request, read it whole, then reply 200 with a body cut short
async fn truncated_reply_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nred")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_unreadable_reply_body_still_succeeds() {
    let base_url = truncated_reply_backend().await;
    let dispatcher = Dispatcher::from_config(&config_for(base_url), 90).unwrap();

    let outcome = dispatcher.dispatch(&frame(), Mode::Color).await.unwrap();
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.attempts, 1);
}

#[tokio::test]
async fn test_unreachable_backend_is_network_fault() {
    let dispatcher = Dispatcher::from_config(&config_for("http://127.0.0.1:1".to_string()), 90).unwrap();
    let err = dispatcher.dispatch(&frame(), Mode::Color).await.unwrap_err();
    assert_eq!(err.kind(), Some(FaultKind::NetworkFault));
}

#[tokio::test]
async fn test_notifier_posts_mode_change() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/socket_emit")
        .match_query(Matcher::UrlEncoded("path".into(), "iOS_info".into()))
        .match_body(Matcher::Exact("DOCUMENT".to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let dispatcher = Dispatcher::from_config(&config_for(server.url()), 90).unwrap();
    let notifier = Notifier::new(Arc::clone(dispatcher.client()), "iOS_info", true);

    assert!(notifier.notify(NotificationEvent::ModeChanged(Mode::Document)).await);
    mock.assert_async().await;
    assert_eq!(notifier.delivered(), 1);
}

#[tokio::test]
async fn test_notifier_skips_faults_when_disabled() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/socket_emit")
        .match_query(Matcher::Any)
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let dispatcher = Dispatcher::from_config(&config_for(server.url()), 90).unwrap();
    let notifier = Notifier::new(Arc::clone(dispatcher.client()), "iOS_info", false);

    assert!(!notifier.notify(NotificationEvent::Fault(FaultKind::NetworkFault)).await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_notifier_failure_is_swallowed() {
    let dispatcher = Dispatcher::from_config(&config_for("http://127.0.0.1:1".to_string()), 90).unwrap();
    let notifier = Notifier::new(Arc::clone(dispatcher.client()), "iOS_info", true);
    assert!(!notifier.notify(NotificationEvent::ModeChanged(Mode::Money)).await);
    assert_eq!(notifier.delivered(), 0);
}

#[tokio::test]
async fn test_vision_api_annotate() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/images:annotate")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "requests": [{ "features": [{ "type": "DOCUMENT_TEXT_DETECTION", "maxResults": 1 }] }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"responses":[{"textAnnotations":[{"locale":"en","description":"EXIT\n"},{"description":"EXIT"}]}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = VisionApiClient::new(&VisionApiConfig {
        endpoint: format!("{}/v1/images:annotate", server.url()),
        api_key: Some("test-key".to_string()),
        ..VisionApiConfig::default()
    })
    .unwrap();

    let annotation = client
        .annotate(&[0xFF, 0xD8, 0xFF, 0xD9], TextDetectionType::DocumentTextDetection)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(annotation.text.as_deref(), Some("EXIT\n"));
    assert_eq!(annotation.locale.as_deref(), Some("en"));
}

#[tokio::test]
async fn test_vision_api_error_payload() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/images:annotate")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#)
        .create_async()
        .await;

    let client = VisionApiClient::new(&VisionApiConfig {
        endpoint: format!("{}/v1/images:annotate", server.url()),
        api_key: Some("test-key".to_string()),
        ..VisionApiConfig::default()
    })
    .unwrap();

    let err = client
        .annotate(b"not a jpeg", TextDetectionType::TextDetection)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::InvalidResponse(_)));
    assert_eq!(err.kind(), Some(FaultKind::BadResponse));
}
