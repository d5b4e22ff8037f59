mod common;

use common::serve_events;
use futures::StreamExt;
use lf_api_contract::SseFrame;
use lf_client_api::{FlowError, StreamConnector};
use lf_rest_client::{ClientConfig, EventSourceConnector};
use std::time::Duration;
use tokio::time::timeout;

fn connector(base_url: &str, token: &str) -> EventSourceConnector {
    EventSourceConnector::new(ClientConfig::from_url(base_url, token).unwrap())
}

#[tokio::test]
async fn test_event_stream_yields_frames_with_bearer_header() {
    let (base_url, server) = serve_events(&[
        "data: {\"chunk\":\"a\"}\n\n",
        ": keep-alive\n\n",
        "data: {\"chunk\":\"b\"}\n\n",
        "event: close\ndata: done\n\n",
    ])
    .await;

    let frames = connector(&base_url, "tok")
        .connect(&format!("{base_url}/api/v1/stream/s-1"))
        .await
        .unwrap();
    let frames: Vec<_> = timeout(Duration::from_secs(10), frames.take(3).collect())
        .await
        .unwrap();

    assert_eq!(
        frames,
        vec![
            Ok(SseFrame::message(r#"{"chunk":"a"}"#)),
            Ok(SseFrame::message(r#"{"chunk":"b"}"#)),
            Ok(SseFrame {
                event_type: "close".to_string(),
                data: "done".to_string(),
            }),
        ]
    );

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/v1/stream/s-1 HTTP/1.1"));
    assert!(request.to_lowercase().contains("authorization: bearer tok"));
}

#[tokio::test]
async fn test_hang_up_without_close_event_is_stream_error() {
    let (base_url, server) = serve_events(&["data: {\"chunk\":\"a\"}\n\n"]).await;

    let frames = connector(&base_url, "tok")
        .connect("/api/v1/stream/s-2")
        .await
        .unwrap();
    let frames: Vec<_> = timeout(Duration::from_secs(10), frames.collect())
        .await
        .unwrap();

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], Ok(SseFrame::message(r#"{"chunk":"a"}"#)));
    assert!(matches!(frames[1], Err(FlowError::Stream(_))));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/v1/stream/s-2 HTTP/1.1"));
}
