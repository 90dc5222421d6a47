// Websocket implementation of the push channel
use crate::application::channel::{ChannelConnector, ChannelEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

const CHANNEL_BUFFER: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

impl ChannelConnector for WebSocketConnector {
    fn connect(&self, endpoint: &Url) -> mpsc::Receiver<ChannelEvent> {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
        tokio::spawn(run_channel(endpoint.clone(), tx));
        rx
    }
}

async fn run_channel(endpoint: Url, tx: mpsc::Sender<ChannelEvent>) {
    tracing::debug!(%endpoint, "opening websocket");
    let mut ws = match connect_async(endpoint.as_str()).await {
        Ok((ws, _)) => ws,
        Err(err) => {
            let _ = tx.send(ChannelEvent::Closed(Some(err.to_string()))).await;
            return;
        }
    };

    if tx.send(ChannelEvent::Opened).await.is_err() {
        let _ = ws.close(None).await;
        return;
    }

    let reason = loop {
        let event = match ws.next().await {
            Some(Ok(Message::Text(text))) => ChannelEvent::Message(text),
            Some(Ok(Message::Binary(bytes))) => {
                ChannelEvent::Message(String::from_utf8_lossy(&bytes).into_owned())
            }
            Some(Ok(Message::Close(frame))) => {
                break frame.map(|f| f.reason.into_owned()).filter(|r| !r.is_empty());
            }
            Some(Ok(_)) => continue,
            Some(Err(err)) => break Some(err.to_string()),
            None => break None,
        };

        if tx.send(event).await.is_err() {
            // Receiver dropped: the session has moved on to a new channel
            let _ = ws.close(None).await;
            return;
        }
    };

    let _ = tx.send(ChannelEvent::Closed(reason)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::SinkExt;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    #[tokio::test]
    async fn test_forwards_frames_until_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            ws.send(Message::Text("{\"System\":\"FireflyIO\"}".to_string()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        });

        let endpoint = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
        let mut rx = WebSocketConnector::new().connect(&endpoint);

        assert_eq!(rx.recv().await, Some(ChannelEvent::Opened));
        assert_eq!(
            rx.recv().await,
            Some(ChannelEvent::Message("{\"System\":\"FireflyIO\"}".to_string()))
        );
        assert!(matches!(rx.recv().await, Some(ChannelEvent::Closed(_))));
    }

    #[tokio::test]
    async fn test_close_frame_reason_is_forwarded() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            let frame = CloseFrame {
                code: CloseCode::Away,
                reason: "firmware update".into(),
            };
            let _ = ws.close(Some(frame)).await;
        });

        let endpoint = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
        let mut rx = WebSocketConnector::new().connect(&endpoint);

        assert_eq!(rx.recv().await, Some(ChannelEvent::Opened));
        assert_eq!(
            rx.recv().await,
            Some(ChannelEvent::Closed(Some("firmware update".to_string())))
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
        let mut rx = WebSocketConnector::new().connect(&endpoint);

        assert!(matches!(rx.recv().await, Some(ChannelEvent::Closed(Some(_)))));
    }
}
