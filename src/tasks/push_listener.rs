use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::error::SendError;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::app::{Msg, PushStatus};
use crate::error::ChannelError;
use crate::models::PushMessage;

// Text frames of one push-channel session; the stream ends when the session closes
pub type PushStream = BoxStream<'static, Result<String, ChannelError>>;

#[async_trait]
pub trait PushConnector: Send + Sync {
    async fn connect(&self) -> Result<PushStream, ChannelError>;
}

pub struct WsConnector {
    url: Url,
}

impl WsConnector {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

#[async_trait]
impl PushConnector for WsConnector {
    async fn connect(&self) -> Result<PushStream, ChannelError> {
        let (socket, _response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|e| ChannelError::Connect {
                    url: self.url.to_string(),
                    reason: e.to_string(),
                })?;

        // Receive-only: binary and control frames are skipped, a close frame ends the session
        let frames = socket
            .take_while(|frame| futures::future::ready(!matches!(frame, Ok(Message::Close(_)))))
            .filter_map(|frame| {
                futures::future::ready(match frame {
                    Ok(Message::Text(text)) => Some(Ok(text)),
                    Ok(_) => None,
                    Err(e) => Some(Err(ChannelError::Transport(e.to_string()))),
                })
            });
        Ok(frames.boxed())
    }
}

// One reconnect per session end after a fixed delay, until the event loop is gone
pub async fn run_push_listener<C: PushConnector>(
    connector: C,
    tx: UnboundedSender<Msg>,
    reconnect_delay: Duration,
) {
    info!("Starting push listener...");

    loop {
        if tx.send(Msg::PushStatus(PushStatus::Connecting)).is_err() {
            break;
        }

        match connector.connect().await {
            Ok(mut frames) => {
                info!("Push channel connected");
                if tx.send(Msg::PushStatus(PushStatus::Open)).is_err() {
                    break;
                }
                while let Some(frame) = frames.next().await {
                    match frame {
                        Ok(text) => {
                            if dispatch_frame(&tx, &text).is_err() {
                                debug!("Event loop gone, push listener stopping");
                                return;
                            }
                        }
                        Err(e) => {
                            error!("Push channel error: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(e) => error!("Push channel error: {}", e),
        }

        warn!(
            "Push channel closed, reconnecting in {} ms...",
            reconnect_delay.as_millis()
        );
        if tx.send(Msg::PushStatus(PushStatus::Closed)).is_err() {
            break;
        }
        tokio::time::sleep(reconnect_delay).await;
    }

    debug!("Event loop gone, push listener stopping");
}

fn dispatch_frame(tx: &UnboundedSender<Msg>, text: &str) -> Result<(), SendError<Msg>> {
    match serde_json::from_str::<PushMessage>(text) {
        Ok(message) => {
            debug!("Received push message: {:?}", message);
            tx.send(Msg::Push(message))
        }
        Err(e) => {
            warn!("Ignoring malformed push message: {}", e);
            Ok(())
        }
    }
}
