//! Realtime channel - one WebSocket per subscription, JSON frames to a callback

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::network::client::ApiClient;

/// WebSocket URL for a base URL: `http` becomes `ws`, `https` becomes `wss`
pub fn realtime_url(base_url: &Url) -> Url {
    let mut url = base_url.clone();
    let scheme = match base_url.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    if url.set_scheme(scheme).is_err() {
        tracing::warn!(url = %base_url, "Could not switch base URL to a WebSocket scheme");
    }
    url
}

/// Handle to an open realtime channel
///
/// Dropping the handle leaves the connection running until the server closes
/// it; call [`close`](Self::close) to end it.
#[derive(Debug)]
pub struct RealtimeChannel {
    url: Url,
    outgoing_tx: mpsc::UnboundedSender<String>,
    close_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RealtimeChannel {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Queue a JSON frame for the server
    pub fn send<T: Serialize + ?Sized>(&self, message: &T) -> ApiResult<()> {
        let text = serde_json::to_string(message).map_err(ApiError::Encode)?;
        self.outgoing_tx
            .send(text)
            .map_err(|_| ApiError::ChannelClosed)
    }

    /// True once the connection task has stopped
    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }

    /// Close the connection and wait for the task to stop
    pub async fn close(mut self) {
        if let Some(close_tx) = self.close_tx.take() {
            let _ = close_tx.send(());
        }
        self.closed().await;
    }

    /// Wait until the connection ends
    pub async fn closed(&mut self) {
        if !self.task.is_finished() {
            let _ = (&mut self.task).await;
        }
    }
}

impl ApiClient {
    /// Open the realtime channel.
    ///
    /// Every inbound frame is decoded as JSON into `T` and passed to
    /// `on_message`. Connection errors are logged; there is no reconnect.
    /// Returns `None` when called outside a Tokio runtime.
    pub fn subscribe<T, F>(&self, on_message: F) -> Option<RealtimeChannel>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime available; realtime channel not opened");
            return None;
        };

        let url = realtime_url(self.base_url());
        let (close_tx, close_rx) = oneshot::channel();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();

        let task = runtime.spawn(run_channel(url.clone(), on_message, outgoing_rx, close_rx));

        Some(RealtimeChannel {
            url,
            outgoing_tx,
            close_tx: Some(close_tx),
            task,
        })
    }
}

async fn run_channel<T, F>(
    url: Url,
    mut on_message: F,
    mut outgoing_rx: mpsc::UnboundedReceiver<String>,
    mut close_rx: oneshot::Receiver<()>,
) where
    T: DeserializeOwned,
    F: FnMut(T),
{
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            tracing::error!(url = %url, error = %e, "Realtime connection failed");
            return;
        }
    };

    tracing::info!(url = %url, "Realtime channel connected");

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;

            // Close requested by the handle; a dropped handle leaves the channel open
            Ok(()) = &mut close_rx => {
                let _ = write.close().await;
                tracing::info!(url = %url, "Realtime channel closed by client");
                return;
            }

            Some(text) = outgoing_rx.recv() => {
                if let Err(e) = write.send(Message::Text(text)).await {
                    tracing::error!(url = %url, error = %e, "Realtime send failed");
                    return;
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => deliver(&url, text.as_bytes(), &mut on_message),
                    Some(Ok(Message::Binary(data))) => deliver(&url, &data, &mut on_message),
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| format!("{}: {}", f.code, f.reason))
                            .unwrap_or_else(|| "Connection closed".to_string());
                        tracing::info!(url = %url, reason = %reason, "Realtime channel closed by server");
                        return;
                    }
                    Some(Err(e)) => {
                        tracing::error!(url = %url, error = %e, "Realtime receive error");
                        return;
                    }
                    None => {
                        tracing::info!(url = %url, "Realtime stream ended");
                        return;
                    }
                }
            }
        }
    }
}

fn deliver<T, F>(url: &Url, payload: &[u8], on_message: &mut F)
where
    T: DeserializeOwned,
    F: FnMut(T),
{
    match serde_json::from_slice::<T>(payload) {
        Ok(message) => on_message(message),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, bytes = payload.len(), "Dropping realtime frame that is not valid JSON");
        }
    }
}
