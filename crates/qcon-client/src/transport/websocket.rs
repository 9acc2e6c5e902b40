//! WebSocket transport backed by tokio-tungstenite.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use qcon_core::error::{ConsoleError, ConsoleResult};

use super::Transport;

/// A WebSocket connection to the game server.
///
/// Text frames carry the protocol; pings are answered in place and every
/// other frame kind is ignored.
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closing: bool,
}

impl WebSocketTransport {
    /// Connect to a game server.
    pub async fn connect(url: &str) -> ConsoleResult<Self> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| ConsoleError::Transport(format!("WebSocket connect error: {e}")))?;

        tracing::info!("WebSocket connected to {}", url);

        Ok(Self {
            stream,
            closing: false,
        })
    }
}

impl Transport for WebSocketTransport {
    async fn send(&mut self, text: &str) -> ConsoleResult<()> {
        self.stream
            .send(Message::Text(text.to_string()))
            .await
            .map_err(|e| ConsoleError::Transport(format!("WS write error: {e}")))
    }

    async fn recv(&mut self) -> ConsoleResult<Option<String>> {
        loop {
            let Some(msg) = self.stream.next().await else {
                return Ok(None);
            };

            match msg {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Ping(payload)) => {
                    let _ = self.stream.send(Message::Pong(payload)).await;
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!("WebSocket close frame received");
                    return Ok(None);
                }
                Ok(_) => {} // binary frames, pongs
                Err(e) => {
                    // An intentional close tears the stream down from under
                    // the reader; report end of stream, not an error.
                    if self.closing {
                        return Ok(None);
                    }
                    return Err(ConsoleError::Transport(format!("WS read error: {e}")));
                }
            }
        }
    }

    async fn close(&mut self) -> ConsoleResult<()> {
        self.closing = true;
        let _ = self.stream.send(Message::Close(None)).await;
        Ok(())
    }
}
