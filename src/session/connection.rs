use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{AppError, AppResult, SessionError};

use super::client::{SessionClient, SessionOptions};
use super::protocol::{Envelope, encode_envelope};
use super::store::RoutineStore;

/// Handshake limit used when [`SessionOptions::connect_timeout`] is unset.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validates a session endpoint. Only `ws` and `wss` are accepted.
///
/// # Errors
///
/// Returns an error when the URL does not parse or uses another scheme.
pub fn parse_session_url(value: &str) -> AppResult<Url> {
    let url = Url::parse(value).map_err(|err| {
        AppError::session(SessionError::InvalidUrl {
            url: value.to_owned(),
            source: err,
        })
    })?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(AppError::session(SessionError::UnsupportedScheme {
            scheme: other.to_owned(),
        })),
    }
}

/// Background tasks driving one connection.
#[derive(Debug)]
pub struct SessionHandle {
    reader: JoinHandle<AppResult<()>>,
    writer: JoinHandle<()>,
}

impl SessionHandle {
    /// Waits until the remote side closes the connection. Call at most once
    /// to completion.
    ///
    /// # Errors
    ///
    /// Returns the transport error that ended the read loop, if any.
    pub async fn closed(&mut self) -> AppResult<()> {
        let result = (&mut self.reader).await;
        self.writer.abort();
        result?
    }

    /// Tears the connection down. Pending queries stay pending.
    pub fn shutdown(&self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Opens the session socket, starts the reader and writer tasks and sends
/// the configuration request.
///
/// # Errors
///
/// Returns an error when the URL is invalid, the handshake fails or it does
/// not complete within the connect timeout.
pub async fn connect(
    url: &str,
    store: Arc<dyn RoutineStore>,
    options: SessionOptions,
) -> AppResult<(SessionClient, SessionHandle)> {
    let url = parse_session_url(url)?;
    info!("Connecting to runtime {}", url);
    let connect_timeout = options.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
    let (socket, _response) = match timeout(connect_timeout, connect_async(url.as_str())).await {
        Ok(Ok(connected)) => connected,
        Ok(Err(err)) => {
            return Err(AppError::session(SessionError::Connection {
                url: url.to_string(),
                source: Box::new(err),
            }));
        }
        Err(_elapsed) => {
            return Err(AppError::session(SessionError::ConnectTimeout {
                url: url.to_string(),
                timeout_ms: u64::try_from(connect_timeout.as_millis()).unwrap_or(u64::MAX),
            }));
        }
    };
    info!("Connected to runtime {}", url);

    let (mut sink, stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Envelope>();
    let writer = tokio::spawn(async move {
        while let Some(envelope) = out_rx.recv().await {
            let payload = match encode_envelope(&envelope) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!("Dropping outbound {}: {}", envelope.message.kind(), err);
                    continue;
                }
            };
            if let Err(err) = sink.send(Message::Binary(payload)).await {
                warn!("Session write failed: {}", err);
                break;
            }
        }
        drop(sink.close().await);
    });

    let client = SessionClient::new(out_tx, store, options);
    let reader_client = client.clone();
    let reader = tokio::spawn(async move { read_loop(stream, &reader_client).await });

    client.request_configuration()?;
    Ok((client, SessionHandle { reader, writer }))
}

async fn read_loop<S>(mut stream: S, client: &SessionClient) -> AppResult<()>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(message) = stream.next().await {
        let message = message.map_err(|err| {
            AppError::session(SessionError::WebSocket {
                context: "read envelope",
                source: Box::new(err),
            })
        })?;
        match message {
            Message::Binary(payload) => client.handle_payload(&payload),
            Message::Text(payload) => client.handle_payload(payload.as_bytes()),
            Message::Close(frame) => {
                info!("Runtime closed the session: {:?}", frame);
                return Ok(());
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {
                debug!("Ignoring control frame");
            }
        }
    }
    info!("Session stream ended");
    Ok(())
}
