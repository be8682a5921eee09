use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

use routine_studio::domain::{Condition, MatchResult, Point, Region, RuntimeContext};
use routine_studio::session::{
    ConfigurationMessage, Envelope, MemoryRoutineStore, SampleConditionMessage, SessionOptions,
    SetCurrMessage, WireMessage, connect, decode_envelope, encode_envelope,
};

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

type ServerSocket = WebSocketStream<TcpStream>;

fn run_async<F>(future: F) -> Result<(), String>
where
    F: std::future::Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;
    runtime.block_on(future)
}

async fn recv_envelope(socket: &mut ServerSocket) -> Result<Envelope, String> {
    loop {
        let message = tokio::time::timeout(STEP_TIMEOUT, socket.next())
            .await
            .map_err(|err| format!("server receive timed out: {}", err))?
            .ok_or_else(|| "client closed the socket".to_owned())?
            .map_err(|err| format!("server receive failed: {}", err))?;
        match message {
            Message::Binary(payload) => {
                return decode_envelope(&payload)
                    .map_err(|err| format!("server decode failed: {}", err));
            }
            Message::Text(text) => {
                return decode_envelope(text.as_bytes())
                    .map_err(|err| format!("server decode failed: {}", err));
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            Message::Close(_) => return Err("client sent close".to_owned()),
        }
    }
}

async fn send_envelope(socket: &mut ServerSocket, envelope: &Envelope) -> Result<(), String> {
    let payload = encode_envelope(envelope).map_err(|err| format!("encode failed: {}", err))?;
    socket
        .send(Message::Binary(payload))
        .await
        .map_err(|err| format!("server send failed: {}", err))
}

async fn serve_one(listener: TcpListener) -> Result<(), String> {
    let (stream, _) = listener
        .accept()
        .await
        .map_err(|err| format!("accept failed: {}", err))?;
    let mut socket = accept_async(stream)
        .await
        .map_err(|err| format!("handshake failed: {}", err))?;

    let first = recv_envelope(&mut socket).await?;
    match first.message {
        WireMessage::Configuration(request) if request == ConfigurationMessage::default() => {}
        other => return Err(format!("expected configuration request, got {:?}", other)),
    }
    send_envelope(
        &mut socket,
        &Envelope::new(WireMessage::Configuration(ConfigurationMessage {
            width: Some(1920),
            height: Some(1080),
        })),
    )
    .await?;

    // An unknown kind must not break the session.
    socket
        .send(Message::Text(r#"{"message":{"type":"telemetry"}}"#.to_owned()))
        .await
        .map_err(|err| format!("server send failed: {}", err))?;

    let query = recv_envelope(&mut socket).await?;
    let id = query
        .id
        .ok_or_else(|| "sample_condition carried no id".to_owned())?;
    match query.message {
        WireMessage::SampleCondition(sample) if sample.condition.is_some() => {}
        other => return Err(format!("expected sample_condition, got {:?}", other)),
    }
    send_envelope(
        &mut socket,
        &Envelope::correlated(
            id,
            WireMessage::SampleCondition(Box::new(SampleConditionMessage {
                condition: None,
                results: vec![MatchResult {
                    frame_id: Some(3),
                    score: 0.5,
                    position: Point::new(40, 60),
                }],
            })),
        ),
    )
    .await?;

    send_envelope(
        &mut socket,
        &Envelope::new(WireMessage::SetCurr(SetCurrMessage {
            node: Some(2),
            edge: Some(5),
        })),
    )
    .await?;

    let goto = recv_envelope(&mut socket).await?;
    if !matches!(goto.message, WireMessage::Goto(_)) {
        return Err(format!("expected goto, got {:?}", goto.message));
    }

    socket
        .close(None)
        .await
        .map_err(|err| format!("server close failed: {}", err))
}

#[test]
fn e2e_session_round_trip() -> Result<(), String> {
    run_async(async {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| format!("bind failed: {}", err))?;
        let addr = listener
            .local_addr()
            .map_err(|err| format!("local_addr failed: {}", err))?;
        let server = tokio::spawn(serve_one(listener));

        let (client, mut handle) = connect(
            &format!("ws://{}", addr),
            Arc::new(MemoryRoutineStore::new()),
            SessionOptions {
                query_timeout: Some(STEP_TIMEOUT),
                connect_timeout: Some(STEP_TIMEOUT),
            },
        )
        .await
        .map_err(|err| format!("connect failed: {}", err))?;

        let mut screen = client.state().subscribe_screen();
        let dimensions = tokio::time::timeout(STEP_TIMEOUT, screen.wait_for(Option::is_some))
            .await
            .map_err(|err| format!("screen never published: {}", err))?
            .map_err(|err| format!("screen channel closed: {}", err))?
            .ok_or_else(|| "screen missing".to_owned())?;
        if dimensions.width != 1920 || dimensions.height != 1080 {
            return Err(format!("unexpected screen {:?}", dimensions));
        }

        let condition = Condition {
            frame_id: Some(3),
            region: Region {
                x: 0,
                y: 0,
                width: 100,
                height: 100,
            },
            threshold: 0.8,
        };
        let results = client
            .query_condition(condition)
            .await
            .map_err(|err| format!("query failed: {}", err))?;
        let position = results.first().map(|result| result.position);
        if results.len() != 1 || position != Some(Point::new(40, 60)) {
            return Err(format!("unexpected results {:?}", results));
        }
        if client.pending_queries() != 0 {
            return Err("query left a pending entry".to_owned());
        }

        let mut runtime = client.state().subscribe_runtime();
        let context = *tokio::time::timeout(
            STEP_TIMEOUT,
            runtime.wait_for(|context| context.current_node.is_some()),
        )
        .await
        .map_err(|err| format!("runtime never published: {}", err))?
        .map_err(|err| format!("runtime channel closed: {}", err))?;
        let expected = RuntimeContext {
            current_node: Some(2),
            current_edge: Some(5),
        };
        if context != expected {
            return Err(format!("unexpected runtime context {:?}", context));
        }

        client
            .goto_node(7)
            .map_err(|err| format!("goto failed: {}", err))?;

        tokio::time::timeout(STEP_TIMEOUT, handle.closed())
            .await
            .map_err(|err| format!("session never closed: {}", err))?
            .map_err(|err| format!("session ended with error: {}", err))?;

        server
            .await
            .map_err(|err| format!("server task failed: {}", err))?
    })
}

#[test]
fn e2e_rejects_http_scheme() -> Result<(), String> {
    run_async(async {
        match connect(
            "http://127.0.0.1:1",
            Arc::new(MemoryRoutineStore::new()),
            SessionOptions::default(),
        )
        .await
        {
            Ok(_) => Err("expected http scheme to be rejected".to_owned()),
            Err(_) => Ok(()),
        }
    })
}
