//! Live voice uplink over the BidiGenerateContent WebSocket.
//!
//! `connect_live` performs the handshake and setup frame, then hands the
//! socket to a pump task. The caller keeps a [`LiveSession`] to send turns
//! and to close. `on_close` fires exactly once per established session.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use super::prompts;
use super::wire::{Content, SpeechConfig};
use super::{Gateway, GatewayError, Result};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const INPUT_AUDIO_MIME: &str = "audio/pcm;rate=16000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    SetupComplete,
    /// Decoded PCM from the model's turn.
    Audio(Vec<u8>),
    Text(String),
    TurnComplete,
    Interrupted,
}

pub trait LiveCallbacks: Send + Sync + 'static {
    fn on_open(&self);
    fn on_message(&self, event: LiveEvent);
    fn on_error(&self, error: &GatewayError);
    fn on_close(&self);
}

enum Outgoing {
    Text(String),
    Audio(Vec<u8>),
}

impl Outgoing {
    fn to_frame(&self) -> String {
        let value = match self {
            Outgoing::Text(text) => json!({
                "clientContent": {
                    "turns": [{"role": "user", "parts": [{"text": text}]}],
                    "turnComplete": true
                }
            }),
            Outgoing::Audio(pcm) => json!({
                "realtimeInput": {
                    "audio": {"data": STANDARD.encode(pcm), "mimeType": INPUT_AUDIO_MIME}
                }
            }),
        };
        value.to_string()
    }
}

/// Cloneable sending half of a session. Sends wait while the outgoing
/// queue is full.
#[derive(Clone)]
pub struct LiveSender {
    outgoing: mpsc::Sender<Outgoing>,
}

impl LiveSender {
    pub async fn send_text(&self, text: impl Into<String>) -> Result<()> {
        self.send(Outgoing::Text(text.into())).await
    }

    /// Stream a chunk of 16 kHz little-endian PCM.
    pub async fn send_audio(&self, pcm: &[u8]) -> Result<()> {
        self.send(Outgoing::Audio(pcm.to_vec())).await
    }

    async fn send(&self, frame: Outgoing) -> Result<()> {
        self.outgoing
            .send(frame)
            .await
            .map_err(|_| GatewayError::SessionClosed)
    }
}

/// Handle to an open uplink. Dropping it also ends the session.
pub struct LiveSession {
    sender: LiveSender,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl LiveSession {
    pub fn sender(&self) -> LiveSender {
        self.sender.clone()
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<()> {
        self.sender.send_text(text).await
    }

    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn close(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!("live uplink task ended abnormally: {e}");
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    #[serde(default)]
    setup_complete: Option<Value>,
    #[serde(default)]
    server_content: Option<ServerContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    #[serde(default)]
    model_turn: Option<Content>,
    #[serde(default)]
    turn_complete: bool,
    #[serde(default)]
    interrupted: bool,
}

fn setup_frame(model: &str, voice: &str) -> String {
    json!({
        "setup": {
            "model": format!("models/{model}"),
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": SpeechConfig::voice(voice),
            },
            "systemInstruction": {"parts": [{"text": prompts::live_instruction()}]}
        }
    })
    .to_string()
}

/// Translate one server frame into events. Malformed frames and undecodable
/// audio are dropped.
fn decode_frame(raw: &[u8]) -> Vec<LiveEvent> {
    let message: ServerMessage = match serde_json::from_slice(raw) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!("dropping unparseable live frame: {e}");
            return Vec::new();
        }
    };

    let mut events = Vec::new();
    if message.setup_complete.is_some() {
        events.push(LiveEvent::SetupComplete);
    }
    if let Some(content) = message.server_content {
        for part in content.model_turn.into_iter().flat_map(|c| c.parts) {
            if let Some(inline) = part.inline_data {
                match STANDARD.decode(inline.data.as_bytes()) {
                    Ok(pcm) => events.push(LiveEvent::Audio(pcm)),
                    Err(e) => tracing::debug!("dropping malformed audio payload: {e}"),
                }
            }
            if let Some(text) = part.text
                && part.thought != Some(true)
            {
                events.push(LiveEvent::Text(text));
            }
        }
        if content.interrupted {
            events.push(LiveEvent::Interrupted);
        }
        if content.turn_complete {
            events.push(LiveEvent::TurnComplete);
        }
    }
    events
}

impl Gateway {
    /// Live URL with the API key appended as a query pair.
    fn live_endpoint(&self) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.live_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {e}", self.live_url)))?;
        url.query_pairs_mut().append_pair("key", self.key()?);
        Ok(url)
    }

    pub async fn connect_live(&self, callbacks: Arc<dyn LiveCallbacks>) -> Result<LiveSession> {
        let url = self.live_endpoint()?;
        let (socket, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (mut sink, stream) = socket.split();
        sink.send(Message::Text(setup_frame(&self.models.live, &self.voice)))
            .await?;

        tracing::info!("live uplink open on {}", self.models.live);
        callbacks.on_open();

        let (tx, rx) = mpsc::channel(32);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(pump(sink, stream, rx, cancel.clone(), callbacks));
        Ok(LiveSession {
            sender: LiveSender { outgoing: tx },
            cancel,
            task,
        })
    }
}

async fn pump(
    mut sink: SplitSink<Socket, Message>,
    mut stream: SplitStream<Socket>,
    mut rx: mpsc::Receiver<Outgoing>,
    cancel: CancellationToken,
    callbacks: Arc<dyn LiveCallbacks>,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                tracing::debug!("live uplink closed by caller");
                break;
            }
            outgoing = rx.recv() => {
                let Some(frame) = outgoing else {
                    let _ = sink.send(Message::Close(None)).await;
                    tracing::debug!("live session handle dropped");
                    break;
                };
                if let Err(e) = sink.send(Message::Text(frame.to_frame())).await {
                    callbacks.on_error(&GatewayError::from(e));
                    break;
                }
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    for event in decode_frame(text.as_bytes()) {
                        callbacks.on_message(event);
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    for event in decode_frame(&data) {
                        callbacks.on_message(event);
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = sink.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!("live uplink closed by peer: {frame:?}");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    callbacks.on_error(&GatewayError::from(e));
                    break;
                }
                None => break,
            }
        }
    }
    callbacks.on_close();
}
