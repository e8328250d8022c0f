//! Live preview over a WebSocket.
//!
//! The browser sends the source image once and then a stream of threshold
//! changes while the slider moves. Each connection owns its own `Debouncer`, so
//! only the last change after a quiet period is compacted and sent back.

use crate::{UI_DEFAULT_MAX_DIFFERENT_PIXELS, UI_MAX_DIFFERENT_PIXELS};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use row_compactor::{
    CompactError, CompactionConfig, CompactionPipeline, DecodedImage, Debouncer, ImageCodec,
    PipelineOutcome, PngCodec,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Announces the name of the file that the next binary frame carries.
    Source { filename: String },
    Params { max_different_pixels: usize },
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Followed by one binary frame holding the encoded image.
    Result {
        filename: String,
        mime_type: String,
        width: u32,
        height: u32,
        original_height: u32,
    },
    Empty {
        width: u32,
        original_height: u32,
    },
    Error { message: String },
}

type Outcome = Result<PipelineOutcome, CompactError>;

/// Per-connection state.
struct Session {
    source: Option<Arc<DecodedImage>>,
    filename: String,
    max_different_pixels: usize,
    debouncer: Debouncer<Outcome>,
}

impl Session {
    fn schedule(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        let filename = self.filename.clone();
        let config =
            CompactionConfig::default().with_max_different_pixels(self.max_different_pixels);
        self.debouncer.call(move || {
            CompactionPipeline::new(PngCodec, config).process_decoded(
                &source.pixels,
                source.width,
                source.height,
                &filename,
            )
        });
    }

    /// Applies one text frame. Returns a message to send back right away, if any.
    fn handle_text(&mut self, text: &str) -> Option<ServerMessage> {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Source { filename }) => {
                self.filename = filename;
                None
            }
            Ok(ClientMessage::Params {
                max_different_pixels,
            }) if max_different_pixels > UI_MAX_DIFFERENT_PIXELS => Some(ServerMessage::Error {
                message: format!(
                    "max_different_pixels must be between 0 and {UI_MAX_DIFFERENT_PIXELS}"
                ),
            }),
            Ok(ClientMessage::Params { max_different_pixels }) => {
                self.max_different_pixels = max_different_pixels;
                self.schedule();
                None
            }
            Err(err) => Some(ServerMessage::Error {
                message: format!("bad message: {err}"),
            }),
        }
    }

    fn handle_source(
        &mut self,
        decoded: Result<DecodedImage, CompactError>,
    ) -> Option<ServerMessage> {
        match decoded {
            Ok(image) => {
                debug!(
                    width = image.width,
                    height = image.height,
                    file = %self.filename,
                    "preview source loaded"
                );
                self.source = Some(Arc::new(image));
                self.schedule();
                None
            }
            Err(err) => Some(ServerMessage::Error {
                message: err.to_string(),
            }),
        }
    }
}

/// Frames to send for one finished compaction.
pub fn outcome_messages(outcome: Outcome) -> Vec<Message> {
    let (header, payload) = match outcome {
        Ok(PipelineOutcome::Compacted(processed)) => (
            ServerMessage::Result {
                filename: processed.filename,
                mime_type: processed.mime_type.to_string(),
                width: processed.width,
                height: processed.height,
                original_height: processed.original_height,
            },
            Some(processed.bytes),
        ),
        Ok(PipelineOutcome::NoContentRows {
            width,
            original_height,
        }) => (
            ServerMessage::Empty {
                width,
                original_height,
            },
            None,
        ),
        Err(err) => (
            ServerMessage::Error {
                message: err.to_string(),
            },
            None,
        ),
    };

    let mut frames = vec![text_frame(&header)];
    frames.extend(payload.map(Message::Binary));
    frames
}

fn text_frame(message: &ServerMessage) -> Message {
    // Serializing these plain enums cannot fail.
    Message::Text(serde_json::to_string(message).unwrap_or_default())
}

pub async fn run_session(socket: WebSocket, debounce: Duration) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (debouncer, mut results) = Debouncer::new(debounce);
    let mut session = Session {
        source: None,
        filename: String::new(),
        max_different_pixels: UI_DEFAULT_MAX_DIFFERENT_PIXELS,
        debouncer,
    };

    loop {
        let reply = tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    session.handle_text(&text).map(|msg| vec![text_frame(&msg)])
                }
                Some(Ok(Message::Binary(bytes))) => {
                    let decoded =
                        tokio::task::spawn_blocking(move || PngCodec.decode(&bytes)).await;
                    match decoded {
                        Ok(decoded) => {
                            session.handle_source(decoded).map(|msg| vec![text_frame(&msg)])
                        }
                        Err(err) => {
                            warn!(error = %err, "decode task failed");
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => None,
                Some(Err(err)) => {
                    warn!(error = %err, "preview socket error");
                    break;
                }
            },
            Some(outcome) = results.recv() => Some(outcome_messages(outcome)),
        };

        for frame in reply.into_iter().flatten() {
            if ws_tx.send(frame).await.is_err() {
                return;
            }
        }
    }
}
