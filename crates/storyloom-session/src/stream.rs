//! Incremental generation protocol consumer.
//!
//! The generation response is a sequence of JSON records, framed either as
//! Server-Sent Events (`data: {json}` lines separated by blank lines) or as
//! bare newline-delimited JSON:
//!
//! ```text
//! data: {"text": "Once "}
//! data: {"text": "upon "}
//! data: {"done": true, "story": "Once upon a time.", "story_id": "abc"}
//! ```
//!
//! A record that does not parse is skipped. The completion record ends the
//! stream; if it carries `story`, that text replaces whatever was
//! accumulated from the deltas.
//!
//! Continuations are answered with a single plain JSON object that carries
//! `story` but neither `done` nor `text`. That shape is also a completion
//! record, and its `story` is the whole story so far:
//!
//! ```text
//! {"story_id": "abc", "story": "A fox hid. \n\n\n Then it sang."}
//! ```

use std::sync::Arc;

use bytes::BytesMut;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use serde::Deserialize;
use storyloom_core::{GenerationRequest, GenerationTransport, StreamError, TextByteStream};
use tracing::{debug, warn};

// ── Records ────────────────────────────────────────────────────────

/// One protocol record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRecord {
    /// Text to append to the accumulated story.
    Delta(String),
    /// Terminal record.
    Done {
        story: Option<String>,
        story_id: Option<String>,
        waiting_for_input: bool,
    },
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    story: Option<String>,
    #[serde(default)]
    story_id: Option<String>,
    #[serde(default)]
    waiting_for_input: bool,
}

/// Parse one framed line.
///
/// `Ok(None)` means the line carries no record (blank line, SSE comment or
/// non-data field). `Err` holds the offending payload of a malformed record.
pub fn parse_line(line: &str) -> Result<Option<StreamRecord>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return Ok(None);
    }

    let payload = match trimmed.strip_prefix("data:") {
        Some(data) => data.trim(),
        None if trimmed.starts_with('{') => trimmed,
        // `event:`, `id:`, `retry:` and friends
        None => return Ok(None),
    };

    let wire: WireRecord = serde_json::from_str(payload).map_err(|_| payload.to_string())?;
    if wire.done || (wire.text.is_none() && wire.story.is_some()) {
        return Ok(Some(StreamRecord::Done {
            story: wire.story,
            story_id: wire.story_id,
            waiting_for_input: wire.waiting_for_input,
        }));
    }
    match wire.text {
        Some(text) => Ok(Some(StreamRecord::Delta(text))),
        None => Err(payload.to_string()),
    }
}

// ── Lazy record stream ─────────────────────────────────────────────

struct RecordState {
    body: TextByteStream,
    buf: BytesMut,
    eof: bool,
    finished: bool,
}

fn find_newline(buf: &BytesMut) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n').map(|pos| pos + 1)
}

/// Turn a response body into a lazy, finite sequence of records.
///
/// The sequence ends after the completion record, after the first read
/// error, or when the body ends.
pub fn records(body: TextByteStream) -> BoxStream<'static, Result<StreamRecord, StreamError>> {
    let state = RecordState {
        body,
        buf: BytesMut::new(),
        eof: false,
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        if st.finished {
            return None;
        }

        loop {
            if let Some(line_end) = find_newline(&st.buf) {
                let line = st.buf.split_to(line_end);
                let line = String::from_utf8_lossy(&line);
                match parse_line(&line) {
                    Ok(Some(record)) => {
                        if matches!(record, StreamRecord::Done { .. }) {
                            st.finished = true;
                        }
                        return Some((Ok(record), st));
                    }
                    Ok(None) => {}
                    Err(payload) => warn!(%payload, "Skipping malformed stream record"),
                }
                continue;
            }

            if st.eof {
                return None;
            }

            match st.body.next().await {
                Some(Ok(chunk)) => st.buf.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(e), st));
                }
                None => {
                    st.eof = true;
                    // Flush a final line that has no trailing newline.
                    if !st.buf.is_empty() {
                        st.buf.extend_from_slice(b"\n");
                    }
                }
            }
        }
    })
    .boxed()
}

/// The part of a continuation's story text that is new.
///
/// The service may answer a continuation with the whole story so far. When
/// `text` begins with the story already shown, only the remainder is
/// returned, without the separator whitespace. Otherwise `text` is already
/// just the new part.
pub fn continuation_text<'a>(previous: &str, text: &'a str) -> &'a str {
    let previous = previous.trim();
    if previous.is_empty() {
        return text;
    }
    match text.trim_start().strip_prefix(previous) {
        Some(rest) => rest.trim(),
        None => text,
    }
}

// ── Consumer ───────────────────────────────────────────────────────

/// Terminal outcome of one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCompletion {
    /// Final story text: the server's `story` if sent, else the accumulated
    /// deltas.
    pub text: String,
    /// Server-assigned story id, if the completion record carried one.
    pub story_id: Option<String>,
    pub waiting_for_input: bool,
}

/// Issues generation requests and folds their records into a completion.
#[derive(Clone)]
pub struct StreamConsumer {
    transport: Arc<dyn GenerationTransport>,
}

impl StreamConsumer {
    pub fn new(transport: Arc<dyn GenerationTransport>) -> Self {
        Self { transport }
    }

    /// Run one request to completion.
    ///
    /// `on_progress` is called with the live accumulated text after every
    /// delta. A body that ends without a completion record is
    /// [`StreamError::Incomplete`]; the accumulated text is never promoted
    /// to a final result.
    pub async fn generate<F>(
        &self,
        request: &GenerationRequest,
        mut on_progress: F,
    ) -> Result<StreamCompletion, StreamError>
    where
        F: FnMut(&str) + Send,
    {
        debug!(
            session = request.session_id(),
            continuation = request.is_continuation(),
            "Opening generation stream"
        );
        let body = self.transport.open(request).await?;
        let mut records = records(body);
        let mut accumulated = String::new();

        while let Some(record) = records.next().await {
            match record? {
                StreamRecord::Delta(delta) => {
                    accumulated.push_str(&delta);
                    on_progress(&accumulated);
                }
                StreamRecord::Done {
                    story,
                    story_id,
                    waiting_for_input,
                } => {
                    if story.as_ref().is_some_and(|s| *s != accumulated) {
                        debug!("Completion record overrides accumulated text");
                    }
                    return Ok(StreamCompletion {
                        text: story.unwrap_or(accumulated),
                        story_id,
                        waiting_for_input,
                    });
                }
            }
        }

        warn!(
            received = accumulated.len(),
            "Generation stream ended without a completion record"
        );
        Err(StreamError::Incomplete)
    }
}
