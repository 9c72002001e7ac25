//! Newline-delimited JSON chunk streams, as produced by Ollama's
//! `/api/generate` with `stream: true`.
//!
//! [`ndjson_chunks`] turns a byte stream into a lazy, finite,
//! non-restartable stream of [`GenerationChunk`]s. [`collect_response`]
//! drains it into the final answer.

use cp_core::{Error, Result};
use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationChunk {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
}

struct LineState<S> {
    bytes: S,
    buf: Vec<u8>,
    exhausted: bool,
}

fn parse_line(line: &[u8]) -> Option<GenerationChunk> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<GenerationChunk>(line) {
        Ok(chunk) => Some(chunk),
        Err(e) => {
            debug!(error = %e, line = %line, "Skipping malformed chunk");
            None
        }
    }
}

/// Split a byte stream into parsed chunks. Blank and malformed lines are
/// skipped. A transport error is yielded once and ends the stream.
pub fn ndjson_chunks<S, B, E>(bytes: S) -> impl Stream<Item = Result<GenerationChunk>>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<Error>,
{
    let state = LineState {
        bytes,
        buf: Vec::new(),
        exhausted: false,
    };

    stream::unfold(Some(state), |state| async move {
        let mut state = state?;
        loop {
            if let Some(pos) = state.buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = state.buf.drain(..=pos).collect();
                if let Some(chunk) = parse_line(&line) {
                    return Some((Ok(chunk), Some(state)));
                }
                continue;
            }

            if state.exhausted {
                let rest = std::mem::take(&mut state.buf);
                return parse_line(&rest).map(|chunk| (Ok(chunk), None));
            }

            match state.bytes.next().await {
                Some(Ok(bytes)) => state.buf.extend_from_slice(bytes.as_ref()),
                Some(Err(e)) => return Some((Err(e.into()), None)),
                None => state.exhausted = true,
            }
        }
    })
}

/// Concatenate chunk text until a chunk reports `done` or the stream ends,
/// then trim surrounding whitespace.
pub async fn collect_response<S>(chunks: S) -> Result<String>
where
    S: Stream<Item = Result<GenerationChunk>>,
{
    futures_util::pin_mut!(chunks);
    let mut full_response = String::new();

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        if let Some(text) = chunk.response.as_deref() {
            full_response.push_str(text);
        }
        if chunk.done {
            break;
        }
    }

    Ok(full_response.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_stream(parts: Vec<&'static str>) -> impl Stream<Item = std::result::Result<&'static [u8], Error>> + Unpin {
        stream::iter(parts.into_iter().map(|p| Ok(p.as_bytes())))
    }

    #[tokio::test]
    async fn test_collects_until_done() {
        let bytes = byte_stream(vec![
            "{\"response\":\" Bitcoin \"}\n",
            "{\"response\":\"rallied.\"}\n{\"response\":\" \",\"done\":true}\n",
            "{\"response\":\"ignored\"}\n",
        ]);
        let text = collect_response(ndjson_chunks(bytes)).await.unwrap();
        assert_eq!(text, "Bitcoin rallied.");
    }

    #[tokio::test]
    async fn test_lines_split_across_reads() {
        let bytes = byte_stream(vec!["{\"respo", "nse\":\"Hel", "lo\"}\n{\"response\":\" world\"}"]);
        let text = collect_response(ndjson_chunks(bytes)).await.unwrap();
        assert_eq!(text, "Hello world");
    }

    #[tokio::test]
    async fn test_malformed_and_blank_lines_are_skipped() {
        let bytes = byte_stream(vec!["\n{not json}\n{\"response\":\"ok\"}\n\n{\"done\":true}\n"]);
        let chunks: Vec<_> = ndjson_chunks(bytes).collect().await;
        assert_eq!(chunks.len(), 2);
        let text = collect_response(stream::iter(chunks)).await.unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_transport_error_fails_collection() {
        let bytes = stream::iter(vec![
            Ok("{\"response\":\"partial\"}\n".as_bytes()),
            Err(Error::Generation("connection reset".to_string())),
        ]);
        let err = collect_response(ndjson_chunks(bytes)).await.unwrap_err();
        assert!(err.is_generation_failure());
    }

    #[tokio::test]
    async fn test_empty_stream_yields_empty_text() {
        let text = collect_response(ndjson_chunks(byte_stream(vec![]))).await.unwrap();
        assert_eq!(text, "");
    }
}
