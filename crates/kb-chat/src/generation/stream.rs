//! Server-sent event decoding for streamed chat completions

use serde::Deserialize;

use crate::error::{Error, Result};

/// Sent by the provider as the final event
const DONE_MARKER: &str = "[DONE]";

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

/// Incremental decoder for `data:` lines of a chat-completion event stream.
///
/// Network chunks may split lines (and UTF-8 sequences) anywhere, so bytes
/// are buffered until a newline arrives.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning the text fragments of every completed event
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<String>> {
        let mut fragments = Vec::new();
        if self.done {
            return fragments;
        }

        self.buffer.extend_from_slice(bytes);

        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.decode_line(&raw, &mut fragments);
            if self.done {
                self.buffer.clear();
                break;
            }
        }

        fragments
    }

    /// Decode whatever is left once the body ends; the last event may
    /// arrive without a trailing newline
    pub fn finish(&mut self) -> Vec<Result<String>> {
        let mut fragments = Vec::new();
        if self.done || self.buffer.is_empty() {
            return fragments;
        }

        let raw = std::mem::take(&mut self.buffer);
        self.decode_line(&raw, &mut fragments);
        self.done = true;
        fragments
    }

    fn decode_line(&mut self, raw: &[u8], fragments: &mut Vec<Result<String>>) {
        let line = String::from_utf8_lossy(raw);

        let Some(data) = line.trim().strip_prefix("data:") else {
            return;
        };
        let data = data.trim();

        if data == DONE_MARKER {
            self.done = true;
            return;
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => {
                let text: String = chunk
                    .choices
                    .into_iter()
                    .filter_map(|c| c.delta.content)
                    .collect();
                if !text.is_empty() {
                    fragments.push(Ok(text));
                }
            }
            Err(e) => fragments.push(Err(Error::transport(format!(
                "Malformed stream event: {}",
                e
            )))),
        }
    }

    /// The end-of-stream marker has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"index": 0, "delta": {"content": content}}]})
        )
    }

    fn texts(results: Vec<Result<String>>) -> Vec<String> {
        results.into_iter().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_decodes_events_in_order() {
        let mut decoder = SseDecoder::new();
        let body = format!("{}{}data: [DONE]\n\n", event("Hello"), event(", world"));

        assert_eq!(texts(decoder.push(body.as_bytes())), vec!["Hello", ", world"]);
        assert!(decoder.is_done());
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let body = format!("{}{}", event("Grüße"), event("!"));
        let bytes = body.as_bytes();

        // split inside the multi-byte 'ü'
        let split = body.find('ü').unwrap() + 1;
        let mut out = texts(decoder.push(&bytes[..split]));
        assert!(out.is_empty());
        out.extend(texts(decoder.push(&bytes[split..])));

        assert_eq!(out, vec!["Grüße", "!"]);
        assert!(!decoder.is_done());
    }

    #[test]
    fn test_ignores_non_data_lines_and_empty_deltas() {
        let mut decoder = SseDecoder::new();
        let body = ": keep-alive\nevent: message\n\
                    data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n";
        assert!(decoder.push(body.as_bytes()).is_empty());
    }

    #[test]
    fn test_malformed_event_is_transport_error() {
        let mut decoder = SseDecoder::new();
        let results = decoder.push(b"data: {not json}\n");
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(Error::Transport(_))));
    }

    #[test]
    fn test_unterminated_last_event_flushed_on_finish() {
        let mut decoder = SseDecoder::new();
        let body = format!("{}{}", event("Hello"), event(" again").trim_end());

        assert_eq!(texts(decoder.push(body.as_bytes())), vec!["Hello"]);
        assert_eq!(texts(decoder.finish()), vec![" again"]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_finish_after_done_is_empty() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: [DONE]\n\n");
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_nothing_after_done() {
        let mut decoder = SseDecoder::new();
        let body = format!("data: [DONE]\n\n{}", event("late"));
        assert!(decoder.push(body.as_bytes()).is_empty());
        assert!(decoder.push(event("later").as_bytes()).is_empty());
    }
}
