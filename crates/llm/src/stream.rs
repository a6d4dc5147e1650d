//! Server-sent event decoding for streamed chat completions.
//!
//! A streamed completion arrives as lines of the form
//! `data: {"choices":[{"delta":{"content":"..."}}]}` terminated by
//! `data: [DONE]`. [`DeltaStream`] turns those lines into a lazy sequence of
//! content fragments, and [`accumulate`] folds the fragments into the full
//! text in arrival order.

use std::io::{self, BufRead};

use serde::Deserialize;
use tracing::debug;

use crate::error::LlmError;

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "[DONE]";

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// What a single event line contributes to the stream.
#[derive(Debug, PartialEq, Eq)]
enum Event {
    Skip,
    Done,
    Delta(String),
}

fn classify(line: &str) -> Event {
    let line = line.trim_end_matches('\r');
    if line.is_empty() || line.starts_with(':') {
        return Event::Skip;
    }

    let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
    if payload == DONE_MARKER {
        return Event::Done;
    }

    let chunk: StreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            debug!("Skipping unparseable stream line: {}", e);
            return Event::Skip;
        }
    };

    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty())
        .map_or(Event::Skip, Event::Delta)
}

/// Lazy, one-shot iterator of content fragments read from an event stream.
///
/// Lines that are not UTF-8 are skipped like any other unusable line.
/// Yields `Err(LlmError::Network)` once if the underlying reader fails, and
/// nothing after that or after `[DONE]`.
pub struct DeltaStream<R> {
    lines: io::Split<R>,
    finished: bool,
}

impl<R: BufRead> DeltaStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.split(b'\n'),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for DeltaStream<R> {
    type Item = Result<String, LlmError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        for line in self.lines.by_ref() {
            let line = match line {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(line) => line,
                    Err(e) => {
                        debug!("Skipping stream line that is not UTF-8: {}", e);
                        continue;
                    }
                },
                Err(e) => {
                    self.finished = true;
                    return Some(Err(LlmError::Network(format!("stream read failed: {}", e))));
                }
            };
            match classify(&line) {
                Event::Skip => continue,
                Event::Done => break,
                Event::Delta(text) => return Some(Ok(text)),
            }
        }
        self.finished = true;
        None
    }
}

/// Fold fragments into the complete text, calling `on_delta` for each.
///
/// The first error aborts the fold and no partial text is returned.
pub fn accumulate<I>(deltas: I, mut on_delta: impl FnMut(&str)) -> Result<String, LlmError>
where
    I: IntoIterator<Item = Result<String, LlmError>>,
{
    deltas.into_iter().try_fold(String::new(), |mut text, delta| {
        let delta = delta?;
        on_delta(&delta);
        text.push_str(&delta);
        Ok(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    fn deltas(body: &str) -> Vec<String> {
        DeltaStream::new(Cursor::new(body.to_string()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn chunk(content: &str) -> String {
        format!(
            "data: {}",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    #[test]
    fn deltas_in_arrival_order() {
        let body = [chunk("Sum"), chunk("mary: OK"), "data: [DONE]".to_string()].join("\n\n");
        assert_eq!(deltas(&body), vec!["Sum", "mary: OK"]);
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let body = [
            ": keep-alive".to_string(),
            String::new(),
            chunk("a"),
            ":another comment".to_string(),
            chunk("b"),
        ]
        .join("\n");
        assert_eq!(deltas(&body), vec!["a", "b"]);
    }

    #[test]
    fn invalid_utf8_lines_skipped() {
        let mut body = Vec::new();
        body.extend_from_slice(chunk("Sum").as_bytes());
        body.extend_from_slice(b"\n: \xff\xfe garbage comment\n");
        body.extend_from_slice(b"data: \xc3\x28\n");
        body.extend_from_slice(chunk("mary").as_bytes());
        body.extend_from_slice(b"\ndata: [DONE]\n");

        let text = accumulate(DeltaStream::new(Cursor::new(body)), |_| {}).unwrap();
        assert_eq!(text, "Summary");
    }

    #[test]
    fn non_json_payloads_skipped() {
        let body = ["data: not json".to_string(), chunk("x"), "data: {".to_string()].join("\n");
        assert_eq!(deltas(&body), vec!["x"]);
    }

    #[test]
    fn done_stops_the_stream() {
        let body = [chunk("kept"), "data: [DONE]".to_string(), chunk("dropped")].join("\n");
        assert_eq!(deltas(&body), vec!["kept"]);
    }

    #[test]
    fn empty_and_missing_deltas_skipped() {
        let body = [
            r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#.to_string(),
            r#"data: {"choices":[{"delta":{"content":""}}]}"#.to_string(),
            r#"data: {"choices":[]}"#.to_string(),
            r#"data: {"id":"x"}"#.to_string(),
            chunk("only"),
        ]
        .join("\n");
        assert_eq!(deltas(&body), vec!["only"]);
    }

    #[test]
    fn unprefixed_json_and_crlf_accepted() {
        let body = format!(
            "{}\r\n{}\r\ndata: [DONE]\r\n",
            r#"{"choices":[{"delta":{"content":"raw"}}]}"#,
            chunk("line")
        );
        assert_eq!(deltas(&body), vec!["raw", "line"]);
    }

    #[test]
    fn stream_without_done_ends_at_eof() {
        assert_eq!(deltas(&chunk("tail")), vec!["tail"]);
    }

    #[test]
    fn accumulate_concatenates_and_reports_each_delta() {
        let mut seen = Vec::new();
        let text = accumulate(
            vec![Ok("Sum".to_string()), Ok("mary: OK".to_string())],
            |d| seen.push(d.to_string()),
        )
        .unwrap();
        assert_eq!(text, "Summary: OK");
        assert_eq!(seen, vec!["Sum", "mary: OK"]);
    }

    /// Reader that yields its bytes, then fails.
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            Ok(n)
        }
    }

    #[test]
    fn read_error_mid_stream_discards_partial_text() {
        let body = format!("{}\n{}\n", chunk("partial"), chunk("more"));
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(body.into_bytes()),
        });

        let mut seen = 0;
        let result = accumulate(DeltaStream::new(reader), |_| seen += 1);

        assert!(matches!(result, Err(LlmError::Network(_))));
        assert_eq!(seen, 2);
    }

    #[test]
    fn stream_is_fused_after_error() {
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(Vec::new()),
        });
        let mut stream = DeltaStream::new(reader);
        assert!(matches!(stream.next(), Some(Err(LlmError::Network(_)))));
        assert!(stream.next().is_none());
    }
}
