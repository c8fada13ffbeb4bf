//! Text-to-speech through the Google Translate speech endpoint.
//!
//! Text is split into short chunks, each chunk is fetched as an MP3
//! stream and the streams are concatenated. MP3 frames are
//! self-delimiting, so the concatenation plays back as one file.

use crate::error::{MediaError, Result};
use reqwest::blocking::{Client, Request};
use std::time::Duration;
use tracing::{debug, info};

/// Default speech endpoint
pub const DEFAULT_ENDPOINT_HOST: &str = "translate.google";

/// Longest chunk the endpoint accepts, in characters
pub const MAX_CHUNK_CHARS: usize = 100;

const USER_AGENT: &str = concat!("verdant/", env!("CARGO_PKG_VERSION"));

/// A selectable voice: display label, language code and accent domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    pub label: &'static str,
    /// Language code as shown to users (`en-us`, `en-uk`, ...)
    pub code: &'static str,
    /// Language sent as `tl`
    pub lang: &'static str,
    /// Top-level domain of the endpoint, selects the accent
    pub tld: &'static str,
}

/// Voices offered by the CLI
pub const VOICES: [Voice; 4] = [
    Voice {
        label: "English (Male)",
        code: "en-us",
        lang: "en",
        tld: "com",
    },
    Voice {
        label: "English (Female)",
        code: "en-uk",
        lang: "en",
        tld: "co.uk",
    },
    Voice {
        label: "Spanish (Male)",
        code: "es-us",
        lang: "es",
        tld: "com",
    },
    Voice {
        label: "Spanish (Female)",
        code: "es",
        lang: "es",
        tld: "com",
    },
];

impl Voice {
    /// Look up a voice by its display label or language code
    pub fn from_label(label: &str) -> Result<Voice> {
        let wanted = label.trim();
        VOICES
            .iter()
            .find(|v| v.label.eq_ignore_ascii_case(wanted) || v.code.eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| MediaError::UnknownVoice(label.to_string()))
    }

    /// Endpoint URL for this voice's accent
    pub fn endpoint(&self) -> String {
        format!("https://{}.{}/translate_tts", DEFAULT_ENDPOINT_HOST, self.tld)
    }
}

impl Default for Voice {
    fn default() -> Self {
        VOICES[0]
    }
}

/// Split text into chunks of at most `max_chars` characters.
///
/// Cuts happen after punctuation where possible, then at whitespace.
/// A single word longer than `max_chars` is hard-split. Chunks are
/// trimmed and empty chunks dropped.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);

    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if is_break_punctuation(c) {
            pieces.push(std::mem::take(&mut current));
        }
    }
    pieces.push(current);

    let mut chunks: Vec<String> = Vec::new();
    let mut buf = String::new();
    for piece in pieces {
        for word in split_words(piece.trim(), max_chars) {
            let buf_len = buf.chars().count();
            let word_len = word.chars().count();
            let joined = if buf.is_empty() { word_len } else { buf_len + 1 + word_len };
            if joined <= max_chars {
                if !buf.is_empty() {
                    buf.push(' ');
                }
                buf.push_str(&word);
            } else {
                if !buf.is_empty() {
                    chunks.push(std::mem::take(&mut buf));
                }
                buf = word;
            }
        }
    }
    if !buf.is_empty() {
        chunks.push(buf);
    }

    chunks.retain(|c| c.chars().any(|ch| !is_break_punctuation(ch) && !ch.is_whitespace()));
    chunks
}

fn is_break_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | ';' | ':' | '!' | '?' | '¡' | '¿' | '\n' | '\u{2026}' | '\u{3002}' | '\u{3001}'
    )
}

/// Break a sentence fragment into pieces no longer than `max_chars`,
/// keeping whole words together when they fit.
fn split_words(fragment: &str, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    for word in fragment.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !buf.is_empty() {
                out.push(std::mem::take(&mut buf));
            }
            let chars: Vec<char> = word.chars().collect();
            for part in chars.chunks(max_chars) {
                out.push(part.iter().collect());
            }
            continue;
        }
        let joined = if buf.is_empty() {
            word_len
        } else {
            buf.chars().count() + 1 + word_len
        };
        if joined > max_chars {
            out.push(std::mem::take(&mut buf));
        }
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(word);
    }
    if !buf.is_empty() {
        out.push(buf);
    }
    out
}

/// Client options
#[derive(Debug, Clone)]
pub struct TtsOptions {
    /// Override the endpoint URL (the voice's accent domain is used otherwise)
    pub endpoint: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Slower speech
    pub slow: bool,
}

impl Default for TtsOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(10),
            slow: false,
        }
    }
}

/// Blocking speech synthesis client
pub struct TtsClient {
    client: Client,
    options: TtsOptions,
}

impl TtsClient {
    pub fn new(options: TtsOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .build()?;
        Ok(Self { client, options })
    }

    /// Build the GET request for chunk `idx` of `total`
    pub fn build_request(&self, chunk: &str, idx: usize, total: usize, voice: &Voice) -> Result<Request> {
        let endpoint = self
            .options
            .endpoint
            .clone()
            .unwrap_or_else(|| voice.endpoint());
        let speed = if self.options.slow { "0.3" } else { "1" };
        let textlen = chunk.chars().count().to_string();
        let total = total.to_string();
        let idx = idx.to_string();

        let request = self
            .client
            .get(endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", voice.lang),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
                ("client", "tw-ob"),
                ("ttsspeed", speed),
            ])
            .build()?;
        Ok(request)
    }

    /// Synthesize `text` and return the MP3 byte stream
    pub fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(MediaError::EmptyText);
        }

        let total = chunks.len();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let request = self.build_request(chunk, idx, total, voice)?;
            debug!("GET {} (chunk {}/{})", request.url().path(), idx + 1, total);

            let response = self.client.execute(request)?;
            let status = response.status();
            if !status.is_success() {
                return Err(MediaError::HttpStatus {
                    status: status.as_u16(),
                    chunk: idx,
                });
            }
            let bytes = response.bytes()?;
            audio.extend_from_slice(&bytes);
        }

        info!(
            "Synthesized {} chunk(s), {} bytes, voice {}",
            total,
            audio.len(),
            voice.code
        );
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_lookup() {
        let v = Voice::from_label("English (Female)").unwrap();
        assert_eq!(v.lang, "en");
        assert_eq!(v.tld, "co.uk");

        let v = Voice::from_label("es-us").unwrap();
        assert_eq!(v.label, "Spanish (Male)");
        assert_eq!(v.lang, "es");

        assert!(matches!(
            Voice::from_label("Klingon"),
            Err(MediaError::UnknownVoice(_))
        ));
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_text("Hello, how are you?", 100), vec!["Hello, how are you?"]);
    }

    #[test]
    fn long_text_respects_limit() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(10);
        let chunks = split_text(&text, 100);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 100, "chunk too long: {c}");
            assert!(!c.is_empty());
        }
        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split_whitespace()).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn long_word_is_hard_split() {
        let word = "a".repeat(250);
        let chunks = split_text(&word, 100);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(split_text("   ", 100).is_empty());
        assert!(split_text("...", 100).is_empty());
    }

    #[test]
    fn empty_text_is_rejected() {
        let client = TtsClient::new(TtsOptions::default()).unwrap();
        let result = client.synthesize("  ", &Voice::default());
        assert!(matches!(result, Err(MediaError::EmptyText)));
    }

    #[test]
    fn request_carries_query() {
        let client = TtsClient::new(TtsOptions::default()).unwrap();
        let voice = Voice::from_label("English (Female)").unwrap();
        let request = client.build_request("Hello there", 0, 2, &voice).unwrap();
        let url = request.url();
        assert_eq!(url.host_str(), Some("translate.google.co.uk"));
        assert_eq!(url.path(), "/translate_tts");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("q"), Some("Hello there"));
        assert_eq!(get("tl"), Some("en"));
        assert_eq!(get("total"), Some("2"));
        assert_eq!(get("idx"), Some("0"));
        assert_eq!(get("textlen"), Some("11"));
        assert_eq!(get("client"), Some("tw-ob"));
    }

    #[test]
    fn endpoint_override() {
        let options = TtsOptions {
            endpoint: Some("http://localhost:9/tts".to_string()),
            ..Default::default()
        };
        let client = TtsClient::new(options).unwrap();
        let request = client.build_request("hi", 0, 1, &Voice::default()).unwrap();
        assert_eq!(request.url().host_str(), Some("localhost"));
    }

    #[test]
    #[ignore = "requires network access"]
    fn synthesize_live() {
        let client = TtsClient::new(TtsOptions::default()).unwrap();
        let mp3 = client.synthesize("Hello, how are you?", &Voice::default()).unwrap();
        assert!(mp3.len() > 1000);
    }
}
