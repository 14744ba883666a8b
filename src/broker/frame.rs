//! STOMP 1.2 wire framing
//!
//! A frame is a command line, zero or more `name:value` header lines, a
//! blank line, then a body terminated by NUL. When a `content-length`
//! header is present the body is read to exactly that length (it may
//! contain NUL bytes); otherwise the body ends at the first NUL. Bare EOLs
//! between frames are heart-beats and are skipped. Header names and values
//! use the 1.2 escape sequences for backslash, CR, LF and colon.

use std::fmt;

/// Upper bound on a single frame (header block or body).
const MAX_FRAME: usize = 1 << 20;

/// Malformed wire data.
#[derive(Debug)]
pub enum FrameError {
    /// Command line empty or not an uppercase STOMP command.
    BadCommand(String),
    /// Header line without a colon, or an invalid escape sequence.
    BadHeader(String),
    /// `content-length` header value is not a usize.
    BadContentLength(String),
    /// Declared body length not followed by the NUL terminator.
    MissingNul,
    /// Frame exceeds [`MAX_FRAME`].
    TooLarge(usize),
    /// Command or header bytes are not UTF-8.
    Utf8(std::str::Utf8Error),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::BadCommand(cmd) => write!(f, "bad command line: {:?}", cmd),
            FrameError::BadHeader(line) => write!(f, "bad header line: {:?}", line),
            FrameError::BadContentLength(v) => write!(f, "bad content-length: {:?}", v),
            FrameError::MissingNul => write!(f, "frame body not NUL-terminated"),
            FrameError::TooLarge(n) => write!(f, "frame exceeds {} bytes ({})", MAX_FRAME, n),
            FrameError::Utf8(e) => write!(f, "frame head is not UTF-8: {}", e),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<std::str::Utf8Error> for FrameError {
    fn from(e: std::str::Utf8Error) -> Self {
        FrameError::Utf8(e)
    }
}

/// One STOMP frame, either direction.
#[derive(Debug, Clone, PartialEq)]
pub struct StompFrame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl StompFrame {
    pub fn new(command: &str) -> Self {
        Self { command: command.to_string(), headers: Vec::new(), body: Vec::new() }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: &[u8]) -> Self {
        self.body = body.to_vec();
        self
    }

    /// First header with this name, per the STOMP repeated-header rule.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// Serialize to wire bytes. A `content-length` header is added for
    /// non-empty bodies unless the caller already set one.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(self.command.as_bytes());
        out.push(b'\n');
        for (name, value) in &self.headers {
            out.extend_from_slice(escape(name).as_bytes());
            out.push(b':');
            out.extend_from_slice(escape(value).as_bytes());
            out.push(b'\n');
        }
        if !self.body.is_empty() && self.header("content-length").is_none() {
            out.extend_from_slice(format!("content-length:{}\n", self.body.len()).as_bytes());
        }
        out.push(b'\n');
        out.extend_from_slice(&self.body);
        out.push(0);
        out
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            ':' => out.push_str("\\c"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> Result<String, FrameError> {
    if !s.contains('\\') {
        return Ok(s.to_string());
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            Some('\\') => out.push('\\'),
            _ => return Err(FrameError::BadHeader(s.to_string())),
        }
    }
    Ok(out)
}

/// Incremental decoder over a growing byte buffer.
///
/// Feed raw socket reads in with [`feed`](Self::feed), then drain complete
/// frames with [`next_frame`](Self::next_frame). Partial frames stay
/// buffered until more bytes arrive.
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete frame, or `None` if the buffer holds only a partial
    /// frame (or heart-beats).
    pub fn next_frame(&mut self) -> Result<Option<StompFrame>, FrameError> {
        // Heart-beats are bare EOLs between frames.
        let pad = self.buf.iter().take_while(|&&b| b == b'\n' || b == b'\r').count();
        if pad > 0 {
            self.buf.drain(..pad);
        }
        if self.buf.is_empty() {
            return Ok(None);
        }

        let (head_end, body_start) = match find_blank_line(&self.buf) {
            Some(split) => split,
            None => {
                if self.buf.len() > MAX_FRAME {
                    return Err(FrameError::TooLarge(self.buf.len()));
                }
                return Ok(None);
            }
        };

        let (command, headers) = parse_head(&self.buf[..head_end])?;

        let content_length = match headers.iter().find(|(n, _)| n == "content-length") {
            Some((_, v)) => {
                Some(v.parse::<usize>().map_err(|_| FrameError::BadContentLength(v.clone()))?)
            }
            None => None,
        };

        let (body, consumed) = match content_length {
            Some(len) => {
                if len > MAX_FRAME {
                    return Err(FrameError::TooLarge(len));
                }
                let body_end = body_start + len;
                if self.buf.len() < body_end + 1 {
                    return Ok(None);
                }
                if self.buf[body_end] != 0 {
                    return Err(FrameError::MissingNul);
                }
                (self.buf[body_start..body_end].to_vec(), body_end + 1)
            }
            None => match self.buf[body_start..].iter().position(|&b| b == 0) {
                Some(rel) => {
                    (self.buf[body_start..body_start + rel].to_vec(), body_start + rel + 1)
                }
                None => {
                    if self.buf.len() - body_start > MAX_FRAME {
                        return Err(FrameError::TooLarge(self.buf.len() - body_start));
                    }
                    return Ok(None);
                }
            },
        };

        self.buf.drain(..consumed);
        Ok(Some(StompFrame { command, headers, body }))
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Locate the blank line separating head from body. Returns
/// `(head_end, body_start)` with the terminating EOLs excluded from both.
fn find_blank_line(buf: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buf.len() {
        if buf[i] != b'\n' {
            continue;
        }
        match buf.get(i + 1) {
            Some(b'\n') => return Some((i, i + 2)),
            Some(b'\r') if buf.get(i + 2) == Some(&b'\n') => return Some((i, i + 3)),
            _ => {}
        }
    }
    None
}

fn parse_head(head: &[u8]) -> Result<(String, Vec<(String, String)>), FrameError> {
    let head = std::str::from_utf8(head)?;
    let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    let command = lines.next().unwrap_or("");
    if command.is_empty() || !command.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(FrameError::BadCommand(command.to_string()));
    }

    let mut headers = Vec::new();
    for line in lines {
        let (name, value) =
            line.split_once(':').ok_or_else(|| FrameError::BadHeader(line.to_string()))?;
        headers.push((unescape(name)?, unescape(value)?));
    }
    Ok((command.to_string(), headers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8]) -> Vec<StompFrame> {
        let mut dec = FrameDecoder::new();
        dec.feed(bytes);
        let mut frames = Vec::new();
        while let Some(frame) = dec.next_frame().unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_encode_connect() {
        let frame = StompFrame::new("CONNECT")
            .with_header("accept-version", "1.2")
            .with_header("host", "localhost");
        assert_eq!(
            frame.encode(),
            b"CONNECT\naccept-version:1.2\nhost:localhost\n\n\0".to_vec()
        );
    }

    #[test]
    fn test_encode_adds_content_length_for_body() {
        let frame = StompFrame::new("MESSAGE").with_body(b"hello");
        assert_eq!(frame.encode(), b"MESSAGE\ncontent-length:5\n\nhello\0".to_vec());
    }

    #[test]
    fn test_decode_nul_terminated_body() {
        let frames = decode_all(b"MESSAGE\ndestination:/topic/x\n\n[1,2]\0");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].command, "MESSAGE");
        assert_eq!(frames[0].header("destination"), Some("/topic/x"));
        assert_eq!(frames[0].body, b"[1,2]");
    }

    #[test]
    fn test_decode_content_length_body_may_contain_nul() {
        let frames = decode_all(b"MESSAGE\ncontent-length:3\n\na\0b\0");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body, b"a\0b");
    }

    #[test]
    fn test_decode_crlf_line_endings() {
        let frames = decode_all(b"CONNECTED\r\nversion:1.2\r\n\r\n\0");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].command, "CONNECTED");
        assert_eq!(frames[0].header("version"), Some("1.2"));
        assert!(frames[0].body.is_empty());
    }

    #[test]
    fn test_decode_skips_heart_beats() {
        let frames = decode_all(b"\n\r\n\nMESSAGE\n\nx\0\n\nRECEIPT\nreceipt-id:1\n\n\0\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].command, "MESSAGE");
        assert_eq!(frames[1].command, "RECEIPT");
    }

    #[test]
    fn test_decoder_is_incremental() {
        let wire = b"MESSAGE\ncontent-length:4\nsubscription:particles\n\nbody\0";
        let mut dec = FrameDecoder::new();
        for chunk in wire.chunks(7) {
            dec.feed(chunk);
        }
        // All chunks fed; intermediate calls on a partial buffer yield None.
        let mut partial = FrameDecoder::new();
        partial.feed(&wire[..10]);
        assert!(partial.next_frame().unwrap().is_none());

        let frame = dec.next_frame().unwrap().unwrap();
        assert_eq!(frame.body, b"body");
        assert_eq!(frame.header("subscription"), Some("particles"));
        assert!(dec.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_header_escaping_round_trip() {
        let frame = StompFrame::new("SEND").with_header("odd", "a:b\nc\\d");
        let decoded = decode_all(&frame.encode());
        assert_eq!(decoded[0].header("odd"), Some("a:b\nc\\d"));
    }

    #[test]
    fn test_first_header_occurrence_wins() {
        let frames = decode_all(b"MESSAGE\nfoo:first\nfoo:second\n\n\0");
        assert_eq!(frames[0].header("foo"), Some("first"));
    }

    #[test]
    fn test_bad_content_length() {
        let mut dec = FrameDecoder::new();
        dec.feed(b"MESSAGE\ncontent-length:nope\n\n\0");
        assert!(matches!(dec.next_frame(), Err(FrameError::BadContentLength(_))));
    }

    #[test]
    fn test_declared_length_requires_nul() {
        let mut dec = FrameDecoder::new();
        dec.feed(b"MESSAGE\ncontent-length:2\n\nabX");
        assert!(matches!(dec.next_frame(), Err(FrameError::MissingNul)));
    }

    #[test]
    fn test_rejects_non_stomp_command() {
        let mut dec = FrameDecoder::new();
        dec.feed(b"GET / HTTP/1.1\nhost:x\n\n\0");
        assert!(matches!(dec.next_frame(), Err(FrameError::BadCommand(_))));
    }

    #[test]
    fn test_header_without_colon() {
        let mut dec = FrameDecoder::new();
        dec.feed(b"MESSAGE\nnocolon\n\n\0");
        assert!(matches!(dec.next_frame(), Err(FrameError::BadHeader(_))));
    }
}
