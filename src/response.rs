//! Response wrapper returned by the `open` helpers.

use std::collections::HashMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use once_cell::sync::OnceCell;
use url::Url;

use crate::charset;

/// A readable, seekable snapshot of a completed transfer.
///
/// Wraps the fully buffered response body behind [`Read`] and [`Seek`] and
/// carries the response metadata. The [`meta`](Self::meta) and
/// [`charset`](Self::charset) accessors are derived from the raw header
/// block on first use and cached.
#[derive(Debug)]
pub struct TransferResult {
    cursor: Cursor<Vec<u8>>,
    header_block: String,
    content_type: Option<String>,
    status: (u32, String),
    base_uri: Option<Url>,
    meta: OnceCell<HashMap<String, String>>,
    charset: OnceCell<String>,
}

impl TransferResult {
    pub(crate) fn new(
        body: Vec<u8>,
        header_block: String,
        content_type: Option<String>,
        status_code: u32,
        base_uri: Option<Url>,
    ) -> Self {
        Self {
            cursor: Cursor::new(body),
            header_block,
            content_type,
            // The engine exposes no reason phrase, so the message half is
            // always empty.
            status: (status_code, String::new()),
            base_uri,
            meta: OnceCell::new(),
            charset: OnceCell::new(),
        }
    }

    /// Status as `(code, message)`. The message is always the empty string.
    pub fn status(&self) -> &(u32, String) {
        &self.status
    }

    /// Base of relative URIs in the document. May differ from the requested
    /// URL because of redirects; unset when the effective URL did not parse.
    pub fn base_uri(&self) -> Option<&Url> {
        self.base_uri.as_ref()
    }

    /// The whole response body, regardless of the read cursor position.
    pub fn body(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    /// Raw response header block, status line included.
    pub fn header_block(&self) -> &str {
        &self.header_block
    }

    /// Header fields as a map from lower-cased name to value.
    ///
    /// Built by splitting the raw header block on line breaks, discarding
    /// the status line, and splitting each remaining line on the first
    /// `": "`. Lines without that separator are skipped.
    pub fn meta(&self) -> &HashMap<String, String> {
        self.meta.get_or_init(|| parse_meta(&self.header_block))
    }

    /// Detected charset, lower-cased, or `""` when neither the content-type
    /// header nor the leading body bytes name one.
    pub fn charset(&self) -> &str {
        self.charset
            .get_or_init(|| charset::detect(self.content_type.as_deref(), self.body()))
    }
}

impl Read for TransferResult {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for TransferResult {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

fn parse_meta(header_block: &str) -> HashMap<String, String> {
    let mut meta = HashMap::new();
    for line in header_block.lines().skip(1) {
        if let Some((name, value)) = line.split_once(": ") {
            meta.insert(name.to_ascii_lowercase(), value.to_owned());
        }
    }
    meta
}
