//! OpenURI-style URL opening backed by libcurl.
//!
//! The crate services the familiar "open a URL and get a file-like object"
//! interface with a single blocking libcurl transfer. [`open`] buffers the
//! whole response and returns a [`TransferResult`]: a readable, seekable
//! byte buffer carrying the response status, effective URL, header map and
//! detected charset.
//!
//! Recognized options (proxy, credentials, timeouts, progress callbacks,
//! TLS knobs, redirect control) are translated into engine configuration;
//! every other header added to [`TransferOptions`] is sent verbatim,
//! overwriting the corresponding default.
//!
//! ```no_run
//! use curl_agent::{open, TransferOptions};
//! use std::io::Read;
//!
//! # fn main() -> curl_agent::Result<()> {
//! let mut page = open(
//!     "http://www.example.com/",
//!     TransferOptions::default().header("User-Agent", "curl"),
//! )?;
//! let mut html = String::new();
//! page.read_to_string(&mut html)?;
//! println!("{} {}", page.status().0, page.charset());
//! # Ok(())
//! # }
//! ```
//!
//! The transfer is fully synchronous: one request runs to completion on
//! the calling thread, and progress callbacks are invoked inline from the
//! engine's read loop. There is no retrying, pooling or streaming; the
//! underlying engine owns the transport (HTTP/HTTPS/FTP), TLS, proxying
//! and redirect following.

mod agent;
mod charset;
mod engine;
mod error;
mod options;
mod response;

#[cfg(feature = "curl")]
pub use agent::{open, open_mode, open_with};
pub use agent::{open_with_engine, CurlAgent};
#[cfg(feature = "curl")]
pub use engine::CurlEngine;
pub use engine::{ProgressFn, TransferEngine};
pub use error::{AgentError, Result};
pub use options::{ContentLengthProc, Mode, ProgressProc, TransferOptions, RDONLY};
pub use response::TransferResult;
