//! The transfer adapter and the `open` entry points.

use std::time::Duration;

use tracing::{debug, trace};
use url::Url;

use crate::charset;
#[cfg(feature = "curl")]
use crate::engine::CurlEngine;
use crate::engine::TransferEngine;
use crate::error::{AgentError, Result};
use crate::options::{Mode, TransferOptions};
use crate::response::TransferResult;

/// Client string sent when the caller supplies no `User-Agent` header.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows; U; Windows NT 5.1; en-US; rv:1.9.0.6) Gecko/2009011913 Firefox/3.0.6";

const DEFAULT_MAX_REDIRECTS: u32 = 2;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Adapter mapping OpenURI-style options onto a [`TransferEngine`].
///
/// Construction applies defaults, translates the recognized options into
/// engine configuration and merges the remaining header bag over the
/// default headers. No network I/O happens until [`perform`](Self::perform)
/// (or a lazy accessor such as [`charset`](Self::charset)) runs the
/// transfer.
#[cfg(feature = "curl")]
pub struct CurlAgent<E: TransferEngine = CurlEngine> {
    engine: E,
    performed: bool,
}

/// Adapter mapping OpenURI-style options onto a [`TransferEngine`].
///
/// Without the `curl` feature there is no default engine; supply one
/// through [`with_engine`](Self::with_engine).
#[cfg(not(feature = "curl"))]
pub struct CurlAgent<E: TransferEngine> {
    engine: E,
    performed: bool,
}

#[cfg(feature = "curl")]
impl CurlAgent<CurlEngine> {
    /// Creates an adapter for `url` with a fresh curl handle.
    pub fn new(url: &str, options: TransferOptions) -> Result<Self> {
        Self::with_engine(CurlEngine::new(url)?, options)
    }
}

impl<E: TransferEngine> CurlAgent<E> {
    /// Wraps an existing engine handle, applying defaults and then
    /// translating `options`.
    pub fn with_engine(mut engine: E, options: TransferOptions) -> Result<Self> {
        // Defaults go in first so recognized options can override them.
        engine.set_follow_redirects(true)?;
        engine.set_max_redirects(options.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS))?;
        engine.set_cookies_enabled(true)?;
        engine.set_connect_timeout(options.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))?;
        engine.set_timeout(options.read_timeout.unwrap_or(DEFAULT_TIMEOUT))?;

        if let Some(proxy) = &options.proxy {
            engine.set_proxy(proxy)?;
        }
        if let Some(userpwd) = &options.proxy_basic_auth {
            engine.set_proxy_credentials(userpwd)?;
        }
        if let Some(userpwd) = &options.basic_auth {
            engine.set_credentials(userpwd)?;
        }
        if let Some(path) = &options.ssl_ca_cert {
            engine.set_ca_bundle(path)?;
        }
        if let Some(mode) = options.ssl_verify_mode {
            // Boolean mapping only; the peer/host distinction of full TLS
            // verify modes is not modeled.
            engine.set_verify_host(mode != 0)?;
        }
        if options.ftp_active_mode {
            // The engine has no active/passive knob for FTP.
            trace!("discarding ftp_active_mode");
        }
        if options.redirect {
            engine.set_follow_redirects(true)?;
        }

        if options.content_length_proc.is_some() || options.progress_proc.is_some() {
            // Both callbacks share one engine registration. The
            // content-length side is a one-shot: pending until the first
            // tick that reports a total size, fired at most once.
            let mut pending = options.content_length_proc.clone();
            let on_progress = options.progress_proc.clone();
            engine.set_progress(Box::new(move |dl_total, dl_now, _ul_total, _ul_now| {
                if dl_total > 0.0 {
                    if let Some(callback) = pending.take() {
                        callback(dl_total as u64);
                    }
                }
                if let Some(callback) = &on_progress {
                    callback(dl_now as u64);
                }
            }))?;
        }

        // Defaults first, then the caller's bag; a caller key overwrites
        // the default of the same name. Key match is case-sensitive,
        // consistent with how the defaults are stored.
        let mut headers: Vec<(String, String)> =
            vec![("User-Agent".to_owned(), DEFAULT_USER_AGENT.to_owned())];
        for (name, value) in options.headers {
            if let Some(existing) = headers.iter_mut().find(|(n, _)| *n == name) {
                existing.1 = value;
            } else {
                headers.push((name, value));
            }
        }
        engine.set_headers(&headers)?;

        Ok(Self {
            engine,
            performed: false,
        })
    }

    /// Runs the transfer, blocking until the response is fully buffered.
    /// Calling again after a successful perform is a no-op.
    pub fn perform(&mut self) -> Result<()> {
        if self.performed {
            return Ok(());
        }
        self.engine.perform()?;
        self.performed = true;
        debug!(code = self.engine.response_code(), "transfer complete");
        Ok(())
    }

    /// Detected charset of the document, lower-cased, or `""` when neither
    /// the content-type header nor the leading body bytes name one.
    ///
    /// Runs the transfer first if it has not happened yet.
    pub fn charset(&mut self) -> Result<String> {
        self.perform()?;
        Ok(charset::detect(
            self.engine.content_type().as_deref(),
            self.engine.body(),
        ))
    }

    /// Buffered response body.
    pub fn body(&self) -> &[u8] {
        self.engine.body()
    }

    /// Raw response header block, status line included.
    pub fn header_block(&self) -> &[u8] {
        self.engine.header_block()
    }

    /// Value of the content-type header, if any.
    pub fn content_type(&mut self) -> Option<String> {
        self.engine.content_type()
    }

    pub fn response_code(&mut self) -> u32 {
        self.engine.response_code()
    }

    /// Final URL after any redirects.
    pub fn effective_url(&mut self) -> Option<String> {
        self.engine.effective_url()
    }

    /// Total download size, once the engine has seen one.
    pub fn downloaded_content_length(&mut self) -> Option<u64> {
        self.engine.downloaded_content_length()
    }

    /// Consumes the adapter and materializes the response snapshot,
    /// performing the transfer first if necessary.
    ///
    /// The base URI comes from the engine's effective URL; a parse failure
    /// there leaves it unset rather than failing the whole call.
    pub fn into_result(mut self) -> Result<TransferResult> {
        self.perform()?;
        let base_uri = self
            .engine
            .effective_url()
            .and_then(|url| Url::parse(&url).ok());
        let header_block = String::from_utf8_lossy(self.engine.header_block()).into_owned();
        let content_type = self.engine.content_type();
        let status_code = self.engine.response_code();
        let body = self.engine.take_body();
        Ok(TransferResult::new(
            body,
            header_block,
            content_type,
            status_code,
            base_uri,
        ))
    }
}

/// Opens `url`, performs the transfer and returns the buffered response.
///
/// # Examples
///
/// ```no_run
/// use curl_agent::{open, TransferOptions};
/// use std::io::Read;
/// use std::time::Duration;
///
/// # fn main() -> curl_agent::Result<()> {
/// let mut page = open(
///     "http://www.example.com/",
///     TransferOptions::default()
///         .read_timeout(Duration::from_secs(10))
///         .header("User-Agent", "curl"),
/// )?;
/// let mut html = String::new();
/// page.read_to_string(&mut html)?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "curl")]
pub fn open(url: &str, options: TransferOptions) -> Result<TransferResult> {
    open_mode(url, None, None, options)
}

/// [`open`] with the legacy mode/permission arguments.
///
/// `mode` must be a read-only indicator (`"r"`, `"rb"` or [`RDONLY`]);
/// anything else fails with [`AgentError::InvalidMode`] before any engine
/// handle is constructed. `perm` is accepted for signature compatibility
/// and ignored.
///
/// [`RDONLY`]: crate::RDONLY
#[cfg(feature = "curl")]
pub fn open_mode(
    url: &str,
    mode: Option<Mode>,
    perm: Option<u32>,
    options: TransferOptions,
) -> Result<TransferResult> {
    open_with_engine::<CurlEngine, _, _>(url, mode, perm, options, |result| result)
}

/// Block form of [`open`]: invokes `f` with the result and returns `f`'s
/// return value.
#[cfg(feature = "curl")]
pub fn open_with<T>(
    url: &str,
    options: TransferOptions,
    f: impl FnOnce(TransferResult) -> T,
) -> Result<T> {
    open_with_engine::<CurlEngine, _, T>(url, None, None, options, f)
}

/// Engine-parameterized core of the `open` helpers.
///
/// Validates `mode` before any engine handle exists, builds the adapter
/// over a fresh `E` handle, performs the transfer and hands the result to
/// `f`, returning `f`'s value. The public helpers delegate here with
/// [`CurlEngine`]; alternative engines call it directly.
pub fn open_with_engine<E, F, T>(
    url: &str,
    mode: Option<Mode>,
    perm: Option<u32>,
    options: TransferOptions,
    f: F,
) -> Result<T>
where
    E: TransferEngine,
    F: FnOnce(TransferResult) -> T,
{
    check_mode(mode.as_ref())?;
    let _ = perm;
    debug!(url, "opening");
    let result = CurlAgent::with_engine(E::new(url)?, options)?.into_result()?;
    Ok(f(result))
}

fn check_mode(mode: Option<&Mode>) -> Result<()> {
    match mode {
        Some(mode) if !mode.is_read_only() => Err(AgentError::InvalidMode {
            mode: mode.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_mode() {
        assert!(check_mode(None).is_ok());
        assert!(check_mode(Some(&Mode::from("r"))).is_ok());
        assert!(check_mode(Some(&Mode::from("rb"))).is_ok());
        assert!(check_mode(Some(&Mode::from(0))).is_ok());
        assert!(matches!(
            check_mode(Some(&Mode::from("w"))),
            Err(AgentError::InvalidMode { .. })
        ));
    }

    #[cfg(feature = "curl")]
    #[test]
    fn test_open_mode_rejects_write_before_any_transfer() {
        let err = open_mode(
            "http://www.example.com/",
            Some(Mode::from("w")),
            Some(0o600),
            TransferOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AgentError::InvalidMode { mode } if mode == "w"));
    }
}
