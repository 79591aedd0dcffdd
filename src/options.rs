use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Read-only numeric open flag accepted by [`Mode::Flags`] (`O_RDONLY`).
pub const RDONLY: i32 = 0;

/// Legacy file-open mode accepted by [`open_mode`](crate::open_mode) for
/// interface compatibility with file-style `open` signatures.
///
/// A URL resource can only ever be read, so the only valid modes are the
/// read-only indicators: `"r"`, `"rb"`, or the numeric [`RDONLY`] flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// A mode string such as `"r"` or `"rb"`.
    Name(String),
    /// Numeric open flags; only [`RDONLY`] is accepted.
    Flags(i32),
}

impl Mode {
    /// Returns `true` for `"r"`, `"rb"` and the read-only flag value.
    pub fn is_read_only(&self) -> bool {
        match self {
            Mode::Name(name) => name == "r" || name == "rb",
            Mode::Flags(flags) => *flags == RDONLY,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Name(name) => f.write_str(name),
            Mode::Flags(flags) => write!(f, "{flags}"),
        }
    }
}

impl From<&str> for Mode {
    fn from(name: &str) -> Self {
        Mode::Name(name.to_owned())
    }
}

impl From<i32> for Mode {
    fn from(flags: i32) -> Self {
        Mode::Flags(flags)
    }
}

/// Callback invoked once, when the total download size first becomes known.
pub type ContentLengthProc = Arc<dyn Fn(u64) + Send + Sync>;

/// Callback invoked on every progress tick with the bytes downloaded so far.
pub type ProgressProc = Arc<dyn Fn(u64) + Send + Sync>;

/// Configuration for a single transfer.
///
/// Recognized options are consumed at adapter construction and translated
/// into engine configuration; they are never sent as headers. Everything
/// added through [`header`](Self::header) goes out verbatim as a request
/// header, overwriting the default header of the same name.
///
/// # Examples
///
/// ```
/// use curl_agent::TransferOptions;
/// use std::time::Duration;
///
/// let options = TransferOptions::default()
///     .read_timeout(Duration::from_secs(10))
///     .header("User-Agent", "curl");
/// ```
#[derive(Clone, Default)]
pub struct TransferOptions {
    /// Proxy URL.
    pub proxy: Option<String>,

    /// Proxy credentials as `user:password`.
    pub proxy_basic_auth: Option<String>,

    /// Origin credentials as `user:password`.
    pub basic_auth: Option<String>,

    /// One-shot callback fired the first time the total download size is
    /// reported by the engine. If the engine never learns a total (for
    /// example, a chunked response), the callback never fires.
    pub content_length_proc: Option<ContentLengthProc>,

    /// Callback fired on every progress tick with bytes downloaded so far.
    pub progress_proc: Option<ProgressProc>,

    /// Overall transfer timeout. Default: 30 seconds.
    pub read_timeout: Option<Duration>,

    /// Connection establishment timeout. Default: 5 seconds.
    pub connect_timeout: Option<Duration>,

    /// Maximum redirect hops to follow. Default: 2.
    pub max_redirects: Option<u32>,

    /// CA bundle path for TLS verification.
    pub ssl_ca_cert: Option<PathBuf>,

    /// TLS verify mode. Mapped onto the engine's host-verification flag as
    /// a plain boolean: any non-zero mode enables it. The peer/host
    /// distinction of full TLS option sets is not modeled.
    pub ssl_verify_mode: Option<u32>,

    /// Recognized and discarded; the engine has no active-mode knob.
    pub ftp_active_mode: bool,

    /// Forces redirect following on.
    pub redirect: bool,

    /// Ordered request-header bag. Later values win for a repeated key.
    pub(crate) headers: Vec<(String, String)>,
}

impl fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOptions")
            .field("proxy", &self.proxy)
            .field("proxy_basic_auth", &self.proxy_basic_auth.as_ref().map(|_| "{ ... }"))
            .field("basic_auth", &self.basic_auth.as_ref().map(|_| "{ ... }"))
            .field("content_length_proc", &self.content_length_proc.as_ref().map(|_| "{ ... }"))
            .field("progress_proc", &self.progress_proc.as_ref().map(|_| "{ ... }"))
            .field("read_timeout", &self.read_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_redirects", &self.max_redirects)
            .field("ssl_ca_cert", &self.ssl_ca_cert)
            .field("ssl_verify_mode", &self.ssl_verify_mode)
            .field("ftp_active_mode", &self.ftp_active_mode)
            .field("redirect", &self.redirect)
            .field("headers", &self.headers)
            .finish()
    }
}

impl TransferOptions {
    /// Set the proxy URL.
    #[must_use]
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    /// Set proxy credentials as `user:password`.
    #[must_use]
    pub fn proxy_basic_auth(mut self, userpwd: impl Into<String>) -> Self {
        self.proxy_basic_auth = Some(userpwd.into());
        self
    }

    /// Set origin credentials as `user:password`.
    #[must_use]
    pub fn basic_auth(mut self, userpwd: impl Into<String>) -> Self {
        self.basic_auth = Some(userpwd.into());
        self
    }

    /// Set the one-shot content-length callback.
    ///
    /// # Examples
    ///
    /// ```
    /// use curl_agent::TransferOptions;
    /// use std::sync::Arc;
    ///
    /// let options = TransferOptions::default()
    ///     .content_length_proc(Arc::new(|total| println!("{total} bytes expected")));
    /// ```
    #[must_use]
    pub fn content_length_proc(mut self, callback: ContentLengthProc) -> Self {
        self.content_length_proc = Some(callback);
        self
    }

    /// Set the per-tick progress callback.
    #[must_use]
    pub fn progress_proc(mut self, callback: ProgressProc) -> Self {
        self.progress_proc = Some(callback);
        self
    }

    /// Set the overall transfer timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum number of redirect hops.
    #[must_use]
    pub fn max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = Some(max);
        self
    }

    /// Set the CA bundle path.
    #[must_use]
    pub fn ssl_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssl_ca_cert = Some(path.into());
        self
    }

    /// Set the TLS verify mode (non-zero enables host verification).
    #[must_use]
    pub fn ssl_verify_mode(mut self, mode: u32) -> Self {
        self.ssl_verify_mode = Some(mode);
        self
    }

    /// Request FTP active mode. Recognized for compatibility and discarded.
    #[must_use]
    pub fn ftp_active_mode(mut self, active: bool) -> Self {
        self.ftp_active_mode = active;
        self
    }

    /// Force redirect following on.
    #[must_use]
    pub fn redirect(mut self, follow: bool) -> Self {
        self.redirect = follow;
        self
    }

    /// Add a request header. Repeating a key keeps the later value.
    ///
    /// # Examples
    ///
    /// ```
    /// use curl_agent::TransferOptions;
    ///
    /// let options = TransferOptions::default()
    ///     .header("User-Agent", "curl")
    ///     .header("Accept", "text/html");
    /// ```
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replace the whole header bag at once.
    #[must_use]
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_read_only() {
        assert!(Mode::from("r").is_read_only());
        assert!(Mode::from("rb").is_read_only());
        assert!(Mode::from(RDONLY).is_read_only());
        assert!(!Mode::from("w").is_read_only());
        assert!(!Mode::from("r+").is_read_only());
        assert!(!Mode::from(2).is_read_only());
    }

    #[test]
    fn test_header_order_preserved() {
        let options = TransferOptions::default()
            .header("X-One", "1")
            .header("X-Two", "2")
            .header("X-One", "3");
        assert_eq!(
            options.headers,
            vec![
                ("X-One".to_owned(), "1".to_owned()),
                ("X-Two".to_owned(), "2".to_owned()),
                ("X-One".to_owned(), "3".to_owned()),
            ]
        );
    }

    #[test]
    fn test_debug_elides_callbacks() {
        let options = TransferOptions::default()
            .progress_proc(std::sync::Arc::new(|_| {}))
            .basic_auth("user:secret");
        let formatted = format!("{options:?}");
        assert!(formatted.contains("{ ... }"));
        assert!(!formatted.contains("secret"));
    }
}
