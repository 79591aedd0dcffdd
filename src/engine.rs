//! Transfer engine abstraction.
//!
//! [`TransferEngine`] enumerates exactly the operations the adapter needs
//! from the underlying transfer library; nothing else is exposed or
//! forwarded. The production implementation is [`CurlEngine`], backed by
//! libcurl and gated behind the `curl` feature. Tests substitute recording
//! mocks.

use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Progress callback registered on the engine. Invoked with
/// `(download_total, download_now, upload_total, upload_now)`; totals are
/// reported as `0` while unknown.
pub type ProgressFn = Box<dyn FnMut(f64, f64, f64, f64) + Send>;

/// One-shot transfer handle.
///
/// A handle is created per request, configured, performed exactly once,
/// and read out. Implementations buffer the whole response body and the
/// raw header block before `perform` returns.
pub trait TransferEngine: Send {
    /// Creates a handle for `url`. No network I/O happens here.
    fn new(url: &str) -> Result<Self>
    where
        Self: Sized;

    /// Replaces the outgoing request headers.
    fn set_headers(&mut self, headers: &[(String, String)]) -> Result<()>;

    fn set_follow_redirects(&mut self, follow: bool) -> Result<()>;

    fn set_max_redirects(&mut self, max: u32) -> Result<()>;

    /// Enables cookie persistence across redirects within this request.
    fn set_cookies_enabled(&mut self, enabled: bool) -> Result<()>;

    fn set_connect_timeout(&mut self, timeout: Duration) -> Result<()>;

    /// Sets the overall transfer timeout.
    fn set_timeout(&mut self, timeout: Duration) -> Result<()>;

    fn set_proxy(&mut self, url: &str) -> Result<()>;

    /// Proxy credentials as `user:password`.
    fn set_proxy_credentials(&mut self, userpwd: &str) -> Result<()>;

    /// Origin credentials as `user:password`.
    fn set_credentials(&mut self, userpwd: &str) -> Result<()>;

    fn set_ca_bundle(&mut self, path: &Path) -> Result<()>;

    fn set_verify_host(&mut self, verify: bool) -> Result<()>;

    /// Registers the progress callback, invoked synchronously from within
    /// [`perform`](Self::perform) on the calling thread.
    fn set_progress(&mut self, callback: ProgressFn) -> Result<()>;

    /// Runs the transfer, blocking until the response is fully buffered or
    /// a timeout/connection error occurs.
    fn perform(&mut self) -> Result<()>;

    /// Buffered response body.
    fn body(&self) -> &[u8];

    /// Moves the buffered body out of the handle.
    fn take_body(&mut self) -> Vec<u8>;

    /// Raw response header block, status line included.
    fn header_block(&self) -> &[u8];

    /// Value of the content-type header, if the engine saw one.
    ///
    /// Info queries take `&mut self`: libcurl hands out its info through a
    /// mutable handle.
    fn content_type(&mut self) -> Option<String>;

    fn response_code(&mut self) -> u32;

    /// Final URL after any redirects.
    fn effective_url(&mut self) -> Option<String>;

    /// Total download size, once known. `None` while the engine has not
    /// seen a content length.
    fn downloaded_content_length(&mut self) -> Option<u64>;
}

#[cfg(feature = "curl")]
mod curl_impl {
    use std::path::Path;
    use std::time::Duration;

    use super::{ProgressFn, TransferEngine};
    use crate::error::Result;

    /// Production engine backed by [`curl::easy::Easy2`].
    pub struct CurlEngine {
        easy: curl::easy::Easy2<Collector>,
    }

    /// Accumulates the response while the transfer runs and forwards
    /// progress ticks to the registered callback.
    struct Collector {
        body: Vec<u8>,
        header_block: Vec<u8>,
        on_progress: Option<ProgressFn>,
    }

    impl curl::easy::Handler for Collector {
        fn write(&mut self, data: &[u8]) -> std::result::Result<usize, curl::easy::WriteError> {
            self.body.extend_from_slice(data);
            Ok(data.len())
        }

        fn header(&mut self, data: &[u8]) -> bool {
            self.header_block.extend_from_slice(data);
            true
        }

        fn progress(&mut self, dltotal: f64, dlnow: f64, ultotal: f64, ulnow: f64) -> bool {
            if let Some(callback) = self.on_progress.as_mut() {
                callback(dltotal, dlnow, ultotal, ulnow);
            }
            true
        }
    }

    impl TransferEngine for CurlEngine {
        fn new(url: &str) -> Result<Self> {
            let mut easy = curl::easy::Easy2::new(Collector {
                body: Vec::new(),
                header_block: Vec::new(),
                on_progress: None,
            });
            easy.url(url)?;
            Ok(Self { easy })
        }

        fn set_headers(&mut self, headers: &[(String, String)]) -> Result<()> {
            let mut list = curl::easy::List::new();
            for (name, value) in headers {
                list.append(&format!("{name}: {value}"))?;
            }
            self.easy.http_headers(list)?;
            Ok(())
        }

        fn set_follow_redirects(&mut self, follow: bool) -> Result<()> {
            self.easy.follow_location(follow)?;
            Ok(())
        }

        fn set_max_redirects(&mut self, max: u32) -> Result<()> {
            self.easy.max_redirections(max)?;
            Ok(())
        }

        fn set_cookies_enabled(&mut self, enabled: bool) -> Result<()> {
            if enabled {
                // An empty cookie file turns the cookie engine on without
                // loading anything from disk.
                self.easy.cookie_file("")?;
            }
            Ok(())
        }

        fn set_connect_timeout(&mut self, timeout: Duration) -> Result<()> {
            self.easy.connect_timeout(timeout)?;
            Ok(())
        }

        fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
            self.easy.timeout(timeout)?;
            Ok(())
        }

        fn set_proxy(&mut self, url: &str) -> Result<()> {
            self.easy.proxy(url)?;
            Ok(())
        }

        fn set_proxy_credentials(&mut self, userpwd: &str) -> Result<()> {
            let (user, password) = userpwd.split_once(':').unwrap_or((userpwd, ""));
            self.easy.proxy_username(user)?;
            self.easy.proxy_password(password)?;
            Ok(())
        }

        fn set_credentials(&mut self, userpwd: &str) -> Result<()> {
            let (user, password) = userpwd.split_once(':').unwrap_or((userpwd, ""));
            self.easy.username(user)?;
            self.easy.password(password)?;
            Ok(())
        }

        fn set_ca_bundle(&mut self, path: &Path) -> Result<()> {
            self.easy.cainfo(path)?;
            Ok(())
        }

        fn set_verify_host(&mut self, verify: bool) -> Result<()> {
            self.easy.ssl_verify_host(verify)?;
            Ok(())
        }

        fn set_progress(&mut self, callback: ProgressFn) -> Result<()> {
            self.easy.progress(true)?;
            self.easy.get_mut().on_progress = Some(callback);
            Ok(())
        }

        fn perform(&mut self) -> Result<()> {
            self.easy.perform()?;
            Ok(())
        }

        fn body(&self) -> &[u8] {
            &self.easy.get_ref().body
        }

        fn take_body(&mut self) -> Vec<u8> {
            std::mem::take(&mut self.easy.get_mut().body)
        }

        fn header_block(&self) -> &[u8] {
            &self.easy.get_ref().header_block
        }

        fn content_type(&mut self) -> Option<String> {
            self.easy.content_type().ok().flatten().map(str::to_owned)
        }

        fn response_code(&mut self) -> u32 {
            self.easy.response_code().unwrap_or(0)
        }

        fn effective_url(&mut self) -> Option<String> {
            self.easy.effective_url().ok().flatten().map(str::to_owned)
        }

        fn downloaded_content_length(&mut self) -> Option<u64> {
            self.easy
                .content_length_download()
                .ok()
                .filter(|length| *length >= 0.0)
                .map(|length| length as u64)
        }
    }
}

#[cfg(feature = "curl")]
pub use curl_impl::CurlEngine;
