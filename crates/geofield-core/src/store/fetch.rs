// crates/geofield-core/src/store/fetch.rs
use std::io::{self, Write};
#[cfg(feature = "download")]
use std::time::Duration;

/// Where dataset archives come from.
pub trait ArchiveSource: Send + Sync {
    /// Streams the archive at `url` into `out`, returning the number of bytes written.
    fn fetch(&self, url: &str, out: &mut dyn Write) -> io::Result<u64>;
}

/// Blocking HTTP downloader.
///
/// Only connecting is bounded in time. Once the server answers, a download
/// runs for as long as it takes, so a stalled transfer stalls the caller.
///
/// Must not be driven from inside an async runtime worker thread.
#[cfg(feature = "download")]
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "download")]
impl HttpSource {
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> io::Result<Self> {
        Self::with_timeouts(Self::CONNECT_TIMEOUT, None)
    }

    /// `total` caps the whole request including the body; `None` disables it.
    pub fn with_timeouts(connect: Duration, total: Option<Duration>) -> io::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("geofield/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect)
            .timeout(total)
            .build()
            .map_err(io::Error::other)?;
        Ok(Self { client })
    }
}

#[cfg(feature = "download")]
impl ArchiveSource for HttpSource {
    fn fetch(&self, url: &str, out: &mut dyn Write) -> io::Result<u64> {
        let mut resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(io::Error::other)?;
        resp.copy_to(out).map_err(io::Error::other)
    }
}
