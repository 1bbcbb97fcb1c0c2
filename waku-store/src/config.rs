use std::path::Path;
use std::time::Duration;

use config::Config;

use crate::pagination::clamp_page_size;
use crate::protocol::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MAX_PROTOBUF_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    /// Largest history frame read from or written to a stream, in bytes.
    pub max_frame_size: usize,
    /// Widens both ends of the resume time window.
    pub resume_guard_offset_ms: u64,
    /// Peers queried at once during resume. Unset queries every candidate at once.
    pub resume_concurrency: Option<usize>,
    /// Most pages resume reads from a single peer.
    pub resume_max_pages: usize,
    /// Bound on each request/response exchange with a remote peer.
    pub request_timeout_ms: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            max_frame_size: MAX_PROTOBUF_SIZE,
            resume_guard_offset_ms: 20_000,
            resume_concurrency: None,
            resume_max_pages: 100,
            request_timeout_ms: None,
        }
    }
}

impl StoreConfig {
    /// Load the configuration from an optional file, overridden by `WAKU_STORE_*` environment
    /// variables.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut conf_builder = Config::builder();
        if let Some(path) = path {
            conf_builder = conf_builder.add_source(config::File::from(path).required(false));
        }
        conf_builder = conf_builder.add_source(
            config::Environment::with_prefix("WAKU_STORE")
                .ignore_empty(true)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        conf_builder.build()?.try_deserialize::<StoreConfig>()
    }

    pub fn resume_guard_offset(&self) -> Duration {
        Duration::from_millis(self.resume_guard_offset_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn clamp_page_size(&self, page_size: u64) -> u64 {
        clamp_page_size(page_size, self.default_page_size, self.max_page_size)
    }
}

#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn build(&self) -> StoreConfig {
        self.config.clone()
    }

    pub fn page_size(&mut self, default: u64, max: u64) -> &mut Self {
        self.config.default_page_size = default;
        self.config.max_page_size = max;
        self
    }

    pub fn max_frame_size(&mut self, size: usize) -> &mut Self {
        self.config.max_frame_size = size;
        self
    }

    pub fn resume_guard_offset(&mut self, offset: Duration) -> &mut Self {
        self.config.resume_guard_offset_ms = offset.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn resume_concurrency(&mut self, limit: usize) -> &mut Self {
        self.config.resume_concurrency = Some(limit);
        self
    }

    pub fn resume_max_pages(&mut self, pages: usize) -> &mut Self {
        self.config.resume_max_pages = pages;
        self
    }

    pub fn request_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.config.request_timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }
}
