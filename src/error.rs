use thiserror::Error;

use crate::config::ConfigError;
use crate::session::SessionError;
use crate::wiki::CrawlError;

pub type Result<T> = std::result::Result<T, Error>;

/// Anything that aborts a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("wiki crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    #[error("MUSH session failed: {0}")]
    Session(#[from] SessionError),
}
