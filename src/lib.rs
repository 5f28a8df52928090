//! Finds wiki roster characters that have not logged in to the MUSH recently.
//!
//! A run crawls the wiki's active-character index into a [`models::Roster`],
//! fingers every rostered name over one raw TCP session, and prunes anyone
//! the transcript shows as recently logged in. Whoever is left goes into the
//! cleanup report.

pub mod audit;
pub mod config;
pub mod correlate;
pub mod error;
pub mod models;
pub mod report;
pub mod session;
pub mod wiki;

pub use error::{Error, Result};
