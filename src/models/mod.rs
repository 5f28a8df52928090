//! Data passed between the crawl, session and correlation phases.
//!
//! - [`Roster`]: character name → wiki page, built by the crawler and pruned
//!   by the correlator.
//! - [`Transcript`]: everything the MUSH sent during one session.

mod roster;
mod transcript;

pub use roster::*;
pub use transcript::*;
