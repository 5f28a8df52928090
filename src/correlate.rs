//! Deciding who has been on recently.
//!
//! A finger reply is taken as evidence only when the line straight after it
//! matches the recent-login pattern. Anything further away does not count,
//! and a finger result on the very last line has nothing after it.
//! Multi-line finger output that pushes the login line further down will
//! therefore not be recognised.

use crate::config::ActivityPatterns;
use crate::models::Roster;

/// Names whose finger result is immediately followed by a recent login,
/// in transcript order. A name can appear more than once.
pub fn recently_active(transcript: &str, patterns: &ActivityPatterns) -> Vec<String> {
    let lines: Vec<&str> = transcript.split('\n').map(str::trim).collect();

    lines
        .windows(2)
        .filter_map(|pair| {
            let name = patterns.finger.captures(pair[0])?.get(1)?;
            patterns
                .recent_login
                .is_match(pair[1])
                .then(|| name.as_str().to_string())
        })
        .collect()
}

/// Remove everyone the transcript shows as recently active.
///
/// Returns how many roster entries were removed. Running it again on the
/// same transcript removes nothing more.
pub fn prune(roster: &mut Roster, transcript: &str, patterns: &ActivityPatterns) -> usize {
    let mut pruned = 0;
    for name in recently_active(transcript, patterns) {
        if roster.remove(&name).is_some() {
            tracing::debug!(%name, "Recent login, not up for review");
            pruned += 1;
        }
    }
    tracing::info!(pruned, remaining = roster.len(), "Pruned active characters");
    pruned
}
