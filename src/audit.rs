//! The whole run: crawl the wiki, finger everyone, keep the quiet ones.

use crate::config::Config;
use crate::correlate;
use crate::models::Roster;
use crate::session::SessionDriver;
use crate::wiki::{CrawlError, RosterCrawler, WikiClient};
use crate::Result;

/// Build the roster from the wiki.
pub async fn crawl(config: &Config) -> Result<Roster> {
    let client = WikiClient::new(config.timing.http_timeout).map_err(CrawlError::from)?;
    let crawler = RosterCrawler::new(
        client,
        config.wiki.clone(),
        config.timing.fetch_concurrency,
    );
    Ok(crawler.build_roster().await?)
}

/// Characters on the wiki roster with no recent login on the MUSH.
pub async fn audit(config: &Config) -> Result<Roster> {
    let mut roster = crawl(config).await?;
    if roster.is_empty() {
        tracing::info!("Roster is empty, skipping MUSH session");
        return Ok(roster);
    }

    let names = roster.names();
    let transcript = SessionDriver::new(&config.server, config.timing)
        .run_session(&names)
        .await?;

    correlate::prune(&mut roster, &transcript.to_text(), &config.activity);
    Ok(roster)
}
