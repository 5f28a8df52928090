//! Building the roster from the wiki.
//!
//! The index page lists every active character's page. Each page is fetched
//! and searched for the character's on-MUSH name. Pages are fetched in
//! batches of `concurrency`; a batch has to finish before the next one
//! starts. Fetch tasks never touch the roster: they send `(name, url)` pairs
//! to a single collector task that owns it.

mod client;

use std::sync::Arc;

use regex::Regex;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

pub use client::*;

use crate::config::WikiConfig;
use crate::models::Roster;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("crawl task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("roster collector stopped early")]
    CollectorClosed,
}

type Entry = (String, String);

pub struct RosterCrawler<F> {
    fetcher: Arc<F>,
    wiki: WikiConfig,
    concurrency: usize,
}

impl<F: PageFetcher + 'static> RosterCrawler<F> {
    /// `concurrency` is clamped to at least one page per batch.
    pub fn new(fetcher: F, wiki: WikiConfig, concurrency: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            wiki,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch the index and return every character page it links to,
    /// duplicates included, in page order.
    pub async fn page_urls(&self) -> Result<Vec<String>, CrawlError> {
        let index_url = self.wiki.index_url();
        let index = self.fetcher.fetch(&index_url).await?;
        let pages = extract_links(&self.wiki, &index);
        tracing::info!(index = %index_url, pages = pages.len(), "Read character index");
        Ok(pages)
    }

    /// Crawl every character page and map on-MUSH names to their pages.
    ///
    /// The first failed fetch aborts the crawl; the rest of its batch is
    /// cancelled.
    pub async fn build_roster(&self) -> Result<Roster, CrawlError> {
        let pages = self.page_urls().await?;

        let (tx, rx) = mpsc::unbounded_channel::<Entry>();
        let collector = tokio::spawn(collect(rx));

        for (batch, urls) in pages.chunks(self.concurrency).enumerate() {
            tracing::debug!(batch, size = urls.len(), "Fetching character pages");

            let mut tasks = JoinSet::new();
            for url in urls {
                tasks.spawn(scan_page(
                    Arc::clone(&self.fetcher),
                    self.wiki.on_mush_as.clone(),
                    url.clone(),
                    tx.clone(),
                ));
            }
            while let Some(joined) = tasks.join_next().await {
                joined??;
            }
        }

        drop(tx);
        let roster = collector.await?;
        tracing::info!(characters = roster.len(), "Built roster");
        Ok(roster)
    }
}

async fn scan_page<F: PageFetcher>(
    fetcher: Arc<F>,
    pattern: Regex,
    url: String,
    tx: mpsc::UnboundedSender<Entry>,
) -> Result<(), CrawlError> {
    let body = fetcher.fetch(&url).await?;
    match extract_name(&pattern, &body) {
        Some(name) => tx
            .send((name, url))
            .map_err(|_| CrawlError::CollectorClosed)?,
        None => tracing::debug!(%url, "Page has no on-MUSH name"),
    }
    Ok(())
}

/// Sole owner of the roster while the crawl runs.
async fn collect(mut rx: mpsc::UnboundedReceiver<Entry>) -> Roster {
    let mut roster = Roster::new();
    while let Some((name, url)) = rx.recv().await {
        roster.insert(name, url);
    }
    roster
}

/// Absolute page URLs for every active-character link on the index page.
pub fn extract_links(wiki: &WikiConfig, index: &str) -> Vec<String> {
    wiki.active_character
        .captures_iter(index)
        .filter_map(|caps| caps.get(1))
        .map(|href| format!("{}{}", wiki.base, href.as_str()))
        .collect()
}

/// The first capture of `pattern` in `body`, if any.
pub fn extract_name(pattern: &Regex, body: &str) -> Option<String> {
    pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiki() -> WikiConfig {
        WikiConfig {
            base: "https://wiki.example.org".to_string(),
            active_character_page: "/Active".to_string(),
            active_character: Regex::new(r#"<a href="(/wiki/[^"]+)""#).unwrap(),
            on_mush_as: Regex::new(r"On MUSH as: (\w+)").unwrap(),
        }
    }

    #[test]
    fn test_extract_links_keeps_duplicates_in_order() {
        let index = r#"
            <a href="/wiki/Alice">Alice</a>
            <a href="/wiki/Bob">Bob</a>
            <a href="/other/Nope">Nope</a>
            <a href="/wiki/Alice">Alice again</a>
        "#;

        assert_eq!(
            extract_links(&wiki(), index),
            vec![
                "https://wiki.example.org/wiki/Alice",
                "https://wiki.example.org/wiki/Bob",
                "https://wiki.example.org/wiki/Alice",
            ]
        );
    }

    #[test]
    fn test_extract_name_takes_first_match() {
        let pattern = wiki().on_mush_as;
        assert_eq!(
            extract_name(&pattern, "On MUSH as: Alice\nOn MUSH as: Alicia"),
            Some("Alice".to_string())
        );
        assert_eq!(extract_name(&pattern, "Retired character"), None);
    }
}
