use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use crate::models::{DependencyEntry, PackageInfo};
use crate::source::MetadataSource;

pub const DEFAULT_CONCURRENCY: usize = 16;

/// Fetches `summary` / `homepage` for every entry, at most `concurrency`
/// lookups in flight at once.
pub struct Enricher<'a> {
    source: &'a dyn MetadataSource,
    concurrency: usize,
    progress: bool,
}

impl<'a> Enricher<'a> {
    pub fn new(source: &'a dyn MetadataSource) -> Self {
        Self {
            source,
            concurrency: DEFAULT_CONCURRENCY,
            progress: false,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Enrich every entry. The returned map has exactly the input's keys, in
    /// the input's order; a failed or empty lookup leaves the entry's
    /// `summary` and `homepage` unset.
    pub async fn enrich(
        &self,
        entries: IndexMap<String, DependencyEntry>,
    ) -> IndexMap<String, DependencyEntry> {
        let pb = self.progress.then(|| progress_bar(entries.len() as u64));

        let lookups = entries.iter().map(|(key, entry)| {
            let id = entry.lookup_id();
            async move {
                let info = match self.source.package_info(&id).await {
                    Ok(Some(info)) if !info.is_empty() => Some(info),
                    Ok(_) => {
                        debug!(package = %id, "no metadata available");
                        None
                    }
                    Err(e) => {
                        warn!(package = %id, error = %e, "metadata lookup failed");
                        None
                    }
                };
                (key.clone(), info)
            }
        });

        let mut results: HashMap<String, Option<PackageInfo>> = stream::iter(lookups)
            .buffer_unordered(self.concurrency)
            .inspect(|_| {
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
            })
            .collect()
            .await;

        if let Some(pb) = pb {
            pb.finish_with_message("Done");
        }

        entries
            .into_iter()
            .map(|(key, mut entry)| {
                if let Some(Some(info)) = results.remove(&key) {
                    entry.metadata.merge(info);
                }
                (key, entry)
            })
            .collect()
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
