//! Ingestion of a batch of specification URLs into one tool set.

use crate::error::{AppError, Result};
use crate::ingestion::fetch::SpecFetcher;
use crate::ingestion::normalizer::normalize;
use crate::ingestion::types::Tool;
use futures::future::join_all;
use std::collections::HashMap;

/// Tools from every document in supplied order, plus one summary document per tool.
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub tools: Vec<Tool>,
    pub documents: Vec<String>,
}

/// Fetch and normalize every URL.
///
/// Documents are fetched and normalized concurrently, but tools are appended
/// in the order the URLs were given. A top-level fetch failure fails the whole
/// batch. Colliding names get a numeric suffix so names stay unique.
pub async fn ingest_documents(urls: &[String], fetcher: &dyn SpecFetcher) -> Result<IngestOutcome> {
    let per_document = join_all(urls.iter().map(|url| async move {
        let document = fetcher.fetch_json(url).await?;
        Ok::<_, AppError>(normalize(&document, url, fetcher).await)
    }))
    .await;

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut outcome = IngestOutcome::default();

    for (url, tools) in urls.iter().zip(per_document) {
        let tools = tools?;
        tracing::info!(url = %url, tools = tools.len(), "Specification ingested");

        for mut tool in tools {
            tool.name = unique_name(&mut seen, tool.name);
            outcome.documents.push(tool.summary_document());
            outcome.tools.push(tool);
        }
    }

    Ok(outcome)
}

fn unique_name(seen: &mut HashMap<String, usize>, name: String) -> String {
    let count = seen.entry(name.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        return name;
    }

    let mut n = *count;
    loop {
        let candidate = format!("{}_{}", name, n);
        if !seen.contains_key(&candidate) {
            tracing::warn!(original = %name, renamed = %candidate, "Duplicate tool name in batch");
            seen.insert(candidate.clone(), 1);
            return candidate;
        }
        n += 1;
    }
}
