use tracing::info;

use crate::error::{Error, Result};
use crate::evidence::normalize;
use crate::search::Searcher;
use crate::types::EvidenceItem;

/// One search for the raw claim text, normalized. Search failures and
/// empty result sets are both errors; assessment never runs without evidence.
pub async fn research(searcher: &dyn Searcher, query: &str, max_results: usize) -> Result<Vec<EvidenceItem>> {
    let hits = searcher.search(query, max_results).await?;
    let evidence = normalize(&hits);
    info!(hits = hits.len(), kept = evidence.len(), "research done");
    if evidence.is_empty() {
        return Err(Error::EvidenceRetrieval(format!("no results for query `{query}`")));
    }
    Ok(evidence)
}
