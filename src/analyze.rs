//! Batch analysis of ingested records.
//!
//! Each record's remote blob is submitted with the prompt, one record at a
//! time. Successful calls are followed by a short pause; rate-limit and
//! service errors by a longer backoff. Any failing record is logged and
//! left out of the results, and the batch carries on.

use crate::config::Pacing;
use crate::models::{AnalysisResult, FileRecord, NO_ANALYSIS};
use crate::traits::AnalysisService;

/// Analyze every record, returning results for the ones that succeeded, in
/// input order.
pub async fn analyze_records(
    service: &dyn AnalysisService,
    prompt: &str,
    records: &[FileRecord],
    pacing: &Pacing,
) -> Vec<AnalysisResult> {
    let mut results = Vec::with_capacity(records.len());

    for record in records {
        tracing::info!(file_name = %record.display_name, "analyzing");

        match service.generate(prompt, &record.remote).await {
            Ok(text) => {
                let trimmed = text.trim();
                let analysis = if trimmed.is_empty() {
                    NO_ANALYSIS.to_string()
                } else {
                    trimmed.to_string()
                };
                tracing::info!(file_name = %record.display_name, "analysis complete");
                results.push(AnalysisResult::from_record(record, analysis));
                tokio::time::sleep(pacing.analysis_delay).await;
            }
            Err(e) if e.is_backoff() => {
                tracing::warn!(
                    file_name = %record.display_name,
                    error = %e,
                    backoff_ms = pacing.rate_limit_backoff.as_millis() as u64,
                    "API error analyzing file, skipped"
                );
                tokio::time::sleep(pacing.rate_limit_backoff).await;
            }
            Err(e) => {
                tracing::warn!(
                    file_name = %record.display_name,
                    error = %e,
                    "unexpected error analyzing file, skipped"
                );
            }
        }
    }

    tracing::info!(
        analyzed = results.len(),
        total = records.len(),
        "analysis finished"
    );
    results
}
