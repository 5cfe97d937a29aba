//! Strictly sequential walk over a device-provided list.
//!
//! Each item gets a summary line, then one fetch; the next fetch is only
//! issued once the previous one resolved. A failed fetch is reported and the
//! walk moves on.

use async_trait::async_trait;
use tracing::debug;

use crate::error::WdsError;
use crate::output::{LifecycleEvent, Reporter};

/// Per-item behaviour of a [`walk`].
#[async_trait]
pub trait ListWalk: Send + Sync {
	type Item: Send + Sync;
	type Detail: Send;

	/// Message name of the per-item request.
	const REQUEST: &'static str;
	/// Reported instead of anything else when the list is empty.
	const EMPTY: &'static str;
	/// Reported before the first item.
	const HEADER: &'static str;

	fn summary(&self, item: &Self::Item) -> String;

	async fn fetch(&self, item: &Self::Item) -> Result<Self::Detail, WdsError>;

	fn detail_lines(&self, detail: &Self::Detail) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
	pub total: usize,
	pub failed: usize,
}

/// Visits `items` in order. Never fails: per-item failures are reported and
/// counted.
pub async fn walk<W: ListWalk>(
	walker: &W,
	items: &[W::Item],
	reporter: &mut dyn Reporter,
) -> WalkSummary {
	let mut summary = WalkSummary {
		total: items.len(),
		failed: 0,
	};

	if items.is_empty() {
		reporter.line(W::EMPTY);
		return summary;
	}

	reporter.line(W::HEADER);
	for (index, item) in items.iter().enumerate() {
		reporter.line(&walker.summary(item));
		reporter.lifecycle(LifecycleEvent::RequestSent { message: W::REQUEST });

		match walker.fetch(item).await {
			Ok(detail) => {
				for line in walker.detail_lines(&detail) {
					reporter.line(&line);
				}
			}
			Err(err) => {
				debug!(index, "item fetch failed: {err}");
				summary.failed += 1;
				for line in err.report_lines() {
					reporter.error(&line);
				}
			}
		}
	}

	summary
}
