//! Reconciler
//!
//! Orders freshly fetched bars and drops everything at or before the
//! resumption point, guaranteeing that nothing appended ever duplicates or
//! regresses a stored timestamp. Bars sharing a timestamp keep the last
//! occurrence so the stored history stays strictly increasing.

use chrono::{DateTime, Utc};

use crate::models::Bar;

/// Sort, deduplicate, and cut fetched bars against the resumption point.
///
/// The returned sequence is strictly increasing by timestamp and may be
/// empty. With no resumption point every deduplicated bar survives.
pub fn reconcile(mut bars: Vec<Bar>, resume_point: Option<DateTime<Utc>>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.time);

    // Stable sort keeps fetch order among equal timestamps; overwriting in
    // place keeps the last occurrence.
    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        if deduped.last().map_or(false, |prev| prev.time == bar.time) {
            if let Some(prev) = deduped.last_mut() {
                *prev = bar;
            }
        } else {
            deduped.push(bar);
        }
    }

    match resume_point {
        Some(cutoff) => deduped.into_iter().filter(|b| b.time > cutoff).collect(),
        None => deduped,
    }
}
