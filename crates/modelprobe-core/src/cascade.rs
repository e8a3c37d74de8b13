//! Fallback cascade selection.
//!
//! Availability is the only criterion: the first successful outcome in
//! priority order wins.

use crate::types::ProbeOutcome;

/// The outcome chosen by [`select`].
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    /// Position in the scanned sequence
    pub index: usize,
    pub outcome: &'a ProbeOutcome,
}

/// Return the first successful outcome, or `None` when nothing is available.
pub fn select(outcomes: &[ProbeOutcome]) -> Option<Selection<'_>> {
    outcomes
        .iter()
        .enumerate()
        .find(|(_, o)| o.status.is_success())
        .map(|(index, outcome)| Selection { index, outcome })
}

/// Stable-sort `items` by the position of their provider name in `order`.
///
/// Names missing from `order` keep their relative order after all listed ones.
pub fn sort_by_priority<T, F>(items: &mut [T], order: &[String], provider_of: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_key(|item| {
        let name = provider_of(item);
        order.iter().position(|p| p == name).unwrap_or(order.len())
    });
}
