use super::config::SdtConfig;
use crate::model::{ContentElement, ElementKind};

const CELL_DEPTH: u8 = 2;
const INLINE_DEPTH: u8 = 3;

/// How deeply nested a target is expected to be. Deeper targets are
/// wrapped first so their containers are still unwrapped when reached.
pub fn depth_score(element: &ContentElement, config: &SdtConfig) -> u8 {
    let base = match element.kind() {
        ElementKind::Cell => CELL_DEPTH,
        _ if config.inline_level() => INLINE_DEPTH,
        _ => 0,
    };
    if config.run_level() {
        base + 1
    } else {
        base
    }
}

/// Batch positions in processing order: depth descending, ties in batch
/// order.
pub fn order_by_depth<'a, I>(pairs: I) -> Vec<usize>
where
    I: IntoIterator<Item = (&'a ContentElement, &'a SdtConfig)>,
{
    let mut scored: Vec<(usize, u8)> = pairs
        .into_iter()
        .enumerate()
        .map(|(i, (element, config))| (i, depth_score(element, config)))
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(i, _)| i).collect()
}
