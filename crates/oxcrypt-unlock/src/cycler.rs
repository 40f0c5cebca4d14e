//! Keyboard-driven tab cycling
//!
//! Cycling only moves the tab strip's selection. The coordinator learns
//! about the move through the returned [`SelectionChanged`], exactly as it
//! would for a click on a tab, so nothing here knows about vaults.

use crate::tab_map::{SelectionChanged, TabStrip};

/// Index reached by moving `offset` tabs away from `current`, wrapping
/// around both ends.
///
/// Returns `None` when there is nothing to do: a zero offset, fewer than two
/// tabs, or no current tab.
pub fn wrap_index(current: Option<usize>, count: usize, offset: isize) -> Option<usize> {
    if offset == 0 || count < 2 {
        return None;
    }
    let current = current?;
    let len = isize::try_from(count).ok()?;
    let step = usize::try_from(offset.rem_euclid(len)).ok()?;
    Some((current % count + step) % count)
}

/// Move the strip's selection by `offset` tabs
pub fn advance(tabs: &mut TabStrip, offset: isize) -> Option<SelectionChanged> {
    let index = wrap_index(tabs.current_index(), tabs.len(), offset)?;
    tabs.set_current(index)
}
