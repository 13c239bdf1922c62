//! Scroll-proximity detection.
//!
//! The listing asks for the next page whenever the visible window comes
//! within `distance` rows of the end of the content:
//!
//! ```text
//! top + height >= content - distance
//! ```
//!
//! The check is evaluated after every navigation key, so it fires many
//! times in a row; [`FeedLoader`](crate::feed::FeedLoader) ignores the
//! repeats while a page is in flight.

/// Default trigger distance, in rows.
pub const DEFAULT_TRIGGER_DISTANCE: usize = 1000;

/// The visible slice of a scrollable list, in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row.
    pub top: usize,
    /// Number of visible rows.
    pub height: usize,
    /// Total rows of content.
    pub content: usize,
}

impl Viewport {
    /// Build the viewport for a list of `count` entries of `entry_rows` rows
    /// each, scrolled so that entry `offset` is at the top and entry
    /// `selected` is visible.
    ///
    /// The list widget only settles its offset on the next draw, so the
    /// selection is folded in here to avoid reacting one key press late.
    pub fn for_list(
        offset: usize,
        selected: Option<usize>,
        count: usize,
        entry_rows: usize,
        height: usize,
    ) -> Self {
        let visible_entries = (height / entry_rows.max(1)).max(1);
        let top_entry = match selected {
            Some(sel) if sel >= offset + visible_entries => sel + 1 - visible_entries,
            Some(sel) if sel < offset => sel,
            _ => offset,
        };
        Self {
            top: top_entry * entry_rows,
            height,
            content: count * entry_rows,
        }
    }

    /// `true` when the bottom of the viewport is within `distance` rows of
    /// the end of the content.
    pub fn near_bottom(&self, distance: usize) -> bool {
        self.top + self.height + distance >= self.content
    }
}
