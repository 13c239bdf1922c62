//! The record type shared by the loader, the detail cache and the UI.
//!
//! `Article` mirrors the upstream JSON shape one-to-one, except that the
//! wire name `userId` is exposed as [`Article::author_id`].
//!
//! ## For contributors
//!
//! If you point the reader at a different API, keep the four fields and add
//! `#[serde(alias = ...)]` attributes rather than new types.  The loader only
//! cares about [`Article::id`].

use serde::{Deserialize, Serialize};

/// A single blog post, immutable once fetched.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Stable unique identifier, used for de-duplication and routing.
    pub id: u64,

    /// Headline shown in the listing and as the detail heading.
    pub title: String,

    /// Full text of the post.
    pub body: String,

    /// Identifier of the author.
    #[serde(rename = "userId")]
    pub author_id: u64,
}

impl Article {
    /// The first line of the body, cut to at most `max_chars` characters.
    ///
    /// Cuts on a `char` boundary so multi-byte text never panics.  An
    /// ellipsis is appended when anything was dropped.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let first_line = self.body.lines().next().unwrap_or_default();
        let mut chars = first_line.chars();
        let cut: String = chars.by_ref().take(max_chars).collect();
        let truncated = chars.next().is_some() || self.body.lines().nth(1).is_some();
        if truncated {
            format!("{cut}…")
        } else {
            cut
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
