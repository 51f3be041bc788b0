//! In-memory scene host for `overflow-audit`.
//!
//! [`SceneDocument`] implements [`overflow_audit::TextHost`] over an arena of
//! frames, shapes, and text nodes with a deterministic glyph-advance layout.
//! [`SceneFontLibrary`] implements [`overflow_audit::FontLoader`] and records
//! every load call.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod document;
mod font_library;
mod layout;

pub use document::{SceneDocument, SceneStyle};
pub use font_library::{SceneFontLibrary, DEFAULT_ADVANCE};
pub use layout::{advance, is_wide, LINE_HEIGHT_FACTOR};
