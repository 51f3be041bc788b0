use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use overflow_audit::{FontLoader, FontName, HostError};

/// Advance of a narrow glyph as a fraction of font size.
pub const DEFAULT_ADVANCE: f32 = 0.6;

#[derive(Debug, Default)]
struct LibraryState {
    installed: BTreeMap<FontName, f32>,
    loaded: BTreeSet<FontName>,
    calls: Vec<FontName>,
}

/// Shared registry of installable fonts.
///
/// Clones share state, so a document and the loader handed to an engine see
/// the same loaded set.
#[derive(Clone, Debug, Default)]
pub struct SceneFontLibrary {
    state: Rc<RefCell<LibraryState>>,
}

impl SceneFontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with `fonts` installed at the default advance.
    pub fn with_fonts<I>(fonts: I) -> Self
    where
        I: IntoIterator<Item = FontName>,
    {
        let library = Self::new();
        for font in fonts {
            library.install(font);
        }
        library
    }

    pub fn install(&self, font: FontName) {
        self.install_with_advance(font, DEFAULT_ADVANCE);
    }

    /// Install a face whose narrow glyphs advance `advance * size`.
    pub fn install_with_advance(&self, font: FontName, advance: f32) {
        self.state.borrow_mut().installed.insert(font, advance);
    }

    pub fn is_installed(&self, font: &FontName) -> bool {
        self.state.borrow().installed.contains_key(font)
    }

    pub fn is_loaded(&self, font: &FontName) -> bool {
        self.state.borrow().loaded.contains(font)
    }

    /// Narrow-glyph advance factor; uninstalled faces use the default.
    pub fn advance(&self, font: &FontName) -> f32 {
        self.state
            .borrow()
            .installed
            .get(font)
            .copied()
            .unwrap_or(DEFAULT_ADVANCE)
    }

    /// Number of load calls made for `font`.
    pub fn load_calls(&self, font: &FontName) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| *call == font)
            .count()
    }

    pub fn total_load_calls(&self) -> usize {
        self.state.borrow().calls.len()
    }
}

impl FontLoader for SceneFontLibrary {
    async fn load_font(&self, font: &FontName) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(font.clone());
        if !state.installed.contains_key(font) {
            return Err(HostError::new(format!("font {} is not installed", font)));
        }
        state.loaded.insert(font.clone());
        Ok(())
    }
}
