//! Font lookup for style resolution.
//!
//! [`FontCatalog`] answers "is this family installed?" for
//! [`Appearance::resolve`](cardfield_core::domain::style::Appearance::resolve).
//! Family names compare case-insensitively, as platform font managers do.

use std::collections::HashSet;

use cardfield_core::domain::style::FontResolver;

/// Families bundled with every supported platform.
const BUNDLED_FAMILIES: &[&str] = &[
    "Helvetica",
    "Helvetica Neue",
    "Arial",
    "Courier",
    "Courier New",
    "Menlo",
    "Roboto",
    "Roboto Mono",
    "Georgia",
    "Times New Roman",
];

/// A fixed set of installed font families.
#[derive(Debug, Clone, Default)]
pub struct FontCatalog {
    families: HashSet<String>,
}

impl FontCatalog {
    /// A catalog containing the bundled families.
    pub fn bundled() -> Self {
        Self::with_families(BUNDLED_FAMILIES.iter().copied())
    }

    pub fn with_families<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            families: families.into_iter().map(|f| f.as_ref().to_lowercase()).collect(),
        }
    }

    /// Registers an additional family (e.g. a font shipped with the app).
    pub fn register(&mut self, family: &str) {
        self.families.insert(family.to_lowercase());
    }
}

impl FontResolver for FontCatalog {
    fn has_family(&self, family: &str) -> bool {
        self.families.contains(&family.to_lowercase())
    }
}
