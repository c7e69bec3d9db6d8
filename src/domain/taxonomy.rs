//! Category canonicalization
//!
//! Maps free-text or locale-rendered category labels to the fixed set of
//! canonical keys (e.g. "Elektronik" / "Electronics" / "electronics" ->
//! `electronics`). Pure functions over a static locale table; replaces the
//! resource-id indirection earlier generations used for category labels.
//!
//! Unresolvable text is not an error: callers treat `None` as "this is a
//! free-text custom category".

use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Canonical keys for the default categories.
///
/// The string form (via `Display` / [`CategoryKey::as_key`]) is what gets
/// stored in item records and category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum CategoryKey {
    All,
    Documents,
    Electronics,
    Household,
    Miscellaneous,
    Office,
    Tools,
}

/// Languages the label table covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Locale {
    En,
    De,
    Es,
    Fr,
    It,
}

impl Locale {
    /// Parse a two-letter language code, defaulting to English
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "de" => Locale::De,
            "es" => Locale::Es,
            "fr" => Locale::Fr,
            "it" => Locale::It,
            _ => Locale::En,
        }
    }
}

static KEY_LOOKUP: Lazy<HashMap<&'static str, CategoryKey>> = Lazy::new(|| {
    CategoryKey::iter().map(|key| (key.as_key(), key)).collect()
});

impl CategoryKey {
    /// The stable, locale-independent key string
    pub fn as_key(&self) -> &'static str {
        match self {
            CategoryKey::All => "all",
            CategoryKey::Documents => "documents",
            CategoryKey::Electronics => "electronics",
            CategoryKey::Household => "household",
            CategoryKey::Miscellaneous => "miscellaneous",
            CategoryKey::Office => "office",
            CategoryKey::Tools => "tools",
        }
    }

    /// Exact (already-normalized) key lookup
    pub fn from_key(key: &str) -> Option<Self> {
        KEY_LOOKUP.get(key).copied()
    }

    /// Localized display string for this key
    pub fn label(&self, locale: Locale) -> &'static str {
        use CategoryKey::*;
        use Locale::*;
        match (self, locale) {
            (All, En) => "All",
            (All, De) => "Alle",
            (All, Es) => "Todos",
            (All, Fr) => "Tous",
            (All, It) => "Tutti",

            (Documents, En) => "Documents",
            (Documents, De) => "Dokumente",
            (Documents, Es) => "Documentos",
            (Documents, Fr) => "Documents",
            (Documents, It) => "Documenti",

            (Electronics, En) => "Electronics",
            (Electronics, De) => "Elektronik",
            (Electronics, Es) => "Electrónica",
            (Electronics, Fr) => "Électronique",
            (Electronics, It) => "Elettronica",

            (Household, En) => "Household",
            (Household, De) => "Haushalt",
            (Household, Es) => "Hogar",
            (Household, Fr) => "Ménage",
            (Household, It) => "Casa",

            (Miscellaneous, En) => "Miscellaneous",
            (Miscellaneous, De) => "Sonstiges",
            (Miscellaneous, Es) => "Varios",
            (Miscellaneous, Fr) => "Divers",
            (Miscellaneous, It) => "Varie",

            (Office, En) => "Office",
            (Office, De) => "Büro",
            (Office, Es) => "Oficina",
            (Office, Fr) => "Bureau",
            (Office, It) => "Ufficio",

            (Tools, En) => "Tools",
            (Tools, De) => "Werkzeuge",
            (Tools, Es) => "Herramientas",
            (Tools, Fr) => "Outils",
            (Tools, It) => "Attrezzi",
        }
    }

    /// Legacy localization-resource id for this key.
    ///
    /// Earlier generations stored an opaque resource id alongside category
    /// names; remote documents may still carry them. The values themselves
    /// are never interpreted, only bridged.
    pub fn legacy_resource_id(&self) -> i32 {
        match self {
            CategoryKey::All => 1,
            CategoryKey::Documents => 2,
            CategoryKey::Electronics => 3,
            CategoryKey::Household => 4,
            CategoryKey::Miscellaneous => 5,
            CategoryKey::Office => 6,
            CategoryKey::Tools => 7,
        }
    }

    /// Inverse of [`CategoryKey::legacy_resource_id`]
    pub fn from_legacy_resource_id(id: i32) -> Option<Self> {
        CategoryKey::iter().find(|key| key.legacy_resource_id() == id)
    }
}

/// Resolve free-text or a localized label to a canonical key.
///
/// Trims and lowercases `text`; a canonical key always resolves to itself
/// regardless of locale. Otherwise every key's label in every supported
/// locale is compared case-insensitively and the first match wins.
pub fn resolve_key_from_text(text: &str) -> Option<CategoryKey> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some(key) = CategoryKey::from_key(&needle) {
        return Some(key);
    }

    for locale in Locale::iter() {
        for key in CategoryKey::iter() {
            if key.label(locale).to_lowercase() == needle {
                return Some(key);
            }
        }
    }
    None
}

/// Localized label for a key string, `None` when the name is not one of the
/// fixed defaults
pub fn label_for_key(key: &str, locale: Locale) -> Option<&'static str> {
    CategoryKey::from_key(key.trim().to_lowercase().as_str()).map(|k| k.label(locale))
}
