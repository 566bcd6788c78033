//! Text resource store - Per-locale texts with extension namespaces

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

use super::files::{self, LocaleTable};
use crate::application::errors::LocaleError;

/// Texts of one locale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleEntries {
    /// Host texts, merged without a namespace
    pub texts: HashMap<String, String>,
    /// Extension texts, keyed by namespace
    pub namespaces: HashMap<String, HashMap<String, String>>,
}

/// Translation store shared by the host and its extensions
#[derive(Debug, Clone, Default)]
pub struct TextResourceStore {
    current_locale: String,
    table: HashMap<String, LocaleEntries>,
}

impl TextResourceStore {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            current_locale: locale.into(),
            table: HashMap::new(),
        }
    }

    pub fn current_locale(&self) -> &str {
        &self.current_locale
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.current_locale = locale.into();
    }

    /// Known locale codes, sorted
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.table.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    pub fn entries(&self, locale: &str) -> Option<&LocaleEntries> {
        self.table.get(locale)
    }

    /// Ingest the host's own locale directory, without a namespace
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize, LocaleError> {
        let locales = files::ingest_directory(dir)?;
        let count = locales.len();
        self.merge(locales, None);
        Ok(count)
    }

    /// Merge `locales` into the store without dropping existing keys.
    ///
    /// With a namespace the keys land under it and nothing outside that
    /// namespace is touched. Keys and namespaces are stored upper-cased.
    pub fn merge(&mut self, locales: LocaleTable, namespace: Option<&str>) {
        let namespace = namespace.map(str::to_uppercase);

        for (locale, texts) in locales {
            let entries = self.table.entry(locale).or_default();
            let target = match &namespace {
                Some(ns) => entries.namespaces.entry(ns.clone()).or_default(),
                None => &mut entries.texts,
            };
            target.extend(texts.into_iter().map(|(k, v)| (k.to_uppercase(), v)));
        }
    }

    /// Drop a namespace from every locale, returning whether anything was removed
    pub fn remove_namespace(&mut self, namespace: &str) -> bool {
        let namespace = namespace.to_uppercase();
        let mut removed = false;
        for entries in self.table.values_mut() {
            removed |= entries.namespaces.remove(&namespace).is_some();
        }
        removed
    }

    /// Look up `KEY` or `NAMESPACE:KEY` in the current locale, without logging
    pub fn lookup(&self, query: &str) -> Option<&str> {
        let (namespace, key) = split_query(query);
        let entries = self.table.get(&self.current_locale)?;
        let texts = match namespace {
            Some(ns) => entries.namespaces.get(&ns.to_uppercase())?,
            None => &entries.texts,
        };
        texts.get(&key.to_uppercase()).map(String::as_str)
    }

    /// Resolve a text, returning the upper-cased key when it is missing
    pub fn resolve(&self, query: &str) -> String {
        self.resolve_with(query, std::iter::empty::<(&str, &str)>())
    }

    /// Resolve a text and replace each `%name%` with its substitution.
    ///
    /// Placeholders without a substitution are left as they are.
    pub fn resolve_with<I, K, V>(&self, query: &str, substitutions: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        let (_, key) = split_query(query);
        if key.chars().any(char::is_lowercase) {
            tracing::warn!(key = %key, "Text keys should be upper case");
        }

        let Some(raw) = self.lookup(query) else {
            tracing::error!(
                locale = %self.current_locale,
                query = %query,
                "Text key does not exist"
            );
            return key.to_uppercase();
        };

        let substitutions: HashMap<String, String> = substitutions
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.to_string()))
            .collect();
        if substitutions.is_empty() {
            return raw.to_string();
        }

        substitute(raw, &substitutions)
    }

    /// View that prefixes every query with `namespace`
    pub fn scoped<'a>(&'a self, namespace: &str) -> ScopedTexts<'a> {
        ScopedTexts {
            store: self,
            namespace: namespace.to_string(),
        }
    }
}

/// Texts of one extension
pub struct ScopedTexts<'a> {
    store: &'a TextResourceStore,
    namespace: String,
}

impl ScopedTexts<'_> {
    pub fn resolve(&self, key: &str) -> String {
        self.store.resolve(&format!("{}:{}", self.namespace, key))
    }

    pub fn resolve_with<I, K, V>(&self, key: &str, substitutions: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        self.store
            .resolve_with(&format!("{}:{}", self.namespace, key), substitutions)
    }
}

/// Replace `%name%` for every supplied name in one left-to-right pass.
///
/// Substituted values are never scanned again. A `%` that does not open a
/// supplied name is kept as it is.
fn substitute(raw: &str, substitutions: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let placeholder = after
            .find('%')
            .and_then(|end| substitutions.get(&after[..end]).map(|value| (end, value)));
        match placeholder {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn split_query(query: &str) -> (Option<&str>, &str) {
    match query.split_once(':') {
        Some((namespace, key)) => (Some(namespace), key),
        None => (None, query),
    }
}
