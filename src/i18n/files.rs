//! Locale file readers and directory ingestion

use std::collections::HashMap;
use std::path::Path;

use walkdir::WalkDir;

use crate::application::errors::LocaleError;

/// Key → text for one locale
pub type LocaleTexts = HashMap<String, String>;

/// Locale code → texts, as read from disk
pub type LocaleTable = HashMap<String, LocaleTexts>;

/// Read a JSON object of texts
pub fn read_json_file(path: &Path) -> Result<LocaleTexts, LocaleError> {
    let content = read_text_file(path)?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| LocaleError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let serde_json::Value::Object(entries) = value else {
        return Err(LocaleError::Parse {
            path: path.to_path_buf(),
            reason: "expected an object at the top level".to_string(),
        });
    };

    let mut texts = LocaleTexts::new();
    for (key, value) in entries {
        let text = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => {
                tracing::warn!(path = %path.display(), key = %key, "Skipping non-scalar locale value");
                continue;
            }
        };
        texts.insert(key, text);
    }

    tracing::debug!(path = %path.display(), entries = texts.len(), "Read JSON locale file");
    Ok(texts)
}

/// Read a YAML mapping of texts
pub fn read_yaml_file(path: &Path) -> Result<LocaleTexts, LocaleError> {
    let content = read_text_file(path)?;
    let entries: HashMap<String, serde_yaml::Value> =
        serde_yaml::from_str(&content).map_err(|e| LocaleError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut texts = LocaleTexts::new();
    for (key, value) in entries {
        let text = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            _ => {
                tracing::warn!(path = %path.display(), key = %key, "Skipping non-scalar locale value");
                continue;
            }
        };
        texts.insert(key, text);
    }

    tracing::debug!(path = %path.display(), entries = texts.len(), "Read YAML locale file");
    Ok(texts)
}

/// Read a whole text file
pub fn read_text_file(path: &Path) -> Result<String, LocaleError> {
    std::fs::read_to_string(path).map_err(|e| LocaleError::Read {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Walk `dir` and collect texts per locale.
///
/// A file's locale is the name of the directory it sits in. Structured files
/// (`.json`, `.yaml`, `.yml`) contribute their entries with keys as written;
/// a `.txt` file becomes one entry keyed by its upper-cased stem. Files are
/// visited sorted by name and later keys overwrite earlier ones.
pub fn ingest_directory(dir: &Path) -> Result<LocaleTable, LocaleError> {
    let mut locales = LocaleTable::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| LocaleError::Walk(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();
        if file_name.starts_with('.') {
            continue;
        }

        let Some(locale) = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match extension {
            "json" => {
                let texts = read_json_file(path)?;
                locales.entry(locale).or_default().extend(texts);
            }
            "yaml" | "yml" => {
                let texts = read_yaml_file(path)?;
                locales.entry(locale).or_default().extend(texts);
            }
            "txt" => {
                let key = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_uppercase())
                    .unwrap_or_default();
                let text = read_text_file(path)?;
                tracing::debug!(path = %path.display(), key = %key, "Read text locale file");
                locales.entry(locale).or_default().insert(key, text);
            }
            _ => {
                tracing::debug!(path = %path.display(), "Ignoring unsupported locale file");
            }
        }
    }

    tracing::info!(dir = %dir.display(), locales = locales.len(), "Locales ingested");
    Ok(locales)
}
