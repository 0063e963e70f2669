//! Surface-form loading and lookup.
//!
//! The CSV source has a header row with (at least) the columns `uri` and
//! `form`, in any order. [`SurfaceFormTable`] keeps the rows as read, which is
//! what the vector index embeds. [`SurfaceFormIndex`] groups them by
//! normalized text for the exact matcher.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use ontolink_core::{Error, Result, SurfaceForm};

/// Normalize a surface form for lookup: trim and lowercase.
pub fn normalize_form(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Surface-form rows in file order.
#[derive(Debug, Clone, Default)]
pub struct SurfaceFormTable {
    rows: Vec<SurfaceForm>,
}

impl SurfaceFormTable {
    pub fn new(rows: Vec<SurfaceForm>) -> Self {
        Self { rows }
    }

    /// Read rows from CSV data.
    ///
    /// Rows whose form or uri is blank are skipped. Input without a header row
    /// is an empty table; a header lacking `uri` or `form` is a configuration
    /// error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Self::default());
        }

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    Error::Config(format!("Surface-form CSV is missing the '{}' column", name))
                })
        };
        let uri_col = column("uri")?;
        let form_col = column("form")?;

        let mut rows = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record?;
            let form = record.get(form_col).unwrap_or_default();
            let uri = record.get(uri_col).unwrap_or_default().trim();

            if form.trim().is_empty() {
                debug!(row = line + 1, uri, "Skipping row with empty form");
                continue;
            }
            if uri.is_empty() {
                debug!(row = line + 1, form, "Skipping row with empty uri");
                continue;
            }
            rows.push(SurfaceForm::new(form, uri));
        }

        Ok(Self { rows })
    }

    /// Read rows from a CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::NotFound(format!("Surface-form CSV {}", path.display()))
            }
            _ => Error::Io(e),
        })?;
        let table = Self::from_reader(file)?;
        info!(path = %path.display(), result_count = table.len(), "Loaded surface forms");
        Ok(table)
    }

    pub fn rows(&self) -> &[SurfaceForm] {
        &self.rows
    }

    /// Raw form texts in file order.
    pub fn forms(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.text.clone()).collect()
    }

    /// URIs in file order, parallel to [`Self::forms`].
    pub fn uris(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.uri.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Normalized form → ordered, de-duplicated URI list.
///
/// Iteration follows the order in which each normalized form first appeared.
#[derive(Debug, Clone, Default)]
pub struct SurfaceFormIndex {
    keys: Vec<String>,
    uris: HashMap<String, Vec<String>>,
}

impl SurfaceFormIndex {
    pub fn from_table(table: &SurfaceFormTable) -> Self {
        let mut index = Self::default();
        for row in table.rows() {
            index.insert(&row.text, &row.uri);
        }
        debug!(
            forms = index.len(),
            rows = table.len(),
            "Built surface-form index"
        );
        index
    }

    /// Load and index a CSV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_table(&SurfaceFormTable::from_path(path)?))
    }

    /// Add one `(form, uri)` pair. Blank forms are ignored.
    pub fn insert(&mut self, form: &str, uri: &str) {
        let key = normalize_form(form);
        if key.is_empty() {
            return;
        }
        let uri = uri.trim();
        match self.uris.get_mut(&key) {
            Some(list) => {
                if !list.iter().any(|u| u == uri) {
                    list.push(uri.to_string());
                }
            }
            None => {
                self.keys.push(key.clone());
                self.uris.insert(key, vec![uri.to_string()]);
            }
        }
    }

    /// URIs for a form; the query is normalized first.
    pub fn get(&self, form: &str) -> Option<&[String]> {
        self.uris.get(&normalize_form(form)).map(Vec::as_slice)
    }

    /// `(normalized_form, uris)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.keys
            .iter()
            .filter_map(|k| self.uris.get(k).map(|u| (k.as_str(), u.as_slice())))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
