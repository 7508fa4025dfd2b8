//! Pinyin dictionary storage.
//!
//! `PinyinDictionary` loads a rime-style text lexicon (`word<TAB>reading`,
//! optional weight column, optional YAML front matter) into a read-only
//! ordered index. Lookups never mutate, so the loaded dictionary is shared
//! across the matching path without locking.

mod entry;

pub use entry::DictEntry;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

/// Unified error type for dictionary loading.
///
/// A load either succeeds completely or fails with the first offending
/// line; partially loaded lexicons are never returned.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("front matter opened with `---` but never closed with `...`")]
    UnterminatedFrontMatter,
}

impl DictError {
    fn parse(line: usize, reason: impl Into<String>) -> Self {
        DictError::Parse {
            line,
            reason: reason.into(),
        }
    }
}

/// Read-only reading → entries index.
#[derive(Debug)]
pub struct PinyinDictionary {
    /// Entries per reading, sorted by descending weight with insertion
    /// order as the stable tie-break.
    index: BTreeMap<String, Vec<DictEntry>>,
    entry_count: usize,
}

impl PinyinDictionary {
    /// Build from pre-parsed pairs. Entries are re-sorted per reading
    /// (weight desc, stable), matching the on-disk loader.
    pub fn from_entries(pairs: impl IntoIterator<Item = (String, DictEntry)>) -> Self {
        let mut index: BTreeMap<String, Vec<DictEntry>> = BTreeMap::new();
        let mut entry_count = 0;
        for (reading, entry) in pairs {
            index.entry(reading).or_default().push(entry);
            entry_count += 1;
        }
        for entries in index.values_mut() {
            entries.sort_by_key(|e| std::cmp::Reverse(e.weight));
        }
        Self { index, entry_count }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictError> {
        let text = fs::read_to_string(path.as_ref())?;
        let dict = Self::from_str_strict(&text)?;
        info!(
            readings = dict.index.len(),
            entries = dict.entry_count,
            path = %path.as_ref().display(),
            "dictionary loaded"
        );
        Ok(dict)
    }

    /// Parse the full dictionary text. Any malformed body line aborts the
    /// load; nothing is skipped silently.
    pub fn from_str_strict(text: &str) -> Result<Self, DictError> {
        let mut pairs: Vec<(String, DictEntry)> = Vec::new();

        let mut lines = text.lines().enumerate().peekable();

        // Optional YAML front matter: `---` ... `...`, contents ignored.
        if let Some((_, first)) = lines.peek() {
            if first.trim_end() == "---" {
                let mut terminated = false;
                for (_, line) in lines.by_ref() {
                    if line.trim_end() == "..." {
                        terminated = true;
                        break;
                    }
                }
                if !terminated {
                    return Err(DictError::UnterminatedFrontMatter);
                }
            }
        }

        for (idx, raw) in lines {
            let line_no = idx + 1;
            let line = raw.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            pairs.push(parse_line(line, line_no)?);
        }

        Ok(Self::from_entries(pairs))
    }

    /// Entries whose reading equals the query, best-weighted first.
    pub fn lookup_exact(&self, reading: &str) -> &[DictEntry] {
        self.index.get(reading).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Readings starting with `prefix` (excluding the exact key itself),
    /// in lexicographic order, up to `limit` readings.
    pub fn lookup_prefix<'a>(
        &'a self,
        prefix: &str,
        limit: usize,
    ) -> Vec<(&'a str, &'a [DictEntry])> {
        if prefix.is_empty() {
            return Vec::new();
        }
        self.index
            .range(prefix.to_string()..)
            .take_while(|(reading, _)| reading.starts_with(prefix))
            .filter(|(reading, _)| reading.as_str() != prefix)
            .take(limit)
            .map(|(reading, entries)| (reading.as_str(), entries.as_slice()))
            .collect()
    }

    /// All readings with their entries, in lexicographic order. The fuzzy
    /// pass scans this.
    pub fn readings(&self) -> impl Iterator<Item = (&str, &[DictEntry])> {
        self.index
            .iter()
            .map(|(reading, entries)| (reading.as_str(), entries.as_slice()))
    }

    pub fn reading_count(&self) -> usize {
        self.index.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Parse one body line: `word<TAB>reading[<TAB>weight]`.
///
/// The reading column is space-separated pinyin syllables; spaces are
/// stripped so `ni hao` and `nihao` index identically.
fn parse_line(line: &str, line_no: usize) -> Result<(String, DictEntry), DictError> {
    let mut fields = line.split('\t');

    let word = fields
        .next()
        .ok_or_else(|| DictError::parse(line_no, "missing word field"))?
        .trim();
    if word.is_empty() {
        return Err(DictError::parse(line_no, "empty word field"));
    }

    let reading_raw = fields
        .next()
        .ok_or_else(|| DictError::parse(line_no, "missing reading field"))?
        .trim();
    let reading: String = reading_raw.split_whitespace().collect();
    if reading.is_empty() {
        return Err(DictError::parse(line_no, "empty reading field"));
    }
    if !reading.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(DictError::parse(
            line_no,
            format!("reading {reading_raw:?} is not lowercase pinyin"),
        ));
    }

    let weight = match fields.next() {
        Some(raw) => {
            let raw = raw.trim();
            raw.parse::<u32>().map_err(|_| {
                DictError::parse(line_no, format!("weight {raw:?} is not a non-negative integer"))
            })?
        }
        None => 0,
    };

    if let Some(extra) = fields.next() {
        return Err(DictError::parse(
            line_no,
            format!("unexpected extra field {:?}", extra.trim()),
        ));
    }

    Ok((reading, DictEntry::new(word, weight)))
}
