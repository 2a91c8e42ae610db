//! Line-oriented `.env` document editing.
//!
//! The configuration file is plain UTF-8 text, one `KEY=VALUE` setting per
//! physical line. Comments and blank lines are preserved verbatim and in
//! place; the value is everything after the first `=` to end of line, with
//! no quoting or escaping rules.
//!
//! Upserts replace the first existing `KEY=...` line in place, or append a
//! new line at the end. An explicit line scan is used rather than a regex so
//! the edge cases (duplicate stale keys, missing trailing newline) stay
//! visible and testable.

use std::path::{Path, PathBuf};

use crate::error::EnvFileError;

/// Suffix appended to the env file name for the backup sibling
/// (`.env` -> `.env.backup`). The backup is overwritten on each run,
/// never versioned, and never read back by the tool.
pub const BACKUP_SUFFIX: &str = ".backup";

/// An in-memory environment document.
///
/// Holds the exact file text; all edits are line-surgical so that every
/// line not targeted by an upsert survives byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDocument {
    text: String,
}

impl EnvDocument {
    /// Parse a document from raw file content.
    pub fn parse(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The document's current text content.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Look up the value assigned to `key`, if any.
    ///
    /// Matching is anchored per physical line: the line must start with the
    /// key followed by a literal `=`. A key appearing as a substring of
    /// another line (e.g. `MY_FAST_LLM=` when looking up `FAST_LLM`) does
    /// not match. When duplicate lines assign the same key, the first wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.text
            .lines()
            .find_map(|line| line.strip_prefix(key)?.strip_prefix('='))
    }

    /// Update the first `key=...` line in place, or append `key=value` at
    /// the end when the key is absent.
    ///
    /// Appended lines get a separating newline when the existing content is
    /// non-empty and lacks one, and always end with a trailing newline.
    /// Duplicate stale lines after the first match are left untouched.
    pub fn upsert(&mut self, key: &str, value: &str) {
        let mut offset = 0;
        let mut target = None;
        for line in self.text.split_inclusive('\n') {
            let body = line.strip_suffix('\n').unwrap_or(line);
            if body.strip_prefix(key).and_then(|r| r.strip_prefix('=')).is_some() {
                target = Some((offset, line.len(), line.ends_with('\n')));
                break;
            }
            offset += line.len();
        }

        if let Some((start, len, has_newline)) = target {
            let terminator = if has_newline { "\n" } else { "" };
            let replacement = format!("{key}={value}{terminator}");
            self.text.replace_range(start..start + len, &replacement);
            return;
        }

        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(key);
        self.text.push('=');
        self.text.push_str(value);
        self.text.push('\n');
    }

    /// Apply a whole set of entries in order.
    pub fn upsert_all<'a>(&mut self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (key, value) in entries {
            self.upsert(key, value);
        }
    }

    /// Return the subsequence of `required` keys that have no usable value:
    /// either no `KEY=...` line at all, or a value that is empty or
    /// whitespace-only. Order follows the input list.
    pub fn missing_keys(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|key| {
                self.get(key)
                    .map(|value| value.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|key| key.to_string())
            .collect()
    }
}

/// A path-bound environment file.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional `.env` in the current working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(".env")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Sibling backup path: the file name with [`BACKUP_SUFFIX`] appended.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    /// Load the document. A missing file reads as an empty document.
    pub fn load(&self) -> Result<EnvDocument, EnvFileError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(EnvDocument::parse(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EnvDocument::default()),
            Err(source) => Err(EnvFileError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Write the document back, fully overwriting the file.
    pub fn save(&self, doc: &EnvDocument) -> Result<(), EnvFileError> {
        std::fs::write(&self.path, doc.as_str()).map_err(|source| EnvFileError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Credential check against the file on disk.
    ///
    /// A file that does not exist yet yields an empty list: there is no
    /// content to inspect, which is distinct from a key that is present
    /// but blank. Callers that care about absence itself use [`exists`].
    ///
    /// [`exists`]: EnvFile::exists
    pub fn missing_keys(&self, required: &[&str]) -> Result<Vec<String>, EnvFileError> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        Ok(self.load()?.missing_keys(required))
    }

    /// Copy the current file bytes to the backup sibling, overwriting any
    /// prior backup. Returns the backup path, or `None` (not an error) when
    /// the source file does not exist yet.
    pub fn backup(&self) -> Result<Option<PathBuf>, EnvFileError> {
        if !self.exists() {
            return Ok(None);
        }
        let backup = self.backup_path();
        std::fs::copy(&self.path, &backup).map_err(|source| EnvFileError::Backup {
            path: self.path.clone(),
            backup: backup.clone(),
            source,
        })?;
        Ok(Some(backup))
    }

    /// Backup-then-upsert: snapshot the current content, apply every entry
    /// in order, and write the result back.
    ///
    /// The backup runs strictly before the mutation on every call that
    /// proceeds to write.
    pub fn apply_entries<'a>(
        &self,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<EnvDocument, EnvFileError> {
        self.backup()?;
        let mut doc = self.load()?;
        doc.upsert_all(entries);
        self.save(&doc)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn upsert_replaces_existing_line_in_place() {
        let mut doc = EnvDocument::parse("A=1\nFAST_LLM=old:model\nB=2\n");
        doc.upsert("FAST_LLM", "openrouter:anthropic/claude-3.5-haiku");
        assert_eq!(
            doc.as_str(),
            "A=1\nFAST_LLM=openrouter:anthropic/claude-3.5-haiku\nB=2\n"
        );
    }

    #[test]
    fn upsert_appends_when_key_absent() {
        let mut doc = EnvDocument::parse("A=1\n");
        doc.upsert("B", "2");
        assert_eq!(doc.as_str(), "A=1\nB=2\n");
    }

    #[test]
    fn upsert_adds_separating_newline_when_content_lacks_one() {
        let mut doc = EnvDocument::parse("A=1");
        doc.upsert("B", "2");
        assert_eq!(doc.as_str(), "A=1\nB=2\n");
    }

    #[test]
    fn upsert_into_empty_document_has_no_leading_blank_line() {
        let mut doc = EnvDocument::default();
        doc.upsert("FAST_LLM", "openai:gpt-4o-mini");
        assert_eq!(doc.as_str(), "FAST_LLM=openai:gpt-4o-mini\n");
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut once = EnvDocument::parse("# comment\nFAST_LLM=x\n");
        once.upsert("FAST_LLM", "ollama:llama3");
        once.upsert("SMART_LLM", "ollama:llama3");

        let mut twice = once.clone();
        twice.upsert("FAST_LLM", "ollama:llama3");
        twice.upsert("SMART_LLM", "ollama:llama3");

        assert_eq!(once, twice);
    }

    #[test]
    fn upsert_preserves_unrelated_lines_verbatim() {
        let original = "# GPT Researcher settings\n\nTAVILY_API_KEY=tvly-123\n  indented weirdness\nFAST_LLM=old\n";
        let mut doc = EnvDocument::parse(original);
        doc.upsert("FAST_LLM", "new");
        assert_eq!(
            doc.as_str(),
            "# GPT Researcher settings\n\nTAVILY_API_KEY=tvly-123\n  indented weirdness\nFAST_LLM=new\n"
        );
    }

    #[test]
    fn upsert_does_not_match_key_as_substring() {
        let mut doc = EnvDocument::parse("MY_FAST_LLM=keep\n");
        doc.upsert("FAST_LLM", "set");
        assert_eq!(doc.as_str(), "MY_FAST_LLM=keep\nFAST_LLM=set\n");
    }

    #[test]
    fn upsert_replaces_only_first_duplicate() {
        // Malformed input with a stale duplicate: only the first line is
        // rewritten, the stale one stays as-is.
        let mut doc = EnvDocument::parse("K=a\nK=b\n");
        doc.upsert("K", "c");
        assert_eq!(doc.as_str(), "K=c\nK=b\n");
    }

    #[test]
    fn upsert_replaces_last_line_without_trailing_newline() {
        let mut doc = EnvDocument::parse("A=1\nK=old");
        doc.upsert("K", "new");
        assert_eq!(doc.as_str(), "A=1\nK=new");
    }

    #[test]
    fn get_returns_everything_after_first_equals() {
        let doc = EnvDocument::parse("URL=http://localhost:11434?a=b\n");
        assert_eq!(doc.get("URL"), Some("http://localhost:11434?a=b"));
    }

    #[test]
    fn missing_keys_reports_empty_and_whitespace_values() {
        let doc = EnvDocument::parse(
            "OPENROUTER_API_KEY=\nOPENAI_API_KEY=   \nANTHROPIC_API_KEY=abc123\n",
        );
        assert_eq!(
            doc.missing_keys(&[
                "OPENROUTER_API_KEY",
                "OPENAI_API_KEY",
                "ANTHROPIC_API_KEY",
                "TAVILY_API_KEY",
            ]),
            vec![
                "OPENROUTER_API_KEY".to_string(),
                "OPENAI_API_KEY".to_string(),
                "TAVILY_API_KEY".to_string(),
            ]
        );
    }

    #[test]
    fn missing_keys_preserves_required_order() {
        let doc = EnvDocument::parse("B=\nA=\n");
        assert_eq!(doc.missing_keys(&["A", "B"]), vec!["A", "B"]);
    }

    #[test]
    fn load_missing_file_is_empty_document() {
        let dir = tempdir().unwrap();
        let file = EnvFile::new(dir.path().join(".env"));
        let doc = file.load().unwrap();
        assert_eq!(doc.as_str(), "");
        assert!(!file.exists());
    }

    #[test]
    fn missing_file_yields_no_missing_keys() {
        // Absence of the file means "no information", not "all keys
        // missing"; a present-but-blank key still counts as missing.
        let dir = tempdir().unwrap();
        let file = EnvFile::new(dir.path().join(".env"));
        assert_eq!(
            file.missing_keys(&["OPENROUTER_API_KEY"]).unwrap(),
            Vec::<String>::new()
        );

        std::fs::write(file.path(), "OPENROUTER_API_KEY=\n").unwrap();
        assert_eq!(
            file.missing_keys(&["OPENROUTER_API_KEY"]).unwrap(),
            vec!["OPENROUTER_API_KEY"]
        );
    }

    #[test]
    fn backup_is_noop_when_source_missing() {
        let dir = tempdir().unwrap();
        let file = EnvFile::new(dir.path().join(".env"));
        assert_eq!(file.backup().unwrap(), None);
        assert!(!file.backup_path().exists());
    }

    #[test]
    fn backup_then_edit_keeps_verbatim_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "A=1\n").unwrap();

        let file = EnvFile::new(&path);
        file.apply_entries([("B", "2")]).unwrap();

        assert_eq!(std::fs::read_to_string(file.backup_path()).unwrap(), "A=1\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\nB=2\n");
    }

    #[test]
    fn backup_overwrites_prior_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "A=1\n").unwrap();
        let file = EnvFile::new(&path);

        file.backup().unwrap();
        std::fs::write(&path, "A=2\n").unwrap();
        file.backup().unwrap();

        assert_eq!(
            std::fs::read_to_string(file.backup_path()).unwrap(),
            "A=2\n"
        );
    }

    #[test]
    fn backup_path_is_sibling_with_suffix() {
        let file = EnvFile::new("/some/dir/.env");
        assert_eq!(file.backup_path(), PathBuf::from("/some/dir/.env.backup"));
    }

    #[test]
    fn apply_entries_creates_file_when_absent() {
        let dir = tempdir().unwrap();
        let file = EnvFile::new(dir.path().join(".env"));
        let doc = file
            .apply_entries([("FAST_LLM", "openai:gpt-4o-mini"), ("SMART_LLM", "openai:gpt-4o")])
            .unwrap();

        assert_eq!(doc.as_str(), "FAST_LLM=openai:gpt-4o-mini\nSMART_LLM=openai:gpt-4o\n");
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), doc.as_str());
        // No pre-existing content, so nothing to back up.
        assert!(!file.backup_path().exists());
    }
}
