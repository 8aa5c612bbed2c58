//! Source excerpts: the lines of the imported file an entry was parsed from.

use crate::model::{Entry, EntryId, Kind};
use dashmap::DashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Excerpts already read, keyed by entry. Shared by every page rendered in
/// one run; a forced read overwrites the stored text.
#[derive(Debug, Default)]
pub struct SourceCache {
    excerpts: DashMap<EntryId, String>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: EntryId) -> Option<String> {
        self.excerpts.get(&id).map(|text| text.value().clone())
    }

    pub fn insert(&self, id: EntryId, text: String) {
        self.excerpts.insert(id, text);
    }

    pub fn len(&self) -> usize {
        self.excerpts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excerpts.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SourceReader {
    root_dir: Option<PathBuf>,
    cache: SourceCache,
}

impl SourceReader {
    pub fn new(root_dir: Option<PathBuf>) -> Self {
        Self {
            root_dir,
            cache: SourceCache::new(),
        }
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Lines `line_num..=end_line_num` of the entry's file, newlines kept.
    /// Empty for hooks, unknown ranges and unreadable files. `force` skips
    /// the cache and refreshes it.
    pub fn read(&self, entry: &Entry, force: bool) -> String {
        if entry.kind == Kind::Hook {
            return String::new();
        }
        if !force {
            if let Some(text) = self.cache.get(entry.id) {
                return text;
            }
        }

        let Some(root) = self.root_dir.as_deref() else {
            return String::new();
        };
        let Some(file) = entry.source_file.as_deref().filter(|f| !f.is_empty()) else {
            return String::new();
        };
        let (start, end) = match (entry.line_num, entry.end_line_num) {
            (Some(start), Some(end)) if start > 0 && end >= start => (start, end),
            _ => return String::new(),
        };

        let Some(path) = contained_path(root, file) else {
            tracing::warn!(file, entry = %entry.name, "source path leaves the root directory");
            return String::new();
        };

        let text = match read_lines(&path, start, end) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file, entry = %entry.name, error = %e, "cannot read source");
                return String::new();
            }
        };
        if !text.is_empty() {
            self.cache.insert(entry.id, text.clone());
        }
        text
    }
}

/// `root/file`, or `None` when `file` is absolute or climbs out with `..`.
fn contained_path(root: &Path, file: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for component in Path::new(file).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(path)
}

/// Invalid UTF-8 (older Latin-1 sources) is replaced, not rejected.
fn read_lines(path: &Path, start: u32, end: u32) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    let skip = (start - 1) as usize;
    let take = (end - start + 1) as usize;
    Ok(content.split_inclusive('\n').skip(skip).take(take).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("inc")).unwrap();
        fs::write(
            dir.path().join("inc/lib.php"),
            "<?php\nfunction a() {\n    return 1;\n}\n\nfunction b() {}\n",
        )
        .unwrap();
        dir
    }

    fn entry(start: Option<u32>, end: Option<u32>) -> Entry {
        let mut e = Entry::new(1, "a", Kind::Function);
        e.source_file = Some("inc/lib.php".into());
        e.line_num = start;
        e.end_line_num = end;
        e
    }

    #[test]
    fn reads_inclusive_range() {
        let dir = fixture();
        let reader = SourceReader::new(Some(dir.path().to_path_buf()));
        assert_eq!(
            reader.read(&entry(Some(2), Some(4)), false),
            "function a() {\n    return 1;\n}\n"
        );
        assert_eq!(reader.read(&entry(Some(1), Some(1)), true), "<?php\n");
    }

    #[test]
    fn last_line_without_newline() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.php"), "a\nb").unwrap();
        let mut e = entry(Some(2), Some(9));
        e.source_file = Some("x.php".into());
        let reader = SourceReader::new(Some(dir.path().to_path_buf()));
        assert_eq!(reader.read(&e, false), "b");
    }

    #[test]
    fn bad_ranges_are_empty() {
        let dir = fixture();
        let reader = SourceReader::new(Some(dir.path().to_path_buf()));
        assert_eq!(reader.read(&entry(Some(0), Some(3)), false), "");
        assert_eq!(reader.read(&entry(Some(4), Some(2)), false), "");
        assert_eq!(reader.read(&entry(None, Some(2)), false), "");
        assert!(reader.cache().is_empty());
    }

    #[test]
    fn missing_root_or_file() {
        assert_eq!(SourceReader::new(None).read(&entry(Some(1), Some(2)), false), "");
        let dir = TempDir::new().unwrap();
        let reader = SourceReader::new(Some(dir.path().to_path_buf()));
        assert_eq!(reader.read(&entry(Some(1), Some(2)), false), "");
    }

    #[test]
    fn paths_outside_root_are_refused() {
        let dir = fixture();
        let root = dir.path().join("inc");
        let reader = SourceReader::new(Some(root.clone()));
        let mut e = entry(Some(1), Some(1));
        e.source_file = Some("../inc/lib.php".into());
        assert_eq!(reader.read(&e, false), "");
        e.source_file = Some(dir.path().join("inc/lib.php").display().to_string());
        assert_eq!(reader.read(&e, false), "");
        e.source_file = Some("./lib.php".into());
        assert_eq!(reader.read(&e, false), "<?php\n");

        assert_eq!(contained_path(&root, "a/b.php"), Some(root.join("a/b.php")));
        assert_eq!(contained_path(&root, "a/../../b.php"), None);
    }

    #[test]
    fn latin1_source_is_read_lossily() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("old.php"), b"<?php\n// caf\xe9\nfunction old() {}\n").unwrap();
        let mut e = entry(Some(2), Some(3));
        e.source_file = Some("old.php".into());
        let reader = SourceReader::new(Some(dir.path().to_path_buf()));
        assert_eq!(reader.read(&e, false), "// caf\u{fffd}\nfunction old() {}\n");
    }

    #[test]
    fn hooks_have_no_source() {
        let dir = fixture();
        let reader = SourceReader::new(Some(dir.path().to_path_buf()));
        let mut e = entry(Some(2), Some(4));
        e.kind = Kind::Hook;
        assert_eq!(reader.read(&e, false), "");
    }

    #[test]
    fn cache_until_forced() {
        let dir = fixture();
        let reader = SourceReader::new(Some(dir.path().to_path_buf()));
        let e = entry(Some(2), Some(2));
        assert_eq!(reader.read(&e, false), "function a() {\n");
        assert_eq!(reader.cache().len(), 1);

        fs::write(dir.path().join("inc/lib.php"), "<?php\nfunction z() {\n").unwrap();
        assert_eq!(reader.read(&e, false), "function a() {\n");
        assert_eq!(reader.read(&e, true), "function z() {\n");
        assert_eq!(reader.read(&e, false), "function z() {\n");
    }
}
