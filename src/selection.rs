//! The set of images an operation will run over.
//!
//! Identity is the record's source path. The set holds no duplicates and keeps
//! insertion order, which is also the order batches process items in. It only
//! changes through [`Selection::toggle`] and [`Selection::remove`].

use crate::record::ImageRecord;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: Vec<PathBuf>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select every record, in order.
    pub fn all(records: &[ImageRecord]) -> Self {
        let mut selection = Self::new();
        for record in records {
            if !selection.contains(record.source_path()) {
                selection.paths.push(record.source_path().to_path_buf());
            }
        }
        selection
    }

    /// Add `path` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, path: &Path) -> bool {
        if self.remove(path) {
            false
        } else {
            self.paths.push(path.to_path_buf());
            true
        }
    }

    /// Returns `true` if `path` was selected.
    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        self.paths.len() != before
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// The selected records, in selection order.
    ///
    /// Paths with no matching record (e.g. removed since selection) are skipped.
    pub fn resolve<'a>(&self, records: &'a [ImageRecord]) -> Vec<&'a ImageRecord> {
        self.paths
            .iter()
            .filter_map(|p| records.iter().find(|r| r.source_path() == p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::SourceFormat;
    use crate::test_helpers::gradient_buffer;

    fn record(path: &str) -> ImageRecord {
        ImageRecord::new(path, gradient_buffer(1, 1), SourceFormat::Png, 0)
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = Selection::new();
        assert!(sel.toggle(Path::new("a.png")));
        assert!(sel.contains(Path::new("a.png")));
        assert!(!sel.toggle(Path::new("a.png")));
        assert!(sel.is_empty());
    }

    #[test]
    fn keeps_insertion_order_without_duplicates() {
        let mut sel = Selection::new();
        sel.toggle(Path::new("c.png"));
        sel.toggle(Path::new("a.png"));
        sel.toggle(Path::new("b.png"));
        sel.toggle(Path::new("a.png"));
        sel.toggle(Path::new("a.png"));
        let order: Vec<_> = sel.iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(order, vec!["c.png", "b.png", "a.png"]);
        assert_eq!(sel.len(), 3);
    }

    #[test]
    fn remove_reports_presence() {
        let mut sel = Selection::new();
        sel.toggle(Path::new("a.png"));
        assert!(sel.remove(Path::new("a.png")));
        assert!(!sel.remove(Path::new("a.png")));
    }

    #[test]
    fn resolve_follows_selection_order_and_skips_missing() {
        let records = vec![record("a.png"), record("b.png"), record("c.png")];
        let mut sel = Selection::new();
        sel.toggle(Path::new("c.png"));
        sel.toggle(Path::new("gone.png"));
        sel.toggle(Path::new("a.png"));

        let names: Vec<_> = sel.resolve(&records).iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["c.png", "a.png"]);
    }

    #[test]
    fn all_dedupes_by_path() {
        let records = vec![record("a.png"), record("a.png"), record("b.png")];
        assert_eq!(Selection::all(&records).len(), 2);
    }
}
