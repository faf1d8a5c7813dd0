//! Repository crawler
//!
//! The crawler walks a repository root and discovers content items. A
//! directory is an item iff it directly contains the marker file
//! (`notes.md` by default, matched case-insensitively). An item's owned
//! files are the non-recursive contents of its reserved `files/`
//! subdirectory; its child items are found by recursing into its
//! subdirectories.
//!
//! Directories without a marker are *transparent*: the crawler keeps
//! descending and lifts any items found below up as siblings at the current
//! level, so `docs/guide/notes.md` under a marker-less `docs/` produces an
//! item at `docs/guide`, not at `docs`.
//!
//! Directory entries are enumerated in byte order of their file names, so a
//! directory holding more than one marker-qualifying name (say `Notes.md`
//! and `notes.md`) deterministically honors the lexicographically smallest
//! one.
//!
//! An unreadable directory yields an empty item list at that level and the
//! crawl continues elsewhere; only an unusable repository root aborts the
//! crawl as a whole.

use crate::error::{NotemapError, Result};
use crate::item::RepositoryItem;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Name of the reserved subdirectory holding an item's owned files
pub const FILES_DIRECTORY_NAME: &str = "files";

/// Default marker file that turns a directory into an item
pub const DEFAULT_MARKER_FILE: &str = "notes.md";

/// Walks a repository directory tree and discovers content items
///
/// # Examples
///
/// ```rust,no_run
/// use notemap::crawler::Crawler;
///
/// # fn main() -> Result<(), notemap::NotemapError> {
/// let crawler = Crawler::new("./repository");
/// let items = crawler.crawl()?;
/// println!("Discovered {} top-level items", items.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Crawler {
    root_path: PathBuf,
    marker_file: String,
}

impl Crawler {
    /// Create a crawler for a repository root with the default marker file
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Crawler {
            root_path: root_path.into(),
            marker_file: DEFAULT_MARKER_FILE.to_string(),
        }
    }

    /// Use a different marker file name (matched case-insensitively)
    pub fn with_marker_file(mut self, name: impl Into<String>) -> Self {
        self.marker_file = name.into();
        self
    }

    /// The repository root this crawler operates on
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Crawl the repository and return the discovered items
    ///
    /// # Errors
    ///
    /// - [`NotemapError::RepositoryPathEmpty`] for a blank root path
    /// - [`NotemapError::RepositoryPathNotFound`] if the root does not exist
    /// - [`NotemapError::RepositoryPathNotADirectory`] if it is not a directory
    /// - [`NotemapError::Io`] if the root cannot be accessed at all
    pub fn crawl(&self) -> Result<Vec<RepositoryItem>> {
        if self.root_path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(NotemapError::RepositoryPathEmpty);
        }

        let metadata = match fs::metadata(&self.root_path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(NotemapError::RepositoryPathNotFound(self.root_path.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        if !metadata.is_dir() {
            return Err(NotemapError::RepositoryPathNotADirectory(
                self.root_path.clone(),
            ));
        }

        info!("Crawling repository at {}", self.root_path.display());
        let items = self.find_items(&self.root_path);
        let total: usize = items.iter().map(RepositoryItem::count).sum();
        info!("Crawl finished, {} items discovered", total);

        Ok(items)
    }

    /// Discover the items at (and below) one directory level
    ///
    /// Returns the directory itself as a single item if it carries a marker
    /// file, otherwise the lifted items of its subdirectories.
    fn find_items(&self, dir: &Path) -> Vec<RepositoryItem> {
        let entries = read_entries(dir);

        let marker = entries.iter().find(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_string_lossy()
                    .eq_ignore_ascii_case(&self.marker_file)
        });

        if marker.is_some() {
            let files = self.item_files(dir);
            let children = self.child_items(&entries);
            debug!(
                "Found item at {} ({} files, {} child items)",
                dir.display(),
                files.len(),
                children.len()
            );

            return vec![RepositoryItem::new(
                dir.to_path_buf(),
                files,
                children,
                directory_modified(dir),
            )];
        }

        // transparent directory: lift the items found below up to this level
        self.child_items(&entries)
    }

    /// Recurse into every subdirectory and collect the items found there
    fn child_items(&self, entries: &[DirEntry]) -> Vec<RepositoryItem> {
        let mut children = Vec::new();

        for entry in entries {
            if entry.file_type().is_dir() {
                children.extend(self.find_items(entry.path()));
            }
        }

        children
    }

    /// The non-recursive contents of the item's `files/` subdirectory
    fn item_files(&self, dir: &Path) -> Vec<PathBuf> {
        let files_dir = dir.join(FILES_DIRECTORY_NAME);
        if !files_dir.is_dir() {
            return Vec::new();
        }

        read_entries(&files_dir)
            .into_iter()
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect()
    }
}

/// Read a directory's direct entries in byte order of their names
///
/// An unreadable directory (or entry) degrades to an empty result with a
/// logged warning; the crawl never aborts mid-tree.
fn read_entries(dir: &Path) -> Vec<DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Cannot read directory entry in {}: {}", dir.display(), err);
                None
            }
        })
        .collect()
}

fn directory_modified(dir: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(dir)
        .and_then(|metadata| metadata.modified())
        .map(DateTime::<Utc>::from)
        .ok()
}
