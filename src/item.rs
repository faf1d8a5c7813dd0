//! Content item model
//!
//! Two item representations exist in the crate, mirroring the two phases of
//! an index build:
//!
//! - [`RepositoryItem`]: the crawler's output. A discovered content unit
//!   with its base directory, owned file paths, and nested child items.
//!   Immutable once built.
//! - [`Item`]: the indexed content entity, keyed by [`Route`] and owned
//!   exclusively by the content index. Carries the owned files as
//!   route-addressed [`ItemFile`]s and optional title/description metadata
//!   filled in by an external renderer.

use crate::route::Route;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A content unit discovered by the repository crawler
///
/// Repository items form a tree: an item's children are the items found by
/// recursing into its subdirectories. The crawler flattens transparent
/// (marker-less) directories, so a child's base directory is not necessarily
/// a direct child of its parent's.
#[derive(Debug, Clone)]
pub struct RepositoryItem {
    base_dir: PathBuf,
    files: Vec<PathBuf>,
    children: Vec<RepositoryItem>,
    modified: Option<DateTime<Utc>>,
}

impl RepositoryItem {
    /// Create a new repository item
    pub fn new(
        base_dir: PathBuf,
        files: Vec<PathBuf>,
        children: Vec<RepositoryItem>,
        modified: Option<DateTime<Utc>>,
    ) -> Self {
        RepositoryItem {
            base_dir,
            files,
            children,
            modified,
        }
    }

    /// Directory this item was discovered in
    pub fn base_directory(&self) -> &Path {
        &self.base_dir
    }

    /// Paths of the item's owned files (contents of its `files/` directory)
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Items discovered below this item
    pub fn children(&self) -> &[RepositoryItem] {
        &self.children
    }

    /// Modification time of the base directory at crawl time
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    /// Number of items in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(RepositoryItem::count).sum::<usize>()
    }
}

impl fmt::Display for RepositoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} files, {} child items)",
            self.base_dir.display(),
            self.files.len(),
            self.children.len()
        )
    }
}

/// A file owned by an indexed item, addressed by its own route
#[derive(Debug, Clone)]
pub struct ItemFile {
    route: Route,
    path: PathBuf,
}

impl ItemFile {
    /// Create a new item file
    pub fn new(route: Route, path: PathBuf) -> Self {
        ItemFile { route, path }
    }

    /// Route of the file relative to the repository root
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Location of the file on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// An indexed content entity
///
/// Items are created once per index build and are read-mostly afterwards;
/// only the title/description metadata is filled in later, by whatever
/// renders the item's content.
#[derive(Debug, Clone)]
pub struct Item {
    route: Route,
    base_dir: PathBuf,
    files: Vec<ItemFile>,
    title: Option<String>,
    description: Option<String>,
    modified: Option<DateTime<Utc>>,
}

impl Item {
    /// Create a new item at the given route
    pub fn new(route: Route, base_dir: PathBuf) -> Self {
        Item {
            route,
            base_dir,
            files: Vec::new(),
            title: None,
            description: None,
            modified: None,
        }
    }

    /// Convert a crawl result into indexable items
    ///
    /// Flattens every [`RepositoryItem`] and its descendants into a flat
    /// list, deriving each item's route from its base directory relative to
    /// `repo_root` and each file's route from its on-disk location. Items or
    /// files whose paths cannot be expressed as routes are skipped with a
    /// logged warning; the conversion itself never fails.
    pub fn from_repository(repo_root: &Path, discovered: &[RepositoryItem]) -> Vec<Item> {
        let mut items = Vec::new();
        for repository_item in discovered {
            convert_item(repo_root, repository_item, &mut items);
        }
        items
    }

    /// Route the item is indexed under
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Directory the item was discovered in
    pub fn base_directory(&self) -> &Path {
        &self.base_dir
    }

    /// The item's owned files
    pub fn files(&self) -> &[ItemFile] {
        &self.files
    }

    /// Look up an owned file by its exact route
    pub fn file(&self, route: &Route) -> Option<&ItemFile> {
        self.files.iter().find(|file| file.route() == route)
    }

    /// Attach an owned file
    pub fn add_file(&mut self, file: ItemFile) {
        self.files.push(file);
    }

    /// Item title, once parsed from its content
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Item description, once parsed from its content
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Set the parsed title (external metadata parser seam)
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Set the parsed description (external metadata parser seam)
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Modification time captured at crawl time
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    /// Set the modification time
    pub fn set_modified(&mut self, modified: Option<DateTime<Utc>>) {
        self.modified = modified;
    }
}

fn convert_item(repo_root: &Path, repository_item: &RepositoryItem, items: &mut Vec<Item>) {
    let route = match Route::from_path(repo_root, repository_item.base_directory()) {
        Ok(route) => route,
        Err(err) => {
            warn!(
                "Skipping item at {}: {}",
                repository_item.base_directory().display(),
                err
            );
            return;
        }
    };

    let mut item = Item::new(route, repository_item.base_directory().to_path_buf());
    item.set_modified(repository_item.modified());

    for file_path in repository_item.files() {
        match Route::from_path(repo_root, file_path) {
            Ok(file_route) => item.add_file(ItemFile::new(file_route, file_path.clone())),
            Err(err) => {
                warn!("Skipping file at {}: {}", file_path.display(), err);
            }
        }
    }

    items.push(item);

    for child in repository_item.children() {
        convert_item(repo_root, child, items);
    }
}
