//! Repository service
//!
//! [`Repository`] is the crate's top-level entry point: it crawls a content
//! repository once at open time and keeps the resulting [`ContentIndex`]
//! around for queries. Re-crawling is explicit via
//! [`reindex`](Repository::reindex); nothing watches the filesystem.
//!
//! The service is an explicit, constructed object passed by reference to
//! consumers. For live re-indexing next to concurrent readers, wrap the
//! whole `Repository` in a `RwLock` (the index's map and tree are updated
//! as one unit per item, but only under a single writer).

use crate::crawler::{Crawler, DEFAULT_MARKER_FILE};
use crate::error::Result;
use crate::index::ContentIndex;
use crate::item::Item;
use crate::search::{SearchEngine, SearchOrchestrator};
use std::path::{Path, PathBuf};
use tracing::info;

/// An opened, indexed content repository
///
/// # Examples
///
/// ```rust,no_run
/// use notemap::repository::Repository;
/// use notemap::route::Route;
///
/// # fn main() -> Result<(), notemap::NotemapError> {
/// let repository = Repository::open("./notes")?;
///
/// let route = Route::new("projects/notemap")?;
/// if let Some(item) = repository.index().is_match(&route) {
///     println!("indexed at {}", item.route());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Repository {
    root_path: PathBuf,
    marker_file: String,
    index: ContentIndex,
}

impl Repository {
    /// Open a repository with default settings
    ///
    /// Equivalent to `RepositoryBuilder::new().open(root_path)`.
    pub fn open(root_path: impl Into<PathBuf>) -> Result<Self> {
        RepositoryBuilder::new().open(root_path)
    }

    /// The repository root directory
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// The content index built from the last crawl
    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    /// Mutable access to the content index
    ///
    /// Intended for enrichment (titles, descriptions) and for targeted
    /// re-insertion or removal of single items without a full re-crawl.
    pub fn index_mut(&mut self) -> &mut ContentIndex {
        &mut self.index
    }

    /// Crawl the repository again and replace the index
    ///
    /// The existing index stays untouched if the crawl fails.
    pub fn reindex(&mut self) -> Result<()> {
        let index = build_index(&self.root_path, &self.marker_file)?;
        self.index = index;
        Ok(())
    }

    /// A search orchestrator over this repository's index
    pub fn search_orchestrator<'a>(
        &'a self,
        engine: &'a dyn SearchEngine,
    ) -> SearchOrchestrator<'a> {
        SearchOrchestrator::new(&self.index, engine)
    }
}

/// Configures and opens a [`Repository`]
///
/// # Default Values
///
/// - `marker_file`: `notes.md`
#[derive(Debug)]
pub struct RepositoryBuilder {
    marker_file: String,
}

impl RepositoryBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        RepositoryBuilder {
            marker_file: DEFAULT_MARKER_FILE.to_string(),
        }
    }

    /// Use a different marker file name (matched case-insensitively)
    pub fn marker_file(mut self, name: impl Into<String>) -> Self {
        self.marker_file = name.into();
        self
    }

    /// Crawl the repository root and build the index
    ///
    /// # Errors
    ///
    /// Fails only when the repository root itself is missing, unreadable,
    /// blank, or not a directory; any degradation below the root is logged
    /// and crawled around.
    pub fn open(self, root_path: impl Into<PathBuf>) -> Result<Repository> {
        let root_path = root_path.into();
        let index = build_index(&root_path, &self.marker_file)?;

        info!(
            "Opened repository at {} with {} indexed items",
            root_path.display(),
            index.len()
        );

        Ok(Repository {
            root_path,
            marker_file: self.marker_file,
            index,
        })
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn build_index(root_path: &Path, marker_file: &str) -> Result<ContentIndex> {
    let crawler = Crawler::new(root_path).with_marker_file(marker_file);
    let discovered = crawler.crawl()?;
    let items = Item::from_repository(root_path, &discovered);
    Ok(ContentIndex::from_items(items))
}
