//! Paginated search orchestration
//!
//! The orchestrator sits between an external ranked full-text
//! [`SearchEngine`] and the [`ContentIndex`]. The engine ranks candidates;
//! the orchestrator pages through them and resolves each visible candidate
//! to a display model via the index.
//!
//! Two counting rules are deliberate and must not be "fixed":
//!
//! - The total result count is the number of candidates the engine returned
//!   (after the engine-side cap, before paging).
//! - A candidate that cannot be resolved to an indexed item is dropped from
//!   its page, shrinking that page's result count while leaving the total
//!   untouched.

use crate::error::{NotemapError, Result};
use crate::index::ContentIndex;
use crate::route::Route;
use crate::tree::Path;
use serde::Serialize;
use tracing::debug;

/// Number of results shown per page
const ITEMS_PER_PAGE: usize = 50;

/// Maximum number of candidates requested from the engine
const MAX_RESULT_COUNT: usize = 100;

/// One ranked candidate produced by the search engine
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Rank of the candidate in the engine's result order
    pub number: usize,
    /// Route of the matched item
    pub route: Route,
}

/// External ranked full-text search provider
///
/// Implementations receive the free-text query and the maximum number of
/// candidates the caller is interested in.
pub trait SearchEngine {
    /// Return ranked candidates for a query, best match first
    fn search(&self, keywords: &str, max_results: usize) -> Vec<SearchHit>;
}

/// Display model for one search result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Rank index from the engine
    pub index: usize,
    /// Item title (empty when not parsed yet)
    pub title: String,
    /// Item description (empty when not parsed yet)
    pub description: String,
    /// Human-readable display path (components joined with `" > "`)
    pub route: String,
    /// The item's route value
    pub path: String,
}

/// Display model for one page of search results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// The query the page was produced for
    pub query: String,
    /// The visible, resolved results of this page
    pub results: Vec<SearchResult>,
    /// 1-indexed page number
    pub page: usize,
    /// Fixed page size
    pub items_per_page: usize,
    /// 1-indexed rank of the page's first slot
    pub start_index: usize,
    /// Number of results on this page (after display resolution)
    pub result_count: usize,
    /// Number of candidates the engine returned
    pub total_result_count: usize,
}

/// Pages and formats the results of an external search engine
///
/// # Examples
///
/// ```rust,no_run
/// # use notemap::index::ContentIndex;
/// # use notemap::search::{SearchEngine, SearchOrchestrator};
/// # fn example(index: &ContentIndex, engine: &dyn SearchEngine) -> Result<(), notemap::NotemapError> {
/// let orchestrator = SearchOrchestrator::new(index, engine);
/// let page = orchestrator.search("travel plans", 1)?;
/// println!("{} of {} results", page.result_count, page.total_result_count);
/// # Ok(())
/// # }
/// ```
pub struct SearchOrchestrator<'a> {
    index: &'a ContentIndex,
    engine: &'a dyn SearchEngine,
}

impl<'a> SearchOrchestrator<'a> {
    /// Create an orchestrator over an index and an engine
    pub fn new(index: &'a ContentIndex, engine: &'a dyn SearchEngine) -> Self {
        SearchOrchestrator { index, engine }
    }

    /// Run a query and return the requested result page
    ///
    /// A blank or whitespace-only query short-circuits to an empty page
    /// without invoking the engine.
    ///
    /// # Errors
    ///
    /// Returns [`NotemapError::InvalidPageNumber`] for a page number below
    /// one; an out-of-range page is not an error and yields an empty page.
    pub fn search(&self, keywords: &str, page: usize) -> Result<SearchPage> {
        if page < 1 {
            return Err(NotemapError::InvalidPageNumber(page));
        }

        let start_item_number = ITEMS_PER_PAGE * (page - 1);
        let end_item_number = ITEMS_PER_PAGE * page;

        let mut results = Vec::new();
        let mut total_result_count = 0;

        if !keywords.trim().is_empty() {
            let hits = self.engine.search(keywords, MAX_RESULT_COUNT);
            total_result_count = hits.len();
            debug!(
                "Search for {:?} returned {} candidates",
                keywords, total_result_count
            );

            for (position, hit) in hits.iter().enumerate() {
                // paging window
                if position < start_item_number || position >= end_item_number {
                    continue;
                }

                if let Some(result) = self.display_result(hit) {
                    results.push(result);
                }
            }
        }

        Ok(SearchPage {
            query: keywords.to_string(),
            page,
            items_per_page: ITEMS_PER_PAGE,
            start_index: start_index(ITEMS_PER_PAGE, page),
            result_count: results.len(),
            total_result_count,
            results,
        })
    }

    /// Resolve a candidate to its display model
    ///
    /// Returns `None` when the candidate's route is not (or no longer)
    /// indexed; such candidates are dropped from the page.
    fn display_result(&self, hit: &SearchHit) -> Option<SearchResult> {
        let item = self.index.is_match(&hit.route)?;

        Some(SearchResult {
            index: hit.number,
            title: item.title().unwrap_or_default().to_string(),
            description: item.description().unwrap_or_default().to_string(),
            route: display_path(item.route()),
            path: item.route().value().to_string(),
        })
    }
}

/// 1-indexed rank of the first slot on a page
fn start_index(items_per_page: usize, page_number: usize) -> usize {
    page_number * items_per_page - items_per_page + 1
}

/// Human-readable form of a route: components joined with `" > "`
fn display_path(route: &Route) -> String {
    Path::new(route.components().map(str::to_string).collect()).to_string()
}
