//! # Notemap - Route-addressable content repository indexing
//!
//! Notemap turns a file-tree content repository into a route-addressable
//! hierarchy with fast exact and ancestor-aware lookups, paginated search,
//! and a persisted cache of derived thumbnail variants.
//!
//! ## Overview
//!
//! A content repository is a directory tree in which any directory holding a
//! marker file (`notes.md` by default) is a content item. Notemap lets you:
//!
//! - Crawl a repository and discover its items, lifting items found below
//!   marker-less directories up through those transparent levels
//! - Index the items by canonical [`Route`](route::Route), with a route map
//!   for O(1) exact lookups and a mirrored tree for ancestor and subtree
//!   queries
//! - Resolve files addressed through *virtual* route segments to the
//!   nearest real ancestor item that owns them
//! - Page through the ranked results of an external full-text search engine
//! - Remember generated thumbnail variants across runs in a JSON-backed
//!   cache index, keyed by route and dimension pair
//!
//! ## Architecture
//!
//! - **Route model**: normalized hierarchical addresses; lowercased keys,
//!   parent/level arithmetic ([`route`])
//! - **Path / tree model**: validated path components and an arena tree with
//!   non-owning parent references ([`tree`])
//! - **Crawler**: synchronous, depth-first discovery of repository items
//!   ([`crawler`])
//! - **Content index**: insertion-ordered item list, route map, and item
//!   tree, kept in sync as one unit ([`index`])
//! - **Thumbnail index**: persisted route → dimension → variant cache with a
//!   bijective route encoding ([`thumbnail`])
//! - **Search orchestrator**: pagination and display resolution over an
//!   external engine ([`search`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notemap::{Repository, Route};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Crawl and index a repository
//! let repository = Repository::open("./notes")?;
//! println!("{} items indexed", repository.index().len());
//!
//! // Exact lookup
//! let route = Route::new("projects/notemap")?;
//! if let Some(item) = repository.index().is_match(&route) {
//!     println!("found {}", item.route());
//! }
//!
//! // Subtree listing
//! for child in repository.index().direct_children(&Route::root()) {
//!     println!("- {}", child.route());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Concepts
//!
//! ### Routes
//!
//! A route is the canonical, normalized address of an item or file relative
//! to the repository root. Lookups compare lowercased keys; display keeps
//! the original casing. The human-readable form joins components with
//! `" > "`.
//!
//! ### Virtual path segments
//!
//! An intermediate route with no item of its own exists in the tree only to
//! connect real descendants. File lookups walk parent routes through such
//! segments until a real item claims (or nobody claims) the file.
//!
//! ### Thumbnail variants
//!
//! A variant is a size-specific derived asset for an item, keyed by its
//! source route and a `maxWidth:<W>-maxHeight:<H>` dimension string. The
//! cache index survives restarts via a JSON document, loaded once at
//! startup and saved once at shutdown through a shutdown hook.
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, NotemapError>`. Only an
//! unusable repository root aborts an index build and only an invalid page
//! number aborts a search; unreadable directories, missing cache files, and
//! malformed thumbnail-route suffixes all degrade with a logged message.
//!
//! ## Module Organization
//!
//! - [`route`]: canonical route model
//! - [`tree`]: path components and the hierarchy tree
//! - [`item`]: repository items and indexed items
//! - [`crawler`]: repository crawler
//! - [`index`]: in-memory content index
//! - [`thumbnail`]: persisted thumbnail cache index
//! - [`search`]: paginated search orchestration
//! - [`shutdown`]: shutdown-hook registration
//! - [`repository`]: top-level repository service
//! - [`error`]: error types and handling

pub mod crawler;
pub mod error;
pub mod index;
pub mod item;
pub mod repository;
pub mod route;
pub mod search;
pub mod shutdown;
pub mod thumbnail;
pub mod tree;

// Re-export main types for convenience
pub use crawler::Crawler;
pub use error::{NotemapError, Result};
pub use index::ContentIndex;
pub use item::{Item, ItemFile, RepositoryItem};
pub use repository::{Repository, RepositoryBuilder};
pub use route::Route;
pub use search::{SearchEngine, SearchHit, SearchOrchestrator, SearchPage, SearchResult};
pub use shutdown::ShutdownHooks;
pub use thumbnail::{dimensions_from_route, Thumb, ThumbDimension, ThumbnailIndex, Thumbs};

#[cfg(test)]
mod tests;
