//! In-memory content index
//!
//! The [`ContentIndex`] is the crate's central query structure. It keeps
//! three synchronized views of the indexed items:
//!
//! - an insertion-ordered route list (stable enumeration order)
//! - a route-key map for O(1) exact lookups
//! - an item tree mirroring the route hierarchy for ancestor and subtree
//!   queries
//!
//! The map and the tree must never diverge: an item is present in the map
//! iff it is reachable in the tree at the same route. All mutation goes
//! through [`add`](ContentIndex::add) and [`remove`](ContentIndex::remove),
//! which update the three structures as one unit.
//!
//! Routes without an item of their own may still exist inside the tree as
//! *virtual* segments connecting real descendants; file lookups resolve
//! through them by walking parent routes until a real item is found.
//!
//! # Thread Safety
//!
//! `ContentIndex` is not internally synchronized. The build phase is
//! single-writer by construction (`&mut self`); once built, concurrent
//! readers are safe. Wrap the index in a `RwLock` when live re-indexing has
//! to run next to readers.

use crate::item::{Item, ItemFile};
use crate::route::Route;
use crate::tree::{Path, Tree};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Route-addressable index over the items of one repository
///
/// # Examples
///
/// ```rust
/// use notemap::index::ContentIndex;
/// use notemap::item::Item;
/// use notemap::route::Route;
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), notemap::NotemapError> {
/// let mut index = ContentIndex::new();
/// index.add(Item::new(Route::new("docs")?, PathBuf::from("/repo/docs")));
/// index.add(Item::new(Route::new("docs/guide")?, PathBuf::from("/repo/docs/guide")));
///
/// assert_eq!(index.len(), 2);
/// assert!(index.is_match(&Route::new("docs/guide")?).is_some());
/// assert!(index.is_match(&Route::new("docs/missing")?).is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ContentIndex {
    /// Routes in insertion order
    routes: Vec<Route>,
    /// Route key -> item
    route_map: HashMap<String, Item>,
    /// Route hierarchy; node values are the indexed routes
    item_tree: Tree<Route>,
}

impl ContentIndex {
    /// Create an empty index
    pub fn new() -> Self {
        ContentIndex {
            routes: Vec::new(),
            route_map: HashMap::new(),
            item_tree: Tree::new(),
        }
    }

    /// Build an index from a list of items
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut index = ContentIndex::new();
        for item in items {
            index.add(item);
        }

        info!("Content index built with {} items", index.len());
        index
    }

    /// Add an item to the index
    ///
    /// The route list, the route map, and the item tree are updated as one
    /// unit; an item that cannot be placed in the tree is rejected with a
    /// logged warning and the index is left unchanged. Adding an item at an
    /// already-indexed route replaces the previous entry in place.
    pub fn add(&mut self, item: Item) {
        let tree_path = Path::from(item.route());
        let route = item.route().clone();

        match self.item_tree.insert(&tree_path, route.clone()) {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!("Cannot add an item without route components to the index");
                return;
            }
            Err(err) => {
                warn!("Cannot add an invalid item to the index: {}", err);
                return;
            }
        }

        debug!("Added item {:?} to the index", route.value());
        if self.route_map.insert(route.key().to_string(), item).is_none() {
            self.routes.push(route);
        }
    }

    /// Remove the item at a route
    ///
    /// Evicts the entry from the route list, the route map, and the item
    /// tree. A route that still connects indexed descendants stays in the
    /// tree as a virtual segment. Returns the removed item, if any.
    pub fn remove(&mut self, route: &Route) -> Option<Item> {
        let item = self.route_map.remove(route.key())?;

        self.item_tree.remove(&Path::from(route));
        self.routes.retain(|indexed| indexed != route);

        debug!("Removed item {:?} from the index", route.value());
        Some(item)
    }

    /// Exact lookup by normalized route key
    pub fn is_match(&self, route: &Route) -> Option<&Item> {
        self.route_map.get(route.key())
    }

    /// Resolve a file addressed through virtual intermediate segments
    ///
    /// Starting at the requested route, parent routes are walked until an
    /// indexed item is found; that item is then asked for a file at the
    /// *original* requested route. Returns `None` when no real ancestor
    /// exists or the owning item has no such file.
    pub fn is_file_match(&self, route: &Route) -> Option<&ItemFile> {
        let mut current = route.clone();

        loop {
            if let Some(item) = self.is_match(&current) {
                // nearest real ancestor; it either owns the file or nobody does
                return item.file(route);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        warn!("No file found for route {:?}", route.value());
        None
    }

    /// The item exactly one level up from a route
    ///
    /// Returns `None` for the root route, or when no item is indexed at the
    /// parent route.
    pub fn parent(&self, route: &Route) -> Option<&Item> {
        if route.is_empty() {
            return None;
        }

        let parent_route = route.parent()?;
        self.is_match(&parent_route)
    }

    /// Immediate tree children of a route, sorted descending by route value
    pub fn direct_children(&self, route: &Route) -> Vec<&Item> {
        let mut children: Vec<&Item> = self
            .item_tree
            .child_values(&Path::from(route))
            .into_iter()
            .filter_map(|child_route| self.route_map.get(child_route.key()))
            .collect();

        sort_by_route(&mut children);
        children
    }

    /// All items in the subtree below a route that match a predicate
    ///
    /// Pre-order traversal: at each level the direct children are filtered
    /// by the predicate, kept children are recursed into, and the
    /// accumulated list is re-sorted descending by route value at every
    /// recursion level. Children of a rejected item are not visited.
    pub fn all_children<F>(&self, route: &Route, predicate: F) -> Vec<&Item>
    where
        F: Fn(&Item) -> bool,
    {
        self.collect_children(route, &predicate)
    }

    fn collect_children<F>(&self, route: &Route, predicate: &F) -> Vec<&Item>
    where
        F: Fn(&Item) -> bool,
    {
        let mut children = Vec::new();

        for child in self.direct_children(route) {
            if !predicate(child) {
                continue;
            }

            children.push(child);
            children.extend(self.collect_children(child.route(), predicate));
        }

        sort_by_route(&mut children);
        children
    }

    /// The item indexed at the root route, if any
    pub fn root(&self) -> Option<&Item> {
        let route = self.item_tree.value(&Path::root())?;
        self.route_map.get(route.key())
    }

    /// Number of indexed items
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True if nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate over the indexed items in insertion order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.routes
            .iter()
            .filter_map(|route| self.route_map.get(route.key()))
    }
}

/// Descending by route string value
fn sort_by_route(items: &mut [&Item]) {
    items.sort_by(|a, b| b.route().value().cmp(a.route().value()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemFile;
    use std::path::PathBuf;

    fn item(route: &str) -> Item {
        Item::new(
            Route::new(route).unwrap(),
            PathBuf::from("/repo").join(route),
        )
    }

    fn route(value: &str) -> Route {
        Route::new(value).unwrap()
    }

    #[test]
    fn test_is_match_exact_only() {
        let mut index = ContentIndex::new();
        index.add(item("docs"));

        assert!(index.is_match(&route("docs")).is_some());
        assert!(index.is_match(&route("DOCS")).is_some());
        assert!(index.is_match(&route("docs/guide")).is_none());
        assert!(index.is_match(&route("doc")).is_none());
    }

    #[test]
    fn test_map_and_tree_stay_in_sync() {
        let mut index = ContentIndex::new();
        index.add(item("a"));
        index.add(item("a/b/c"));
        index.add(item("d"));

        assert_eq!(index.len(), 3);
        // every mapped item is reachable through the tree
        for indexed in index.items() {
            let reachable = index
                .item_tree
                .value(&Path::from(indexed.route()))
                .is_some();
            assert!(reachable, "item {:?} missing from tree", indexed.route().value());
        }
        assert_eq!(index.item_tree.len(), 3);
    }

    #[test]
    fn test_add_replaces_existing_route() {
        let mut index = ContentIndex::new();
        index.add(item("docs"));

        let mut replacement = item("docs");
        replacement.set_title("Replacement");
        index.add(replacement);

        assert_eq!(index.len(), 1);
        assert_eq!(index.item_tree.len(), 1);
        assert_eq!(
            index.is_match(&route("docs")).unwrap().title(),
            Some("Replacement")
        );
    }

    #[test]
    fn test_remove_evicts_map_and_tree() {
        let mut index = ContentIndex::new();
        index.add(item("a"));
        index.add(item("a/b"));

        let removed = index.remove(&route("a/b")).unwrap();
        assert_eq!(removed.route().value(), "a/b");
        assert_eq!(index.len(), 1);
        assert_eq!(index.item_tree.len(), 1);
        assert!(index.is_match(&route("a/b")).is_none());
        assert!(index.remove(&route("a/b")).is_none());
    }

    #[test]
    fn test_removed_connector_stays_virtual() {
        let mut index = ContentIndex::new();
        index.add(item("a"));
        index.add(item("a/b"));

        index.remove(&route("a"));
        // "a" is virtual now but still connects "a/b"
        assert!(index.is_match(&route("a")).is_none());
        assert_eq!(index.direct_children(&route("a")).len(), 1);
    }

    #[test]
    fn test_is_file_match_through_virtual_segments() {
        let mut index = ContentIndex::new();

        // item "a" owning a file addressed three levels deeper; "a/b" and
        // "a/b/c" exist only as virtual connectors of the request
        let mut owner = item("a");
        owner.add_file(ItemFile::new(
            route("a/b/c/image.png"),
            PathBuf::from("/repo/a/b/c/image.png"),
        ));
        index.add(owner);

        let file = index.is_file_match(&route("a/b/c/image.png")).unwrap();
        assert_eq!(file.route(), &route("a/b/c/image.png"));
    }

    #[test]
    fn test_is_file_match_prefers_nearest_ancestor() {
        let mut index = ContentIndex::new();

        let mut far = item("a");
        far.add_file(ItemFile::new(
            route("a/b/files/image.png"),
            PathBuf::from("/repo/a/far.png"),
        ));
        index.add(far);

        let mut near = item("a/b");
        near.add_file(ItemFile::new(
            route("a/b/files/image.png"),
            PathBuf::from("/repo/a/b/near.png"),
        ));
        index.add(near);

        let file = index.is_file_match(&route("a/b/files/image.png")).unwrap();
        assert_eq!(file.path(), PathBuf::from("/repo/a/b/near.png"));
    }

    #[test]
    fn test_is_file_match_without_ancestor() {
        let mut index = ContentIndex::new();
        index.add(item("other"));

        assert!(index.is_file_match(&route("a/b/image.png")).is_none());
    }

    #[test]
    fn test_is_file_match_ancestor_without_file() {
        let mut index = ContentIndex::new();
        index.add(item("a"));

        assert!(index.is_file_match(&route("a/b/image.png")).is_none());
    }

    #[test]
    fn test_parent() {
        let mut index = ContentIndex::new();
        index.add(item("a"));
        index.add(item("a/b"));

        let parent = index.parent(&route("a/b")).unwrap();
        assert_eq!(parent.route().value(), "a");

        // no item at the parent route
        index.remove(&route("a"));
        assert!(index.parent(&route("a/b")).is_none());

        // the root route has no parent
        assert!(index.parent(&Route::root()).is_none());
    }

    #[test]
    fn test_direct_children_sorted_descending() {
        let mut index = ContentIndex::new();
        index.add(item("docs"));
        index.add(item("docs/alpha"));
        index.add(item("docs/zulu"));
        index.add(item("docs/mike"));
        // grandchild is not a direct child
        index.add(item("docs/alpha/deep"));

        let children: Vec<_> = index
            .direct_children(&route("docs"))
            .iter()
            .map(|c| c.route().value().to_string())
            .collect();
        assert_eq!(children, vec!["docs/zulu", "docs/mike", "docs/alpha"]);
    }

    #[test]
    fn test_direct_children_skip_virtual_nodes() {
        let mut index = ContentIndex::new();
        index.add(item("docs"));
        index.add(item("docs/a/deep"));

        // "docs/a" is virtual: not a direct child item of "docs"
        assert!(index.direct_children(&route("docs")).is_empty());
    }

    #[test]
    fn test_all_children_filters_and_sorts() {
        let mut index = ContentIndex::new();
        index.add(item("r"));
        index.add(item("r/a"));
        index.add(item("r/a/x"));
        index.add(item("r/b"));
        index.add(item("r/b/y"));

        let all: Vec<_> = index
            .all_children(&route("r"), |_| true)
            .iter()
            .map(|c| c.route().value().to_string())
            .collect();
        assert_eq!(all, vec!["r/b/y", "r/b", "r/a/x", "r/a"]);

        // rejecting "r/b" hides its subtree as well
        let filtered: Vec<_> = index
            .all_children(&route("r"), |item| item.route().value() != "r/b")
            .iter()
            .map(|c| c.route().value().to_string())
            .collect();
        assert_eq!(filtered, vec!["r/a/x", "r/a"]);
    }

    #[test]
    fn test_root_and_len() {
        let mut index = ContentIndex::new();
        assert!(index.root().is_none());
        assert!(index.is_empty());

        index.add(Item::new(Route::root(), PathBuf::from("/repo")));
        index.add(item("docs"));

        assert_eq!(index.len(), 2);
        assert!(index.root().unwrap().route().is_empty());
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let mut index = ContentIndex::new();
        index.add(item("zulu"));
        index.add(item("alpha"));
        index.add(item("mike"));

        let order: Vec<_> = index
            .items()
            .map(|i| i.route().value().to_string())
            .collect();
        assert_eq!(order, vec!["zulu", "alpha", "mike"]);
    }
}
