//! Canonical route model for addressing indexed content
//!
//! A [`Route`] is the normalized, hierarchical address of an item or file
//! inside a repository. Every index in this crate is keyed by routes, so
//! their normalization rules are the contract that keeps the route map and
//! the item tree pointing at the same entries.
//!
//! ## Normalization
//!
//! Routes are derived from request strings or filesystem paths:
//!
//! - Backslashes are folded into forward slashes
//! - Surrounding whitespace is trimmed
//! - Leading, trailing, and duplicate separators are removed
//! - `.` and `..` components are rejected
//!
//! The normalized value keeps its original casing for display; the lookup
//! key is the lowercased value. Two routes are equal when their keys are
//! equal.
//!
//! ## Hierarchy
//!
//! A route's [`level`](Route::level) is its component count (the root route
//! is level zero), and [`parent`](Route::parent) steps exactly one component
//! up. A route with no item of its own may still appear inside an index as a
//! *virtual* segment connecting real descendants; virtuality is a property
//! of the index, not of the route value.

use crate::error::{NotemapError, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Normalized hierarchical address of an item or file
///
/// Routes are cheap to clone; equality and hashing use the lowercased key,
/// so lookups are case-insensitive while the display value keeps its
/// original casing.
///
/// # Examples
///
/// ```rust
/// use notemap::route::Route;
///
/// let route = Route::new("Documents/Projects\\Notes")?;
/// assert_eq!(route.value(), "Documents/Projects/Notes");
/// assert_eq!(route.key(), "documents/projects/notes");
/// assert_eq!(route.level(), 3);
///
/// let parent = route.parent().unwrap();
/// assert_eq!(parent.value(), "Documents/Projects");
/// # Ok::<(), notemap::NotemapError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    /// Normalized value with original casing, components joined by `/`
    value: String,
    /// Lowercased value used for lookups and equality
    key: String,
}

impl Route {
    /// Create a route from a request string
    ///
    /// The input is normalized as described in the module documentation.
    ///
    /// # Errors
    ///
    /// Returns [`NotemapError::InvalidRoute`] if the input contains `.` or
    /// `..` components.
    pub fn new(request: impl AsRef<str>) -> Result<Self> {
        let normalized = request.as_ref().trim().replace('\\', "/");

        let mut components = Vec::new();
        for component in normalized.split('/') {
            let component = component.trim();
            if component.is_empty() {
                continue;
            }
            if component == "." || component == ".." {
                return Err(NotemapError::invalid_route(
                    request.as_ref(),
                    "routes must not contain relative path components",
                ));
            }
            components.push(component);
        }

        let value = components.join("/");
        let key = value.to_lowercase();
        Ok(Route { value, key })
    }

    /// The root route (empty value, level zero)
    pub fn root() -> Self {
        Route {
            value: String::new(),
            key: String::new(),
        }
    }

    /// Create a route for a filesystem path relative to a base directory
    ///
    /// # Arguments
    ///
    /// * `base` - Repository root the route is relative to
    /// * `path` - Path inside `base`; passing `base` itself yields the root
    ///   route
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not live under `base`.
    pub fn from_path(base: &Path, path: &Path) -> Result<Self> {
        let relative = path.strip_prefix(base).map_err(|_| {
            NotemapError::invalid_route(
                path.to_string_lossy(),
                format!("path is outside the repository root {:?}", base),
            )
        })?;

        Route::new(relative.to_string_lossy())
    }

    /// Normalized route value (original casing)
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Normalized lookup key (lowercased value)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this is the root route
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Number of components; the root route is level zero
    pub fn level(&self) -> usize {
        if self.value.is_empty() {
            0
        } else {
            self.value.split('/').count()
        }
    }

    /// Iterate over the route's components in order
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.value.split('/').filter(|c| !c.is_empty())
    }

    /// The last component, or `None` for the root route
    pub fn last_component(&self) -> Option<&str> {
        self.components().last()
    }

    /// The route exactly one level up
    ///
    /// Returns `None` for the root route; the parent of a level-one route is
    /// the root route.
    pub fn parent(&self) -> Option<Route> {
        if self.value.is_empty() {
            return None;
        }

        match self.value.rfind('/') {
            Some(pos) => {
                let value = self.value[..pos].to_string();
                let key = value.to_lowercase();
                Some(Route { value, key })
            }
            None => Some(Route::root()),
        }
    }

    /// Append components to this route, producing a child route
    ///
    /// # Errors
    ///
    /// Returns an error if the appended part fails route normalization.
    pub fn join(&self, part: impl AsRef<str>) -> Result<Route> {
        if self.value.is_empty() {
            return Route::new(part);
        }
        Route::new(format!("{}/{}", self.value, part.as_ref()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Route {}

impl Hash for Route {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
