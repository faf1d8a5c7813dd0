//! Persisted thumbnail-variant cache index
//!
//! Thumbnails are derived assets generated for indexed items by an external
//! renderer. The [`ThumbnailIndex`] remembers which size variants already
//! exist so they can be served without regenerating them: a map from route
//! string to a set of [`Thumb`] descriptors keyed by their canonical
//! dimension string.
//!
//! The index is backed by a JSON document that is loaded once at startup and
//! saved once at shutdown through a [`ShutdownHooks`] callback. A missing or
//! unreadable backing file is not an error; the index simply starts empty.
//!
//! ## Route encoding
//!
//! Every variant also has a synthetic route of its own, formed by
//! concatenating the base content route, a literal `-`, and the canonical
//! dimension string `maxWidth:<W>-maxHeight:<H>`. The encoding is bijective:
//! [`dimensions_from_route`] recovers the base route and dimensions from
//! such a route, and returns the original route with zero-valued dimensions
//! when no variant suffix is present (callers treat a zero pair as "no
//! thumbnail variant requested").

use crate::error::Result;
use crate::route::Route;
use crate::shutdown::ShutdownHooks;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

static DIMENSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-maxWidth:(\d+)-maxHeight:(\d+)$").expect("dimension pattern must compile")
});

/// Maximum dimensions of one thumbnail variant
///
/// The canonical string form `maxWidth:<W>-maxHeight:<H>` keys the variant
/// inside its per-route set and is embedded into thumbnail routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbDimension {
    /// Maximum width in pixels
    #[serde(rename = "maxWidth")]
    pub max_width: u32,
    /// Maximum height in pixels
    #[serde(rename = "maxHeight")]
    pub max_height: u32,
}

impl ThumbDimension {
    /// Create a dimension pair
    pub fn new(max_width: u32, max_height: u32) -> Self {
        ThumbDimension {
            max_width,
            max_height,
        }
    }

    /// True for the zero-valued pair, meaning "no variant requested"
    pub fn is_unset(&self) -> bool {
        self.max_width == 0 && self.max_height == 0
    }
}

impl fmt::Display for ThumbDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "maxWidth:{}-maxHeight:{}", self.max_width, self.max_height)
    }
}

/// Descriptor of one generated thumbnail variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumb {
    route: String,
    #[serde(rename = "baseFolder")]
    base_folder: String,
    path: String,
    dimensions: ThumbDimension,
}

impl Thumb {
    /// Create a thumbnail descriptor
    ///
    /// # Arguments
    ///
    /// * `route` - Route of the source content item
    /// * `base_folder` - Folder the rendered variants live in
    /// * `path` - Path of the variant file, relative to `base_folder`
    /// * `dimensions` - The variant's maximum dimensions
    pub fn new(
        route: &Route,
        base_folder: impl Into<String>,
        path: impl Into<String>,
        dimensions: ThumbDimension,
    ) -> Self {
        Thumb {
            route: route.value().to_string(),
            base_folder: base_folder.into(),
            path: path.into(),
            dimensions,
        }
    }

    /// Route of the source content item
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Folder the rendered variants live in
    pub fn base_folder(&self) -> &str {
        &self.base_folder
    }

    /// Path of the variant file, relative to the base folder
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The variant's maximum dimensions
    pub fn dimensions(&self) -> ThumbDimension {
        self.dimensions
    }

    /// The variant's synthetic route: base route, `-`, dimension string
    ///
    /// # Panics
    ///
    /// Panics if the concatenation is not a valid route. This cannot happen
    /// for a thumb built from a well-formed base route and is treated as an
    /// internal invariant violation rather than a recoverable error.
    pub fn thumb_route(&self) -> Route {
        let value = format!("{}-{}", self.route, self.dimensions);
        match Route::new(&value) {
            Ok(route) => route,
            Err(err) => panic!(
                "thumbnail route {:?} must always be constructible: {}",
                value, err
            ),
        }
    }
}

impl fmt::Display for Thumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.dimensions)
    }
}

/// Size-keyed set of thumbnail variants for one route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thumbs(BTreeMap<String, Thumb>);

impl Thumbs {
    /// Create an empty variant set
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variant by its canonical dimension string
    pub fn get_thumb_by_size(&self, dimensions: &ThumbDimension) -> Option<&Thumb> {
        self.0.get(&dimensions.to_string())
    }

    /// Insert a variant, keyed by its dimension string
    pub fn insert(&mut self, thumb: Thumb) {
        self.0.insert(thumb.dimensions().to_string(), thumb);
    }

    /// Number of variants in the set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the set holds no variants
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the variants, ordered by dimension string
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Thumb)> {
        self.0.iter().map(|(key, thumb)| (key.as_str(), thumb))
    }
}

/// Persisted JSON shape of the index
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    thumbs: BTreeMap<String, Thumbs>,
}

/// Route-keyed cache index over all generated thumbnail variants
///
/// Entries are added lazily while thumbnails are generated; the index itself
/// never removes them. Interior mutability allows insertion through a shared
/// reference, so the index can be handed out as `Arc<ThumbnailIndex>` to the
/// renderer and to the shutdown save hook at the same time.
///
/// # Examples
///
/// ```rust,no_run
/// use notemap::route::Route;
/// use notemap::shutdown::ShutdownHooks;
/// use notemap::thumbnail::{Thumb, ThumbDimension, ThumbnailIndex};
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), notemap::NotemapError> {
/// let hooks = ShutdownHooks::new();
/// let index = Arc::new(ThumbnailIndex::load("thumbs/index.json"));
/// index.register_save_on_shutdown(&hooks);
///
/// let route = Route::new("docs/files/photo.jpg")?;
/// let dimensions = ThumbDimension::new(200, 150);
/// index.add_thumb(Thumb::new(&route, "thumbs", "photo-200x150.jpg", dimensions));
///
/// // ... at process exit:
/// hooks.run();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ThumbnailIndex {
    index_file_path: PathBuf,
    thumbs: RwLock<BTreeMap<String, Thumbs>>,
}

impl ThumbnailIndex {
    /// Load the index from its backing file
    ///
    /// A missing, unreadable, or undecodable file is not an error: the index
    /// starts empty and the condition is logged at debug level.
    pub fn load(index_file_path: impl Into<PathBuf>) -> Self {
        let index_file_path = index_file_path.into();

        let thumbs = match read_index_file(&index_file_path) {
            Ok(thumbs) => {
                info!(
                    "Loaded thumbnail index with {} routes from {}",
                    thumbs.len(),
                    index_file_path.display()
                );
                thumbs
            }
            Err(err) => {
                debug!("No thumbnail index loaded ({}). Creating a new one.", err);
                BTreeMap::new()
            }
        };

        ThumbnailIndex {
            index_file_path,
            thumbs: RwLock::new(thumbs),
        }
    }

    /// Location of the backing file
    pub fn index_file_path(&self) -> &Path {
        &self.index_file_path
    }

    /// Save the index to its backing file
    ///
    /// The document is written with sorted keys and stable formatting, so
    /// saving an unchanged index reproduces the same bytes. The write goes
    /// through a temporary file in the target directory and is moved into
    /// place afterwards.
    pub fn save(&self) -> Result<()> {
        let snapshot = IndexFile {
            thumbs: self.thumbs.read().clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;

        let directory = match self.index_file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(directory)?;
        file.write_all(json.as_bytes())?;
        file.persist(&self.index_file_path)
            .map_err(|err| err.error)?;

        info!(
            "Saved thumbnail index with {} routes to {}",
            snapshot.thumbs.len(),
            self.index_file_path.display()
        );
        Ok(())
    }

    /// Register saving this index as a shutdown hook
    pub fn register_save_on_shutdown(self: &Arc<Self>, hooks: &ShutdownHooks) {
        let index = Arc::clone(self);
        hooks.register(move || {
            info!("Saving the thumbnail index");
            index.save()
        });
    }

    /// The variant set recorded for a route
    pub fn get_thumbs(&self, route: &Route) -> Option<Thumbs> {
        self.thumbs.read().get(route.value()).cloned()
    }

    /// Replace the variant set recorded for a route
    pub fn set_thumbs(&self, route: &Route, thumbs: Thumbs) {
        self.thumbs
            .write()
            .insert(route.value().to_string(), thumbs);
    }

    /// Record one newly generated variant
    pub fn add_thumb(&self, thumb: Thumb) {
        let mut thumbs = self.thumbs.write();
        thumbs
            .entry(thumb.route().to_string())
            .or_default()
            .insert(thumb);
    }

    /// Look up one variant by route and dimensions
    pub fn thumb(&self, route: &Route, dimensions: &ThumbDimension) -> Option<Thumb> {
        self.thumbs
            .read()
            .get(route.value())
            .and_then(|thumbs| thumbs.get_thumb_by_size(dimensions).cloned())
    }

    /// Number of routes with at least one recorded variant
    pub fn len(&self) -> usize {
        self.thumbs.read().len()
    }

    /// True if no variants are recorded
    pub fn is_empty(&self) -> bool {
        self.thumbs.read().is_empty()
    }
}

fn read_index_file(path: &Path) -> Result<BTreeMap<String, Thumbs>> {
    let content = fs::read_to_string(path)?;
    let file: IndexFile = serde_json::from_str(&content)?;
    Ok(file.thumbs)
}

/// Recover a base route and dimensions from a thumbnail route
///
/// Matches the dimension suffix `-maxWidth:<W>-maxHeight:<H>` at the end of
/// the route's string form. On no match, or when either captured number does
/// not parse, the original route is returned together with zero-valued
/// dimensions; a zero pair means "no thumbnail variant requested", never a
/// literal 0x0 size.
pub fn dimensions_from_route(route: &Route) -> (Route, ThumbDimension) {
    let value = route.value();

    let Some(captures) = DIMENSION_PATTERN.captures(value) else {
        return (route.clone(), ThumbDimension::default());
    };

    let (Some(full), Some(width), Some(height)) =
        (captures.get(0), captures.get(1), captures.get(2))
    else {
        return (route.clone(), ThumbDimension::default());
    };

    let Ok(max_width) = width.as_str().parse::<u32>() else {
        return (route.clone(), ThumbDimension::default());
    };
    let Ok(max_height) = height.as_str().parse::<u32>() else {
        return (route.clone(), ThumbDimension::default());
    };

    let base_value = &value[..value.len() - full.as_str().len()];
    match Route::new(base_value) {
        Ok(base_route) => (base_route, ThumbDimension::new(max_width, max_height)),
        Err(_) => (route.clone(), ThumbDimension::default()),
    }
}
