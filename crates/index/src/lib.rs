//! # Catalog Index
//!
//! Holds the catalog's items together with their embedding vectors as one
//! consistent snapshot. Item `i` always owns vector `i`, every vector has the
//! same width, and a snapshot never changes after it is built.
//!
//! ## Lifecycle
//!
//! - Load raw rows with [`load_catalog`] (JSON array, every field optional).
//! - Build with [`CatalogIndex::build`]: rows without an id are dropped, each
//!   item's [`Item::search_text`] is embedded, and the build either succeeds
//!   completely or returns an error. Items whose text embeds to a zero-norm
//!   vector are left out and counted in [`BuildStats`].
//! - Publish through a [`CatalogHandle`]. A rebuild produces a new index and
//!   swaps it in; readers holding the old snapshot are unaffected.
//!
//! ## Example
//!
//! ```no_run
//! use index::{load_catalog, CatalogHandle, CatalogIndex};
//! use semantic::{Embedder, SemanticConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = Embedder::lazy(SemanticConfig::default());
//! let records = load_catalog("data/catalog.json")?;
//! let handle = CatalogHandle::new(CatalogIndex::build(records, &embedder, 8).await?);
//!
//! let snapshot = handle.snapshot();
//! println!("{} items, dim {:?}", snapshot.size(), snapshot.dimension());
//! # Ok(())
//! # }
//! ```

mod catalog;
mod error;
mod handle;
mod snapshot;

pub use catalog::{
    load_catalog, parse_catalog, CatalogRecord, Item, RecordId, RecordTags, ITEM_TEXT_SEPARATOR,
};
pub use error::IndexError;
pub use handle::CatalogHandle;
pub use snapshot::{BuildStats, CatalogIndex};
