//! Typed content relationship registry backed by SQLite.
//!
//! `tether-core` stores two shapes of relationship for a host content
//! system: unordered item↔item pairs between two declared entity types,
//! and ordered item↔principal pairs under one declared entity type.
//! Each relationship set is namespaced by a free-form tag, so the same
//! pair of types can carry several independent relationship sets.
//!
//! A [`Registry`] deduplicates declarations and hands out one shared
//! store instance per logical relationship; hosts supply their entity
//! type system through the [`EntityTypes`] capability. Stores can also
//! be constructed directly, bypassing declaration tracking.
//!
//! ```no_run
//! use std::rc::Rc;
//! use tether_core::{Registry, TypeSet, db};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut types = TypeSet::new();
//! types.register("post").assign(1, "post").assign(2, "post");
//!
//! let conn = Rc::new(db::open_in_memory()?);
//! let mut registry = Registry::new(conn, Rc::new(types));
//!
//! let related = registry.declare_item_item("post", "post", "related")?;
//! related.add_relationship(1, 2)?;
//! assert_eq!(related.related_object_ids(2)?, vec![1.into()]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod id;
pub mod registry;
pub mod store;
pub mod types;

pub use config::{Config, load_config};
pub use id::{ItemId, ParseIdError, PrincipalId};
pub use registry::{Registry, RegistryError};
pub use store::{ItemToItem, ItemToPrincipal, StoreError};
pub use types::{EntityTypes, TypeSet};
