//! Relationship stores.
//!
//! Two shapes are supported: unordered item↔item pairs between two
//! declared entity types ([`ItemToItem`]) and ordered item↔principal
//! pairs under one declared entity type ([`ItemToPrincipal`]). Each
//! store instance is scoped to a relationship tag; stores with the same
//! entity types but different tags are fully independent data sets.

pub mod item_item;
pub mod item_principal;

pub use item_item::ItemToItem;
pub use item_principal::ItemToPrincipal;

use crate::types::EntityTypes;

/// Errors raised by store construction and row mutation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An entity-type argument is not registered with the host system.
    #[error("unknown entity type '{0}'")]
    UnknownType(String),

    /// The relationship tag was empty or whitespace-only.
    #[error("relationship tag must not be empty")]
    EmptyTag,

    /// Strict insert mode rejected an id that does not satisfy the
    /// declared entity types.
    #[error("id {id} does not belong to entity type '{ty}'")]
    TypeMismatch { id: i64, ty: String },

    /// Underlying SQLite failure.
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

pub(crate) fn validate_type(types: &dyn EntityTypes, name: &str) -> Result<(), StoreError> {
    if types.type_exists(name) {
        Ok(())
    } else {
        Err(StoreError::UnknownType(name.to_string()))
    }
}

pub(crate) fn validate_tag(tag: &str) -> Result<(), StoreError> {
    if tag.trim().is_empty() {
        Err(StoreError::EmptyTag)
    } else {
        Ok(())
    }
}
