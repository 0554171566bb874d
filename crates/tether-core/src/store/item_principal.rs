//! Ordered item↔principal relationships.

use std::fmt;
use std::rc::Rc;

use rusqlite::{Connection, params};

use super::StoreError;
use crate::id::{ItemId, PrincipalId};
use crate::types::EntityTypes;

/// Store for ordered relationships between one declared entity type and
/// the principal space.
///
/// Unlike [`ItemToItem`](super::ItemToItem), pairs here are ordered:
/// item ids and principal ids come from different spaces and must never
/// be conflated, which the distinct [`ItemId`] and [`PrincipalId`]
/// parameter types enforce at the call site. Rows live in one shared
/// table namespaced only by the relationship tag.
pub struct ItemToPrincipal {
    conn: Rc<Connection>,
    types: Rc<dyn EntityTypes>,
    item_type: String,
    tag: String,
    strict: bool,
}

impl fmt::Debug for ItemToPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemToPrincipal")
            .field("item_type", &self.item_type)
            .field("tag", &self.tag)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

impl ItemToPrincipal {
    /// Build a store over (item of `item_type`, principal) pairs under
    /// `tag`.
    ///
    /// `item_type` is validated against the host once, here. The
    /// principal space is not subtyped, so there is nothing to validate
    /// on that side.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownType`] for an unregistered entity
    /// type and [`StoreError::EmptyTag`] for a blank tag.
    pub fn new(
        conn: Rc<Connection>,
        types: Rc<dyn EntityTypes>,
        item_type: &str,
        tag: &str,
    ) -> Result<Self, StoreError> {
        super::validate_type(types.as_ref(), item_type)?;
        super::validate_tag(tag)?;

        Ok(Self {
            conn,
            types,
            item_type: item_type.to_string(),
            tag: tag.to_string(),
            strict: false,
        })
    }

    /// Toggle strict insert mode. When on, [`add_relationship`]
    /// validates that the item id belongs to the declared item type.
    ///
    /// [`add_relationship`]: Self::add_relationship
    #[must_use]
    pub fn strict_inserts(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Declared item entity type.
    #[must_use]
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// Relationship tag scoping this store's rows.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Record the ordered pair (`item`, `principal`) under this store's
    /// tag. Idempotent on repeated identical calls.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TypeMismatch`] when strict insert mode is on
    /// and `item` does not belong to the declared item type, or a
    /// database error.
    pub fn add_relationship(
        &self,
        item: impl Into<ItemId>,
        principal: impl Into<PrincipalId>,
    ) -> Result<(), StoreError> {
        let (item, principal): (ItemId, PrincipalId) = (item.into(), principal.into());
        if self.strict && !self.types.id_belongs_to(item, &self.item_type) {
            return Err(StoreError::TypeMismatch {
                id: item.get(),
                ty: self.item_type.clone(),
            });
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO item_principal_relationships (item_id, principal_id, type)
             VALUES (?1, ?2, ?3)",
            params![item, principal, self.tag],
        )?;
        tracing::trace!(
            item_id = %item,
            principal_id = %principal,
            tag = %self.tag,
            "item-principal relationship added"
        );
        Ok(())
    }

    /// Remove the ordered pair (`item`, `principal`) if present; no-op
    /// when absent. Order is significant: only the row whose item slot
    /// holds `item` and whose principal slot holds `principal` is
    /// matched.
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails.
    pub fn delete_relationship(
        &self,
        item: impl Into<ItemId>,
        principal: impl Into<PrincipalId>,
    ) -> Result<(), StoreError> {
        let (item, principal): (ItemId, PrincipalId) = (item.into(), principal.into());
        let deleted = self.conn.execute(
            "DELETE FROM item_principal_relationships
             WHERE item_id = ?1 AND principal_id = ?2 AND type = ?3",
            params![item, principal, self.tag],
        )?;
        tracing::trace!(
            item_id = %item,
            principal_id = %principal,
            tag = %self.tag,
            deleted,
            "item-principal relationship deleted"
        );
        Ok(())
    }

    /// Whether the ordered pair (`item`, `principal`) is stored under
    /// this tag.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn has_relationship(
        &self,
        item: impl Into<ItemId>,
        principal: impl Into<PrincipalId>,
    ) -> Result<bool, StoreError> {
        let (item, principal): (ItemId, PrincipalId) = (item.into(), principal.into());
        let exists = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM item_principal_relationships
                WHERE item_id = ?1 AND principal_id = ?2 AND type = ?3
             )",
            params![item, principal, self.tag],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// All principal ids associated with `item` under this tag,
    /// ascending by value.
    ///
    /// The queried item's own type is *not* verified: callers are
    /// trusted to pass ids of the declared item type, and a
    /// mismatched-type id returns whatever raw rows exist for it.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn related_principal_ids(
        &self,
        item: impl Into<ItemId>,
    ) -> Result<Vec<PrincipalId>, StoreError> {
        let item: ItemId = item.into();
        let mut stmt = self.conn.prepare(
            "SELECT principal_id FROM item_principal_relationships
             WHERE item_id = ?1 AND type = ?2
             ORDER BY principal_id",
        )?;
        let principals = stmt
            .query_map(params![item, self.tag], |row| {
                row.get::<_, PrincipalId>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(principals)
    }

    /// All item ids associated with `principal` under this tag,
    /// restricted to ids belonging to the declared item type, ascending
    /// by value.
    ///
    /// The type restriction is what keeps two same-tag stores over
    /// different item types independent on this side.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn related_item_ids(
        &self,
        principal: impl Into<PrincipalId>,
    ) -> Result<Vec<ItemId>, StoreError> {
        let principal: PrincipalId = principal.into();
        let mut stmt = self.conn.prepare(
            "SELECT item_id FROM item_principal_relationships
             WHERE principal_id = ?1 AND type = ?2
             ORDER BY item_id",
        )?;
        let candidates = stmt
            .query_map(params![principal, self.tag], |row| {
                row.get::<_, ItemId>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(candidates
            .into_iter()
            .filter(|item| self.types.id_belongs_to(*item, &self.item_type))
            .collect())
    }
}
