//! Unordered item↔item relationships.

use std::fmt;
use std::rc::Rc;

use rusqlite::{Connection, params};

use super::StoreError;
use crate::id::ItemId;
use crate::types::EntityTypes;

/// Store for unordered relationships between two declared entity types.
///
/// A pair is persisted once, in canonical `(min, max)` order, regardless
/// of the order arguments arrive in. Adds are idempotent and deletes of
/// absent pairs are no-ops. All rows live in one shared table namespaced
/// only by the relationship tag, so the same tag must not be reused for
/// an unrelated type pair — the [`Registry`](crate::registry::Registry)
/// enforces this for stores declared through it.
pub struct ItemToItem {
    conn: Rc<Connection>,
    types: Rc<dyn EntityTypes>,
    from: String,
    to: String,
    tag: String,
    strict: bool,
}

impl fmt::Debug for ItemToItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemToItem")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("tag", &self.tag)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

impl ItemToItem {
    /// Build a store over `from_type` ↔ `to_type` pairs under `tag`.
    ///
    /// Both entity types are validated against the host once, here.
    /// The tag is an opaque non-empty namespace label. Self-relationships
    /// (`from_type == to_type`) are legal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownType`] for an unregistered entity
    /// type and [`StoreError::EmptyTag`] for a blank tag.
    pub fn new(
        conn: Rc<Connection>,
        types: Rc<dyn EntityTypes>,
        from_type: &str,
        to_type: &str,
        tag: &str,
    ) -> Result<Self, StoreError> {
        super::validate_type(types.as_ref(), from_type)?;
        super::validate_type(types.as_ref(), to_type)?;
        super::validate_tag(tag)?;

        Ok(Self {
            conn,
            types,
            from: from_type.to_string(),
            to: to_type.to_string(),
            tag: tag.to_string(),
            strict: false,
        })
    }

    /// Toggle strict insert mode. When on, [`add_relationship`]
    /// validates id/type membership instead of trusting the caller.
    ///
    /// [`add_relationship`]: Self::add_relationship
    #[must_use]
    pub fn strict_inserts(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Declared "from" entity type.
    #[must_use]
    pub fn from_type(&self) -> &str {
        &self.from
    }

    /// Declared "to" entity type.
    #[must_use]
    pub fn to_type(&self) -> &str {
        &self.to
    }

    /// Relationship tag scoping this store's rows.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Record the unordered pair `{a, b}` under this store's tag.
    ///
    /// Idempotent: repeated calls, in either argument order, leave
    /// exactly one stored row for the pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TypeMismatch`] when strict insert mode is on
    /// and the pair does not satisfy the declared types, or a database
    /// error.
    pub fn add_relationship(
        &self,
        a: impl Into<ItemId>,
        b: impl Into<ItemId>,
    ) -> Result<(), StoreError> {
        let (a, b): (ItemId, ItemId) = (a.into(), b.into());
        if self.strict {
            self.check_pair_types(a, b)?;
        }

        let (lo, hi) = canonical_pair(a, b);
        self.conn.execute(
            "INSERT OR IGNORE INTO item_item_relationships (id1, id2, type)
             VALUES (?1, ?2, ?3)",
            params![lo, hi, self.tag],
        )?;
        tracing::trace!(id1 = %lo, id2 = %hi, tag = %self.tag, "item-item relationship added");
        Ok(())
    }

    /// Remove the unordered pair `{a, b}` if present, in either argument
    /// order. Removing an absent pair is a no-op. Only the exact
    /// (pair, tag) row is matched; sibling pairs and sibling tags are
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails.
    pub fn delete_relationship(
        &self,
        a: impl Into<ItemId>,
        b: impl Into<ItemId>,
    ) -> Result<(), StoreError> {
        let (lo, hi) = canonical_pair(a.into(), b.into());
        let deleted = self.conn.execute(
            "DELETE FROM item_item_relationships
             WHERE id1 = ?1 AND id2 = ?2 AND type = ?3",
            params![lo, hi, self.tag],
        )?;
        tracing::trace!(id1 = %lo, id2 = %hi, tag = %self.tag, deleted, "item-item relationship deleted");
        Ok(())
    }

    /// Whether the unordered pair `{a, b}` is stored under this tag.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn has_relationship(
        &self,
        a: impl Into<ItemId>,
        b: impl Into<ItemId>,
    ) -> Result<bool, StoreError> {
        let (lo, hi) = canonical_pair(a.into(), b.into());
        let exists = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM item_item_relationships
                WHERE id1 = ?1 AND id2 = ?2 AND type = ?3
             )",
            params![lo, hi, self.tag],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// All ids related to `id` under this store's declared types and
    /// tag, ascending by value.
    ///
    /// Both stored slots are searched because pairs are unordered. The
    /// relationship table carries no per-row entity types, so candidates
    /// are filtered through the host's type registry: a partner is
    /// returned only when it occupies the slot opposite the one `id`'s
    /// own type fills. An id belonging to neither declared type relates
    /// to nothing.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn related_object_ids(&self, id: impl Into<ItemId>) -> Result<Vec<ItemId>, StoreError> {
        let id = id.into();
        let mut stmt = self.conn.prepare(
            "SELECT id2 AS related FROM item_item_relationships
             WHERE id1 = ?1 AND type = ?2
             UNION
             SELECT id1 FROM item_item_relationships
             WHERE id2 = ?1 AND type = ?2
             ORDER BY related",
        )?;
        let candidates = stmt
            .query_map(params![id, self.tag], |row| row.get::<_, ItemId>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let in_from = self.types.id_belongs_to(id, &self.from);
        let in_to = self.types.id_belongs_to(id, &self.to);

        Ok(candidates
            .into_iter()
            .filter(|partner| {
                (in_from && self.types.id_belongs_to(*partner, &self.to))
                    || (in_to && self.types.id_belongs_to(*partner, &self.from))
            })
            .collect())
    }

    fn check_pair_types(&self, a: ItemId, b: ItemId) -> Result<(), StoreError> {
        let forward = self.types.id_belongs_to(a, &self.from) && self.types.id_belongs_to(b, &self.to);
        let reverse = self.types.id_belongs_to(a, &self.to) && self.types.id_belongs_to(b, &self.from);
        if forward || reverse {
            return Ok(());
        }

        let offender = if self.types.id_belongs_to(a, &self.from) || self.types.id_belongs_to(a, &self.to) {
            (b, self.to.clone())
        } else {
            (a, self.from.clone())
        };
        Err(StoreError::TypeMismatch {
            id: offender.0.get(),
            ty: offender.1,
        })
    }
}

/// Normalize an unordered pair to its `(min, max)` storage order.
const fn canonical_pair(a: ItemId, b: ItemId) -> (ItemId, ItemId) {
    if a.get() <= b.get() { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::canonical_pair;
    use crate::id::ItemId;
    use proptest::prelude::*;

    #[test]
    fn canonical_pair_orders_by_value() {
        let (lo, hi) = canonical_pair(ItemId::new(5), ItemId::new(2));
        assert_eq!((lo.get(), hi.get()), (2, 5));

        let (lo, hi) = canonical_pair(ItemId::new(2), ItemId::new(5));
        assert_eq!((lo.get(), hi.get()), (2, 5));
    }

    #[test]
    fn self_pairs_are_canonical() {
        let (lo, hi) = canonical_pair(ItemId::new(3), ItemId::new(3));
        assert_eq!((lo.get(), hi.get()), (3, 3));
    }

    proptest! {
        #[test]
        fn canonicalization_is_order_insensitive(a in any::<i64>(), b in any::<i64>()) {
            let forward = canonical_pair(ItemId::new(a), ItemId::new(b));
            let reverse = canonical_pair(ItemId::new(b), ItemId::new(a));
            prop_assert_eq!(forward, reverse);
            prop_assert!(forward.0 <= forward.1);
        }

        #[test]
        fn canonicalization_is_idempotent(a in any::<i64>(), b in any::<i64>()) {
            let once = canonical_pair(ItemId::new(a), ItemId::new(b));
            let twice = canonical_pair(once.0, once.1);
            prop_assert_eq!(once, twice);
        }
    }
}
