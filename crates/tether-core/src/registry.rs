//! In-memory catalog of declared relationships.
//!
//! A [`Registry`] tracks which (type-pair, tag) and (item-type, tag)
//! combinations have been declared, rejects duplicate declarations
//! (including order-flipped item-item duplicates), and hands out one
//! shared store instance per logical relationship. The registry itself
//! never touches the database — it is bookkeeping over store
//! construction.
//!
//! The registry is an explicit context object: hosts construct one (or
//! several, each with independent state) and pass it to the code that
//! needs relationship access. There is no process-global instance.

use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::config::Config;
use crate::db;
use crate::store::{ItemToItem, ItemToPrincipal, StoreError};
use crate::types::EntityTypes;

/// Errors raised by relationship declaration.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The canonical (type-pair, tag) key is already declared, possibly
    /// with the type arguments flipped.
    #[error("item-item relationship ({a}, {b}, '{tag}') is already declared")]
    DuplicateItemItem { a: String, b: String, tag: String },

    /// The (item-type, tag) key is already declared.
    #[error("item-principal relationship ({item_type}, '{tag}') is already declared")]
    DuplicateItemPrincipal { item_type: String, tag: String },

    /// Store construction failed: unknown entity type or blank tag.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Canonical key for an item-item declaration: the type pair sorted into
/// a stable order so argument order cannot produce distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PairKey {
    a: String,
    b: String,
    tag: String,
}

impl PairKey {
    fn new(type_a: &str, type_b: &str, tag: &str) -> Self {
        let (a, b) = if type_a <= type_b {
            (type_a, type_b)
        } else {
            (type_b, type_a)
        };
        Self {
            a: a.to_string(),
            b: b.to_string(),
            tag: tag.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PrincipalKey {
    item_type: String,
    tag: String,
}

impl PrincipalKey {
    fn new(item_type: &str, tag: &str) -> Self {
        Self {
            item_type: item_type.to_string(),
            tag: tag.to_string(),
        }
    }
}

/// Catalog of declared relationship stores over one database connection.
///
/// Declarations are scoped to the registry instance; two registries
/// share nothing, even over the same database.
pub struct Registry {
    conn: Rc<Connection>,
    types: Rc<dyn EntityTypes>,
    strict_inserts: bool,
    item_item: HashMap<PairKey, Rc<ItemToItem>>,
    item_principal: HashMap<PrincipalKey, Rc<ItemToPrincipal>>,
}

impl Registry {
    /// Build a registry over an already-opened connection.
    #[must_use]
    pub fn new(conn: Rc<Connection>, types: Rc<dyn EntityTypes>) -> Self {
        Self {
            conn,
            types,
            strict_inserts: false,
            item_item: HashMap::new(),
            item_principal: HashMap::new(),
        }
    }

    /// Open (or create) the relationship database named by `config` and
    /// build a registry over it. Stores declared through the registry
    /// inherit the configured strict-insert default.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &Config, types: Rc<dyn EntityTypes>) -> Result<Self> {
        let conn = db::open_with_timeout(&config.db_path, config.busy_timeout())
            .context("open relationship database from config")?;
        let mut registry = Self::new(Rc::new(conn), types);
        registry.strict_inserts = config.strict_inserts;
        Ok(registry)
    }

    /// Declare an item-item relationship between `type_a` and `type_b`
    /// under `tag`, returning the store servicing it.
    ///
    /// The declaration key is canonical: `(a, b, tag)` and `(b, a, tag)`
    /// are the same declaration, and the second of the two fails.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateItemItem`] when the canonical
    /// key is already declared, or a [`StoreError`] from construction.
    pub fn declare_item_item(
        &mut self,
        type_a: &str,
        type_b: &str,
        tag: &str,
    ) -> Result<Rc<ItemToItem>, RegistryError> {
        let key = PairKey::new(type_a, type_b, tag);
        if self.item_item.contains_key(&key) {
            return Err(RegistryError::DuplicateItemItem {
                a: key.a,
                b: key.b,
                tag: key.tag,
            });
        }

        let store = Rc::new(
            ItemToItem::new(
                Rc::clone(&self.conn),
                Rc::clone(&self.types),
                type_a,
                type_b,
                tag,
            )?
            .strict_inserts(self.strict_inserts),
        );
        tracing::debug!(from_type = type_a, to_type = type_b, tag, "declared item-item relationship");
        self.item_item.insert(key, Rc::clone(&store));
        Ok(store)
    }

    /// The store previously declared for `(type_a, type_b, tag)` in
    /// either argument order, or `None` if never declared. Lookup never
    /// constructs.
    #[must_use]
    pub fn get_item_item(
        &self,
        type_a: &str,
        type_b: &str,
        tag: &str,
    ) -> Option<Rc<ItemToItem>> {
        self.item_item.get(&PairKey::new(type_a, type_b, tag)).cloned()
    }

    /// Whether `(type_a, type_b, tag)` is declared, in either argument
    /// order.
    #[must_use]
    pub fn item_item_exists(&self, type_a: &str, type_b: &str, tag: &str) -> bool {
        self.item_item.contains_key(&PairKey::new(type_a, type_b, tag))
    }

    /// Declare an item-principal relationship for `item_type` under
    /// `tag`, returning the store servicing it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateItemPrincipal`] when the key is
    /// already declared, or a [`StoreError`] from construction.
    pub fn declare_item_principal(
        &mut self,
        item_type: &str,
        tag: &str,
    ) -> Result<Rc<ItemToPrincipal>, RegistryError> {
        let key = PrincipalKey::new(item_type, tag);
        if self.item_principal.contains_key(&key) {
            return Err(RegistryError::DuplicateItemPrincipal {
                item_type: key.item_type,
                tag: key.tag,
            });
        }

        let store = Rc::new(
            ItemToPrincipal::new(Rc::clone(&self.conn), Rc::clone(&self.types), item_type, tag)?
                .strict_inserts(self.strict_inserts),
        );
        tracing::debug!(item_type, tag, "declared item-principal relationship");
        self.item_principal.insert(key, Rc::clone(&store));
        Ok(store)
    }

    /// The store previously declared for `(item_type, tag)`, or `None`
    /// if never declared. Lookup never constructs.
    #[must_use]
    pub fn get_item_principal(&self, item_type: &str, tag: &str) -> Option<Rc<ItemToPrincipal>> {
        self.item_principal
            .get(&PrincipalKey::new(item_type, tag))
            .cloned()
    }

    /// Whether `(item_type, tag)` is declared.
    #[must_use]
    pub fn item_principal_exists(&self, item_type: &str, tag: &str) -> bool {
        self.item_principal
            .contains_key(&PrincipalKey::new(item_type, tag))
    }
}
