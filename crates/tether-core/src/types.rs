//! Entity-type capability supplied by the host system.

use std::collections::{HashMap, HashSet};

use crate::id::ItemId;

/// Host-supplied view of the entity-type registry.
///
/// Store constructors call [`type_exists`](Self::type_exists) once per
/// declared type and fail fast on unknown names. The query-side
/// membership filters and the opt-in strict insert mode call
/// [`id_belongs_to`](Self::id_belongs_to) per candidate id. Both must be
/// cheap and synchronous.
pub trait EntityTypes {
    /// Whether `name` is a registered entity type.
    fn type_exists(&self, name: &str) -> bool;

    /// Whether item `id` currently belongs to the entity type `name`.
    fn id_belongs_to(&self, id: ItemId, name: &str) -> bool;
}

/// In-memory entity-type table.
///
/// Hosts with their own type system implement [`EntityTypes`] directly;
/// this implementation serves tests and embedded setups where the set of
/// types and id assignments is known up front.
#[derive(Debug, Clone, Default)]
pub struct TypeSet {
    types: HashSet<String>,
    assignments: HashMap<i64, String>,
}

impl TypeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type name.
    pub fn register(&mut self, name: &str) -> &mut Self {
        self.types.insert(name.to_string());
        self
    }

    /// Assign an item id to an entity type. An id has at most one type;
    /// reassignment replaces the previous one.
    pub fn assign(&mut self, id: impl Into<ItemId>, name: &str) -> &mut Self {
        self.assignments.insert(id.into().get(), name.to_string());
        self
    }
}

impl EntityTypes for TypeSet {
    fn type_exists(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    fn id_belongs_to(&self, id: ItemId, name: &str) -> bool {
        self.assignments.get(&id.get()).is_some_and(|ty| ty == name)
    }
}
