//! Canonical SQLite schema for the relationship tables.
//!
//! Both tables are shared across every declaration of their shape: a row
//! carries only the two identifiers and the relationship tag (`type`).
//! The declared entity types are never persisted per row, so the tag is
//! the only stored namespace boundary; entity-type scoping happens at
//! query time against the host's type registry.

/// Migration v1: the two relationship tables plus reverse-lookup indexes.
///
/// The three-column primary keys provide the uniqueness guarantee that
/// makes `INSERT OR IGNORE` an idempotent add. Item-item rows are kept
/// in canonical `(id1 <= id2)` order so each unordered pair occupies
/// exactly one row.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS item_item_relationships (
    id1 INTEGER NOT NULL,
    id2 INTEGER NOT NULL,
    type TEXT NOT NULL CHECK (length(trim(type)) > 0),
    PRIMARY KEY (id1, id2, type),
    CHECK (id1 <= id2)
);

CREATE TABLE IF NOT EXISTS item_principal_relationships (
    item_id INTEGER NOT NULL,
    principal_id INTEGER NOT NULL,
    type TEXT NOT NULL CHECK (length(trim(type)) > 0),
    PRIMARY KEY (item_id, principal_id, type)
);

CREATE INDEX IF NOT EXISTS idx_item_item_reverse
    ON item_item_relationships(id2, type, id1);

CREATE INDEX IF NOT EXISTS idx_item_principal_reverse
    ON item_principal_relationships(principal_id, type, item_id);
"#;

/// Indexes expected by the reverse-lookup query paths.
pub const REQUIRED_INDEXES: &[&str] = &["idx_item_item_reverse", "idx_item_principal_reverse"];
