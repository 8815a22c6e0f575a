//! Record entity - One row per CRM record in the local store.
//!
//! The local store mirrors the hosted backend's generic shape: every table
//! shares this one SQL table, and the entity-specific fields live in a JSON
//! object. `Id`, `CreatedOn` and `ModifiedOn` are kept as real columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored record
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "records")]
pub struct Model {
    /// Backend identifier, unique across all tables
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Backend table the record belongs to (e.g. `"deal_c"`)
    pub table_name: String,
    /// Field map without `Id`, `CreatedOn` and `ModifiedOn`
    pub fields: Json,
    /// When the record was created
    pub created_on: DateTimeUtc,
    /// When the record was last written
    pub modified_on: DateTimeUtc,
}

/// Records reference each other through JSON fields only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
