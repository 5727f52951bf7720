//! Pieces shared by the four projection tables.
//!
//! The tables have identical columns, so reads go through [`ProjectionRow`]
//! and the column accessors of [`ProjectionColumns`] instead of each table's
//! own model.

use sea_orm::{EntityTrait, FromQueryResult};

/// A record produced by the ingestion job, not yet assigned to a table.
#[derive(Clone, Debug, PartialEq)]
pub struct NewProjection {
    pub uuid: String,
    pub region_id: i32,
    pub year: i32,
    pub value: f64,
    pub unit: String,
    pub item: String,
    pub variable: String,
}

#[derive(Clone, Debug, PartialEq, FromQueryResult)]
pub struct ProjectionRow {
    pub id: i32,
    pub uuid: String,
    pub region_id: i32,
    pub year: i32,
    pub value: f64,
    pub unit: String,
    pub item: String,
    pub variable: String,
}

pub trait ProjectionColumns: EntityTrait {
    fn region_id() -> Self::Column;
    fn year() -> Self::Column;
    fn value() -> Self::Column;
    fn item() -> Self::Column;
    fn variable() -> Self::Column;
}
