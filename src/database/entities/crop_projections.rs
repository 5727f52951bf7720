use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use super::projection::{NewProjection, ProjectionColumns};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crop_projections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: String,
    pub region_id: i32,
    pub year: i32,
    pub value: f64,
    pub unit: String,
    pub item: String,
    pub variable: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::regions::Entity",
        from = "Column::RegionId",
        to = "super::regions::Column::Id",
        on_delete = "Restrict"
    )]
    Regions,
}

impl Related<super::regions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Regions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn from_new(record: &NewProjection) -> Self {
        Self {
            uuid: Set(record.uuid.clone()),
            region_id: Set(record.region_id),
            year: Set(record.year),
            value: Set(record.value),
            unit: Set(record.unit.clone()),
            item: Set(record.item.clone()),
            variable: Set(record.variable.clone()),
            ..Default::default()
        }
    }
}

impl ProjectionColumns for Entity {
    fn region_id() -> Column {
        Column::RegionId
    }

    fn year() -> Column {
        Column::Year
    }

    fn value() -> Column {
        Column::Value
    }

    fn item() -> Column {
        Column::Item
    }

    fn variable() -> Column {
        Column::Variable
    }
}
