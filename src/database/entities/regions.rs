use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "regions")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::crop_projections::Entity")]
    CropProjections,
    #[sea_orm(has_many = "super::animal_projections::Entity")]
    AnimalProjections,
    #[sea_orm(has_many = "super::bioenergy_projections::Entity")]
    BioenergyProjections,
    #[sea_orm(has_many = "super::land_cover_projections::Entity")]
    LandCoverProjections,
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            ..Default::default()
        }
    }
}
