//! Food category entity - A named, guild-scoped grouping of foods.
//!
//! Categories are managed through the `/food category` wizard. Deleting a
//! category cascades to its foods (see the relation on [`super::food`]).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Food category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "food_category")]
pub struct Model {
    /// Generated 15-character short identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Discord guild (server) this category belongs to
    pub guild_id: String,
    /// Category name, unique within the guild
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// When the category was created
    pub created_at: DateTime,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category owns many foods
    #[sea_orm(has_many = "super::food::Entity")]
    Food,
}

impl Related<super::food::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Food.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
