//! Food entity - A catalog item belonging to one category.
//!
//! Foods optionally carry a relative path to an uploaded image on local disk;
//! the file's lifetime is tied to the row (replaced on edit, removed on
//! delete, both handled by the core layer).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Food database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "food")]
pub struct Model {
    /// Generated 15-character short identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Discord guild (server) this food belongs to
    pub guild_id: String,
    /// Owning category
    pub category_id: String,
    /// Food name, unique within (guild, category)
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Relative path of the uploaded image, if any
    pub image: Option<String>,
    /// Discord user id of the creator
    pub created_by: String,
    /// When the food was created
    pub created_at: DateTime,
}

/// Defines relationships between Food and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each food belongs to one category; deleting the category deletes it
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
