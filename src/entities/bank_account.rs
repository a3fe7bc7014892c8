//! Bank account entity - A user-registered account reference.
//!
//! Created by `/bank add_account`. The bank *list* itself is not stored here;
//! it lives in the JSON cache maintained by [`crate::core::bank`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bank account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_account")]
pub struct Model {
    /// Generated 15-character short identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Discord guild (server) the account was registered in
    pub guild_id: String,
    /// Discord user id of the account owner
    pub user_id: String,
    /// Account holder name
    pub name: String,
    /// Bank short name (e.g. "VCB")
    pub short_name: String,
    /// When the account was registered
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
