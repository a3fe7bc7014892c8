//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.
//!
//! All catalog tables are guild-scoped: a `guild_id` column is the tenancy
//! boundary, and name uniqueness is enforced per guild by unique indexes
//! created in [`crate::config::database`].

pub mod bank_account;
pub mod category;
pub mod food;

// Re-export specific types to avoid conflicts
pub use bank_account::{
    Column as BankAccountColumn, Entity as BankAccount, Model as BankAccountModel,
};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use food::{Column as FoodColumn, Entity as Food, Model as FoodModel};
