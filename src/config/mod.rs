/// Database connection and table/index creation
pub mod database;

/// Environment-driven application settings
pub mod settings;

pub use settings::AppConfig;
