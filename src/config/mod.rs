/// Local store connection and table creation
pub mod database;

/// Settings loaded from `pipeline-desk.toml`
pub mod settings;

/// Hosted backend credentials from environment variables
pub mod credentials;
