pub mod data_uri;
pub mod error;
pub mod language;
pub mod schema;
pub mod settings;
pub mod types;
