pub mod schema;
pub mod store;

pub use schema::{GuardConfig, ServiceConfig, Settings};
pub use store::{FileSettingsProvider, SettingsProvider, SharedSettings};
