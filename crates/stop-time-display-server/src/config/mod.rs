pub mod hub;
pub mod settings;

pub use hub::HubConfig;
pub use settings::{AuthConfig, ServerConfig, Settings};
