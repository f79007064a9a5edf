pub mod app;
pub mod components;
pub mod logging;
pub mod models;
pub mod processing;

pub use models::EsrgupGui;
pub use models::*;
