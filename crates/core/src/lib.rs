pub mod category;
pub mod config;
pub mod definition;
pub mod error;

pub use category::*;
pub use config::EngineConfig;
pub use definition::*;
pub use error::*;
