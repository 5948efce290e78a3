pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::HeraldConfig;
pub use error::{HeraldError, Result};
pub use events::DomainEvent;
pub use types::*;
