pub mod config;
pub mod error;
pub mod money;
pub mod record;

pub use config::Config;
pub use error::*;
pub use money::*;
pub use record::*;
