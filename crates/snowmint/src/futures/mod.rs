mod sleep_provider;
mod snowflake;
mod tokio;

pub use sleep_provider::*;
pub use snowflake::*;
pub use tokio::*;
