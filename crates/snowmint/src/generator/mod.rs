mod lock;
mod state;

pub use lock::*;
