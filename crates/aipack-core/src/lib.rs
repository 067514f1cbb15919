pub mod config;
pub mod enforcement;
pub mod error;
pub mod gate;
pub mod install;
pub mod io;
pub mod ledger;
pub mod paths;
pub mod timestamp;
pub mod types;

pub use error::{PackError, Result};
