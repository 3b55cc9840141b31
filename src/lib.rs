pub mod args;
mod backup;
pub mod commands;
mod config;
mod db;
mod error;
pub mod model;
pub mod report;
#[cfg(test)]
mod test;
mod utils;

pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use model::Amount;
