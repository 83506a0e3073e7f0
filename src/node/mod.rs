//! Node module - Chef deployment, configuration and devnet bootstrap

mod args;
mod chef;
mod config;
mod devnet;

pub use args::*;
pub use chef::*;
pub use config::*;
pub use devnet::*;
