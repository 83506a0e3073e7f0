//! JSON-RPC API Module
//!
//! Provides the HTTP interface to the chef's query and mutating surface.

mod methods;
mod server;

pub use methods::*;
pub use server::*;
