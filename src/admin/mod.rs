//! Admin module - Authorization and operator mutations

mod controller;

pub use controller::*;
