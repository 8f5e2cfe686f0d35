#[macro_use]
extern crate tracing;

pub mod backend;
pub mod cli;
pub mod config;
pub mod layout;
pub mod protocols;
pub mod utils;
pub mod window;
