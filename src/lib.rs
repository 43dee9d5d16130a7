#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod commands;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod logging;
pub mod logout;
pub mod probe;
pub mod registry;
