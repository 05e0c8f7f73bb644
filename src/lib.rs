extern crate chrono;
extern crate colored;
extern crate serde;
extern crate serde_json;
extern crate uuid;

mod store;

pub mod command;
pub mod config;
pub mod demo;
pub mod error;
pub mod filter;
pub mod notice;
pub mod storage;
pub mod task;
pub mod time;
pub mod viewer;

pub use config::Config;
pub use store::*;
