#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod channel;
pub mod client;
mod error;
pub mod message;

pub use error::{Error, Result};
