//! Main module for tokenfold library functionality

pub mod assembly;
pub mod config;
pub mod error;
pub mod node;
pub mod parser;
pub mod registry;
pub mod sequence;
pub mod source;
pub mod testing;
pub mod token;
pub mod validate;
pub mod view;

pub use error::{Error, Result};
