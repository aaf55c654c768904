pub mod config;
pub mod generation;
pub mod manifest;
pub mod markup;
