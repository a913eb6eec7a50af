pub mod config;
pub mod counter;
pub mod model;
pub mod tagger;
mod context;
