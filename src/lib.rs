// Veracity: fake news classification
//
// This is the library root. Each module corresponds to a stage of the
// classification pipeline or to the boundary around it.

pub mod config;
pub mod db;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod text;

#[cfg(feature = "web")]
pub mod web;
