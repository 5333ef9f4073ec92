pub mod configuration;
pub mod errors;
pub mod generator;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod router;
pub mod sanitizer;
pub mod tool;
