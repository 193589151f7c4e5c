pub mod config;
pub mod download;
pub mod generate;
pub mod providers;
