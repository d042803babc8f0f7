pub mod chunker;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod export;
pub mod glossary;
pub mod history;
pub mod loader;
mod persist;
pub mod stats;
