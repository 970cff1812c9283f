//! Document storage, the rich-text editing model and background tasks

pub mod assist;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod filter;
pub mod markup;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod store;
pub mod surface;
pub mod tasks;
pub mod toolbar;
