pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod form;
pub mod io;
pub mod paths;
pub mod prompt;
pub mod record;
pub mod render;
pub mod session;
pub mod types;

pub use error::{CasegenError, Result};
