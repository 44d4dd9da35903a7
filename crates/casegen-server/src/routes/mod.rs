pub mod auth;
pub mod generate;
pub mod meta;
pub mod projects;
pub mod search;
