pub mod init;
pub mod projects;
pub mod prompt;
pub mod render;
pub mod ui;
