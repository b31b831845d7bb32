pub mod cmd;
pub mod error;
pub mod graph;
pub mod permissions;
pub mod progress;
pub mod prompts;
