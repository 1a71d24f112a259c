//! Collaborators that do the actual I/O for built-in commands and agent tools.
//!
//! The dispatcher and the agent share one [`Toolkit`], so a file created with
//! `create` is the same file the agent sees through `file_read`.

pub mod commands;
pub mod files;
pub mod web;

use std::sync::Arc;

pub use commands::{CliOperations, CommandResult};
pub use files::FileOperations;
pub use web::WebOperations;

use crate::config::AppConfig;
use crate::safety::SafetyLayer;

#[derive(Clone)]
pub struct Toolkit {
    pub files: Arc<FileOperations>,
    pub cli: Arc<CliOperations>,
    pub web: Arc<WebOperations>,
}

impl Toolkit {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let safety = SafetyLayer::new(config)?;
        let files = FileOperations::new(safety.guard().clone());

        Ok(Self {
            files: Arc::new(files),
            cli: Arc::new(CliOperations::new(safety)),
            web: Arc::new(WebOperations::new()?),
        })
    }
}
