use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::llm::OutlineClient;
use crate::storage::TempWorkspace;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub outlines: OutlineClient,
    /// Where uploads and rendered decks live for the length of a request.
    pub workspace: TempWorkspace,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let outlines = OutlineClient::new(&config.providers)?;
        let workspace = TempWorkspace::new(config.server.temp_dir.clone());

        Ok(Self {
            config: Arc::new(config),
            outlines,
            workspace,
        })
    }
}
