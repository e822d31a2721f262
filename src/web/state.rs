use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::{config::Config, mailer::Mailer, store::RecordStore};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<RecordStore>,
    mailer: Option<Mailer>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let mailer = config
            .mail
            .as_ref()
            .map(Mailer::from_config)
            .transpose()
            .context("failed to initialize SMTP mailer")?;

        if mailer.is_some() {
            info!("SMTP configured; registration notifications enabled");
        } else {
            info!("SMTP not configured; registration notifications disabled");
        }

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(RecordStore::new()),
            mailer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn mailer(&self) -> Option<&Mailer> {
        self.mailer.as_ref()
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by a temporary staging directory and no mailer.
    pub fn for_tests(upload_dir: std::path::PathBuf) -> Self {
        let config = Config {
            port: 0,
            upload_dir,
            frontend_dir: std::path::PathBuf::from("frontend"),
            max_upload_bytes: 1024 * 1024,
            mail: None,
        };
        Self::new(config).expect("test state")
    }
}
