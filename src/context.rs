//! Startup-built application context shared by every request handler.
//! Built once, passed around as `Arc<AppContext>`; nothing in it is mutated after load
//! except the per-path render locks.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::info;

use crate::chart::{fonts, plan, ChartRequest, RenderLocks};
use crate::config::AppConfig;
use crate::data::{load_table, Table};
use crate::error::{ChartError, DataSourceError};

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub table: Table,
    pub render_locks: RenderLocks,
}

impl AppContext {
    /// Load the dataset named by `config`. A load failure must stop the process.
    pub fn load(config: AppConfig) -> Result<Arc<Self>, DataSourceError> {
        let table = load_table(&config.data_path)?;
        Ok(Self::with_table(config, table))
    }

    pub fn with_table(config: AppConfig, table: Table) -> Arc<Self> {
        fonts::ensure_font(config.font_path.as_deref());
        Arc::new(Self {
            config,
            table,
            render_locks: RenderLocks::new(),
        })
    }

    /// Resolve, render and write a chart. Returns the file path.
    pub fn render_chart(&self, request: &ChartRequest) -> Result<PathBuf, ChartError> {
        let plan = plan(&self.table, request)?;
        let path = plan.output_path(&self.config.image_dir);
        self.render_locks
            .with_path(&path, || plan.render(&self.config.image_dir))
    }

    /// Like [`render_chart`](Self::render_chart), but also reads the PNG back while the
    /// path lock is held so callers never see a half-written file.
    pub fn render_chart_bytes(&self, request: &ChartRequest) -> Result<Vec<u8>, ChartError> {
        let plan = plan(&self.table, request)?;
        let path = plan.output_path(&self.config.image_dir);
        self.render_locks.with_path(&path, || {
            let written = plan.render(&self.config.image_dir)?;
            let bytes = fs::read(&written)?;
            info!("serving {} bytes from '{}'", bytes.len(), written.display());
            Ok(bytes)
        })
    }
}
