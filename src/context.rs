use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters;
use crate::config::AppConfig;
use crate::core::transfer_engine::{self, TransferEngineType};
use crate::core::{DiscIdentifier, DiscIdentity, ResumableCopier};
use crate::disc::{DiscError, DiscReader, ReadRequest};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn copier(&self) -> ResumableCopier {
        self.copier_with(self.config.transfer_engine, self.config.verify)
    }

    pub fn copier_with(&self, engine: TransferEngineType, verify: bool) -> ResumableCopier {
        ResumableCopier::new(transfer_engine::create_engine(engine, &self.config.dd_path))
            .with_verification(verify)
    }

    pub fn identifier(&self) -> DiscIdentifier {
        DiscIdentifier::new(&self.config.isoinfo_path)
    }

    pub fn reader(&self) -> Result<Arc<dyn DiscReader>, DiscError> {
        adapters::get_reader(self.config.simulation)
    }

    /// Request for `device` carrying the configured KEYDB and title filtering.
    pub fn read_request(&self, device: impl Into<PathBuf>) -> ReadRequest {
        let mut request = ReadRequest::new(device).with_keydb(self.config.keydb.clone());
        request.title_filter = self.config.title_filter;
        request.min_title_length = self.config.min_title_length;
        request
    }

    /// Where `rip` writes the image for `identity`. Path separators in the
    /// volume id are replaced so the image stays inside the output directory.
    pub fn image_path(&self, identity: &DiscIdentity) -> PathBuf {
        let name: String = identity
            .label()
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.config.output_directory.join(format!("{name}.iso"))
    }
}
