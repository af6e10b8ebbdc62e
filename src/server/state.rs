//! Application state management

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::inference::CreditModel;

/// Whether a model is available for scoring
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(Arc<CreditModel>),
    Unloaded,
}

/// Application state shared across handlers. Read-only after startup.
#[derive(Debug)]
pub struct AppState {
    pub model: ModelState,
}

impl AppState {
    /// Load artifacts from `models_dir`.
    ///
    /// A missing or inconsistent artifact set leaves the service running in
    /// the unloaded state.
    pub fn new(models_dir: &Path) -> Self {
        let model = match CreditModel::load(models_dir) {
            Ok(model) => {
                info!(
                    run_id = %model.run_id(),
                    classifier = %model.kind(),
                    features = model.feature_names().len(),
                    "Model artifacts loaded"
                );
                ModelState::Ready(Arc::new(model))
            }
            Err(e) => {
                warn!(
                    models_dir = %models_dir.display(),
                    error = %e,
                    "Could not load model artifacts, serving without a model"
                );
                ModelState::Unloaded
            }
        };

        Self { model }
    }

    /// State around an already loaded model
    pub fn with_model(model: CreditModel) -> Self {
        Self {
            model: ModelState::Ready(Arc::new(model)),
        }
    }

    pub fn model(&self) -> Option<Arc<CreditModel>> {
        match &self.model {
            ModelState::Ready(model) => Some(Arc::clone(model)),
            ModelState::Unloaded => None,
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.model, ModelState::Ready(_))
    }
}
