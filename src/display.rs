//! Display-side preview configuration.

use std::fmt;
use std::sync::Arc;

use crate::scaling::{CenterCropStrategy, PreviewScalingStrategy};
use crate::types::Size;

/// Where and how the preview is shown: the viewfinder size the preview must
/// serve, and the scaling strategy used to rank the resolutions a device
/// offers. Handed to the device before `configure`.
#[derive(Clone)]
pub struct DisplayConfiguration {
    viewfinder_size: Option<Size>,
    strategy: Arc<dyn PreviewScalingStrategy + Send + Sync>,
}

impl DisplayConfiguration {
    pub fn new(viewfinder_size: Size) -> Self {
        Self {
            viewfinder_size: Some(viewfinder_size),
            strategy: Arc::new(CenterCropStrategy),
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn PreviewScalingStrategy + Send + Sync>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn viewfinder_size(&self) -> Option<Size> {
        self.viewfinder_size
    }

    /// The size the preview should ideally match.
    pub fn desired_preview_size(&self) -> Option<Size> {
        self.viewfinder_size
    }

    /// Rank the device's supported sizes, best fit first. Without a
    /// viewfinder size there is no preference and the input order is kept.
    pub fn best_preview_order(&self, sizes: &[Size]) -> Vec<Size> {
        match self.viewfinder_size {
            Some(desired) => self.strategy.best_preview_order(sizes, desired),
            None => sizes.to_vec(),
        }
    }

    pub fn best_preview_size(&self, sizes: &[Size]) -> Option<Size> {
        self.best_preview_order(sizes).first().copied()
    }
}

impl Default for DisplayConfiguration {
    fn default() -> Self {
        Self {
            viewfinder_size: None,
            strategy: Arc::new(CenterCropStrategy),
        }
    }
}

impl fmt::Debug for DisplayConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayConfiguration")
            .field("viewfinder_size", &self.viewfinder_size)
            .finish()
    }
}
