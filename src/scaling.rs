//! Preview-size selection strategies.
//!
//! A strategy scores every supported camera resolution against the desired
//! viewport and produces a best-to-worst ordering. Scores are in `[0, 1]`
//! with 1.0 for an exact match; a zero-area candidate or viewport scores 0
//! and sorts last.

use std::cmp::Ordering;

use crate::types::Size;

pub trait PreviewScalingStrategy {
    /// Score a candidate resolution against the desired viewport.
    /// Higher is better.
    fn score(&self, candidate: Size, desired: Size) -> f32;

    /// Order candidates from best to worst fit.
    ///
    /// Returns a fresh permutation of `sizes`; the input is not mutated.
    /// The sort is stable, so candidates with identical scores keep their
    /// relative input order.
    fn best_preview_order(&self, sizes: &[Size], desired: Size) -> Vec<Size> {
        let mut ordered: Vec<Size> = sizes.to_vec();
        ordered.sort_by(|a, b| {
            let a_score = self.score(*a, desired);
            let b_score = self.score(*b, desired);
            b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
        });
        log::trace!("preview order for {}: {:?}", desired, ordered);
        ordered
    }

    /// The best matching candidate, if any.
    fn best_preview_size(&self, sizes: &[Size], desired: Size) -> Option<Size> {
        self.best_preview_order(sizes, desired).first().copied()
    }
}

/// Prefers sizes that fill the viewport with as little excess as possible.
///
/// The candidate is scaled (aspect preserved) until it covers the desired
/// viewport. Downscaling is scored by the scale ratio directly, upscaling
/// slightly worse; the area cropped away beyond the viewport is penalized
/// linearly.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterCropStrategy;

impl PreviewScalingStrategy for CenterCropStrategy {
    fn score(&self, candidate: Size, desired: Size) -> f32 {
        if candidate.width == 0 || candidate.height == 0 {
            return 0.0;
        }
        // A degenerate viewport would make the ratios below divide by zero.
        if desired.width == 0 || desired.height == 0 {
            return 0.0;
        }
        let scaled = candidate.scale_crop(desired);
        let scale_ratio = scaled.width as f32 / candidate.width as f32;
        let scale_score = if scale_ratio > 1.0 {
            (1.0 / scale_ratio).powf(1.1)
        } else {
            scale_ratio
        };

        // Share of the scaled frame that survives the crop.
        let crop_ratio = (desired.width as f32 / scaled.width as f32)
            * (desired.height as f32 / scaled.height as f32);

        scale_score * crop_ratio
    }
}

/// Prefers sizes that fit inside the viewport with as little letterboxing
/// as possible.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitCenterStrategy;

impl PreviewScalingStrategy for FitCenterStrategy {
    fn score(&self, candidate: Size, desired: Size) -> f32 {
        if candidate.width == 0 || candidate.height == 0 {
            return 0.0;
        }
        if desired.width == 0 || desired.height == 0 {
            return 0.0;
        }
        let scaled = candidate.scale_fit(desired);
        let scale_ratio = scaled.width as f32 / candidate.width as f32;
        let scale_score = if scale_ratio > 1.0 {
            (1.0 / scale_ratio).powf(1.1)
        } else {
            scale_ratio
        };

        // Share of the viewport the scaled frame actually covers.
        let fit_ratio = (scaled.width as f32 / desired.width as f32)
            * (scaled.height as f32 / desired.height as f32);

        scale_score * fit_ratio
    }
}
