// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image compression optimizer — find the sharpest JPEG that fits a byte budget.
//
// JPEG size grows monotonically with quality at a fixed resolution, so the
// quality for each scale is binary-searched. Sharpness is not monotonic in
// resolution once the budget is fixed, so the small scale set is swept and
// the candidates are ranked by Laplacian variance.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use kompakt_core::config::ImageSearchConfig;
use kompakt_core::error::{KompaktError, Result};
use kompakt_core::types::{AssetKind, TargetSize};
use tracing::{debug, info, instrument, warn};

use super::raster::{ColorMode, RasterImage};
use super::sharpness;
use crate::workspace::{CandidateWorkspace, StagedFile, sibling_output};

/// How the winning encoding was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// The source already fit; re-encoded once at the fast-path quality.
    FastPath,
    /// Won the scale sweep.
    Searched,
    /// Nothing fit; last-resort small encoding, possibly over budget.
    Fallback,
}

/// One trial encoding that made it past the quality search.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Linear scale factor applied to the source dimensions.
    pub scale: f32,
    pub width: u32,
    pub height: u32,
    /// JPEG quality the encoding was made at.
    pub quality: u8,
    /// Encoded size in bytes.
    pub size: u64,
    /// Laplacian variance of the decoded encoding. Higher is sharper.
    pub sharpness: f64,
}

/// Result of one optimizer invocation.
#[derive(Debug, Clone)]
pub struct ImageOptimization {
    /// Where the winning JPEG was written.
    pub output: PathBuf,
    pub strategy: SearchStrategy,
    pub winner: Candidate,
    /// Every fitting candidate the sweep scored, in scale order.
    pub explored: Vec<Candidate>,
    /// Size of the source file in bytes.
    pub source_size: u64,
    pub target: TargetSize,
}

impl ImageOptimization {
    /// False only when the fallback encoding overshot the budget.
    pub fn within_budget(&self) -> bool {
        self.target.fits(self.winner.size)
    }
}

/// Highest fitting quality found by [`search_quality`], with its encoding.
#[derive(Debug, Clone)]
pub struct QualityFit {
    pub quality: u8,
    /// The encoding made at `quality`, kept so it is not redone.
    pub bytes: Vec<u8>,
}

/// Binary-search `qualities` for the highest quality whose encoding fits.
///
/// Assumes encoded size is non-decreasing in quality. Returns `None` when even
/// the lowest quality exceeds the budget.
pub fn search_quality<F>(
    qualities: RangeInclusive<u8>,
    target: TargetSize,
    mut encode: F,
) -> Result<Option<QualityFit>>
where
    F: FnMut(u8) -> Result<Vec<u8>>,
{
    let mut low = *qualities.start() as i32;
    let mut high = *qualities.end() as i32;
    let mut best: Option<QualityFit> = None;

    while low <= high {
        let mid = (low + high) / 2;
        let bytes = encode(mid as u8)?;
        if target.fits(bytes.len() as u64) {
            best = Some(QualityFit {
                quality: mid as u8,
                bytes,
            });
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }

    Ok(best)
}

/// A candidate together with the staged file backing it.
struct Staged {
    candidate: Candidate,
    file: StagedFile,
}

/// Size-budgeted JPEG optimizer.
pub struct ImageOptimizer {
    config: ImageSearchConfig,
}

impl Default for ImageOptimizer {
    fn default() -> Self {
        Self::new(ImageSearchConfig::default())
    }
}

impl ImageOptimizer {
    /// Optimizer driven by `config`. Use `Default` for the stock search.
    pub fn new(config: ImageSearchConfig) -> Self {
        Self { config }
    }

    /// Optimize `source`, writing `<stem>.compressed.jpg` next to it.
    pub fn optimize(&self, source: &Path, target: TargetSize) -> Result<ImageOptimization> {
        let output = sibling_output(source, "compressed", "jpg");
        self.optimize_to(source, target, &output)
    }

    /// Optimize `source` into `output`.
    ///
    /// Only a missing, undecodable or PDF source is an error. An unreachable
    /// budget still yields a valid JPEG through the fallback encoding.
    #[instrument(skip_all, fields(source = %source.display(), target = target.bytes()))]
    pub fn optimize_to(
        &self,
        source: &Path,
        target: TargetSize,
        output: &Path,
    ) -> Result<ImageOptimization> {
        AssetKind::ensure(source, |kind| kind.is_raster())?;
        let source_size = std::fs::metadata(source)?.len();
        let original = RasterImage::open(source)?;
        let workspace = CandidateWorkspace::beside(output)?;

        info!(
            width = original.width(),
            height = original.height(),
            source_size,
            "Optimizing image"
        );

        if target.bytes() > 0 && target.fits(source_size) {
            let staged = self.fast_path(&original, &workspace)?;
            let strategy = SearchStrategy::FastPath;
            return finish(staged, strategy, Vec::new(), output, source_size, target);
        }

        let mut explored = Vec::new();
        let best = if target.bytes() == 0 {
            warn!("Zero byte budget, skipping the search");
            None
        } else {
            self.sweep(&original, target, &workspace, &mut explored)?
        };

        match best {
            Some(staged) => {
                finish(staged, SearchStrategy::Searched, explored, output, source_size, target)
            }
            None => {
                let unsatisfiable = KompaktError::ConstraintUnsatisfiable {
                    target_bytes: target.bytes(),
                };
                warn!(%unsatisfiable, "Using fallback encoding");
                let staged = self.fallback(&original, &workspace)?;
                finish(staged, SearchStrategy::Fallback, explored, output, source_size, target)
            }
        }
    }

    /// Re-encode once at high quality without resizing.
    fn fast_path(&self, original: &RasterImage, workspace: &CandidateWorkspace) -> Result<Staged> {
        let quality = self.config.fast_path_quality;
        debug!(quality, "Source already within budget");
        let rgb = original.clone().with_color_mode(ColorMode::Rgb);
        let bytes = rgb.to_jpeg_bytes(quality)?;
        stage_candidate(workspace, 1.0, &rgb, quality, bytes)
    }

    /// Fold over the scale sequence, carrying the sharpest candidate so far.
    /// Replaced candidates drop, which deletes their staged files.
    fn sweep(
        &self,
        original: &RasterImage,
        target: TargetSize,
        workspace: &CandidateWorkspace,
        explored: &mut Vec<Candidate>,
    ) -> Result<Option<Staged>> {
        self.config
            .scales
            .iter()
            .try_fold(None, |best: Option<Staged>, &scale| -> Result<Option<Staged>> {
                let Some(challenger) = self.explore_scale(original, scale, target, workspace)?
                else {
                    return Ok(best);
                };
                explored.push(challenger.candidate.clone());

                let keep_current = best.as_ref().is_some_and(|current| {
                    current.candidate.sharpness >= challenger.candidate.sharpness
                });
                Ok(Some(match best {
                    Some(current) if keep_current => current,
                    _ => {
                        debug!(
                            scale,
                            quality = challenger.candidate.quality,
                            sharpness = challenger.candidate.sharpness,
                            "New best candidate"
                        );
                        challenger
                    }
                }))
            })
    }

    /// Whether the width floor applies to this budget.
    fn width_floor_applies(&self, target: TargetSize) -> bool {
        target.bytes() > self.config.small_budget_bytes
    }

    /// Resize to `scale` and search the quality range at that resolution.
    fn explore_scale(
        &self,
        original: &RasterImage,
        scale: f32,
        target: TargetSize,
        workspace: &CandidateWorkspace,
    ) -> Result<Option<Staged>> {
        let (width, height) = original.scaled_dimensions(scale);
        if width < self.config.min_width && self.width_floor_applies(target) {
            debug!(scale, width, min_width = self.config.min_width, "Scale below width floor");
            return Ok(None);
        }

        let resized = original
            .resize_exact(width, height)
            .with_color_mode(ColorMode::Rgb);
        let qualities = self.config.min_quality..=self.config.max_quality;
        let fit = search_quality(qualities, target, |quality| resized.to_jpeg_bytes(quality))?;

        match fit {
            Some(fit) => {
                debug!(
                    scale,
                    width,
                    height,
                    quality = fit.quality,
                    size = fit.bytes.len(),
                    "Scale fits"
                );
                stage_candidate(workspace, scale, &resized, fit.quality, fit.bytes).map(Some)
            }
            None => {
                debug!(scale, width, height, "Nothing fits at the quality floor");
                Ok(None)
            }
        }
    }

    /// Fixed-width, low-quality encoding used when no scale fits.
    fn fallback(&self, original: &RasterImage, workspace: &CandidateWorkspace) -> Result<Staged> {
        let width = self.config.fallback_width;
        let height = original.height_for_width(width);
        let quality = self.config.fallback_quality;
        let resized = original
            .resize_exact(width, height)
            .with_color_mode(ColorMode::Rgb);
        let bytes = resized.to_jpeg_bytes(quality)?;
        let scale = width as f32 / original.width().max(1) as f32;
        stage_candidate(workspace, scale, &resized, quality, bytes)
    }
}

/// Score an encoding and stage its bytes in the workspace.
fn stage_candidate(
    workspace: &CandidateWorkspace,
    scale: f32,
    image: &RasterImage,
    quality: u8,
    bytes: Vec<u8>,
) -> Result<Staged> {
    let candidate = Candidate {
        scale,
        width: image.width(),
        height: image.height(),
        quality,
        size: bytes.len() as u64,
        sharpness: sharpness::score(&bytes)?,
    };
    let file = workspace.stage(&bytes)?;
    Ok(Staged { candidate, file })
}

fn finish(
    staged: Staged,
    strategy: SearchStrategy,
    explored: Vec<Candidate>,
    output: &Path,
    source_size: u64,
    target: TargetSize,
) -> Result<ImageOptimization> {
    let output = staged.file.promote(output)?;
    info!(
        ?strategy,
        width = staged.candidate.width,
        height = staged.candidate.height,
        quality = staged.candidate.quality,
        size = staged.candidate.size,
        within_budget = target.fits(staged.candidate.size),
        "Image optimized"
    );
    Ok(ImageOptimization {
        output,
        strategy,
        winner: staged.candidate,
        explored,
        source_size,
        target,
    })
}
