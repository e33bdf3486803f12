// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — raster codec, sharpness scoring and the size-budgeted optimizer.

pub mod optimizer;
pub mod raster;
pub mod sharpness;

pub use optimizer::{Candidate, ImageOptimization, ImageOptimizer, SearchStrategy};
pub use raster::{ColorMode, RasterImage};
