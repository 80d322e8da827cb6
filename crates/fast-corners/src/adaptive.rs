//! Barrier feedback loop for keeping the corner count in a target band.
//!
//! The detector itself is stateless. A tracker that wants a steady number of
//! keypoints per frame owns an [`AdaptiveBarrier`], reports how many corners
//! the last call produced, and uses the returned barrier for the next call.
//! Because a higher barrier never yields more candidates, raising it when
//! there are too many corners and lowering it when there are too few moves
//! the count in the right direction.

use anyhow::{ensure, Result};
use fast_corners_core::{find_corners, FastParams, FastVariant, ImageView, ScoredCorner};
use serde::{Deserialize, Serialize};

/// Limits and step size for [`AdaptiveBarrier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdaptiveParams {
    /// Lower bound of the accepted corner count (inclusive).
    pub target_min: usize,
    /// Upper bound of the accepted corner count (inclusive).
    pub target_max: usize,
    /// Barrier change applied per update.
    pub step: u8,
    pub min_barrier: u8,
    pub max_barrier: u8,
    /// Maximum detection passes for [`detect_adaptive`] on a still image.
    pub iterations: u32,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            target_min: 200,
            target_max: 500,
            step: 2,
            min_barrier: 5,
            max_barrier: 120,
            iterations: 16,
        }
    }
}

impl AdaptiveParams {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.target_min <= self.target_max,
            "target_min ({}) must not exceed target_max ({})",
            self.target_min,
            self.target_max
        );
        ensure!(
            self.min_barrier <= self.max_barrier,
            "min_barrier ({}) must not exceed max_barrier ({})",
            self.min_barrier,
            self.max_barrier
        );
        ensure!(self.step > 0, "step must be >= 1");
        ensure!(self.iterations > 0, "iterations must be >= 1");
        Ok(())
    }
}

/// Caller-owned barrier state.
#[derive(Clone, Debug)]
pub struct AdaptiveBarrier {
    barrier: u8,
    params: AdaptiveParams,
}

impl AdaptiveBarrier {
    /// Start from `initial`, clamped into the configured barrier range.
    pub fn new(initial: u8, params: AdaptiveParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            barrier: initial.clamp(params.min_barrier, params.max_barrier),
            params,
        })
    }

    #[inline]
    pub fn barrier(&self) -> u8 {
        self.barrier
    }

    #[inline]
    pub fn params(&self) -> &AdaptiveParams {
        &self.params
    }

    /// True when `count` lies inside the target band.
    #[inline]
    pub fn in_target(&self, count: usize) -> bool {
        (self.params.target_min..=self.params.target_max).contains(&count)
    }

    /// Feed the corner count of the last call and return the barrier for the
    /// next one.
    pub fn update(&mut self, count: usize) -> u8 {
        let p = &self.params;
        let next = if count > p.target_max {
            self.barrier.saturating_add(p.step)
        } else if count < p.target_min {
            self.barrier.saturating_sub(p.step)
        } else {
            self.barrier
        };
        let next = next.clamp(p.min_barrier, p.max_barrier);
        if next != self.barrier {
            log::debug!(
                "barrier {} -> {} (count {}, target {}..={})",
                self.barrier,
                next,
                count,
                p.target_min,
                p.target_max
            );
        }
        self.barrier = next;
        next
    }
}

/// Outcome of [`detect_adaptive`].
#[derive(Clone, Debug)]
pub struct AdaptiveRun {
    pub corners: Vec<ScoredCorner>,
    /// Barrier used for the returned corners.
    pub barrier: u8,
    /// Number of detection passes performed.
    pub passes: u32,
    pub converged: bool,
}

/// Re-run detection on one image until the count lands in the target band,
/// the barrier stops moving, or the pass budget is spent.
pub fn detect_adaptive(
    img: &ImageView<'_>,
    variant: FastVariant,
    nonmax: bool,
    controller: &mut AdaptiveBarrier,
) -> AdaptiveRun {
    let max_passes = controller.params().iterations.max(1);
    let mut passes = 0;
    loop {
        let barrier = controller.barrier();
        let params = FastParams {
            variant,
            barrier,
            nonmax,
        };
        let corners = find_corners(img, &params);
        passes += 1;

        let converged = controller.in_target(corners.len());
        let next = controller.update(corners.len());
        if converged || next == barrier || passes >= max_passes {
            log::info!(
                "adaptive {}: {} corners at barrier {} after {} pass(es)",
                variant,
                corners.len(),
                barrier,
                passes
            );
            return AdaptiveRun {
                corners,
                barrier,
                passes,
                converged,
            };
        }
    }
}
