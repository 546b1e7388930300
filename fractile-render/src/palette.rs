use rayon::prelude::*;

use fractile_core::KernelParams;

use crate::count_buffer::CountBuffer;
use crate::pixel_buffer::PixelBuffer;

/// Channel periods of the default banded coloring. Mutually coprime so
/// the bands drift against each other instead of repeating in lockstep.
pub const DEFAULT_PERIODS: [u32; 3] = [7, 5, 11];

/// Triangle-wave fold of `x` into `0..=255`.
///
/// Folds over a 512-wide window and mirrors the negative half, giving a
/// sawtooth that rises and falls instead of wrapping with a hard jump.
#[inline]
fn fold(x: u32) -> u8 {
    let v = ((x.wrapping_add(256) & 0x1ff) as i32) - 256;
    v.unsigned_abs().min(255) as u8
}

/// Precomputed escape-count → RGBA table.
///
/// One entry per count in `0..=max_iterations`. The final entry is the
/// reserved interior color and is forced to opaque black no matter what
/// the channel formula produces — "never escaped" must be visually
/// distinct from "escaped on the last allowed iteration". Immutable
/// once built; construction is off the per-unit hot path, and workers
/// share the table read-only without synchronisation.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    max_iterations: u32,
    colors: Vec<[u8; 4]>,
}

impl Palette {
    /// Build the banded default coloring for the given parameters.
    pub fn new(params: &KernelParams) -> Self {
        Self::with_periods(params, DEFAULT_PERIODS)
    }

    /// Build with custom per-channel periods.
    pub fn with_periods(params: &KernelParams, periods: [u32; 3]) -> Self {
        let max_iterations = params.max_iterations;
        let mut colors: Vec<[u8; 4]> = (0..=max_iterations)
            .map(|k| {
                [
                    fold(periods[0].wrapping_mul(k)),
                    fold(periods[1].wrapping_mul(k)),
                    fold(periods[2].wrapping_mul(k)),
                    255,
                ]
            })
            .collect();
        // Reserved interior entry.
        colors[max_iterations as usize] = [0, 0, 0, 255];
        Self {
            max_iterations,
            colors,
        }
    }

    /// The interior sentinel this palette was built for.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Number of entries (`max_iterations + 1`).
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Look up the color for one escape count. Counts beyond the
    /// sentinel clamp to the interior entry.
    #[inline]
    pub fn color(&self, count: u32) -> [u8; 4] {
        self.colors[count.min(self.max_iterations) as usize]
    }

    /// Colorize a whole count frame into an RGBA image.
    ///
    /// Parallel over pixels; this is what makes switching palettes on a
    /// finished frame cheap compared to recomputing the counts.
    pub fn colorize(&self, frame: &CountBuffer) -> PixelBuffer {
        let mut pixels = vec![0u8; frame.data.len() * 4];
        pixels
            .par_chunks_mut(4)
            .zip(frame.data.par_iter())
            .for_each(|(pixel, &count)| {
                pixel.copy_from_slice(&self.color(count));
            });
        PixelBuffer {
            width: frame.width,
            height: frame.height,
            pixels,
        }
    }
}
