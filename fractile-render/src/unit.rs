use fractile_core::Viewport;

/// One rectangular block of canvas handed to a compute worker.
///
/// Self-describing: it carries its own generation tag, canvas position,
/// and the plane bounds of its corners, so a completion can be placed —
/// or discarded — no matter when or in what order it arrives. Immutable
/// once produced, consumed exactly once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkUnit {
    /// The generation this unit was produced for. Echoed verbatim in
    /// the result; the scheduler compares it against the current
    /// generation to recognise stale work.
    pub generation: u64,

    /// Canvas x of the block's left edge, in pixels.
    pub x: u32,

    /// Canvas y of the block's top edge, in pixels.
    pub y: u32,

    /// Block width in pixels. Always the configured block size, even at
    /// the right canvas edge.
    pub width: u32,

    /// Block height in pixels. Always the configured block size, even
    /// at the bottom canvas edge.
    pub height: u32,

    /// Plane coordinate of the block's top-left corner (real part).
    pub r_start: f64,

    /// Plane coordinate of the block's bottom-right corner (real part).
    pub r_end: f64,

    /// Plane coordinate of the block's top-left corner (imaginary
    /// part). Numerically the larger of the pair: pixel y grows
    /// downward while the imaginary axis grows upward.
    pub i_start: f64,

    /// Plane coordinate of the block's bottom-right corner (imaginary part).
    pub i_end: f64,
}

impl WorkUnit {
    /// Samples in this unit.
    pub fn sample_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Lazy, one-shot producer of the work units covering one generation.
///
/// An explicit cursor rather than an iterator chain: the scheduler pulls
/// exactly one unit whenever a worker frees up, and dropping the cursor
/// on cancel abandons the remainder without ever materialising it.
/// Blocks are walked in row-major order. Once exhausted the cursor stays
/// exhausted — a new generation gets a new cursor.
#[derive(Debug)]
pub struct TileCursor {
    generation: u64,
    viewport: Viewport,
    block_size: u32,
    next_x: u32,
    next_y: u32,
}

impl TileCursor {
    pub fn new(generation: u64, viewport: Viewport, block_size: u32) -> Self {
        debug_assert!(block_size > 0);
        Self {
            generation,
            viewport,
            block_size,
            next_x: 0,
            next_y: 0,
        }
    }

    /// Produce the next unit, or `None` when the canvas is covered.
    pub fn next_unit(&mut self) -> Option<WorkUnit> {
        if self.next_y >= self.viewport.height {
            return None;
        }

        let (x, y) = (self.next_x, self.next_y);
        let b = self.block_size;
        let top_left = self.viewport.subpixel_to_complex(x as f64, y as f64);
        let bottom_right = self
            .viewport
            .subpixel_to_complex((x + b) as f64, (y + b) as f64);

        self.next_x += b;
        if self.next_x >= self.viewport.width {
            self.next_x = 0;
            self.next_y += b;
        }

        Some(WorkUnit {
            generation: self.generation,
            x,
            y,
            width: b,
            height: b,
            r_start: top_left.re,
            r_end: bottom_right.re,
            i_start: top_left.im,
            i_end: bottom_right.im,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(width: u32, height: u32, block: u32) -> Vec<WorkUnit> {
        let vp = Viewport::home(width, height);
        let mut cursor = TileCursor::new(7, vp, block);
        let mut units = Vec::new();
        while let Some(u) = cursor.next_unit() {
            units.push(u);
        }
        units
    }

    #[test]
    fn covers_every_pixel_at_least_once() {
        for (w, h, b) in [(200u32, 150u32, 64u32), (128, 128, 128), (10, 10, 3), (500, 20, 128)] {
            let units = collect(w, h, b);
            let mut covered = vec![false; (w * h) as usize];
            for u in &units {
                for py in u.y..(u.y + u.height).min(h) {
                    for px in u.x..(u.x + u.width).min(w) {
                        covered[(py * w + px) as usize] = true;
                    }
                }
            }
            assert!(
                covered.iter().all(|&c| c),
                "{w}×{h} block {b}: uncovered pixels remain"
            );
        }
    }

    #[test]
    fn unit_count_matches_grid() {
        let units = collect(200, 150, 64);
        assert_eq!(units.len(), (200_u32.div_ceil(64) * 150_u32.div_ceil(64)) as usize);
    }

    #[test]
    fn units_are_full_blocks_even_at_edges() {
        for u in collect(200, 150, 64) {
            assert_eq!(u.width, 64);
            assert_eq!(u.height, 64);
        }
    }

    #[test]
    fn row_major_order() {
        let units = collect(300, 200, 100);
        let positions: Vec<(u32, u32)> = units.iter().map(|u| (u.x, u.y)).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (100, 0), (200, 0), (0, 100), (100, 100), (200, 100)]
        );
    }

    #[test]
    fn all_units_tagged_with_generation() {
        assert!(collect(256, 256, 64).iter().all(|u| u.generation == 7));
    }

    #[test]
    fn exhausted_cursor_stays_exhausted() {
        let mut cursor = TileCursor::new(1, Viewport::home(64, 64), 64);
        assert!(cursor.next_unit().is_some());
        assert!(cursor.next_unit().is_none());
        assert!(cursor.next_unit().is_none());
    }

    #[test]
    fn bounds_match_viewport_corners() {
        let vp = Viewport::home(800, 600);
        let mut cursor = TileCursor::new(1, vp, 128);
        let u = cursor.next_unit().unwrap();
        let tl = vp.subpixel_to_complex(0.0, 0.0);
        let br = vp.subpixel_to_complex(128.0, 128.0);
        assert_eq!(u.r_start, tl.re);
        assert_eq!(u.i_start, tl.im);
        assert_eq!(u.r_end, br.re);
        assert_eq!(u.i_end, br.im);
        assert!(u.i_start > u.i_end, "top edge has the larger imaginary part");
    }
}
