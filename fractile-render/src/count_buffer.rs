use crate::sink::ResultSink;

/// Full-frame store of per-pixel escape counts.
///
/// The raw output of a render before any coloring — keeping counts
/// rather than pixels means a palette change is a cheap re-colorize
/// with no recomputation. Freshly created frames read as all-interior.
#[derive(Debug, Clone)]
pub struct CountBuffer {
    pub width: u32,
    pub height: u32,
    /// The interior sentinel value for this frame (the `max_iterations`
    /// the counts were computed with).
    pub max_iterations: u32,
    /// Row-major escape counts, `width × height` entries.
    pub data: Vec<u32>,
}

impl CountBuffer {
    pub fn new(width: u32, height: u32, max_iterations: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            max_iterations,
            data: vec![max_iterations; size],
        }
    }

    /// Copy a block of counts into place, clipping whatever overhangs
    /// the right or bottom frame edge.
    pub fn blit(&mut self, x: u32, y: u32, block_w: u32, block_h: u32, counts: &[u32]) {
        debug_assert!(counts.len() >= block_w as usize * block_h as usize);
        if x >= self.width {
            return;
        }
        let copy_w = block_w.min(self.width - x) as usize;
        for row in 0..block_h {
            let frame_y = y + row;
            if frame_y >= self.height {
                break;
            }
            let dst = (frame_y * self.width + x) as usize;
            let src = (row * block_w) as usize;
            self.data[dst..dst + copy_w].copy_from_slice(&counts[src..src + copy_w]);
        }
    }
}

impl ResultSink for CountBuffer {
    fn accept(&mut self, x: u32, y: u32, width: u32, height: u32, counts: &[u32]) {
        self.blit(x, y, width, height, counts);
    }
}
