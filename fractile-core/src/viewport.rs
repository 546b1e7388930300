use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// The region of the complex plane mapped onto the canvas.
///
/// Stored in center + scale form; `scale` is the plane extent of the
/// *average* canvas dimension, so the same viewport value describes the
/// same region at any aspect ratio. All pixel↔plane mapping lives here —
/// the scheduler and workers only ever see the bounds derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Centre of the view on the complex plane.
    pub center: Complex,

    /// Plane units spanned across `(width + height) / 2` pixels.
    pub scale: f64,

    /// Canvas width in pixels.
    pub width: u32,

    /// Canvas height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Home view: the whole set, centred on `-0.5 + 0i` at scale 3.5.
    pub fn home(width: u32, height: u32) -> Self {
        Self {
            center: Complex::new(-0.5, 0.0),
            scale: 3.5,
            width,
            height,
        }
    }

    pub fn new(center: Complex, scale: f64, width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("dimensions must be > 0, got {width}×{height}"),
            });
        }
        if scale <= 0.0 || !scale.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("scale must be positive and finite, got {scale}"),
            });
        }
        Ok(Self {
            center,
            scale,
            width,
            height,
        })
    }

    /// Plane span of the real axis across the full canvas width.
    ///
    /// Spans derive from the average of width and height rather than
    /// each axis independently, which keeps a square plane region square
    /// on screen whatever shape the canvas is.
    #[inline]
    fn r_span(&self) -> f64 {
        let avg = (self.width as f64 + self.height as f64) / 2.0;
        self.width as f64 / avg * self.scale
    }

    /// Plane span of the imaginary axis across the full canvas height.
    /// Negative: pixel y grows downward, imaginary values grow upward.
    #[inline]
    fn i_span(&self) -> f64 {
        let avg = (self.width as f64 + self.height as f64) / 2.0;
        -(self.height as f64) / avg * self.scale
    }

    /// Plane units covered by one pixel (same magnitude on both axes).
    #[inline]
    pub fn units_per_pixel(&self) -> f64 {
        let avg = (self.width as f64 + self.height as f64) / 2.0;
        self.scale / avg
    }

    /// Map fractional pixel coordinates to a point on the plane.
    ///
    /// `(0, 0)` is the canvas top-left corner; coordinates outside
    /// `[0, width] × [0, height]` extrapolate past the canvas, which is
    /// how overhanging edge tiles get their bounds.
    #[inline]
    pub fn subpixel_to_complex(&self, x: f64, y: f64) -> Complex {
        Complex::new(
            self.center.re + (x / self.width as f64 - 0.5) * self.r_span(),
            self.center.im + (y / self.height as f64 - 0.5) * self.i_span(),
        )
    }

    /// Map a whole-pixel coordinate to a point on the plane.
    #[inline]
    pub fn pixel_to_complex(&self, px: u32, py: u32) -> Complex {
        self.subpixel_to_complex(px as f64, py as f64)
    }

    /// Inverse mapping: plane point to (fractional) pixel coordinates.
    /// Resolves a click or tap back into canvas space.
    #[inline]
    pub fn complex_to_pixel(&self, c: Complex) -> (f64, f64) {
        (
            ((c.re - self.center.re) / self.r_span() + 0.5) * self.width as f64,
            ((c.im - self.center.im) / self.i_span() + 0.5) * self.height as f64,
        )
    }

    /// Translate the view by a plane-space delta.
    #[must_use]
    pub fn panned(&self, delta_r: f64, delta_i: f64) -> Self {
        Self {
            center: self.center + Complex::new(delta_r, delta_i),
            ..*self
        }
    }

    /// Translate the view by a pixel-space drag delta.
    ///
    /// Dragging the content right (`dx > 0`) exposes plane to the left,
    /// so the centre moves in the opposite direction.
    #[must_use]
    pub fn panned_pixels(&self, dx: f64, dy: f64) -> Self {
        let upp = self.units_per_pixel();
        Self {
            center: Complex::new(self.center.re - dx * upp, self.center.im + dy * upp),
            ..*self
        }
    }

    /// Re-centre on `target` and multiply the scale by `factor`
    /// (`factor < 1` zooms in, `> 1` zooms out).
    #[must_use]
    pub fn zoomed(&self, target: Complex, factor: f64) -> Self {
        Self {
            center: target,
            scale: self.scale * factor,
            ..*self
        }
    }

    /// Same plane centre and scale on a different canvas. The
    /// average-dimension span formula keeps the aspect ratio correct
    /// without any further adjustment.
    pub fn resized(&self, width: u32, height: u32) -> crate::Result<Self> {
        Self::new(self.center, self.scale, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn corner_mapping_800x600() {
        // Reference view: centre (-0.5, 0), scale 3.5 on an 800×600
        // canvas spans exactly [-2.5, 1.5] × [-1.5, 1.5].
        let vp = Viewport::home(800, 600);

        let tl = vp.pixel_to_complex(0, 0);
        assert!(approx(tl.re, -2.5));
        assert!(approx(tl.im, 1.5));

        let br = vp.pixel_to_complex(800, 600);
        assert!(approx(br.re, 1.5));
        assert!(approx(br.im, -1.5));
    }

    #[test]
    fn center_pixel_maps_to_center() {
        let vp = Viewport::new(Complex::new(0.25, -0.7), 2.0, 640, 480).unwrap();
        let c = vp.subpixel_to_complex(320.0, 240.0);
        assert!(approx(c.re, 0.25));
        assert!(approx(c.im, -0.7));
    }

    #[test]
    fn pixel_step_is_isotropic() {
        // Plane units per pixel must match between axes for any canvas
        // shape, or circles would render as ellipses.
        for (w, h) in [(800u32, 600u32), (1920, 1080), (300, 900), (512, 512)] {
            let vp = Viewport::home(w, h);
            let origin = vp.subpixel_to_complex(0.0, 0.0);
            let right = vp.subpixel_to_complex(1.0, 0.0);
            let down = vp.subpixel_to_complex(0.0, 1.0);
            let step_r = right.re - origin.re;
            let step_i = origin.im - down.im;
            assert!(approx(step_r, step_i), "{w}×{h}: {step_r} vs {step_i}");
            assert!(approx(step_r, vp.units_per_pixel()));
        }
    }

    #[test]
    fn inverse_round_trip() {
        let vp = Viewport::new(Complex::new(-1.2, 0.3), 0.02, 1024, 768).unwrap();
        for (x, y) in [(0.0, 0.0), (512.0, 384.0), (1000.5, 13.25)] {
            let c = vp.subpixel_to_complex(x, y);
            let (bx, by) = vp.complex_to_pixel(c);
            assert!(approx(bx, x));
            assert!(approx(by, y));
        }
    }

    #[test]
    fn pan_by_pixels_moves_against_drag() {
        let vp = Viewport::home(800, 600);
        let dragged = vp.panned_pixels(100.0, 0.0);
        assert!(dragged.center.re < vp.center.re);
        // The point formerly under the pointer origin is now 100px right.
        let c = vp.subpixel_to_complex(0.0, 0.0);
        let (x, _) = dragged.complex_to_pixel(c);
        assert!(approx(x, 100.0));
    }

    #[test]
    fn zoom_recenters_and_scales() {
        let vp = Viewport::home(800, 600);
        let target = Complex::new(-0.7436, 0.1318);
        let zoomed = vp.zoomed(target, 0.25);
        assert_eq!(zoomed.center, target);
        assert!(approx(zoomed.scale, 3.5 / 4.0));
        assert_eq!((zoomed.width, zoomed.height), (800, 600));
    }

    #[test]
    fn resize_preserves_center_and_scale() {
        let vp = Viewport::home(800, 600);
        let resized = vp.resized(1000, 500).unwrap();
        assert_eq!(resized.center, vp.center);
        assert!(approx(resized.scale, vp.scale));
        assert_eq!((resized.width, resized.height), (1000, 500));
    }

    #[test]
    fn rejects_degenerate_viewports() {
        assert!(Viewport::new(Complex::ZERO, 1.0, 0, 100).is_err());
        assert!(Viewport::new(Complex::ZERO, 1.0, 100, 0).is_err());
        assert!(Viewport::new(Complex::ZERO, 0.0, 100, 100).is_err());
        assert!(Viewport::new(Complex::ZERO, -2.0, 100, 100).is_err());
        assert!(Viewport::new(Complex::ZERO, f64::NAN, 100, 100).is_err());
    }
}
