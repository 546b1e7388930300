use crate::error::CoreError;

/// Iteration parameters shared by every work unit of a render.
///
/// The cached `escape_radius_sq` is recomputed on deserialization so a
/// config loaded from disk can never carry a stale square.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct KernelParams {
    /// Iteration budget before a point is declared interior.
    pub max_iterations: u32,

    /// Bailout radius — the orbit has escaped once `|z|` exceeds this.
    /// The loop itself compares `|z|²` against `escape_radius²`.
    pub escape_radius: f64,

    /// Cached `escape_radius * escape_radius` for the inner loop.
    #[serde(skip)]
    escape_radius_sq: f64,
}

impl<'de> serde::Deserialize<'de> for KernelParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            max_iterations: u32,
            escape_radius: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Self {
            max_iterations: raw.max_iterations,
            escape_radius: raw.escape_radius,
            escape_radius_sq: raw.escape_radius * raw.escape_radius,
        })
    }
}

impl KernelParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 1024;
    pub const DEFAULT_ESCAPE_RADIUS: f64 = 10.0;

    pub fn new(max_iterations: u32, escape_radius: f64) -> crate::Result<Self> {
        if max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(max_iterations));
        }
        if escape_radius <= 0.0 || !escape_radius.is_finite() {
            return Err(CoreError::InvalidEscapeRadius(escape_radius));
        }
        Ok(Self {
            max_iterations,
            escape_radius,
            escape_radius_sq: escape_radius * escape_radius,
        })
    }

    /// Pre-squared escape radius for the inner loop.
    #[inline]
    pub fn escape_radius_sq(&self) -> f64 {
        self.escape_radius_sq
    }
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            escape_radius: Self::DEFAULT_ESCAPE_RADIUS,
            escape_radius_sq: Self::DEFAULT_ESCAPE_RADIUS * Self::DEFAULT_ESCAPE_RADIUS,
        }
    }
}
