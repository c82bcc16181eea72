/// Stopping criteria for iterative closest-point projection.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ProjectionTolerance {
    /// Hard cap on Newton iterations per segment search
    pub max_iters: usize,
    /// Threshold on squared residual distance (in model units squared)
    pub sqr_dist: f64,
    /// Threshold on |cos| of the angle between residual and tangent
    pub cos_angle: f64,
    /// Threshold on the parameter change between iterates
    pub param: f64,
}

impl ProjectionTolerance {
    pub const DEFAULT_MAX_ITERS: usize = 50;
    pub const DEFAULT_SQR_DIST: f64 = 1e-6;
    pub const DEFAULT_COS_ANGLE: f64 = 1e-4;
    pub const DEFAULT_PARAM: f64 = 1e-5;

    pub fn new(max_iters: usize, sqr_dist: f64, cos_angle: f64, param: f64) -> Self {
        Self {
            max_iters,
            sqr_dist,
            cos_angle,
            param,
        }
    }

    pub fn default_precision() -> Self {
        Self {
            max_iters: Self::DEFAULT_MAX_ITERS,
            sqr_dist: Self::DEFAULT_SQR_DIST,
            cos_angle: Self::DEFAULT_COS_ANGLE,
            param: Self::DEFAULT_PARAM,
        }
    }

    pub fn loose() -> Self {
        Self {
            max_iters: 20,
            sqr_dist: 1e-4,
            cos_angle: 1e-3,
            param: 1e-4,
        }
    }

    pub fn tight() -> Self {
        Self {
            max_iters: 200,
            sqr_dist: 1e-10,
            cos_angle: 1e-6,
            param: 1e-8,
        }
    }

    /// Check if a squared residual distance is small enough to stop
    pub fn distance_converged(self, sqr_dist: f64) -> bool {
        sqr_dist < self.sqr_dist
    }

    /// Check if the residual is near-orthogonal to the tangent
    pub fn angle_converged(self, cos_angle: f64) -> bool {
        cos_angle.abs() < self.cos_angle
    }

    /// Check if the parameter change between iterates is negligible
    pub fn param_converged(self, delta: f64) -> bool {
        delta.abs() < self.param
    }
}

impl Default for ProjectionTolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
