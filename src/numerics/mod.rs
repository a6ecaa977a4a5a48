pub mod gamma;
pub mod solver;
pub mod sparse;
pub mod timing;
pub mod transient;

use crate::error::ConfigurationError;

/// Numerical thresholds shared by assembly and time integration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    /// Singular values below `pinv_rcond · σ_max` are treated as zero.
    pub pinv_rcond: f64,
    /// Iteration cap handed to the SVD.
    pub svd_max_iterations: usize,
    /// Smallest accepted `min |U_ii| / max |U_ii|` of a factored system.
    pub min_pivot_ratio: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            pinv_rcond: 1e-15,
            svd_max_iterations: 10_000,
            min_pivot_ratio: 1e-14,
        }
    }
}

impl Tolerances {
    pub fn with_pinv_rcond(mut self, rcond: f64) -> Self {
        self.pinv_rcond = rcond;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.pinv_rcond.is_finite() && self.pinv_rcond >= 0.0) {
            return Err(ConfigurationError::InvalidPinvRcond(self.pinv_rcond));
        }
        if !(self.min_pivot_ratio.is_finite() && self.min_pivot_ratio >= 0.0) {
            return Err(ConfigurationError::InvalidPivotRatio(self.min_pivot_ratio));
        }
        Ok(())
    }

    pub fn with_min_pivot_ratio(mut self, ratio: f64) -> Self {
        self.min_pivot_ratio = ratio;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_or_non_finite_thresholds_are_rejected() {
        assert_eq!(Tolerances::default().validate(), Ok(()));
        assert_eq!(
            Tolerances::default().with_pinv_rcond(-1.0).validate(),
            Err(ConfigurationError::InvalidPinvRcond(-1.0))
        );
        assert!(matches!(
            Tolerances::default().with_pinv_rcond(f64::NAN).validate(),
            Err(ConfigurationError::InvalidPinvRcond(_))
        ));
        assert_eq!(
            Tolerances::default().with_min_pivot_ratio(f64::INFINITY).validate(),
            Err(ConfigurationError::InvalidPivotRatio(f64::INFINITY))
        );
    }
}
