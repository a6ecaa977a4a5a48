use glam::DVec2;
use num_dual::{Dual2_64, DualNum, HyperDual64};

/// Linear second-order operator
/// `a ∂x + b ∂y + c ∂xx + d ∂xy + e ∂yy`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifferentialOperator {
    coefficients: [f64; 5],
}

impl DifferentialOperator {
    pub const fn new(coefficients: [f64; 5]) -> Self {
        Self { coefficients }
    }

    pub const fn laplacian() -> Self {
        Self::new([0.0, 0.0, 1.0, 0.0, 1.0])
    }

    #[inline]
    pub fn coefficients(&self) -> [f64; 5] {
        self.coefficients
    }

    /// Right-hand side of the local fit in the basis
    /// `[dx, dy, dx², dx·dy, dy²]`. The pure second derivatives pick up
    /// a factor of two from the Taylor expansion.
    pub fn taylor_vector(&self) -> [f64; 5] {
        let [a, b, c, d, e] = self.coefficients;
        [a, b, 2.0 * c, d, 2.0 * e]
    }

    /// Evaluate the operator exactly on an analytic field at `point`.
    pub fn apply_exact<F: AnalyticField + ?Sized>(&self, field: &F, point: DVec2) -> f64 {
        let [a, b, c, d, e] = self.coefficients;

        // eps1 → ∂x, eps2 → ∂y, eps1eps2 → ∂xy
        let h = field.eval(
            HyperDual64::new(point.x, 1.0, 0.0, 0.0),
            HyperDual64::new(point.y, 0.0, 1.0, 0.0),
        );

        let fxx = if c != 0.0 {
            field
                .eval(
                    Dual2_64::new(point.x, 1.0, 0.0),
                    Dual2_64::new(point.y, 0.0, 0.0),
                )
                .v2
        } else {
            0.0
        };
        let fyy = if e != 0.0 {
            field
                .eval(
                    Dual2_64::new(point.x, 0.0, 0.0),
                    Dual2_64::new(point.y, 1.0, 0.0),
                )
                .v2
        } else {
            0.0
        };

        a * h.eps1 + b * h.eps2 + c * fxx + d * h.eps1eps2 + e * fyy
    }
}

impl Default for DifferentialOperator {
    fn default() -> Self {
        Self::laplacian()
    }
}

/// A scalar field written once over any dual number type.
pub trait AnalyticField {
    fn eval<D: DualNum<f64> + Copy>(&self, x: D, y: D) -> D;

    fn value(&self, point: DVec2) -> f64 {
        self.eval(point.x, point.y)
    }
}

/// `x² + y²`
#[derive(Clone, Copy, Debug, Default)]
pub struct Paraboloid;

impl AnalyticField for Paraboloid {
    fn eval<D: DualNum<f64> + Copy>(&self, x: D, y: D) -> D {
        x * x + y * y
    }
}

/// `sin(kx·x) · cos(ky·y)`
#[derive(Clone, Copy, Debug)]
pub struct Trigonometric {
    pub kx: f64,
    pub ky: f64,
}

impl AnalyticField for Trigonometric {
    fn eval<D: DualNum<f64> + Copy>(&self, x: D, y: D) -> D {
        (x * self.kx).sin() * (y * self.ky).cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Mixed;

    impl AnalyticField for Mixed {
        fn eval<D: DualNum<f64> + Copy>(&self, x: D, y: D) -> D {
            x * x * y + (x * y).exp()
        }
    }

    #[test]
    fn laplacian_of_paraboloid_is_four() {
        let lap = DifferentialOperator::laplacian();
        let v = lap.apply_exact(&Paraboloid, DVec2::new(0.3, -1.7));
        assert_relative_eq!(v, 4.0, epsilon = 1e-14);
    }

    #[test]
    fn every_coefficient_reaches_its_derivative() {
        let p = DVec2::new(0.4, 0.7);
        let (x, y) = (p.x, p.y);
        let exy = (x * y).exp();
        let expected = [
            2.0 * x * y + y * exy,
            x * x + x * exy,
            2.0 * y + y * y * exy,
            2.0 * x + exy + x * y * exy,
            x * x * exy,
        ];
        for (k, want) in expected.iter().enumerate() {
            let mut coefficients = [0.0; 5];
            coefficients[k] = 1.0;
            let got = DifferentialOperator::new(coefficients).apply_exact(&Mixed, p);
            assert_relative_eq!(got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn taylor_vector_doubles_pure_second_derivatives() {
        let op = DifferentialOperator::new([1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(op.taylor_vector(), [1.0, 2.0, 6.0, 4.0, 10.0]);
    }

    #[test]
    fn trigonometric_field_is_an_eigenfunction() {
        let field = Trigonometric { kx: 2.0, ky: 3.0 };
        let p = DVec2::new(0.2, 0.1);
        let lap = DifferentialOperator::laplacian().apply_exact(&field, p);
        assert_relative_eq!(lap, -13.0 * field.value(p), epsilon = 1e-12);
    }
}
