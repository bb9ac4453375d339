//! Double integration of curvature along a single span.
//!
//! Rotation and deflection are accumulated with the trapezoidal rule from
//! `x = 0`, then the chord `f(L)·x/L` is subtracted so that both supports
//! have zero deflection. An integrator only ever sees one span: a repeated
//! station (a support between two spans) is rejected.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_finite, ensure_positive, CalcError, CalcResult};

/// Curvature at one station (x in cm, κ in 1/cm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvaturePoint {
    pub x_cm: f64,
    pub kappa_per_cm: f64,
}

/// Deflection at one station (cm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeflectionPoint {
    pub x_cm: f64,
    pub f_cm: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeflectionProfile {
    pub points: Vec<DeflectionPoint>,
    /// Signed deflection of largest magnitude (cm)
    pub max_f_cm: f64,
    pub max_x_cm: f64,
}

impl DeflectionProfile {
    /// Every ordinate multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> DeflectionProfile {
        DeflectionProfile {
            points: self
                .points
                .iter()
                .map(|p| DeflectionPoint {
                    x_cm: p.x_cm,
                    f_cm: p.f_cm * factor,
                })
                .collect(),
            max_f_cm: self.max_f_cm * factor,
            max_x_cm: self.max_x_cm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvatureIntegrator {
    span_cm: f64,
}

impl CurvatureIntegrator {
    pub fn new(span_cm: f64) -> CalcResult<Self> {
        ensure_positive("span_cm", span_cm)?;
        Ok(CurvatureIntegrator { span_cm })
    }

    pub fn span_cm(&self) -> f64 {
        self.span_cm
    }

    fn validate(&self, points: &[CurvaturePoint]) -> CalcResult<()> {
        let tol = 1e-9 * self.span_cm;
        for (i, p) in points.iter().enumerate() {
            ensure_finite("x_cm", p.x_cm)?;
            ensure_finite("kappa_per_cm", p.kappa_per_cm)?;
            if p.x_cm < -tol || p.x_cm > self.span_cm + tol {
                return Err(CalcError::invalid_input(
                    "x_cm",
                    p.x_cm.to_string(),
                    format!("Station outside the span [0, {}]", self.span_cm),
                ));
            }
            if i > 0 && p.x_cm <= points[i - 1].x_cm {
                return Err(CalcError::invalid_input(
                    "x_cm",
                    p.x_cm.to_string(),
                    "Stations must be strictly increasing within one span",
                ));
            }
        }
        Ok(())
    }

    fn ensure_supports_sampled(&self, points: &[CurvaturePoint]) -> CalcResult<()> {
        let tol = 1e-9 * self.span_cm;
        let first = points.first().map_or(f64::NAN, |p| p.x_cm);
        let last = points.last().map_or(f64::NAN, |p| p.x_cm);
        if !(first.abs() <= tol && (last - self.span_cm).abs() <= tol) {
            return Err(CalcError::invalid_input(
                "x_cm",
                format!("[{}, {}]", first, last),
                format!("Stations must start at 0 and end at the span length {}", self.span_cm),
            ));
        }
        Ok(())
    }

    /// Deflection profile for curvatures sampled along the span.
    ///
    /// Fewer than two stations give an empty profile. Otherwise both supports
    /// (`x = 0` and `x = L`) must be sampled.
    pub fn integrate(&self, points: &[CurvaturePoint]) -> CalcResult<DeflectionProfile> {
        self.validate(points)?;
        if points.len() < 2 {
            return Ok(DeflectionProfile::default());
        }
        self.ensure_supports_sampled(points)?;

        let n = points.len();
        let mut theta = vec![0.0; n];
        let mut f = vec![0.0; n];
        for i in 1..n {
            let dx = points[i].x_cm - points[i - 1].x_cm;
            theta[i] = theta[i - 1] + 0.5 * (points[i].kappa_per_cm + points[i - 1].kappa_per_cm) * dx;
        }
        for i in 1..n {
            let dx = points[i].x_cm - points[i - 1].x_cm;
            f[i] = f[i - 1] + 0.5 * (theta[i] + theta[i - 1]) * dx;
        }

        let f_end = f[n - 1];
        let mut profile = DeflectionProfile::default();
        for (p, f_raw) in points.iter().zip(f) {
            let f_cm = f_raw - f_end * (p.x_cm / self.span_cm);
            if f_cm.abs() > profile.max_f_cm.abs() {
                profile.max_f_cm = f_cm;
                profile.max_x_cm = p.x_cm;
            }
            profile.points.push(DeflectionPoint { x_cm: p.x_cm, f_cm });
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parabola(span: f64, n: usize, kappa_mid: f64) -> Vec<CurvaturePoint> {
        (0..n)
            .map(|i| {
                let x = span * i as f64 / (n - 1) as f64;
                CurvaturePoint {
                    x_cm: x,
                    kappa_per_cm: 4.0 * kappa_mid * x * (span - x) / (span * span),
                }
            })
            .collect()
    }

    #[test]
    fn test_uniform_load_shape() {
        let span = 600.0;
        let kappa_mid = 1e-5;
        let profile = CurvatureIntegrator::new(span)
            .unwrap()
            .integrate(&parabola(span, 61, kappa_mid))
            .unwrap();

        // 5/48·κmax·L² for a parabolic curvature diagram
        let expected = 5.0 / 48.0 * kappa_mid * span * span;
        assert_relative_eq!(profile.max_f_cm.abs(), expected, max_relative = 0.01);
        assert_eq!(profile.max_x_cm, 300.0);
        assert_eq!(profile.points[0].f_cm, 0.0);
        assert_eq!(profile.points[60].f_cm, 0.0);
    }

    #[test]
    fn test_symmetric_profile() {
        let profile = CurvatureIntegrator::new(500.0)
            .unwrap()
            .integrate(&parabola(500.0, 21, 2e-5))
            .unwrap();
        let n = profile.points.len();
        for i in 0..n {
            assert_relative_eq!(profile.points[i].f_cm, profile.points[n - 1 - i].f_cm, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_too_few_points() {
        let integrator = CurvatureIntegrator::new(100.0).unwrap();
        let profile = integrator.integrate(&[CurvaturePoint { x_cm: 0.0, kappa_per_cm: 1e-4 }]).unwrap();
        assert!(profile.points.is_empty());
        assert_eq!(profile.max_f_cm, 0.0);
    }

    #[test]
    fn test_rejects_support_crossing() {
        let integrator = CurvatureIntegrator::new(100.0).unwrap();
        let points = [
            CurvaturePoint { x_cm: 0.0, kappa_per_cm: 0.0 },
            CurvaturePoint { x_cm: 50.0, kappa_per_cm: 1e-5 },
            CurvaturePoint { x_cm: 50.0, kappa_per_cm: -1e-5 },
            CurvaturePoint { x_cm: 100.0, kappa_per_cm: 0.0 },
        ];
        assert!(integrator.integrate(&points).is_err());

        let outside = [
            CurvaturePoint { x_cm: 0.0, kappa_per_cm: 0.0 },
            CurvaturePoint { x_cm: 150.0, kappa_per_cm: 0.0 },
        ];
        assert!(integrator.integrate(&outside).is_err());
    }

    #[test]
    fn test_requires_both_supports() {
        let integrator = CurvatureIntegrator::new(100.0).unwrap();
        let short_end = [
            CurvaturePoint { x_cm: 0.0, kappa_per_cm: 0.0 },
            CurvaturePoint { x_cm: 50.0, kappa_per_cm: 1e-5 },
            CurvaturePoint { x_cm: 80.0, kappa_per_cm: 1e-5 },
        ];
        assert!(integrator.integrate(&short_end).is_err());

        let late_start = [
            CurvaturePoint { x_cm: 20.0, kappa_per_cm: 1e-5 },
            CurvaturePoint { x_cm: 50.0, kappa_per_cm: 1e-5 },
            CurvaturePoint { x_cm: 100.0, kappa_per_cm: 0.0 },
        ];
        assert!(integrator.integrate(&late_start).is_err());
    }

    #[test]
    fn test_scaled() {
        let profile = CurvatureIntegrator::new(300.0)
            .unwrap()
            .integrate(&parabola(300.0, 11, 1e-5))
            .unwrap();
        let total = profile.scaled(2.5);
        assert_relative_eq!(total.max_f_cm, 2.5 * profile.max_f_cm, epsilon = 1e-15);
        assert_eq!(total.max_x_cm, profile.max_x_cm);
    }
}
