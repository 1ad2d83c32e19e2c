use std::f64::consts::PI;

use crate::error::{ConfigError, Result};
use crate::math::position_key::POSITION_DECIMALS;

/// Base outline thickness in model units, before the multiplier is applied.
pub const DEFAULT_LINE_THICKNESS: f64 = 0.013;

/// Default break angle in degrees.
pub const DEFAULT_BREAK_ANGLE_DEG: f64 = 35.0;

/// Maximum angle (radians) between two edge directions still treated as colinear.
pub const COLINEAR_ANGLE: f64 = 0.08;

/// Maximum distance between `direction × outline` and the face normal before
/// a hard edge's endpoints are swapped.
pub const ORDER_CORRECTION_DISTANCE: f64 = 0.2;

/// Distance under which two projected positions are the same vertex.
pub const POSITION_TOLERANCE: f64 = 5e-4;

/// Fraction of π bounding the outline-direction difference of linkable edges.
pub const LINK_OUTLINE_ANGLE_FACTOR: f64 = 0.85;

/// Fraction of π at or above which a planar edge pair is treated as opposed.
pub const OPPOSED_PAIR_ANGLE_FACTOR: f64 = 0.998;

/// Maximum distance between a triangle normal and a hard edge's face normal
/// for the edge to count as one of the triangle's own edges.
pub const TRIANGLE_EDGE_NORMAL_TOLERANCE: f64 = 0.05;

/// Which normals are compared when deciding whether a shared edge is smooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreaseMetric {
    /// Compare the face normals of the adjoining triangles.
    #[default]
    FaceNormal,
    /// Compare the averaged endpoint vertex normals of each adjoining
    /// triangle, so creases that are smooth-shaded produce no outline.
    VertexNormal,
}

/// Numeric tolerances used throughout the pipeline.
///
/// These encode tie-break policy rather than precision, so changing them
/// changes which edges are outlined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub colinear_angle: f64,
    pub order_correction_distance: f64,
    pub position_decimals: i32,
    pub position_tolerance: f64,
    pub link_outline_angle: f64,
    pub opposed_pair_angle: f64,
    pub triangle_edge_normal: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            colinear_angle: COLINEAR_ANGLE,
            order_correction_distance: ORDER_CORRECTION_DISTANCE,
            position_decimals: POSITION_DECIMALS,
            position_tolerance: POSITION_TOLERANCE,
            link_outline_angle: PI * LINK_OUTLINE_ANGLE_FACTOR,
            opposed_pair_angle: PI * OPPOSED_PAIR_ANGLE_FACTOR,
            triangle_edge_normal: TRIANGLE_EDGE_NORMAL_TOLERANCE,
        }
    }
}

/// Parameters for outline generation.
#[derive(Debug, Clone)]
pub struct OutlineConfig {
    /// Angle in degrees above which adjoining faces form a hard edge. Default: 35
    pub break_angle_deg: f64,

    /// Dimensionless outline width multiplier. Default: 1.0
    pub thickness_multiplier: f64,

    /// Outline width at multiplier 1.0, in model units. Default: 0.013
    pub base_thickness: f64,

    /// Normals compared for hard-edge detection. Default: face normals
    pub crease_metric: CreaseMetric,

    /// Run the per-triangle phase on the rayon thread pool. Default: true
    pub parallel: bool,

    pub tolerances: Tolerances,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            break_angle_deg: DEFAULT_BREAK_ANGLE_DEG,
            thickness_multiplier: 1.0,
            base_thickness: DEFAULT_LINE_THICKNESS,
            crease_metric: CreaseMetric::default(),
            parallel: true,
            tolerances: Tolerances::default(),
        }
    }
}

impl OutlineConfig {
    /// Creates a config with the given break angle and thickness multiplier.
    #[must_use]
    pub fn new(break_angle_deg: f64, thickness_multiplier: f64) -> Self {
        Self {
            break_angle_deg,
            thickness_multiplier,
            ..Default::default()
        }
    }

    /// Set the break angle in degrees.
    #[must_use]
    pub const fn with_break_angle(mut self, degrees: f64) -> Self {
        self.break_angle_deg = degrees;
        self
    }

    /// Set the thickness multiplier.
    #[must_use]
    pub const fn with_thickness_multiplier(mut self, multiplier: f64) -> Self {
        self.thickness_multiplier = multiplier;
        self
    }

    /// Set the crease metric.
    #[must_use]
    pub const fn with_crease_metric(mut self, metric: CreaseMetric) -> Self {
        self.crease_metric = metric;
        self
    }

    /// Enable or disable parallel per-triangle processing.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Break angle in radians.
    #[must_use]
    pub fn break_angle_rad(&self) -> f64 {
        self.break_angle_deg.to_radians()
    }

    /// Effective outline width in model units.
    #[must_use]
    pub fn outline_thickness(&self) -> f64 {
        self.base_thickness * self.thickness_multiplier
    }

    /// Checks that all parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParameterOutOfRange`] if the break angle is
    /// outside `(0, 180]`, or the multiplier or base thickness is not a
    /// positive finite number.
    pub fn validate(&self) -> Result<()> {
        if !(self.break_angle_deg > 0.0 && self.break_angle_deg <= 180.0) {
            return Err(ConfigError::ParameterOutOfRange {
                parameter: "break_angle_deg",
                value: self.break_angle_deg,
                min: 0.0,
                max: 180.0,
            }
            .into());
        }
        for (parameter, value) in [
            ("thickness_multiplier", self.thickness_multiplier),
            ("base_thickness", self.base_thickness),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::ParameterOutOfRange {
                    parameter,
                    value,
                    min: 0.0,
                    max: f64::MAX,
                }
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = OutlineConfig::default();
        assert!((config.break_angle_deg - 35.0).abs() < f64::EPSILON);
        assert!((config.outline_thickness() - 0.013).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn break_angle_converts_to_radians() {
        let config = OutlineConfig::default().with_break_angle(90.0);
        assert!((config.break_angle_rad() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn thickness_scales_with_multiplier() {
        let config = OutlineConfig::new(35.0, 2.5);
        assert!((config.outline_thickness() - 0.0325).abs() < 1e-12);
    }

    #[test]
    fn invalid_break_angle_fails() {
        assert!(OutlineConfig::default().with_break_angle(0.0).validate().is_err());
        assert!(OutlineConfig::default().with_break_angle(190.0).validate().is_err());
        assert!(OutlineConfig::default().with_break_angle(f64::NAN).validate().is_err());
    }

    #[test]
    fn invalid_multiplier_fails() {
        assert!(OutlineConfig::default().with_thickness_multiplier(0.0).validate().is_err());
        assert!(OutlineConfig::default()
            .with_thickness_multiplier(f64::INFINITY)
            .validate()
            .is_err());
    }

    #[test]
    fn tolerance_defaults_match_constants() {
        let tol = Tolerances::default();
        assert!((tol.colinear_angle - COLINEAR_ANGLE).abs() < f64::EPSILON);
        assert_eq!(tol.position_decimals, 4);
        assert!((tol.link_outline_angle - PI * 0.85).abs() < 1e-12);
    }
}
