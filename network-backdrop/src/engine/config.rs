use bevy::prelude::*;
use constants::class::CLASS_MAP;
use constants::{cloud, render_settings};
use serde::{Deserialize, Serialize};

use crate::engine::error::ConfigurationError;
use crate::engine::point_cloud::ColourClass;

/// Closed sampling interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f32,
    pub max: f32,
}

impl AxisRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, axis: &'static str) -> Result<(), ConfigurationError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigurationError::InvalidBounds {
                axis,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Sampling extents of the point cloud in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudBounds {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl CloudBounds {
    pub fn contains(&self, position: Vec3) -> bool {
        self.x.contains(position.x) && self.y.contains(position.y) && self.z.contains(position.z)
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.x.min + self.x.max) * 0.5,
            (self.y.min + self.y.max) * 0.5,
            (self.z.min + self.z.max) * 0.5,
        )
    }

    pub fn size(&self) -> Vec3 {
        Vec3::new(
            self.x.max - self.x.min,
            self.y.max - self.y.min,
            self.z.max - self.z.min,
        )
    }
}

impl Default for CloudBounds {
    fn default() -> Self {
        Self {
            x: AxisRange::new(cloud::X_RANGE.0, cloud::X_RANGE.1),
            y: AxisRange::new(cloud::Y_RANGE.0, cloud::Y_RANGE.1),
            z: AxisRange::new(cloud::Z_RANGE.0, cloud::Z_RANGE.1),
        }
    }
}

/// One entry of the ordered colour distribution.
///
/// A uniform draw `r` falls in this band when `r > above`. A band with
/// `above == 0.0` takes every remaining draw and must come last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColourBand {
    pub above: f32,
    pub class: ColourClass,
    /// sRGB
    pub colour: [f32; 3],
}

impl ColourBand {
    pub fn contains(&self, r: f32) -> bool {
        self.above <= 0.0 || r > self.above
    }
}

/// Radians added to the scene rotation on every rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationStep {
    pub x: f32,
    pub y: f32,
}

impl Default for RotationStep {
    fn default() -> Self {
        Self {
            x: cloud::ROTATION_STEP_X,
            y: cloud::ROTATION_STEP_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin along +Z
    pub distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: render_settings::CAMERA_FOV_DEGREES,
            near: render_settings::CAMERA_NEAR,
            far: render_settings::CAMERA_FAR,
            distance: render_settings::CAMERA_DISTANCE,
        }
    }
}

/// Construction-time configuration for one backdrop instance.
///
/// Loaded from `backdrop.json` when present. Every field falls back to the
/// values in the `constants` crate.
#[derive(Asset, TypePath, Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// Signed so that a negative count in JSON is reported instead of failing to parse
    pub point_count: i64,
    pub bounds: CloudBounds,
    pub proximity_threshold: f32,
    pub colour_bands: Vec<ColourBand>,
    pub rotation: RotationStep,
    /// Dot diameter in logical pixels
    pub point_size: f32,
    pub line_opacity: f32,
    pub line_colour: [f32; 3],
    pub camera: CameraSettings,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        let colour_bands = CLASS_MAP
            .iter()
            .filter_map(|info| {
                ColourClass::from_id(info.id).map(|class| ColourBand {
                    above: info.above,
                    class,
                    colour: info.colour,
                })
            })
            .collect();

        Self {
            point_count: cloud::POINT_COUNT,
            bounds: CloudBounds::default(),
            proximity_threshold: cloud::PROXIMITY_THRESHOLD,
            colour_bands,
            rotation: RotationStep::default(),
            point_size: render_settings::POINT_SIZE,
            line_opacity: render_settings::LINE_OPACITY,
            line_colour: render_settings::LINE_COLOUR,
            camera: CameraSettings::default(),
        }
    }
}

impl BackdropConfig {
    /// Point count as a length, rejecting negative values.
    pub fn point_count(&self) -> Result<usize, ConfigurationError> {
        usize::try_from(self.point_count)
            .map_err(|_| ConfigurationError::NegativePointCount(self.point_count))
    }

    /// Check every field. Runs before any surface or GPU resource is touched.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.point_count()?;

        if !self.proximity_threshold.is_finite() || self.proximity_threshold < 0.0 {
            return Err(ConfigurationError::InvalidThreshold(
                self.proximity_threshold,
            ));
        }

        self.bounds.x.validate("x")?;
        self.bounds.y.validate("y")?;
        self.bounds.z.validate("z")?;

        self.validate_colour_bands()?;

        for (axis, step) in [("x", self.rotation.x), ("y", self.rotation.y)] {
            if !step.is_finite() || step <= 0.0 {
                return Err(ConfigurationError::InvalidRotationStep { axis, step });
            }
        }

        if !self.point_size.is_finite() || self.point_size <= 0.0 {
            return Err(ConfigurationError::InvalidPointSize(self.point_size));
        }

        if !(0.0..=1.0).contains(&self.line_opacity) {
            return Err(ConfigurationError::InvalidLineOpacity(self.line_opacity));
        }

        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigurationError::InvalidCamera(format!(
                "fov {} must be within (0, 180) degrees",
                camera.fov_degrees
            )));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(ConfigurationError::InvalidCamera(format!(
                "near {} / far {} planes must satisfy 0 < near < far",
                camera.near, camera.far
            )));
        }
        if !camera.distance.is_finite() || camera.distance <= 0.0 {
            return Err(ConfigurationError::InvalidCamera(format!(
                "distance {} must be positive",
                camera.distance
            )));
        }

        Ok(())
    }

    /// The bands must partition [0, 1): thresholds in [0, 1), strictly
    /// descending, ending with the catch-all 0.
    fn validate_colour_bands(&self) -> Result<(), ConfigurationError> {
        let Some(last) = self.colour_bands.last() else {
            return Err(ConfigurationError::EmptyColourBands);
        };

        for (index, band) in self.colour_bands.iter().enumerate() {
            if !(0.0..1.0).contains(&band.above) {
                return Err(ConfigurationError::BandOutOfRange {
                    index,
                    above: band.above,
                });
            }
        }

        for (index, pair) in self.colour_bands.windows(2).enumerate() {
            if pair[1].above >= pair[0].above {
                return Err(ConfigurationError::BandsNotDescending { index: index + 1 });
            }
        }

        if last.above != 0.0 {
            return Err(ConfigurationError::MissingCatchAll);
        }

        Ok(())
    }

    /// sRGB colour assigned to a class, or white if no band names it.
    pub fn colour_for(&self, class: ColourClass) -> [f32; 3] {
        self.colour_bands
            .iter()
            .find(|band| band.class == class)
            .map_or([1.0, 1.0, 1.0], |band| band.colour)
    }

    /// Expected share of each band under a uniform draw on [0, 1).
    pub fn expected_proportions(&self) -> Vec<(ColourClass, f32)> {
        let mut upper = 1.0;
        self.colour_bands
            .iter()
            .map(|band| {
                let share = upper - band.above;
                upper = band.above;
                (band.class, share)
            })
            .collect()
    }
}
