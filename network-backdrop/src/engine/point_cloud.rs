use bevy::prelude::*;
use constants::class;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::config::{AxisRange, CloudBounds, ColourBand};

/// Categorical colour assigned to each generated point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColourClass {
    Alert,
    Warning,
    Nominal,
}

impl ColourClass {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            class::ALERT => Some(Self::Alert),
            class::WARNING => Some(Self::Warning),
            class::NOMINAL => Some(Self::Nominal),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Self::Alert => class::ALERT,
            Self::Warning => class::WARNING,
            Self::Nominal => class::NOMINAL,
        }
    }

    pub fn name(self) -> String {
        class::get_class_name(self.id())
    }
}

/// A generated point. Its identity is its index in the generated sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: Vec3,
    pub class: ColourClass,
}

/// Sample `count` points uniformly inside `bounds` and assign each a colour
/// class from `bands` (first band containing the draw wins).
///
/// Never fails; `count == 0` yields an empty cloud. `bands` is expected to be
/// validated, but an uncovered draw falls back to the last band.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    bounds: &CloudBounds,
    bands: &[ColourBand],
) -> Vec<Point> {
    (0..count)
        .map(|_| {
            let position = Vec3::new(
                sample_axis(rng, &bounds.x),
                sample_axis(rng, &bounds.y),
                sample_axis(rng, &bounds.z),
            );
            let r: f32 = rng.gen_range(0.0..1.0);
            Point {
                position,
                class: classify(r, bands),
            }
        })
        .collect()
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, range: &AxisRange) -> f32 {
    if range.min == range.max {
        return range.min;
    }
    rng.gen_range(range.min..=range.max)
}

/// Colour class for a uniform draw `r` in [0, 1).
pub fn classify(r: f32, bands: &[ColourBand]) -> ColourClass {
    bands
        .iter()
        .find(|band| band.contains(r))
        .or(bands.last())
        .map_or(ColourClass::Nominal, |band| band.class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::BackdropConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn default_bands() -> Vec<ColourBand> {
        BackdropConfig::default().colour_bands
    }

    #[test]
    fn generates_exact_count_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let bounds = CloudBounds::default();
        for count in [0, 1, 2, 17, 300, 1000] {
            let points = generate(&mut rng, count, &bounds, &default_bands());
            assert_eq!(points.len(), count);
            for point in &points {
                assert!(bounds.contains(point.position), "{:?}", point.position);
            }
        }
    }

    #[test]
    fn empty_count_yields_empty_cloud() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(generate(&mut rng, 0, &CloudBounds::default(), &default_bands()).is_empty());
    }

    #[test]
    fn degenerate_axis_pins_coordinate() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let bounds = CloudBounds {
            z: AxisRange::new(5.0, 5.0),
            ..CloudBounds::default()
        };
        let points = generate(&mut rng, 50, &bounds, &default_bands());
        assert!(points.iter().all(|p| p.position.z == 5.0));
    }

    #[test]
    fn classify_follows_band_order() {
        let bands = default_bands();
        assert_eq!(classify(0.99, &bands), ColourClass::Alert);
        assert_eq!(classify(0.90, &bands), ColourClass::Warning);
        assert_eq!(classify(0.50, &bands), ColourClass::Nominal);
        assert_eq!(classify(0.0, &bands), ColourClass::Nominal);
        // Boundary draws fall through to the next band (strict comparison)
        assert_eq!(classify(0.95, &bands), ColourClass::Warning);
        assert_eq!(classify(0.80, &bands), ColourClass::Nominal);
    }

    #[test]
    fn class_frequencies_converge_to_configured_proportions() {
        let config = BackdropConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let count = 100_000;
        let points = generate(&mut rng, count, &config.bounds, &config.colour_bands);

        for (class, expected) in config.expected_proportions() {
            let observed =
                points.iter().filter(|p| p.class == class).count() as f32 / count as f32;
            assert!(
                (observed - expected).abs() < 0.01,
                "{class:?}: observed {observed}, expected {expected}"
            );
        }
    }

    #[test]
    fn class_ids_round_trip_through_constants() {
        for class in [ColourClass::Alert, ColourClass::Warning, ColourClass::Nominal] {
            assert_eq!(ColourClass::from_id(class.id()), Some(class));
        }
        assert_eq!(ColourClass::Warning.name(), "warning");
        assert_eq!(ColourClass::from_id(42), None);
    }
}
