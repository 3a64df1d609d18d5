/// Number of points generated per backdrop instance
pub const POINT_COUNT: i64 = 300;

/// Sampling extents per axis (min, max) in world units
pub const X_RANGE: (f32, f32) = (-100.0, 100.0);
pub const Y_RANGE: (f32, f32) = (-100.0, 100.0);
pub const Z_RANGE: (f32, f32) = (-50.0, 50.0);

/// Points closer than this are joined by an edge (strict)
pub const PROXIMITY_THRESHOLD: f32 = 20.0;

/// Below this point count the exhaustive pair scan beats building a spatial hash
pub const PARTITION_MIN_POINTS: usize = 2048;

/// Rotation added per rendered frame, radians
pub const ROTATION_STEP_X: f32 = 0.0002;
pub const ROTATION_STEP_Y: f32 = 0.0005;
