/// Colour class identifiers shared between the generator and the renderer
pub struct ClassInfo {
    pub id: u8,
    pub name: &'static str,
    /// Lower bound of the uniform draw, exclusive. The last band uses 0.0 and catches everything.
    pub above: f32,
    /// sRGB colour
    pub colour: [f32; 3],
}

pub const ALERT: u8 = 0;
pub const WARNING: u8 = 1;
pub const NOMINAL: u8 = 2;

/// Evaluated top to bottom, first match wins
pub const CLASS_MAP: &[ClassInfo] = &[
    ClassInfo {
        id: ALERT,
        name: "alert",
        above: 0.95,
        colour: [0.937, 0.267, 0.267],
    },
    ClassInfo {
        id: WARNING,
        name: "warning",
        above: 0.80,
        colour: [0.961, 0.620, 0.043],
    },
    ClassInfo {
        id: NOMINAL,
        name: "nominal",
        above: 0.0,
        colour: [0.231, 0.510, 0.965],
    },
];

pub fn get_class_name(id: u8) -> String {
    CLASS_MAP
        .iter()
        .find(|c| c.id == id)
        .map_or("unknown", |c| c.name)
        .to_string()
}
