//! Frame profiles (PVC systems)
//!
//! Uf values and visible face widths follow the manufacturer data sheets for
//! the standard outer frame + sash combination. Prices are material cost per
//! m² of frame area.

use serde::{Deserialize, Serialize};

/// A frame profile system as sold by the manufacturer.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "salamander-bluevolution-92",
///   "name": "Salamander bluEvolution 92",
///   "frame_u_value": 1.0,
///   "visible_face_width_mm": 110.0,
///   "price_per_m2": 160.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameProfile {
    /// Unique catalog key
    pub id: String,

    /// Display name, copied into every window that uses this profile
    pub name: String,

    /// Frame heat-transfer coefficient Uf (W/m²K)
    pub frame_u_value: f64,

    /// Visible face width of frame + sash on each side (mm)
    pub visible_face_width_mm: f64,

    /// Material price per m² of frame area
    pub price_per_m2: f64,
}

impl FrameProfile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        frame_u_value: f64,
        visible_face_width_mm: f64,
        price_per_m2: f64,
    ) -> Self {
        FrameProfile {
            id: id.into(),
            name: name.into(),
            frame_u_value,
            visible_face_width_mm,
            price_per_m2,
        }
    }
}

pub(crate) fn builtin_profiles() -> Vec<FrameProfile> {
    vec![
        FrameProfile::new("salamander-bluevolution-92", "Salamander bluEvolution 92", 1.0, 110.0, 160.0),
        FrameProfile::new("salamander-bauline-80", "Salamander Bauline 80", 1.06, 100.0, 150.0),
        FrameProfile::new("salamander-design-2d", "Salamander Design 2D", 1.3, 80.0, 130.0),
        FrameProfile::new("salamander-pb", "Salamander PB", 1.06, 110.0, 155.0),
        FrameProfile::new("veka-softline-82", "VEKA Softline 82", 1.3, 110.0, 150.0),
        FrameProfile::new("veka-swingline", "VEKA Swingline", 1.4, 108.0, 140.0),
        FrameProfile::new("veka-euroline", "VEKA Euroline", 1.5, 90.0, 120.0),
        FrameProfile::new("veka-alphaline", "VEKA Alphaline", 1.2, 110.0, 170.0),
        FrameProfile::new("veka-whs", "VEKA WHS", 1.6, 90.0, 110.0),
    ]
}
