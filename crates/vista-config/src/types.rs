use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output display geometry (split side-by-side between the eyes).
    pub display: DisplayConfig,
    /// Stereo camera parameters.
    pub camera: CameraConfig,
    /// Orientation tracker parameters.
    pub tracker: TrackerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            camera: CameraConfig::default(),
            tracker: TrackerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl DisplayConfig {
    /// Per-eye aspect ratio: each eye renders into half the display.
    pub fn eye_aspect(&self) -> f32 {
        (self.width as f32 / 2.0) / self.height as f32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Eye separation from the view midpoint (world units).
    pub parallax: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// World-space eye midpoint.
    #[serde(with = "vec3_serde")]
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 90.0,
            parallax: 0.4,
            near: 0.1,
            far: 30.0,
            position: Vec3::new(-1.7, 3.0, 3.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Whether magnetometer drift correction starts enabled.
    pub drift_correction: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            drift_correction: true,
        }
    }
}

// Serde helper for glam vectors, stored in TOML as plain arrays.

mod vec3_serde {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        [v.x, v.y, v.z].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        let [x, y, z] = <[f32; 3]>::deserialize(d)?;
        Ok(Vec3::new(x, y, z))
    }
}
