use glam::{Quat, Vec3};

/// Sensor kinds delivered by a sensor backend.
///
/// The accelerometer is assumed always present; gyroscope and magnetometer
/// availability decides the fusion mode at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Magnetometer,
}

/// Latest reading per sensor kind, in the shared inertial frame.
///
/// Latest-value-wins: each kind is overwritten independently as readings
/// arrive, no history is kept. A kind whose sensor is absent stays zero,
/// which the filter tolerates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSamples {
    /// Accelerometer reading (m/s^2), gravity plus linear acceleration.
    pub accel: Vec3,
    /// Gyroscope angular velocity (rad/s).
    pub gyro: Vec3,
    /// Magnetometer field (uT).
    pub mag: Vec3,
}

/// Fused head orientation pulled by the camera each frame.
#[derive(Debug, Clone, Copy)]
pub struct Orientation {
    /// Head orientation as a unit quaternion.
    pub quaternion: Quat,
}
