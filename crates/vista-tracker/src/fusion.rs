use crate::types::RawSamples;
use glam::{Quat, Vec3};

/// Fusion strategy, fixed at startup from which sensors exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionMode {
    /// Accelerometer only: tilt correction plus lean-to-steer yaw.
    AccelOnly,
    /// Gyro integration with accelerometer tilt correction.
    AccelGyro,
    /// Accelerometer plus compass. A calibrated compass behaves almost
    /// like a gyroscope here, which is why it outranks gyro-only in
    /// [`FusionMode::select`].
    AccelMag,
    /// All three sensors.
    AccelGyroMag,
}

impl FusionMode {
    /// Select the mode from sensor availability.
    ///
    /// The precedence is fixed: magnetometer-without-gyro wins over
    /// gyro-without-mag.
    pub fn select(gyro_present: bool, mag_present: bool) -> Self {
        match (gyro_present, mag_present) {
            (true, true) => FusionMode::AccelGyroMag,
            (false, true) => FusionMode::AccelMag,
            (true, false) => FusionMode::AccelGyro,
            (false, false) => FusionMode::AccelOnly,
        }
    }
}

/// Rest-drift rejection threshold for gyro integration (rad/s).
const GYRO_DRIFT_THRESHOLD: f32 = 0.1;
/// Heading is only corrected while the head is actually turning.
const MAG_MOTION_GATE: f32 = 0.1;

/// Tilt filter strengths per mode.
const TILT_ALPHA_ACCEL_ONLY: f32 = 0.1;
const TILT_ALPHA_ACCEL_MAG: f32 = 0.2;
const TILT_ALPHA_WITH_GYRO: f32 = 0.02;

/// Yaw filter strengths per mode.
const MAG_ALPHA_ACCEL_MAG: f32 = 0.05;
const MAG_ALPHA_FULL: f32 = 0.005;

/// Divisor turning raw lateral acceleration into a steering angle.
const LEAN_STEER_DIVISOR: f32 = 200.0;

/// Complementary filter over gyroscope integration and the
/// accelerometer/magnetometer reference vectors.
///
/// `gyro_q` carries the running gyro-integrated orientation, `head_q` the
/// corrected estimate handed to the camera. Both stay unit-norm: every
/// composition is followed by a renormalize.
pub struct FusionFilter {
    mode: FusionMode,
    gyro_q: Quat,
    head_q: Quat,
}

impl FusionFilter {
    pub fn new(mode: FusionMode) -> Self {
        Self {
            mode,
            gyro_q: Quat::IDENTITY,
            head_q: Quat::IDENTITY,
        }
    }

    pub fn mode(&self) -> FusionMode {
        self.mode
    }

    /// The latest corrected orientation without advancing the filter.
    pub fn head_quaternion(&self) -> Quat {
        self.head_q
    }

    /// Advance the filter by one step.
    ///
    /// `dt` is the elapsed time since the previous step in seconds;
    /// `drift_correction` gates magnetometer use in the modes that have
    /// one. Returns the updated head quaternion.
    pub fn step(&mut self, samples: &RawSamples, dt: f32, drift_correction: bool) -> Quat {
        match self.mode {
            FusionMode::AccelOnly => {
                self.correct_tilt(samples.accel, TILT_ALPHA_ACCEL_ONLY);
                self.lean_steer_yaw(samples.accel);
            }
            FusionMode::AccelMag => {
                self.correct_tilt(samples.accel, TILT_ALPHA_ACCEL_MAG);
                if drift_correction {
                    // Compass replaces the lean-steer branch; the motion
                    // gate is bypassed in this mode.
                    self.correct_yaw(samples.mag, 1.0, MAG_ALPHA_ACCEL_MAG);
                } else {
                    self.lean_steer_yaw(samples.accel);
                }
            }
            FusionMode::AccelGyro => {
                self.integrate_gyro(samples.gyro, dt, GYRO_DRIFT_THRESHOLD);
                self.correct_tilt(samples.accel, TILT_ALPHA_WITH_GYRO);
            }
            FusionMode::AccelGyroMag => {
                let step_len = self.integrate_gyro(samples.gyro, dt, GYRO_DRIFT_THRESHOLD);
                self.correct_tilt(samples.accel, TILT_ALPHA_WITH_GYRO);
                if drift_correction {
                    self.correct_yaw(samples.mag, step_len, MAG_ALPHA_FULL);
                }
            }
        }
        self.head_q
    }

    /// Integrate angular velocity into `gyro_q` and return its magnitude.
    ///
    /// Below `drift_threshold` the delta is the identity, so sensor noise
    /// at rest never accumulates into a slow spin.
    fn integrate_gyro(&mut self, w: Vec3, dt: f32, drift_threshold: f32) -> f32 {
        let l = w.length();
        let delta = if l > drift_threshold {
            // Exponential-map small rotation, half-angle l * dt / 2.
            let half_angle = 0.5 * dt * l;
            let s = half_angle.sin() / l;
            Quat::from_xyzw(s * w.x, s * w.y, s * w.z, half_angle.cos())
        } else {
            Quat::IDENTITY
        };
        self.gyro_q = (self.gyro_q * delta).normalize();
        l
    }

    /// Pull pitch/roll toward the gravity vector by a fraction `alpha`.
    ///
    /// The accelerometer also picks up linear acceleration, so only a
    /// fraction of the detected tilt error is corrected per step; the
    /// repeated small corrections act as a low-pass filter.
    fn correct_tilt(&mut self, accel: Vec3, alpha: f32) {
        let measured = self.gyro_q * accel;
        let len = measured.length();
        if len <= f32::EPSILON {
            // No usable reading; leave the estimate where it is.
            self.head_q = self.gyro_q;
            return;
        }
        let up = measured / len;

        // Rotation axis: horizontal-plane cross between measured up and
        // world up.
        let horiz = (up.x * up.x + up.z * up.z).sqrt();
        if horiz <= 1e-6 {
            // Already aligned with world up, nothing to correct.
            self.head_q = self.gyro_q;
            return;
        }
        let axis = Vec3::new(-up.z / horiz, 0.0, up.x / horiz);
        let phi = up.y.clamp(-1.0, 1.0).acos();

        self.head_q = (Quat::from_axis_angle(axis, alpha * phi) * self.gyro_q).normalize();
        self.gyro_q = self.head_q;
    }

    /// Pull heading toward the compass by a fraction `alpha`.
    ///
    /// No-op while `gate_len` is below the motion gate, so a stationary
    /// estimate is never corrupted by magnetometer noise.
    fn correct_yaw(&mut self, mag: Vec3, gate_len: f32, alpha: f32) {
        if gate_len < MAG_MOTION_GATE {
            return;
        }
        let m = self.gyro_q * mag;
        let theta = m.z.atan2(m.x);

        self.head_q = (Quat::from_axis_angle(Vec3::Y, alpha * theta) * self.gyro_q).normalize();
        self.gyro_q = self.head_q;
    }

    /// Yaw by leaning the head sideways, for devices without a rate
    /// sensor (racing-game steering).
    fn lean_steer_yaw(&mut self, accel: Vec3) {
        let angle = -(accel.x / LEAN_STEER_DIVISOR).sin();

        self.head_q = (Quat::from_axis_angle(Vec3::Y, angle) * self.gyro_q).normalize();
        self.gyro_q = self.head_q;
    }
}
