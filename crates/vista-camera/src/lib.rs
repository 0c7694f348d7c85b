//! Stereo view synthesis from a fused head orientation.
//!
//! Pull-based: the caller feeds the tracker's quaternion into
//! [`VrCamera::update`] once per frame and hands the resulting left/right
//! transforms to the renderer.

use glam::{Mat4, Quat, Vec3};

/// Cutoff on `1 - w^2` below which a quaternion counts as the identity
/// for axis-angle extraction.
const AXIS_EPSILON: f32 = 1e-6;

/// Transforms for one eye, rebuilt on every update.
#[derive(Debug, Clone, Copy)]
pub struct EyeTransforms {
    /// Eye offset, head rotation, then camera translation.
    pub view: Mat4,
    /// Projection * view, ready for the renderer.
    pub combined: Mat4,
}

/// Stereo VR camera.
///
/// Position is the midpoint between the eyes; each eye is offset by
/// `parallax` along the local X axis before the head rotation is applied.
pub struct VrCamera {
    position: Vec3,
    parallax: f32,
    projection: Mat4,
    direction: Vec3,
    up: Vec3,
    right: Vec3,
    left_eye: EyeTransforms,
    right_eye: EyeTransforms,
}

impl VrCamera {
    /// `fov_y_degrees` is the vertical field of view, `aspect_ratio` the
    /// per-eye ratio (half the display width over its height), `parallax`
    /// the eye separation from the midpoint.
    pub fn new(fov_y_degrees: f32, aspect_ratio: f32, parallax: f32, near: f32, far: f32) -> Self {
        let projection =
            Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect_ratio, near, far);
        let identity = EyeTransforms {
            view: Mat4::IDENTITY,
            combined: projection,
        };
        Self {
            position: Vec3::ZERO,
            parallax,
            projection,
            direction: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::Z.cross(Vec3::Y),
            left_eye: identity,
            right_eye: identity,
        }
    }

    /// Move the eye midpoint.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Rebuild both eye transforms from the fused head orientation.
    pub fn update(&mut self, head: Quat) {
        // The view matrices bypass the usual look-at path, so direction
        // and up are derived from the quaternion by hand.
        self.direction = head * Vec3::Z;
        self.up = head * Vec3::Y;
        self.right = self.direction.cross(self.up).normalize_or_zero();

        let rotation = match axis_angle(head) {
            Some((axis, angle)) => Mat4::from_axis_angle(axis, -angle),
            None => Mat4::IDENTITY,
        };
        let recenter = Mat4::from_translation(-self.position);

        let left_view =
            Mat4::from_translation(Vec3::new(self.parallax, 0.0, 0.0)) * rotation * recenter;
        let right_view =
            Mat4::from_translation(Vec3::new(-self.parallax, 0.0, 0.0)) * rotation * recenter;

        self.left_eye = EyeTransforms {
            view: left_view,
            combined: self.projection * left_view,
        };
        self.right_eye = EyeTransforms {
            view: right_view,
            combined: self.projection * right_view,
        };
    }

    pub fn left_eye(&self) -> &EyeTransforms {
        &self.left_eye
    }

    pub fn right_eye(&self) -> &EyeTransforms {
        &self.right_eye
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Forward direction of the head.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }
}

/// Unit axis and angle of `q`, or `None` when `q` is close enough to the
/// identity that the sine term would divide to NaN.
fn axis_angle(q: Quat) -> Option<(Vec3, f32)> {
    let w = q.w.clamp(-1.0, 1.0);
    let sin_half_sq = 1.0 - w * w;
    if sin_half_sq <= AXIS_EPSILON {
        return None;
    }
    let s = sin_half_sq.sqrt().recip();
    Some((Vec3::new(q.x, q.y, q.z) * s, 2.0 * w.acos()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((x - y).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    fn camera() -> VrCamera {
        VrCamera::new(90.0, 960.0 / 1080.0, 0.4, 0.1, 30.0)
    }

    #[test]
    fn identity_orientation_yields_translation_only() {
        let mut cam = camera();
        cam.set_position(Vec3::new(-1.7, 3.0, 3.0));
        cam.update(Quat::IDENTITY);

        let expected = Mat4::from_translation(Vec3::new(0.4, 0.0, 0.0))
            * Mat4::from_translation(Vec3::new(1.7, -3.0, -3.0));
        assert_mat_eq(cam.left_eye().view, expected);
        assert!(cam.left_eye().combined.is_finite());
        assert!(cam.right_eye().combined.is_finite());
    }

    #[test]
    fn axis_angle_identity_is_zero_rotation() {
        assert!(axis_angle(Quat::IDENTITY).is_none());
        // w slightly out of range from accumulated float error.
        assert!(axis_angle(Quat::from_xyzw(0.0, 0.0, 0.0, 1.0000001)).is_none());
    }

    #[test]
    fn axis_angle_roundtrips_through_matrix() {
        let q = Quat::from_axis_angle(Vec3::new(0.6, 0.0, 0.8), 1.2);
        let (axis, angle) = axis_angle(q).unwrap();
        assert_mat_eq(Mat4::from_axis_angle(axis, angle), Mat4::from_quat(q));
    }

    #[test]
    fn direction_and_up_follow_the_head() {
        let mut cam = camera();
        cam.update(Quat::from_rotation_y(FRAC_PI_2));
        assert!((cam.direction() - Vec3::X).length() < 1e-5);
        assert!((cam.up() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn eyes_differ_only_by_parallax() {
        let mut cam = camera();
        cam.set_position(Vec3::new(0.5, 1.0, -2.0));
        cam.update(Quat::from_rotation_y(0.3));

        let shift = Mat4::from_translation(Vec3::new(-0.8, 0.0, 0.0));
        assert_mat_eq(shift * cam.left_eye().view, cam.right_eye().view);
    }

    #[test]
    fn combined_is_projection_times_view() {
        let mut cam = camera();
        cam.update(Quat::from_rotation_x(0.2));
        assert_mat_eq(
            cam.left_eye().combined,
            cam.projection * cam.left_eye().view,
        );
    }
}
