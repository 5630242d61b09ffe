// Minimal 3D math used by the beam projection: vectors, row-major 4x4
// matrices and a perspective/frustum builder. Pure and stateless.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn divide(self, d: f32) -> Self {
        Self::new(self.x / d, self.y / d, self.z / d)
    }

    /// Moves the point onto the near plane when it sits behind it.
    /// Projecting a vertex with z at or behind the eye would divide by a
    /// non-positive w and flip the quad inside out.
    pub fn clip_z(self, min: f32) -> Self {
        if self.z >= min {
            self
        } else {
            Self::new(self.x, self.y, min)
        }
    }
}

/// Row-major 4x4 matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Mat4 {
    pub fn identity() -> Self {
        let mut m = [0.0; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        Self { m }
    }

    pub fn multiply(&self, rhs: &Mat4) -> Mat4 {
        let a = &self.m;
        let b = &rhs.m;
        let mut r = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a[row * 4 + k] * b[k * 4 + col];
                }
                r[row * 4 + col] = sum;
            }
        }
        Mat4 { m: r }
    }

    /// Applies the full transform including the perspective divide by the
    /// w row.
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        let w = m[12] * v.x + m[13] * v.y + m[14] * v.z + m[15];
        Vec3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z + m[3],
            m[4] * v.x + m[5] * v.y + m[6] * v.z + m[7],
            m[8] * v.x + m[9] * v.y + m[10] * v.z + m[11],
        )
        .divide(w)
    }

    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let y = (fov_degrees * std::f32::consts::PI / 360.0).tan() * near;
        let x = y * aspect;
        Mat4::frustum(-x, x, -y, y, near, far)
    }

    pub fn frustum(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> Mat4 {
        let mut m = [0.0; 16];
        m[0] = 2.0 * n / (r - l);
        m[2] = (r + l) / (r - l);
        m[5] = 2.0 * n / (t - b);
        m[6] = (t + b) / (t - b);
        m[10] = -(f + n) / (f - n);
        m[11] = -2.0 * f * n / (f - n);
        m[14] = -1.0;
        Mat4 { m }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_points_untouched() {
        let v = Vec3::new(3.0, -2.0, 5.0);
        let out = Mat4::identity().transform_point(v);
        assert_eq!(out, v);
    }

    #[test]
    fn multiply_by_identity_is_noop() {
        let p = Mat4::perspective(45.0, 4.0 / 3.0, 0.1, 1000.0);
        let out = p.multiply(&Mat4::identity());
        assert_eq!(out, p);
    }

    #[test]
    fn perspective_divides_by_depth() {
        let p = Mat4::perspective(45.0, 1.0, 0.1, 1000.0);
        let near = p.transform_point(Vec3::new(0.5, 0.5, 1.0));
        let far = p.transform_point(Vec3::new(0.5, 0.5, 2.0));
        // Same lateral offset shrinks on screen as depth grows.
        assert!(far.x.abs() < near.x.abs());
        assert!(far.y.abs() < near.y.abs());
    }

    #[test]
    fn projection_is_centered() {
        let p = Mat4::perspective(45.0, 2.0, 0.1, 1000.0);
        let out = p.transform_point(Vec3::new(0.0, 0.0, 5.0));
        assert!(out.x.abs() < 1e-6);
        assert!(out.y.abs() < 1e-6);
    }

    #[test]
    fn clip_z_snaps_points_behind_near_plane() {
        let near = 0.1;
        let behind = Vec3::new(1.0, 2.0, -0.5).clip_z(near);
        assert_eq!(behind, Vec3::new(1.0, 2.0, near));
        let ahead = Vec3::new(1.0, 2.0, 0.5).clip_z(near);
        assert_eq!(ahead, Vec3::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn transform_point_sign_flips_behind_eye() {
        // Without clipping, a vertex behind the eye projects inverted.
        let p = Mat4::perspective(45.0, 1.0, 0.1, 1000.0);
        let front = p.transform_point(Vec3::new(1.0, 0.0, 1.0));
        let behind = p.transform_point(Vec3::new(1.0, 0.0, -1.0));
        assert!(front.x * behind.x < 0.0);
    }
}
