use shared_structs::{BoundingBox, Point, Ray, Vector};

#[derive(Copy, Clone, Debug)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,
    pub position: Point,
    pub forward: Vector,
    pub right: Vector,
    pub up: Vector,
    pub half_tan_fov: f64,
}

impl Camera {
    /// A camera looking down -Z from the origin, 90 degree FOV. Useful for
    /// tests that place geometry explicitly rather than relying on
    /// auto-framing.
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Camera {
            image_width,
            image_height,
            position: Point::ZERO,
            forward: Vector::new(0.0, 0.0, -1.0),
            right: Vector::new(1.0, 0.0, 0.0),
            up: Vector::new(0.0, 1.0, 0.0),
            half_tan_fov: (90f64.to_radians() * 0.5).tan(),
        }
    }

    /// Auto-positions the camera so the whole scene bounding box is framed
    /// at a fixed 39 degree field of view, looking back along -Z toward the
    /// box's center from just beyond its far face.
    pub fn frame_scene(image_width: u32, image_height: u32, bounds: &BoundingBox) -> Self {
        let extent = bounds.extent();
        let center = bounds.min + extent * 0.5;

        let half_width = extent.x * 0.5;
        let half_height = extent.y * 0.5;
        let max_half = half_width.max(half_height);

        let fov_degrees = 39.0f64;
        let half_tan_fov = (fov_degrees * std::f64::consts::PI / 360.0).tan();
        let distance = max_half / half_tan_fov;

        let position = Point::new(center.x, center.y, bounds.max.z + distance);
        let forward = (center - position).normalize();
        let right = forward.cross(Vector::new(0.0, 1.0, 0.0)).normalize();
        let up = right.cross(forward);

        Camera {
            image_width,
            image_height,
            position,
            forward,
            right,
            up,
            half_tan_fov,
        }
    }

    /// Primary ray through (possibly sub-pixel, for jittered antialiasing)
    /// image coordinates `(px, py)`, with row 0 at the top of the image.
    pub fn primary_ray(&self, px: f64, py: f64) -> Ray {
        let aspect_ratio = self.image_width as f64 / self.image_height as f64;

        let normalized_x = (2.0 * (px + 0.5) / self.image_width as f64) - 1.0;
        let normalized_y = -(2.0 * (py + 0.5) / self.image_height as f64) + 1.0;

        let x = normalized_x * aspect_ratio * self.half_tan_fov;
        let y = normalized_y * self.half_tan_fov;

        let direction = self.forward + self.right * x + self.up * y;
        Ray::new(self.position, direction.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_looks_along_forward() {
        let cam = Camera::new(500, 500);
        let ray = cam.primary_ray(249.5, 249.5);
        assert!((ray.direction - cam.forward).length() < 1e-6);
    }

    #[test]
    fn frame_scene_centers_box() {
        let bounds = BoundingBox {
            min: Point::new(-1.0, -1.0, -5.0),
            max: Point::new(1.0, 1.0, -5.0),
        };
        let cam = Camera::frame_scene(500, 500, &bounds);
        assert!((cam.forward.length() - 1.0).abs() < 1e-9);
        assert!(cam.position.z > bounds.max.z);
    }
}
