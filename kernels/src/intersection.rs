use shared_structs::{
    BVHNode, BoundingBox, HitRecord, Point, PrimitiveKind, Ray, Sphere, Triangle, Vector,
    RAY_EPSILON,
};

/// Möller-Trumbore ray-triangle test. `min_dist`/`max_dist` bound the
/// accepted distance range; `RAY_EPSILON` slack is applied to the barycentric
/// bounds so hits exactly on a shared edge between adjacent triangles are not
/// lost to floating-point noise.
pub fn triangle_hit(triangle: &Triangle, ray: &Ray, min_dist: f64, max_dist: f64) -> Option<HitRecord> {
    let ray_cross_e2 = ray.direction.cross(triangle.edge2);
    let det = triangle.edge1.dot(ray_cross_e2);

    if det.abs() < f64::EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - triangle.p1;
    let u = s.dot(ray_cross_e2) * inv_det;
    if (u < 0.0 && u.abs() > f64::EPSILON) || (u > 1.0 && (u - 1.0).abs() > f64::EPSILON) {
        return None;
    }

    let s_cross_e1 = s.cross(triangle.edge1);
    let v = ray.direction.dot(s_cross_e1) * inv_det;
    if (v < 0.0 && v.abs() > f64::EPSILON) || (u + v > 1.0 && (u + v - 1.0).abs() > f64::EPSILON) {
        return None;
    }

    let distance = triangle.edge2.dot(s_cross_e1) * inv_det;
    if distance < min_dist || distance > max_dist {
        return None;
    }

    Some(HitRecord {
        distance,
        point: ray.at(distance),
        normal: triangle.normal,
        material_id: triangle.material_id,
    })
}

/// Analytic ray-sphere test via the half-b quadratic parametrization.
pub fn sphere_hit(sphere: &Sphere, ray: &Ray, min_dist: f64, max_dist: f64) -> Option<HitRecord> {
    let origin_to_center = sphere.center - ray.origin;
    let a = ray.direction.dot(ray.direction);
    let half_b = origin_to_center.dot(ray.direction);
    let c = origin_to_center.dot(origin_to_center) - sphere.radius * sphere.radius;
    let discriminant = half_b * half_b - a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let mut distance = (half_b - sqrt_disc) / a;
    if distance < min_dist || distance > max_dist {
        distance = (half_b + sqrt_disc) / a;
        if distance < min_dist || distance > max_dist {
            return None;
        }
    }

    let point = ray.at(distance);
    Some(HitRecord {
        distance,
        point,
        normal: (point - sphere.center) / sphere.radius,
        material_id: sphere.material_id,
    })
}

/// Slab test. Division by a zero ray-direction component correctly yields
/// infinities that resolve through the subsequent min/max chain, so no
/// special-casing of axis-aligned rays is needed.
pub fn aabb_hit(bounds: &BoundingBox, ray: &Ray, min_dist: f64, max_dist: f64) -> bool {
    let mut close = min_dist;
    let mut far = max_dist;
    for axis in 0..3 {
        let inv_d = 1.0 / ray.direction[axis];
        let mut t0 = (bounds.min[axis] - ray.origin[axis]) * inv_d;
        let mut t1 = (bounds.max[axis] - ray.origin[axis]) * inv_d;
        if inv_d < 0.0 {
            std::mem::swap(&mut t0, &mut t1);
        }
        close = close.max(t0);
        far = far.min(t1);
        if far < close {
            return false;
        }
    }
    true
}

/// Borrowed view over a built scene's geometry, mirroring the shape the
/// teacher passes its buffers in: the tracer never owns the data it walks.
pub struct SceneRef<'a> {
    pub nodes: &'a [BVHNode],
    pub triangles: &'a [Triangle],
    pub spheres: &'a [Sphere],
}

const STACK_CAPACITY: usize = 64;

impl<'a> SceneRef<'a> {
    fn hit_primitive(&self, kind: u32, index: u32, ray: &Ray, min_dist: f64, max_dist: f64) -> Option<HitRecord> {
        if kind == PrimitiveKind::Triangle as u32 {
            triangle_hit(&self.triangles[index as usize], ray, min_dist, max_dist)
        } else {
            sphere_hit(&self.spheres[index as usize], ray, min_dist, max_dist)
        }
    }

    /// Closest hit in `(RAY_EPSILON, 1e20]` via BVH traversal, nearer child
    /// visited first so the running `max_dist` prunes the farther subtree as
    /// early as possible.
    pub fn scene_hit(&self, ray: &Ray) -> Option<HitRecord> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut stack = [0u32; STACK_CAPACITY];
        let mut stack_len = 1usize;
        let mut closest = 1e20f64;
        let mut best: Option<HitRecord> = None;

        while stack_len > 0 {
            stack_len -= 1;
            let node = &self.nodes[stack[stack_len] as usize];
            if !aabb_hit(&node.bounds(), ray, RAY_EPSILON, closest) {
                continue;
            }

            if node.is_leaf != 0 {
                if let Some(hit) = self.hit_primitive(node.primitive_kind, node.left, ray, RAY_EPSILON, closest) {
                    closest = hit.distance;
                    best = Some(hit);
                }
                continue;
            }

            let (left, right) = (node.left as usize, node.right as usize);
            let left_dist = aabb_entry_distance(&self.nodes[left], ray, RAY_EPSILON, closest);
            let right_dist = aabb_entry_distance(&self.nodes[right], ray, RAY_EPSILON, closest);

            let (near, far, near_hit, far_hit) = if left_dist <= right_dist {
                (left, right, left_dist, right_dist)
            } else {
                (right, left, right_dist, left_dist)
            };

            if far_hit.is_finite() {
                stack[stack_len] = far as u32;
                stack_len += 1;
            }
            if near_hit.is_finite() {
                stack[stack_len] = near as u32;
                stack_len += 1;
            }
        }

        best
    }

    /// Linear scan over every primitive, used only by tests and benchmarks
    /// to cross-check the BVH traversal above.
    pub fn scene_hit_brute_force(&self, ray: &Ray) -> Option<HitRecord> {
        let mut closest = 1e20f64;
        let mut best: Option<HitRecord> = None;
        for sphere in self.spheres {
            if let Some(hit) = sphere_hit(sphere, ray, RAY_EPSILON, closest) {
                closest = hit.distance;
                best = Some(hit);
            }
        }
        for triangle in self.triangles {
            if let Some(hit) = triangle_hit(triangle, ray, RAY_EPSILON, closest) {
                closest = hit.distance;
                best = Some(hit);
            }
        }
        best
    }
}

fn aabb_entry_distance(node: &BVHNode, ray: &Ray, min_dist: f64, max_dist: f64) -> f64 {
    if aabb_hit(&node.bounds(), ray, min_dist, max_dist) {
        let mut close = min_dist;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let mut t0 = (node.bounds_min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (node.bounds_max[axis] - ray.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            close = close.max(t0);
        }
        close
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Point::new(-1.0, -1.0, 0.0),
            Point::new(1.0, -1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            0,
        )
    }

    #[test]
    fn triangle_hit_is_in_front_of_ray() {
        let tri = unit_triangle();
        let ray = Ray::new(Point::new(0.0, 0.0, -5.0), Vector::new(0.0, 0.0, 1.0));
        let hit = triangle_hit(&tri, &ray, RAY_EPSILON, 1e20).expect("should hit");
        assert!((hit.point - ray.at(hit.distance)).length() < 1e-6);
        assert!(hit.distance > RAY_EPSILON);
    }

    #[test]
    fn triangle_normal_is_unit() {
        let tri = unit_triangle();
        assert!((tri.normal.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sphere_normal_is_unit() {
        let sphere = Sphere {
            center: Point::new(0.0, 0.0, 0.0),
            radius: 2.0,
            material_id: 0,
        };
        let ray = Ray::new(Point::new(0.0, 0.0, -10.0), Vector::new(0.0, 0.0, 1.0));
        let hit = sphere_hit(&sphere, &ray, RAY_EPSILON, 1e20).expect("should hit");
        assert!((hit.normal.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn miss_outside_triangle() {
        let tri = unit_triangle();
        let ray = Ray::new(Point::new(5.0, 5.0, -5.0), Vector::new(0.0, 0.0, 1.0));
        assert!(triangle_hit(&tri, &ray, RAY_EPSILON, 1e20).is_none());
    }

    #[test]
    fn scene_hit_on_single_leaf_matches_brute_force() {
        let tri = unit_triangle();
        let triangles = vec![tri];
        let spheres: Vec<Sphere> = Vec::new();
        let node = BVHNode::leaf(tri.bounds(), PrimitiveKind::Triangle, 0);
        let nodes = vec![node];
        let scene = SceneRef {
            nodes: &nodes,
            triangles: &triangles,
            spheres: &spheres,
        };
        let ray = Ray::new(Point::new(0.0, 0.0, -5.0), Vector::new(0.0, 0.0, 1.0));
        let bvh = scene.scene_hit(&ray);
        let brute = scene.scene_hit_brute_force(&ray);
        assert!(bvh.is_some());
        assert!((bvh.unwrap().distance - brute.unwrap().distance).abs() < 1e-9);
    }

    #[test]
    fn empty_scene_never_hits() {
        let scene = SceneRef {
            nodes: &[],
            triangles: &[],
            spheres: &[],
        };
        let ray = Ray::new(Point::ZERO, Vector::new(0.0, 0.0, 1.0));
        assert!(scene.scene_hit(&ray).is_none());
    }
}
