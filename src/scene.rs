use kernels::intersection::SceneRef;
use kernels::light::detect_light;
use shared_structs::{BVHNode, BoundingBox, LightData, Material, Sphere, Triangle};

use crate::bvh;

/// Owns all geometry and derived acceleration/lighting data for one render.
/// Immutable once built: every worker thread borrows it read-only.
pub struct Scene {
    pub triangles: Vec<Triangle>,
    pub spheres: Vec<Sphere>,
    pub materials: Vec<Material>,
    pub bounding_box: BoundingBox,
    pub light: Option<LightData>,
    pub bvh_nodes: Vec<BVHNode>,
}

impl Scene {
    /// Assembles a scene from already-loaded geometry: computes the overall
    /// bounding box, detects the light (if any), and builds the BVH.
    pub fn build(triangles: Vec<Triangle>, spheres: Vec<Sphere>, materials: Vec<Material>) -> Scene {
        let mut bounding_box = BoundingBox::EMPTY;
        for t in &triangles {
            bounding_box = bounding_box.extend(t.p1).extend(t.p2).extend(t.p3);
        }
        for s in &spheres {
            bounding_box = bounding_box.union(&s.bounds());
        }

        let light = detect_light(&triangles, &materials);
        let bvh_nodes = bvh::build(&triangles, &spheres);

        Scene {
            triangles,
            spheres,
            materials,
            bounding_box,
            light,
            bvh_nodes,
        }
    }

    pub fn as_ref(&self) -> SceneRef<'_> {
        SceneRef {
            nodes: &self.bvh_nodes,
            triangles: &self.triangles,
            spheres: &self.spheres,
        }
    }

    pub fn primitive_count(&self) -> usize {
        self.triangles.len() + self.spheres.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_structs::{MaterialKind, Point, Vector};

    #[test]
    fn empty_scene_has_no_light_and_no_nodes() {
        let scene = Scene::build(Vec::new(), Vec::new(), Vec::new());
        assert!(scene.light.is_none());
        assert!(scene.bvh_nodes.is_empty());
    }

    #[test]
    fn scene_with_emissive_triangle_detects_light() {
        let materials = vec![Material {
            color: Vector::ONE,
            emission: Vector::ONE,
            kind: MaterialKind::Diffuse,
            index_of_refraction: 1.0,
        }];
        let triangles = vec![Triangle::new(
            Point::new(-1.0, 5.0, -1.0),
            Point::new(1.0, 5.0, -1.0),
            Point::new(0.0, 5.0, 1.0),
            0,
        )];
        let scene = Scene::build(triangles, Vec::new(), materials);
        assert!(scene.light.is_some());
        assert_eq!(scene.bvh_nodes.len(), 1);
    }
}
