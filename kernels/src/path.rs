use shared_structs::{HitRecord, Material, Ray, Vector, MAX_BOUNCES, RAY_EPSILON};

use crate::intersection::SceneRef;
use crate::material::scatter;
use crate::rng::Rng;

/// Recursively extends `path` with scene intersections, scattering off each
/// hit material in turn, until the ray escapes the scene or `MAX_BOUNCES` is
/// reached. Returns the number of valid entries written to `path`.
pub fn trace_path(
    mut ray: Ray,
    path: &mut [HitRecord; MAX_BOUNCES as usize],
    materials: &[Material],
    scene: &SceneRef,
    rng: &mut Rng,
) -> usize {
    let mut depth = 0usize;
    while depth < MAX_BOUNCES as usize {
        let Some(hit) = scene.scene_hit(&ray) else {
            break;
        };
        path[depth] = hit;

        let material = &materials[hit.material_id as usize];
        ray = scatter(material, ray.direction, hit.normal, hit.point, rng);
        depth += 1;
    }
    depth
}

/// Walks a traced path front-to-back, accumulating emitted and directly
/// sampled radiance weighted by the running throughput (product of surface
/// albedos along the path so far).
///
/// Emission is only counted at the primary hit (`i == 0`); emission reaching
/// the camera via later bounces is accounted for exclusively through the
/// next-event-estimation term below, not by re-adding `material.emission` at
/// every vertex.
pub fn calculate_path_color(
    path: &[HitRecord],
    materials: &[Material],
    light: Option<&shared_structs::LightData>,
    scene: &SceneRef,
) -> Vector {
    let mut color = Vector::ZERO;
    let mut throughput = Vector::ONE;

    for (i, hit) in path.iter().enumerate() {
        let material = &materials[hit.material_id as usize];

        if i == 0 {
            color += throughput * material.emission;
        }

        if let Some(light) = light {
            let to_light = light.vertex - hit.point;
            let distance_to_light = to_light.length();
            let direction_to_light = to_light / distance_to_light;
            let direction_from_light = -direction_to_light;

            let cos_theta_light = light.normal.dot(direction_from_light);
            let cos_theta_surface = hit.normal.dot(direction_to_light);

            if cos_theta_light > 0.0 && cos_theta_surface > 0.0 {
                let origin = hit.point + hit.normal * RAY_EPSILON;
                let shadow_ray = Ray::new(origin, direction_to_light);

                let blocked = match scene.scene_hit(&shadow_ray) {
                    Some(shadow_hit) => shadow_hit.distance <= distance_to_light - RAY_EPSILON,
                    None => false,
                };

                if !blocked {
                    let falloff = 1.0 / (distance_to_light * distance_to_light + 1.0);
                    let intensity = cos_theta_surface * cos_theta_light * falloff;
                    let light_emission = materials[light.material_id as usize].emission;
                    let direct_light_contribution = light_emission * intensity;
                    let reflected_light = direct_light_contribution * material.color;
                    color += throughput * reflected_light;
                }
            }
        }

        throughput *= material.color;
    }

    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_structs::{BVHNode, MaterialKind, Point, PrimitiveKind, Sphere, Triangle};

    fn materials() -> Vec<Material> {
        vec![Material {
            color: Vector::splat(0.8),
            emission: Vector::ZERO,
            kind: MaterialKind::Mirror,
            index_of_refraction: 1.0,
        }]
    }

    #[test]
    fn mirror_box_runs_to_max_bounces() {
        // Two parallel mirror planes (as single huge triangles is awkward;
        // use a closed mirror sphere shell the ray starts inside of,
        // guaranteeing every bounce keeps hitting the sphere from inside).
        let spheres = vec![Sphere {
            center: Point::ZERO,
            radius: 10.0,
            material_id: 0,
        }];
        let triangles: Vec<Triangle> = Vec::new();
        let mats = materials();
        let node = BVHNode::leaf(spheres[0].bounds(), PrimitiveKind::Sphere, 0);
        let nodes = vec![node];
        let scene = SceneRef {
            nodes: &nodes,
            triangles: &triangles,
            spheres: &spheres,
        };

        let mut rng = Rng::new(1);
        let ray = Ray::new(Point::new(0.1, 0.0, 0.0), Vector::new(1.0, 0.0, 0.0));
        let mut path = [HitRecord {
            distance: 0.0,
            point: Point::ZERO,
            normal: Vector::ZERO,
            material_id: 0,
        }; MAX_BOUNCES as usize];
        let hits = trace_path(ray, &mut path, &mats, &scene, &mut rng);
        assert_eq!(hits, MAX_BOUNCES as usize);
    }

    #[test]
    fn no_light_and_no_emission_gives_black() {
        let hit = HitRecord {
            distance: 1.0,
            point: Point::new(0.0, 0.0, -1.0),
            normal: Vector::new(0.0, 0.0, 1.0),
            material_id: 0,
        };
        let path = [hit];
        let mats = materials();
        let nodes: Vec<BVHNode> = Vec::new();
        let triangles: Vec<Triangle> = Vec::new();
        let spheres: Vec<Sphere> = Vec::new();
        let scene = SceneRef {
            nodes: &nodes,
            triangles: &triangles,
            spheres: &spheres,
        };
        let color = calculate_path_color(&path, &mats, None, &scene);
        assert_eq!(color, Vector::ZERO);
    }
}
