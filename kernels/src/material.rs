use shared_structs::{Material, MaterialKind, Point, Ray, Vector, RAY_EPSILON};

use crate::rng::Rng;
use crate::vec::{fresnel_schlick, reflect};

fn mirror_reflection(incoming: Vector, normal: Vector, point: Point) -> Ray {
    Ray::new(point + normal * RAY_EPSILON, reflect(incoming, normal).normalize())
}

fn diffuse_reflection(normal: Vector, point: Point, rng: &mut Rng) -> Ray {
    let rand_vec = Vector::new(rng.next_signed(), rng.next_signed(), rng.next_signed());
    Ray::new(point + normal * RAY_EPSILON, (normal + rand_vec).normalize())
}

/// Dielectric scatter: reflects (possibly via total internal reflection) or
/// refracts, chosen stochastically by a Schlick-approximated Fresnel term.
fn glass_scatter(incoming: Vector, normal: Vector, point: Point, ior: f64, rng: &mut Rng) -> Ray {
    let mut cos_theta = incoming.dot(normal);
    let mut glass_normal = normal;
    let mut refraction_ratio = 1.0 / ior;

    if cos_theta > 0.0 {
        glass_normal = -normal;
        refraction_ratio = ior;
    } else {
        cos_theta = -cos_theta;
    }

    let internal_reflection_check = 1.0 - refraction_ratio * refraction_ratio * (1.0 - cos_theta * cos_theta);

    if internal_reflection_check < 0.0 {
        return mirror_reflection(incoming, glass_normal, point);
    }

    let fresnel_probability = fresnel_schlick(cos_theta, ior);

    if rng.next_f64() < fresnel_probability {
        mirror_reflection(incoming, glass_normal, point)
    } else {
        let direction = (incoming * refraction_ratio
            + glass_normal * (refraction_ratio * cos_theta - internal_reflection_check.sqrt()))
        .normalize();
        Ray::new(point - glass_normal * RAY_EPSILON, direction)
    }
}

/// Produces the next ray of a path after scattering off `material` at
/// `point`, given the incoming ray direction and surface normal.
pub fn scatter(material: &Material, incoming: Vector, normal: Vector, point: Point, rng: &mut Rng) -> Ray {
    match material.kind {
        MaterialKind::Mirror => mirror_reflection(incoming, normal, point),
        MaterialKind::Diffuse => diffuse_reflection(normal, point, rng),
        MaterialKind::Glass => glass_scatter(incoming, normal, point, material.index_of_refraction, rng),
    }
}
