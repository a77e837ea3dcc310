use shared_structs::Vector;

/// Mirrors `reflect(v, n) = v - 2*(v.n)*n`. Returns the unit direction a
/// perfectly specular surface sends `incoming` into, given unit normal `n`.
pub fn reflect(incoming: Vector, n: Vector) -> Vector {
    incoming - 2.0 * incoming.dot(n) * n
}

/// Schlick's approximation to the Fresnel reflectance of a dielectric
/// interface, given the cosine of the incident angle and the relative index
/// of refraction.
pub fn fresnel_schlick(cos_theta: f64, ior: f64) -> f64 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_theta).powi(5)
}

/// `normalize`, but returns the zero vector for inputs shorter than 1e-10
/// rather than producing NaNs.
pub fn safe_normalize(v: Vector) -> Vector {
    if v.length_squared() < 1e-20 {
        Vector::ZERO
    } else {
        v.normalize()
    }
}
