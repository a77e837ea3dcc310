use bytemuck::{Pod, Zeroable};
use glam::DVec3;

/// A displacement or direction in scene space.
pub type Vector = DVec3;
/// A location in scene space.
pub type Point = DVec3;

/// Ray origin offset used when spawning secondary rays off a surface, and the
/// near-clip distance for all intersection queries.
pub const RAY_EPSILON: f64 = 1e-3;

/// Hard cap on path length. Prevents runaway recursion in closed, mirrored
/// scenes where a ray may never escape.
pub const MAX_BOUNCES: u32 = 20;

/// Default samples accumulated per pixel.
pub const TOTAL_SAMPLES: u32 = 10;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vector,
}

impl Ray {
    pub fn new(origin: Point, direction: Vector) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub const EMPTY: BoundingBox = BoundingBox {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn extend(&self, p: Point) -> BoundingBox {
        BoundingBox {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn centroid(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vector {
        self.max - self.min
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Triangle {
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
    pub edge1: Vector,
    pub edge2: Vector,
    pub normal: Vector,
    pub material_id: u32,
}

impl Triangle {
    pub fn new(p1: Point, p2: Point, p3: Point, material_id: u32) -> Self {
        let edge1 = p2 - p1;
        let edge2 = p3 - p1;
        let normal = edge1.cross(edge2).normalize_or_zero();
        Triangle {
            p1,
            p2,
            p3,
            edge1,
            edge2,
            normal,
            material_id,
        }
    }

    pub fn centroid(&self) -> Point {
        (self.p1 + self.p2 + self.p3) / 3.0
    }

    /// Bounds inflated by `RAY_EPSILON` on every face, guarding against
    /// rays missing near-degenerate triangles lying exactly on a slab.
    pub fn bounds(&self) -> BoundingBox {
        let min = self.p1.min(self.p2).min(self.p3) - Vector::splat(RAY_EPSILON);
        let max = self.p1.max(self.p2).max(self.p3) + Vector::splat(RAY_EPSILON);
        BoundingBox { min, max }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Sphere {
    pub center: Point,
    pub radius: f64,
    pub material_id: u32,
}

impl Sphere {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            min: self.center - Vector::splat(self.radius),
            max: self.center + Vector::splat(self.radius),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaterialKind {
    Diffuse,
    Mirror,
    Glass,
}

#[derive(Copy, Clone, Debug)]
pub struct Material {
    pub color: Vector,
    pub emission: Vector,
    pub kind: MaterialKind,
    pub index_of_refraction: f64,
}

impl Material {
    pub fn diffuse(color: Vector) -> Self {
        Material {
            color,
            emission: Vector::ZERO,
            kind: MaterialKind::Diffuse,
            index_of_refraction: 1.0,
        }
    }

    pub fn is_light(&self) -> bool {
        self.emission.max_element() > 0.0
    }
}

/// Derived next-event-estimation target: a single representative point on the
/// scene's one supported area light, plus enough geometry to evaluate a
/// shadow ray's solid angle contribution.
#[derive(Copy, Clone, Debug)]
pub struct LightData {
    pub material_id: u32,
    pub vertex: Point,
    pub edge1: Vector,
    pub edge2: Vector,
    pub normal: Vector,
    pub area: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum PrimitiveKind {
    Triangle = 0,
    Sphere = 1,
}

unsafe impl Zeroable for PrimitiveKind {}
unsafe impl Pod for PrimitiveKind {}

/// Flat arena BVH node. Interior nodes reference two children by index into
/// the same arena; leaves reference exactly one primitive. `left` doubles as
/// the leaf's primitive index (`right` is unused for leaves, kept so the
/// struct stays a fixed, `Pod`-friendly size).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct BVHNode {
    pub bounds_min: Point,
    pub bounds_max: Point,
    pub left: u32,
    pub right: u32,
    pub is_leaf: u32,
    pub primitive_kind: u32,
}

impl BVHNode {
    pub fn leaf(bounds: BoundingBox, kind: PrimitiveKind, primitive_index: u32) -> Self {
        BVHNode {
            bounds_min: bounds.min,
            bounds_max: bounds.max,
            left: primitive_index,
            right: 0,
            is_leaf: 1,
            primitive_kind: kind as u32,
        }
    }

    pub fn interior(bounds: BoundingBox, left: u32, right: u32) -> Self {
        BVHNode {
            bounds_min: bounds.min,
            bounds_max: bounds.max,
            left,
            right,
            is_leaf: 0,
            primitive_kind: 0,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            min: self.bounds_min,
            max: self.bounds_max,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct HitRecord {
    pub distance: f64,
    pub point: Point,
    pub normal: Vector,
    pub material_id: u32,
}

/// Row-major RGBA8 raster, top-left origin.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        PixelBuffer {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }
}

#[derive(Copy, Clone, Debug)]
pub struct TracerConfig {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub fov_degrees: f64,
    pub seed: u64,
    pub threads: usize,
}

impl Default for TracerConfig {
    fn default() -> Self {
        TracerConfig {
            width: 500,
            height: 500,
            samples: TOTAL_SAMPLES,
            fov_degrees: 39.0,
            seed: 0x5EED_1234_ABCD_EF01,
            threads: 1,
        }
    }
}
