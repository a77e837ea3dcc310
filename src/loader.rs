use std::path::Path;

use shared_structs::{Material, MaterialKind, Point, Triangle, Vector};
use thiserror::Error;

use crate::scene::Scene;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse OBJ: {0}")]
    ObjParse(tobj::LoadError),
    #[error("failed to parse referenced MTL: {0}")]
    MtlParse(tobj::LoadError),
    #[error("face {face_index} in mesh {mesh_index} is degenerate (zero area)")]
    DegenerateFace { mesh_index: usize, face_index: usize },
}

fn illum_to_kind(illumination_model: Option<u8>) -> MaterialKind {
    match illumination_model {
        Some(5) => MaterialKind::Mirror,
        Some(7) => MaterialKind::Glass,
        _ => MaterialKind::Diffuse,
    }
}

/// MTL has no native emissive channel in `tobj`'s typed `Material` struct;
/// `Ke` surfaces only through the catch-all `unknown_param` map.
fn parse_ke(material: &tobj::Material) -> Vector {
    material
        .unknown_param
        .get("Ke")
        .and_then(|raw| {
            let mut parts = raw.split_whitespace();
            let r: f64 = parts.next()?.parse().ok()?;
            let g: f64 = parts.next()?.parse().ok()?;
            let b: f64 = parts.next()?.parse().ok()?;
            Some(Vector::new(r, g, b))
        })
        .unwrap_or(Vector::ZERO)
}

fn convert_material(material: &tobj::Material) -> Material {
    let color = material
        .diffuse
        .map(|[r, g, b]| Vector::new(r as f64, g as f64, b as f64))
        .unwrap_or(Vector::splat(0.8));
    Material {
        color,
        emission: parse_ke(material),
        kind: illum_to_kind(material.illumination_model),
        index_of_refraction: material.optical_density.unwrap_or(1.5) as f64,
    }
}

/// Loads a triangle scene (and its referenced materials) from a Wavefront
/// OBJ file. The OBJ format has no native sphere primitive, so a scene
/// loaded this way always has zero spheres.
pub fn load_scene(obj_path: &Path) -> Result<Scene, LoadError> {
    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    let (models, materials_result) =
        tobj::load_obj(obj_path, &load_options).map_err(LoadError::ObjParse)?;
    let tobj_materials = materials_result.map_err(LoadError::MtlParse)?;

    let mut materials: Vec<Material> = tobj_materials.iter().map(convert_material).collect();
    let default_material_id = materials.len() as u32;
    materials.push(Material::diffuse(Vector::splat(0.8)));

    let mut triangles = Vec::new();
    for (mesh_index, model) in models.iter().enumerate() {
        let mesh = &model.mesh;
        let material_id = mesh
            .material_id
            .map(|id| id as u32)
            .unwrap_or(default_material_id);

        for (face_index, chunk) in mesh.indices.chunks(3).enumerate() {
            let [ia, ib, ic] = [chunk[0], chunk[1], chunk[2]];
            let p1 = position(&mesh.positions, ia);
            let p2 = position(&mesh.positions, ib);
            let p3 = position(&mesh.positions, ic);

            let edge1 = p2 - p1;
            let edge2 = p3 - p1;
            if edge1.cross(edge2).length_squared() < 1e-20 {
                return Err(LoadError::DegenerateFace { mesh_index, face_index });
            }

            triangles.push(Triangle::new(p1, p2, p3, material_id));
        }
    }

    Ok(Scene::build(triangles, Vec::new(), materials))
}

fn position(positions: &[f32], index: u32) -> Point {
    let base = index as usize * 3;
    Point::new(
        positions[base] as f64,
        positions[base + 1] as f64,
        positions[base + 2] as f64,
    )
}
