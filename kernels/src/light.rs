use shared_structs::{LightData, Material, Triangle};

const MAX_LIGHT_TRIANGLES: usize = 8;
const SHARED_VERTEX_EPSILON_SQ: f64 = 1e-8;

/// Finds the scene's single supported area light: the first material with a
/// positive emission component, and the rectangle (from two triangles) or
/// triangle (from one) it's painted on. Scenes with zero, or more than two,
/// triangles assigned to the light material have no detected light.
pub fn detect_light(triangles: &[Triangle], materials: &[Material]) -> Option<LightData> {
    let light_material_id = materials.iter().position(|m| m.is_light())? as u32;

    let light_triangles: Vec<&Triangle> = triangles
        .iter()
        .filter(|t| t.material_id == light_material_id)
        .take(MAX_LIGHT_TRIANGLES)
        .collect();

    match light_triangles.len() {
        2 => {
            let t0 = light_triangles[0];
            let t1 = light_triangles[1];
            let t0_verts = [t0.p1, t0.p2, t0.p3];
            let t1_verts = [t1.p1, t1.p2, t1.p3];

            let unique_vertex = t1_verts.iter().find(|v| {
                !t0_verts
                    .iter()
                    .any(|w| (**v - *w).length_squared() < SHARED_VERTEX_EPSILON_SQ)
            })?;

            let edge1 = t0.p2 - t0.p1;
            let edge2 = *unique_vertex - t0.p1;
            let vertex = t0.p1 + (edge1 + edge2) * 0.5;

            Some(LightData {
                material_id: light_material_id,
                vertex,
                edge1,
                edge2,
                normal: t0.normal,
                area: edge1.cross(edge2).length(),
            })
        }
        1 => {
            let t = light_triangles[0];
            let edge1 = t.p2 - t.p1;
            let edge2 = t.p3 - t.p1;
            Some(LightData {
                material_id: light_material_id,
                vertex: t.p1,
                edge1,
                edge2,
                normal: t.normal,
                area: 0.5 * edge1.cross(edge2).length(),
            })
        }
        _ => None,
    }
}
