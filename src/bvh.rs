use shared_structs::{BVHNode, BoundingBox, PrimitiveKind, Sphere, Triangle};

/// Transient per-primitive record consumed only during construction: the
/// primitive's kind/index, its already-epsilon-inflated bounds, and its
/// centroid, which drives the split decision.
#[derive(Copy, Clone)]
struct BVHObject {
    kind: PrimitiveKind,
    index: u32,
    bounds: BoundingBox,
    centroid: shared_structs::Point,
}

fn collect_objects(triangles: &[Triangle], spheres: &[Sphere]) -> Vec<BVHObject> {
    let mut objects = Vec::with_capacity(triangles.len() + spheres.len());
    for (i, t) in triangles.iter().enumerate() {
        objects.push(BVHObject {
            kind: PrimitiveKind::Triangle,
            index: i as u32,
            bounds: t.bounds(),
            centroid: t.centroid(),
        });
    }
    for (i, s) in spheres.iter().enumerate() {
        objects.push(BVHObject {
            kind: PrimitiveKind::Sphere,
            index: i as u32,
            bounds: s.bounds(),
            centroid: s.center,
        });
    }
    objects
}

/// Builds the flat BVH arena over `triangles` and `spheres`. Returns an empty
/// arena for an empty scene (traversal treats that as "no hit" for every
/// ray). The root, when present, is always at index 0.
pub fn build(triangles: &[Triangle], spheres: &[Sphere]) -> Vec<BVHNode> {
    let mut objects = collect_objects(triangles, spheres);
    if objects.is_empty() {
        return Vec::new();
    }

    let mut nodes = Vec::with_capacity(objects.len() * 2 - 1);
    build_range(&mut objects, &mut nodes);
    nodes
}

/// Recursively partitions `objects[..]` by median split on the centroid
/// volume's largest axis, reserving this node's arena slot before recursing
/// so the very first call always lands at index 0 (the root).
fn build_range(objects: &mut [BVHObject], nodes: &mut Vec<BVHNode>) -> u32 {
    let count = objects.len();
    debug_assert!(count > 0);

    if count == 1 {
        let obj = objects[0];
        let idx = nodes.len() as u32;
        nodes.push(BVHNode::leaf(obj.bounds, obj.kind, obj.index));
        return idx;
    }

    let mut centroid_min = shared_structs::Point::splat(f64::INFINITY);
    let mut centroid_max = shared_structs::Point::splat(f64::NEG_INFINITY);
    let mut bounding_volume = BoundingBox::EMPTY;
    for obj in objects.iter() {
        centroid_min = centroid_min.min(obj.centroid);
        centroid_max = centroid_max.max(obj.centroid);
        bounding_volume = bounding_volume.union(&obj.bounds);
    }

    let extent = centroid_max - centroid_min;
    let axis = if extent.x > extent.y && extent.x > extent.z {
        0
    } else if extent.y > extent.x && extent.y > extent.z {
        1
    } else {
        2
    };

    objects.sort_by(|a, b| {
        let ca = component(a.centroid, axis);
        let cb = component(b.centroid, axis);
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let idx = nodes.len() as u32;
    nodes.push(BVHNode::interior(bounding_volume, 0, 0));

    let mid = count / 2;
    let (left_objects, right_objects) = objects.split_at_mut(mid);
    let left = build_range(left_objects, nodes);
    let right = build_range(right_objects, nodes);

    nodes[idx as usize] = BVHNode::interior(bounding_volume, left, right);
    idx
}

fn component(p: shared_structs::Point, axis: usize) -> f64 {
    match axis {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_structs::Point;

    fn tri_at(x: f64) -> Triangle {
        Triangle::new(
            Point::new(x, 0.0, 0.0),
            Point::new(x + 1.0, 0.0, 0.0),
            Point::new(x, 1.0, 0.0),
            0,
        )
    }

    #[test]
    fn leaf_count_matches_primitive_count() {
        let triangles: Vec<Triangle> = (0..17).map(|i| tri_at(i as f64 * 3.0)).collect();
        let nodes = build(&triangles, &[]);
        let leaves = nodes.iter().filter(|n| n.is_leaf != 0).count();
        let interior = nodes.iter().filter(|n| n.is_leaf == 0).count();
        assert_eq!(leaves, triangles.len());
        assert_eq!(interior, triangles.len() - 1);
    }

    #[test]
    fn single_primitive_is_root_leaf() {
        let triangles = vec![tri_at(0.0)];
        let nodes = build(&triangles, &[]);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].is_leaf, 1);
    }

    #[test]
    fn empty_scene_has_no_nodes() {
        let nodes = build(&[], &[]);
        assert!(nodes.is_empty());
    }

    #[test]
    fn every_node_bounds_contains_its_subtree() {
        let triangles: Vec<Triangle> = (0..9).map(|i| tri_at(i as f64 * 2.0)).collect();
        let nodes = build(&triangles, &[]);
        for node in &nodes {
            let b = node.bounds();
            if node.is_leaf != 0 {
                let t = &triangles[node.left as usize];
                for p in [t.p1, t.p2, t.p3] {
                    assert!(p.x >= b.min.x - 1e-6 && p.x <= b.max.x + 1e-6);
                }
            }
        }
    }
}
