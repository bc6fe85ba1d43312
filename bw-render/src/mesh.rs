use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use bw_utils::{BoxDimensions, Face};

/// Center, right and up axes of a face on a box of the given size. The
/// right/up vectors are half extents; right × up points outward.
pub fn face_frame(face: Face, dims: &BoxDimensions) -> (Vec3, Vec3, Vec3) {
    let hx = dims.width / 2.0;
    let hy = dims.height / 2.0;
    let hz = dims.depth / 2.0;
    match face {
        Face::Right => (Vec3::X * hx, Vec3::NEG_Z * hz, Vec3::Y * hy),
        Face::Left => (Vec3::NEG_X * hx, Vec3::Z * hz, Vec3::Y * hy),
        Face::Lid => (Vec3::Y * hy, Vec3::X * hx, Vec3::NEG_Z * hz),
        Face::Bottom => (Vec3::NEG_Y * hy, Vec3::X * hx, Vec3::Z * hz),
        Face::Front => (Vec3::Z * hz, Vec3::X * hx, Vec3::Y * hy),
        Face::Back => (Vec3::NEG_Z * hz, Vec3::NEG_X * hx, Vec3::Y * hy),
    }
}

/// One side of the box as its own quad so each face can carry a material.
/// UV (0, 0) is the top-left corner of the face as seen from outside.
pub fn face_mesh(face: Face, dims: &BoxDimensions) -> Mesh {
    let (center, right, up) = face_frame(face, dims);
    let normal = right.cross(up).normalize_or_zero();

    let corners = [
        center - right - up,
        center + right - up,
        center + right + up,
        center - right + up,
    ];
    let positions: Vec<[f32; 3]> = corners.iter().map(|c| c.to_array()).collect();
    let normals = vec![normal.to_array(); 4];
    let uvs = vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let indices = vec![0u32, 1, 2, 0, 2, 3];

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// The twelve box edges as a line list.
pub fn edge_mesh(dims: &BoxDimensions) -> Mesh {
    let h = Vec3::new(dims.width, dims.height, dims.depth) / 2.0;
    let corner = |i: u32| {
        Vec3::new(
            if i & 1 == 0 { -h.x } else { h.x },
            if i & 2 == 0 { -h.y } else { h.y },
            if i & 4 == 0 { -h.z } else { h.z },
        )
    };
    let positions: Vec<[f32; 3]> = (0..8).map(|i| corner(i).to_array()).collect();

    // Corners differing in exactly one bit share an edge.
    let mut indices = Vec::with_capacity(24);
    for a in 0..8u32 {
        for bit in [1u32, 2, 4] {
            let b = a | bit;
            if b != a {
                indices.extend([a, b]);
            }
        }
    }

    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(mesh: &Mesh) -> Vec<Vec3> {
        mesh.attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|attr| attr.as_float3())
            .unwrap()
            .iter()
            .map(|p| Vec3::from_array(*p))
            .collect()
    }

    #[test]
    fn face_normals_match_slot_axes() {
        let dims = BoxDimensions::default();
        let expected = [
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::NEG_Z,
        ];
        for (slot, axis) in expected.into_iter().enumerate() {
            let face = Face::from_slot(slot).unwrap();
            let (center, right, up) = face_frame(face, &dims);
            assert!(right.cross(up).normalize().abs_diff_eq(axis, 1e-6), "{face}");
            assert!(center.normalize().abs_diff_eq(axis, 1e-6), "{face}");
        }
    }

    #[test]
    fn face_quad_spans_its_side() {
        let dims = BoxDimensions::new(2.0, 4.0, 6.0).unwrap();
        let corners = positions(&face_mesh(Face::Front, &dims));
        assert_eq!(corners[0], Vec3::new(-1.0, -2.0, 3.0));
        assert_eq!(corners[2], Vec3::new(1.0, 2.0, 3.0));

        let lid = positions(&face_mesh(Face::Lid, &dims));
        // top-left of the lid seen from above is the back-left corner
        assert_eq!(lid[3], Vec3::new(-1.0, 2.0, -3.0));
    }

    #[test]
    fn winding_faces_outward() {
        let dims = BoxDimensions::default();
        for face in Face::ALL {
            let p = positions(&face_mesh(face, &dims));
            let n = (p[1] - p[0]).cross(p[2] - p[0]);
            let (center, _, _) = face_frame(face, &dims);
            assert!(n.dot(center) > 0.0, "{face}");
        }
    }

    #[test]
    fn outline_has_twelve_edges() {
        let mesh = edge_mesh(&BoxDimensions::default());
        assert_eq!(mesh.indices().map(|i| i.len()), Some(24));
        assert_eq!(positions(&mesh).len(), 8);
    }
}
