use crate::math::{Point, Real};

/// Given an index buffer, remove from `vertices` (and the parallel `values`)
/// every vertex that is not indexed.
///
/// The relative order of the remaining vertices is preserved. Returns, for
/// each original vertex, its new index or `None` if it was removed.
pub fn remove_unused_vertices(
    vertices: &mut Vec<Point<Real>>,
    mut values: Option<&mut Vec<Real>>,
    idx: &mut [[u32; 3]],
) -> Vec<Option<u32>> {
    let mut used = vec![false; vertices.len()];
    for i in idx.iter().flatten() {
        used[*i as usize] = true;
    }

    let mut remap = vec![None; vertices.len()];
    let mut kept = 0;
    for i in 0..vertices.len() {
        if used[i] {
            vertices[kept] = vertices[i];
            if let Some(values) = values.as_deref_mut() {
                values[kept] = values[i];
            }
            remap[i] = Some(kept as u32);
            kept += 1;
        }
    }

    vertices.truncate(kept);
    if let Some(values) = values {
        values.truncate(kept);
    }

    for i in idx.iter_mut().flatten() {
        if let Some(new_i) = remap[*i as usize] {
            *i = new_i;
        }
    }

    remap
}

/// Keeps the entries of a per-vertex array whose vertex survived a
/// [`remove_unused_vertices`] call, given the remapping it returned.
pub fn retain_remapped<T>(data: &mut Vec<T>, remap: &[Option<u32>]) {
    let mut i = 0;
    data.retain(|_| {
        let kept = remap.get(i).is_some_and(|r| r.is_some());
        i += 1;
        kept
    });
}
