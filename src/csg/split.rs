//! Cutting a polygon along the plane of a polygon from the other operand.
//!
//! A cut is only made where the two polygons physically cross: the polygon
//! being cut has to straddle the other polygon's plane, the other polygon has
//! to reach this polygon's plane, and the stretches both of them cover along
//! the line where the planes meet must overlap by more than [`EPSILON`]. The
//! cut itself runs along the whole chord of the cutting plane, leaving two
//! convex pieces that share the new edge.

use crate::csg::context::CsgContext;
use crate::csg::object::CsgObject;
use crate::csg::polygon::CsgPolygon;
use crate::csg::vertex::{VertexId, VertexStatus};
use crate::float_types::{COPLANAR_EPSILON, EPSILON, Real};
use crate::geometry::newell_normal;
use crate::geometry::plane::{BACK, COPLANAR, FRONT, Plane, SPANNING};
use hashbrown::{HashMap, HashSet};
use nalgebra::{Point3, Vector3};
use tracing::{debug, trace};

/// Cut `object.polygons[index]` where it crosses `split_by`.
///
/// On success the polygon is replaced in place by the piece in front of the
/// cutting plane, the piece behind it is appended to `object.polygons`, and
/// `true` is returned. Points on the cut come from the context's positional
/// lookup, so neighbouring polygons cut at the same place share vertices, and
/// they are marked [`VertexStatus::Boundary`].
///
/// Returns `false`, leaving `object` untouched, when the planes are parallel,
/// the polygons do not cross, the overlap is too short, or the resulting
/// pieces would be degenerate.
pub fn split_polys<S: Clone>(
    ctx: &mut CsgContext,
    object: &mut CsgObject<S>,
    index: usize,
    split_by: &CsgPolygon<S>,
) -> bool {
    let poly = &object.polygons[index];
    let Some(line) = poly.plane.intersection_direction(&split_by.plane) else {
        return false;
    };

    let positions = ctx.positions(&poly.vertices);
    let types: Vec<i8> = positions
        .iter()
        .map(|p| split_by.plane.orient_point(p))
        .collect();
    if types.iter().fold(0, |acc, &t| acc | t) != SPANNING {
        return false;
    }

    let Some(own_span) = chord_span(&positions, &types, &split_by.plane, &line) else {
        return false;
    };
    let other_positions = ctx.positions(&split_by.vertices);
    let other_types: Vec<i8> = other_positions
        .iter()
        .map(|p| poly.plane.orient_point(p))
        .collect();
    let Some(other_span) = chord_span(&other_positions, &other_types, &poly.plane, &line) else {
        return false;
    };

    let overlap = own_span.1.min(other_span.1) - own_span.0.max(other_span.0);
    if overlap <= EPSILON {
        return false;
    }

    let n = poly.vertices.len();
    let mut front = Vec::with_capacity(n + 2);
    let mut back = Vec::with_capacity(n + 2);
    let mut cut_points = Vec::with_capacity(2);

    for i in 0..n {
        let j = (i + 1) % n;
        let (type_i, type_j) = (types[i], types[j]);
        let id_i = poly.vertices[i];

        if type_i != BACK {
            front.push(id_i);
        }
        if type_i != FRONT {
            back.push(id_i);
        }
        if (type_i | type_j) == SPANNING {
            let point = edge_plane_intersection(&positions[i], &positions[j], &split_by.plane);
            let id = ctx.vertex_at(point);
            front.push(id);
            back.push(id);
            cut_points.push(id);
        }
    }

    dedup_ring(&mut front);
    dedup_ring(&mut back);
    if front.len() < 3 || back.len() < 3 {
        ctx.stats.rejected_splits += 1;
        trace!(index, "rejected split with a collapsed piece");
        return false;
    }

    let pieces = [
        CsgPolygon::with_plane(ctx, front, poly.plane, poly.metadata.clone()),
        CsgPolygon::with_plane(ctx, back, poly.plane, poly.metadata.clone()),
    ];
    if !is_valid_polygon_split(ctx, poly, &pieces, cut_points.len()) {
        ctx.stats.rejected_splits += 1;
        debug!(index, "rejected split failing validation");
        return false;
    }

    for &id in &cut_points {
        ctx.vertex_mut(id).status = VertexStatus::Boundary;
        object.track_vertex(id);
    }
    let [front, back] = pieces;
    object.polygons[index] = front;
    object.polygons.push(back);
    ctx.stats.splits += 1;
    trace!(index, overlap, "split polygon");
    true
}

/// Checks a split of `original` into `results`.
///
/// `num_pre_split_edges` is the number of edges of `original` that were cut
/// in two. A split is valid when:
/// - every result faces the same way as `original`,
/// - no result visits a vertex twice,
/// - every vertex of `original` survives in some result,
/// - no directed edge occurs twice across the results,
/// - every result shares an edge, in reverse, with another result,
/// - the edges of `original` kept whole plus the cut ones account for all
///   of its edges.
pub fn is_valid_polygon_split<S: Clone>(
    ctx: &CsgContext,
    original: &CsgPolygon<S>,
    results: &[CsgPolygon<S>],
    num_pre_split_edges: usize,
) -> bool {
    for result in results {
        let Some(normal) = newell_normal(&ctx.positions(&result.vertices)) else {
            return false;
        };
        if normal.dot(&original.plane.normal) < 1.0 - COPLANAR_EPSILON {
            return false;
        }

        let mut seen = HashSet::new();
        if !result.vertices.iter().all(|v| seen.insert(*v)) {
            return false;
        }
    }

    let used: HashSet<VertexId> = results
        .iter()
        .flat_map(|r| r.vertices.iter().copied())
        .collect();
    if !original.vertices.iter().all(|v| used.contains(v)) {
        return false;
    }

    let mut owners: HashMap<(VertexId, VertexId), usize> = HashMap::new();
    for (k, result) in results.iter().enumerate() {
        for edge in result.edges() {
            if owners.insert(edge, k).is_some() {
                return false;
            }
        }
    }

    for (k, result) in results.iter().enumerate() {
        let shares_edge = result
            .edges()
            .any(|(a, b)| owners.get(&(b, a)).is_some_and(|&m| m != k));
        if !shares_edge {
            return false;
        }
    }

    let preserved = original
        .edges()
        .filter(|edge| owners.contains_key(edge))
        .count();
    preserved + num_pre_split_edges == original.vertices.len()
}

/// Interval covered along `line` by the part of an outline lying on `plane`.
///
/// That part is made of the outline's vertices on the plane plus the points
/// where its edges cross it. `None` when the outline never reaches the plane.
fn chord_span(
    positions: &[Point3<Real>],
    types: &[i8],
    plane: &Plane,
    line: &Vector3<Real>,
) -> Option<(Real, Real)> {
    let n = positions.len();
    let mut span: Option<(Real, Real)> = None;
    let mut include = |p: &Point3<Real>| {
        let t = line.dot(&p.coords);
        span = Some(match span {
            Some((lo, hi)) => (lo.min(t), hi.max(t)),
            None => (t, t),
        });
    };

    for i in 0..n {
        let j = (i + 1) % n;
        if types[i] == COPLANAR {
            include(&positions[i]);
        }
        if (types[i] | types[j]) == SPANNING {
            include(&edge_plane_intersection(&positions[i], &positions[j], plane));
        }
    }

    span
}

/// Where the segment `a`–`b` meets `plane`. The endpoints must lie strictly on
/// opposite sides.
fn edge_plane_intersection(a: &Point3<Real>, b: &Point3<Real>, plane: &Plane) -> Point3<Real> {
    let direction = b - a;
    let t = (plane.w - plane.normal.dot(&a.coords)) / plane.normal.dot(&direction);
    a + direction * t
}

/// Drop consecutive repeats, including a repeat across the wrap-around.
fn dedup_ring(ids: &mut Vec<VertexId>) {
    ids.dedup();
    while ids.len() > 1 && ids.first() == ids.last() {
        ids.pop();
    }
}
