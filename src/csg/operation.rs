//! The subtraction pipeline and result assembly.

use crate::csg::classify::{build_adjacency, classify_polygons, mark_boundary_vertices, split_object};
use crate::csg::context::CsgContext;
use crate::csg::object::CsgObject;
use crate::csg::polygon::{CsgPolygon, PolygonStatus};
use crate::csg::vertex::VertexId;
use crate::float_types::parry3d::bounding_volume::BoundingVolume;
use crate::float_types::{EPSILON, Real};
use hashbrown::HashSet;
use nalgebra::Point3;
use tracing::debug;

/// Polygons bounding `left - right`.
///
/// Both objects are cut against each other (left by right, right by left,
/// then left by right again since cutting right can expose new crossings),
/// classified against each other and filtered by [`select_polygons`]. With
/// `config.weld_t_junctions` set the result is passed through
/// [`weld_t_junctions`] so every edge is matched by exactly one reversed edge.
///
/// An empty result means `right` swallowed `left` whole.
pub fn csg_subtract<S: Clone>(
    ctx: &mut CsgContext,
    left: &mut CsgObject<S>,
    right: &mut CsgObject<S>,
) -> Vec<CsgPolygon<S>> {
    split_object(ctx, left, right);
    split_object(ctx, right, left);
    split_object(ctx, left, right);

    mark_boundary_vertices(ctx, left, right);
    mark_boundary_vertices(ctx, right, left);

    build_adjacency(ctx, left);
    classify_polygons(ctx, left, right);
    build_adjacency(ctx, right);
    classify_polygons(ctx, right, left);

    let mut result = select_polygons(left, right);
    if ctx.config.weld_t_junctions {
        weld_t_junctions(ctx, &mut result);
    }

    debug!(
        left = left.polygons.len(),
        right = right.polygons.len(),
        kept = result.len(),
        splits = ctx.stats.splits,
        "subtraction assembled"
    );
    result
}

/// Polygons of `left` outside `right` or facing away from a coplanar face of
/// it, followed by the polygons of `right` inside `left`, turned inside out.
///
/// Turned polygons take the payload of `left`'s first polygon so the carved
/// surface looks like the material it was carved from.
pub fn select_polygons<S: Clone>(left: &CsgObject<S>, right: &CsgObject<S>) -> Vec<CsgPolygon<S>> {
    debug_assert!(
        left.polygons
            .iter()
            .chain(&right.polygons)
            .all(|p| p.status != PolygonStatus::Unknown),
        "selecting from unclassified polygons"
    );

    let kept = left
        .polygons
        .iter()
        .filter(|p| matches!(p.status, PolygonStatus::Outside | PolygonStatus::Opposite))
        .cloned();

    let material = left.polygons.first().map(|p| p.metadata.clone());
    let carved = right
        .polygons
        .iter()
        .filter(|p| p.status == PolygonStatus::Inside)
        .map(|p| {
            let mut inverted = p.invert();
            if let Some(material) = &material {
                inverted.metadata = material.clone();
            }
            inverted
        });

    kept.chain(carved).collect()
}

/// Insert into every polygon edge the result vertices lying strictly inside
/// that edge.
///
/// A cut that stops at a neighbouring polygon leaves a vertex in the middle of
/// that neighbour's edge. Inserting it there pairs the edge halves up again.
/// Inserted points are collinear with the edge, so planes and bounds are
/// unchanged.
pub fn weld_t_junctions<S: Clone>(ctx: &CsgContext, polygons: &mut [CsgPolygon<S>]) {
    let mut seen = HashSet::new();
    let candidates: Vec<(VertexId, Point3<Real>)> = polygons
        .iter()
        .flat_map(|p| p.vertices.iter().copied())
        .filter(|id| seen.insert(*id))
        .map(|id| (id, ctx.position(id)))
        .collect();

    let mut inserted = 0;
    for poly in polygons.iter_mut() {
        let region = poly.bounding_box.loosened(EPSILON);
        let nearby: Vec<_> = candidates
            .iter()
            .filter(|(_, p)| region.contains_local_point(p))
            .collect();
        if nearby.len() <= poly.vertices.len() {
            continue;
        }

        let mut welded = Vec::with_capacity(poly.vertices.len());
        for (a, b) in poly.edges() {
            welded.push(a);
            let start = ctx.position(a);
            let edge = ctx.position(b) - start;
            let length_squared = edge.norm_squared();
            if length_squared < EPSILON * EPSILON {
                continue;
            }
            let length = length_squared.sqrt();

            let mut on_edge: Vec<(Real, VertexId)> = nearby
                .iter()
                .filter(|(id, _)| *id != a && *id != b)
                .filter_map(|(id, p)| {
                    let s = (p - start).dot(&edge) / length_squared;
                    let along = s * length;
                    if along <= EPSILON || along >= length - EPSILON {
                        return None;
                    }
                    let off_line = (p - (start + edge * s)).norm();
                    (off_line < EPSILON).then_some((s, *id))
                })
                .collect();
            on_edge.sort_by(|x, y| x.0.total_cmp(&y.0));
            inserted += on_edge.len();
            welded.extend(on_edge.into_iter().map(|(_, id)| id));
        }

        if welded.len() != poly.vertices.len() {
            poly.vertices = welded;
        }
    }

    if inserted > 0 {
        debug!(inserted, "welded t-junctions");
    }
}
