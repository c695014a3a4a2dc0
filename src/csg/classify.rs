//! Splitting both operands against each other and deciding, for every
//! resulting polygon, where it lies relative to the other solid.

use crate::csg::context::CsgContext;
use crate::csg::object::CsgObject;
use crate::csg::polygon::{CsgPolygon, PolygonStatus};
use crate::csg::split::split_polys;
use crate::csg::vertex::{VertexId, VertexStatus};
use crate::float_types::parry3d::bounding_volume::BoundingVolume;
use crate::float_types::parry3d::query::{Ray, RayCast};
use crate::float_types::{EPSILON, Real};
use crate::geometry::{PointInPolygon, are_coplanar, barycenter, is_inside, ray_plane_distance};
use nalgebra::Vector3;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Split every polygon of `object` against every polygon of `other` until a
/// full pass makes no cut.
///
/// Only pairs with overlapping bounds and distinct planes are tried. Gives up
/// after `config.max_split_passes` passes, keeping whatever cuts were made;
/// this is logged and counted in [`CsgStats::truncated_split_loops`].
///
/// [`CsgStats::truncated_split_loops`]: crate::csg::CsgStats::truncated_split_loops
pub fn split_object<S: Clone>(
    ctx: &mut CsgContext,
    object: &mut CsgObject<S>,
    other: &CsgObject<S>,
) {
    if !object
        .bounding_box()
        .loosened(EPSILON)
        .intersects(&other.bounding_box())
    {
        return;
    }

    for pass in 0..ctx.config.max_split_passes {
        ctx.stats.split_passes += 1;
        let mut split_any = false;

        // pieces appended by a split are visited later in the same pass
        let mut index = 0;
        while index < object.polygons.len() {
            for candidate in &other.polygons {
                let poly = &object.polygons[index];
                if !poly
                    .bounding_box
                    .loosened(EPSILON)
                    .intersects(&candidate.bounding_box)
                    || are_coplanar(&poly.plane, &candidate.plane)
                {
                    continue;
                }
                if split_polys(ctx, object, index, candidate) {
                    split_any = true;
                }
            }
            index += 1;
        }

        if !split_any {
            trace!(passes = pass + 1, polygons = object.polygons.len(), "splitting settled");
            return;
        }
    }

    ctx.stats.truncated_split_loops += 1;
    warn!(
        max_passes = ctx.config.max_split_passes,
        polygons = object.polygons.len(),
        "split loop hit its pass cap; continuing with the cuts made so far"
    );
}

/// Rebuild the neighbor lists of `object`'s vertices from its polygon edges.
///
/// Links made while handling the other operand are cleared first, so shared
/// vertices only see neighbors within `object`.
pub fn build_adjacency<S: Clone>(ctx: &mut CsgContext, object: &CsgObject<S>) {
    for &id in &object.vertices {
        ctx.vertex_mut(id).neighbors.clear();
    }
    for poly in &object.polygons {
        for (a, b) in poly.edges() {
            ctx.vertex_mut(a).link(b);
            ctx.vertex_mut(b).link(a);
        }
    }
}

/// Mark every vertex of `object` lying on the surface of `other` as
/// [`VertexStatus::Boundary`].
///
/// Cut points are already marked by the splitter. This catches the rest:
/// original corners that touch the other solid and vertices the two
/// operands share.
pub fn mark_boundary_vertices<S: Clone>(
    ctx: &mut CsgContext,
    object: &CsgObject<S>,
    other: &CsgObject<S>,
) {
    let surface: Vec<_> = other
        .polygons
        .iter()
        .map(|poly| (poly, ctx.positions(&poly.vertices)))
        .collect();

    for &id in &object.vertices {
        if ctx.vertex(id).status == VertexStatus::Boundary {
            continue;
        }
        let point = ctx.position(id);
        let on_surface = surface.iter().any(|(poly, outline)| {
            let distance = poly.plane.signed_distance(&point);
            if distance.abs() >= EPSILON {
                return false;
            }
            let projected = point - poly.plane.normal * distance;
            is_inside(outline, &projected) != PointInPolygon::Outside
        });
        if on_surface {
            ctx.vertex_mut(id).status = VertexStatus::Boundary;
        }
    }
}

/// Give every polygon of `object` a status relative to the solid `other`.
///
/// A polygon whose corners are all known, and not all on the boundary,
/// takes the status of its first inside or outside corner. Everything else is
/// raycast, and an inside or outside answer is flooded through the vertex
/// graph so neighbouring polygons can skip the raycast. Call
/// [`build_adjacency`] for `object` first.
pub fn classify_polygons<S: Clone>(
    ctx: &mut CsgContext,
    object: &mut CsgObject<S>,
    other: &CsgObject<S>,
) {
    for index in 0..object.polygons.len() {
        let poly = &object.polygons[index];
        let statuses: Vec<VertexStatus> =
            poly.vertices.iter().map(|&id| ctx.vertex(id).status).collect();

        let needs_raycast = statuses.contains(&VertexStatus::Unknown)
            || statuses.iter().all(|&s| s == VertexStatus::Boundary);

        let status = if needs_raycast {
            let status = classify_polygon_using_raycast(ctx, poly, other);
            let vertex_status = match status {
                PolygonStatus::Inside => Some(VertexStatus::Inside),
                PolygonStatus::Outside => Some(VertexStatus::Outside),
                _ => None,
            };
            if let Some(vertex_status) = vertex_status {
                for &id in &poly.vertices {
                    propagate_vertex_status(ctx, id, vertex_status);
                }
            }
            status
        } else {
            ctx.stats.propagated_polygons += 1;
            match statuses
                .iter()
                .find(|&&s| matches!(s, VertexStatus::Inside | VertexStatus::Outside))
            {
                Some(VertexStatus::Inside) => PolygonStatus::Inside,
                Some(VertexStatus::Outside) => PolygonStatus::Outside,
                _ => PolygonStatus::Unknown,
            }
        };

        object.polygons[index].status = status;
    }

    debug_assert!(
        object
            .polygons
            .iter()
            .all(|p| p.status != PolygonStatus::Unknown),
        "classification left a polygon unknown"
    );
    debug!(
        polygons = object.polygons.len(),
        raycasts = ctx.stats.raycasts,
        propagated = ctx.stats.propagated_polygons,
        "classified object"
    );
}

/// Classify `poly` by casting a ray from its barycenter along its normal into
/// the polygons of `other`.
///
/// The closest polygon hit at or ahead of the origin decides: a hit at
/// distance zero is a coplanar face, [`Same`](PolygonStatus::Same) or
/// [`Opposite`](PolygonStatus::Opposite) by normal direction; otherwise the
/// ray leaving through a face means the barycenter is inside. Ambiguous rays
/// (grazing a face in its plane, or hitting an edge) are jittered and cast
/// again, up to `config.max_raycast_attempts` times; the final attempt
/// accepts edge hits. No hit at all means outside.
pub fn classify_polygon_using_raycast<S: Clone>(
    ctx: &mut CsgContext,
    poly: &CsgPolygon<S>,
    other: &CsgObject<S>,
) -> PolygonStatus {
    ctx.stats.raycasts += 1;
    let origin = barycenter(&ctx.positions(&poly.vertices));
    let attempts = ctx.config.max_raycast_attempts.max(1);
    let mut direction = poly.plane.normal;

    for attempt in 0..attempts {
        let last = attempt + 1 == attempts;
        let mut closest: Option<(Real, &CsgPolygon<S>)> = None;
        let mut ambiguous = false;

        for candidate in &other.polygons {
            let Some(t) = ray_plane_distance(&origin, &direction, &candidate.plane) else {
                // running along a face in its own plane tells us nothing
                let ray = Ray::new(origin, direction);
                if candidate.plane.signed_distance(&origin).abs() < EPSILON
                    && candidate
                        .bounding_box
                        .loosened(EPSILON)
                        .intersects_local_ray(&ray, Real::MAX)
                {
                    ambiguous = true;
                }
                continue;
            };
            if t < 0.0 || closest.is_some_and(|(best, _)| best <= t) {
                continue;
            }

            // starting on a face that is not parallel to ours is an edge graze
            if t == 0.0 && !last && !are_coplanar(&poly.plane, &candidate.plane) {
                ambiguous = true;
                continue;
            }

            let hit = if t == 0.0 { origin } else { origin + direction * t };
            match is_inside(&ctx.positions(&candidate.vertices), &hit) {
                PointInPolygon::Outside => continue,
                PointInPolygon::Boundary if !last => {
                    ambiguous = true;
                    continue;
                },
                _ => {},
            }
            closest = Some((t, candidate));
        }

        if ambiguous && !last {
            ctx.stats.perturbed_raycasts += 1;
            let jitter = ctx.random_offset(ctx.config.perturbation);
            direction = (poly.plane.normal + jitter).normalize();
            trace!(attempt, "ambiguous raycast, retrying with a perturbed ray");
            continue;
        }

        return match closest {
            None => PolygonStatus::Outside,
            Some((t, hit)) if t == 0.0 && are_coplanar(&poly.plane, &hit.plane) => {
                if hit.plane.normal.dot(&poly.plane.normal) > 0.0 {
                    PolygonStatus::Same
                } else {
                    PolygonStatus::Opposite
                }
            },
            Some((_, hit)) => ray_exit_status(&direction, &hit.plane.normal),
        };
    }

    PolygonStatus::Outside
}

#[inline]
fn ray_exit_status(direction: &Vector3<Real>, hit_normal: &Vector3<Real>) -> PolygonStatus {
    if direction.dot(hit_normal) > 0.0 {
        PolygonStatus::Inside
    } else {
        PolygonStatus::Outside
    }
}

/// Set `start` to `status` and flood it to every connected vertex whose
/// status is still unknown.
///
/// Boundary vertices are neither overwritten nor crossed.
pub fn propagate_vertex_status(ctx: &mut CsgContext, start: VertexId, status: VertexStatus) {
    if ctx.vertex(start).status != VertexStatus::Unknown {
        return;
    }
    ctx.vertex_mut(start).status = status;

    let mut queue = VecDeque::from([start]);
    while let Some(id) = queue.pop_front() {
        for k in 0..ctx.vertex(id).neighbors.len() {
            let neighbor = ctx.vertex(id).neighbors[k];
            let vertex = ctx.vertex_mut(neighbor);
            if vertex.status == VertexStatus::Unknown {
                vertex.status = status;
                queue.push_back(neighbor);
            }
        }
    }
}
