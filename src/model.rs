//! A collection of meshes edited by whole-model subtractions.
//!
//! [`subtract_from_model`] carves a brush out of every mesh it touches and
//! returns the edit as one [`CompositeCommand`]; [`Model::apply`] commits it
//! all or nothing, so an undo stack sees a single step.

use crate::bridge::{Subtraction, subtract};
use crate::config::CsgConfig;
use crate::errors::CsgError;
use crate::mesh::Mesh;
use crate::traits::SpatialIndex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One edit of the model.
#[derive(Debug, Clone)]
pub enum Command<S: Clone + Send + Sync + Debug> {
    /// Insert a mesh under its own id
    AddMesh(Mesh<S>),
    /// Remove the mesh with this id
    DeleteMesh(usize),
}

/// Edits applied together or not at all.
#[derive(Debug, Clone)]
pub struct CompositeCommand<S: Clone + Send + Sync + Debug> {
    pub commands: Vec<Command<S>>,
}

impl<S: Clone + Send + Sync + Debug> Default for CompositeCommand<S> {
    fn default() -> Self {
        CompositeCommand {
            commands: Vec::new(),
        }
    }
}

impl<S: Clone + Send + Sync + Debug> CompositeCommand<S> {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Ids removed by this edit.
    pub fn deleted(&self) -> impl Iterator<Item = usize> + '_ {
        self.commands.iter().filter_map(|c| match c {
            Command::DeleteMesh(id) => Some(*id),
            Command::AddMesh(_) => None,
        })
    }

    /// Meshes inserted by this edit.
    pub fn added(&self) -> impl Iterator<Item = &Mesh<S>> + '_ {
        self.commands.iter().filter_map(|c| match c {
            Command::AddMesh(mesh) => Some(mesh),
            Command::DeleteMesh(_) => None,
        })
    }
}

/// Meshes by id.
#[derive(Debug, Clone)]
pub struct Model<S: Clone + Send + Sync + Debug> {
    meshes: BTreeMap<usize, Mesh<S>>,
    next_id: usize,
}

impl<S: Clone + Send + Sync + Debug> Default for Model<S> {
    fn default() -> Self {
        Model {
            meshes: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<S: Clone + Send + Sync + Debug> Model<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `mesh` under a fresh id, which is returned.
    pub fn insert(&mut self, mesh: Mesh<S>) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.meshes.insert(id, mesh.with_id(id));
        id
    }

    pub fn get(&self, id: usize) -> Option<&Mesh<S>> {
        self.meshes.get(&id)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh<S>> + '_ {
        self.meshes.values()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// The id the next inserted mesh will get.
    pub const fn next_id(&self) -> usize {
        self.next_id
    }

    /// Commit `edit` in order.
    ///
    /// The whole edit is checked against the model first: deleting a mesh
    /// that is not there fails with [`CsgError::UnknownMesh`], adding under a
    /// taken id with [`CsgError::DuplicateMesh`]. Nothing is changed on
    /// failure.
    pub fn apply(&mut self, edit: CompositeCommand<S>) -> Result<(), CsgError> {
        let mut present: BTreeSet<usize> = self.meshes.keys().copied().collect();
        for command in &edit.commands {
            match command {
                Command::DeleteMesh(id) => {
                    if !present.remove(id) {
                        return Err(CsgError::UnknownMesh(*id));
                    }
                },
                Command::AddMesh(mesh) => {
                    if !present.insert(mesh.id) {
                        return Err(CsgError::DuplicateMesh(mesh.id));
                    }
                },
            }
        }

        for command in edit.commands {
            match command {
                Command::DeleteMesh(id) => {
                    self.meshes.remove(&id);
                },
                Command::AddMesh(mesh) => {
                    self.next_id = self.next_id.max(mesh.id + 1);
                    self.meshes.insert(mesh.id, mesh);
                },
            }
        }
        Ok(())
    }
}

/// Carve `brush` out of every mesh of `model` that `index` reports near it.
///
/// Each touched mesh becomes a delete plus, unless it was erased, an add of
/// the carved mesh under a new id. The carved meshes are validated; the first
/// invalid one aborts the whole batch with [`CsgError::Validation`] and no
/// edit is returned. The model itself is not modified, and `brush` is not
/// expected to be one of its meshes.
pub fn subtract_from_model<S, I>(
    model: &Model<S>,
    brush: &Mesh<S>,
    index: &I,
    config: &CsgConfig,
) -> Result<CompositeCommand<S>, CsgError>
where
    S: Clone + Send + Sync + Debug,
    I: SpatialIndex + ?Sized,
{
    let mut candidates = index.query(&brush.bounding_box());
    candidates.sort_unstable();
    candidates.dedup();

    let targets = candidates
        .into_iter()
        .map(|id| model.get(id).ok_or(CsgError::UnknownMesh(id)))
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(usize, Subtraction<S>)> = targets
        .iter()
        .map(|mesh| (mesh.id, subtract(mesh, brush, config)))
        .collect();

    #[cfg(feature = "parallel")]
    let results: Vec<(usize, Subtraction<S>)> = targets
        .par_iter()
        .map(|mesh| (mesh.id, subtract(mesh, brush, config)))
        .collect();

    let edit = assemble_edit(results, model.next_id())?;

    info!(
        candidates = targets.len(),
        commands = edit.len(),
        "subtracted brush from model"
    );
    Ok(edit)
}

/// Turn per-mesh subtraction results into one edit, numbering carved meshes
/// from `first_id` in result order. Any carved mesh failing validation
/// discards everything assembled so far.
fn assemble_edit<S: Clone + Send + Sync + Debug>(
    results: Vec<(usize, Subtraction<S>)>,
    first_id: usize,
) -> Result<CompositeCommand<S>, CsgError> {
    let mut edit = CompositeCommand::default();
    let mut next_id = first_id;
    for (id, result) in results {
        match result {
            Subtraction::Untouched(_) => {},
            Subtraction::Erased => {
                debug!(mesh = id, "mesh erased by brush");
                edit.commands.push(Command::DeleteMesh(id));
            },
            Subtraction::Cut(mesh) => {
                mesh.validate()
                    .map_err(|source| CsgError::Validation { mesh_id: id, source })?;
                edit.commands.push(Command::DeleteMesh(id));
                edit.commands.push(Command::AddMesh(mesh.with_id(next_id)));
                next_id += 1;
            },
        }
    }
    Ok(edit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use crate::traits::BruteForceIndex;
    use nalgebra::Vector3;

    fn row_of_cubes() -> Model<u8> {
        let mut model = Model::new();
        for k in 0..3 {
            model.insert(
                Mesh::cube(1.0, k as u8).with_offset(Vector3::new(3.0 * k as f64, 0.0, 0.0)),
            );
        }
        model
    }

    #[test]
    fn insert_hands_out_fresh_ids() {
        let model = row_of_cubes();
        assert_eq!(model.len(), 3);
        assert_eq!(model.next_id(), 3);
        assert_eq!(model.get(2).map(|m| m.id), Some(2));
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut model = row_of_cubes();
        let edit = CompositeCommand {
            commands: vec![Command::DeleteMesh(0), Command::DeleteMesh(7)],
        };
        assert_eq!(model.apply(edit), Err(CsgError::UnknownMesh(7)));
        assert_eq!(model.len(), 3);

        let clash = CompositeCommand {
            commands: vec![Command::AddMesh(Mesh::cube(1.0, 9).with_id(1))],
        };
        assert_eq!(model.apply(clash), Err(CsgError::DuplicateMesh(1)));

        let replace = CompositeCommand {
            commands: vec![
                Command::DeleteMesh(1),
                Command::AddMesh(Mesh::cube(1.0, 9).with_id(1)),
            ],
        };
        assert_eq!(model.apply(replace), Ok(()));
        assert_eq!(model.get(1).map(|m| m.faces[&0].properties), Some(9));
    }

    #[test]
    fn brush_missing_everything_edits_nothing() {
        let model = row_of_cubes();
        let index = BruteForceIndex::from_meshes(model.meshes());
        let brush = Mesh::cube(1.0, 0).with_offset(Vector3::new(0.0, 10.0, 0.0));
        let edit = subtract_from_model(&model, &brush, &index, &CsgConfig::deterministic(4))
            .expect("nothing to validate");
        assert!(edit.is_empty());
    }

    #[test]
    fn index_naming_unknown_mesh_fails() {
        struct Liar;
        impl SpatialIndex for Liar {
            fn query(&self, _: &crate::float_types::parry3d::bounding_volume::Aabb) -> Vec<usize> {
                vec![42]
            }
        }
        let model = row_of_cubes();
        let brush = Mesh::cube(1.0, 0).with_id(100);
        let result = subtract_from_model(&model, &brush, &Liar, &CsgConfig::deterministic(4));
        assert!(matches!(result, Err(CsgError::UnknownMesh(42))));
    }

    #[test]
    fn validation_error_names_the_mesh() {
        let error = CsgError::Validation {
            mesh_id: 5,
            source: ValidationError::EmptyMesh,
        };
        assert!(error.to_string().contains("mesh 5"));
    }

    #[test]
    fn carved_meshes_are_numbered_in_result_order() {
        let results = vec![
            (0, Subtraction::Untouched(Mesh::cube(1.0, 0u8))),
            (1, Subtraction::Cut(Mesh::cube(1.0, 1).with_id(1))),
            (2, Subtraction::Erased),
            (4, Subtraction::Cut(Mesh::cube(1.0, 4).with_id(4))),
        ];
        let edit = assemble_edit(results, 10).expect("valid meshes");
        assert_eq!(edit.deleted().collect::<Vec<_>>(), [1, 2, 4]);
        let added: Vec<_> = edit.added().map(|m| (m.id, m.faces[&0].properties)).collect();
        assert_eq!(added, [(10, 1), (11, 4)]);
    }

    #[test]
    fn invalid_carving_aborts_the_whole_edit() {
        let model = row_of_cubes();
        let results = vec![
            (0, Subtraction::Cut(Mesh::cube(1.0, 0u8))),
            (1, Subtraction::Cut(Mesh::new(1))),
            (2, Subtraction::Erased),
        ];
        let edit = assemble_edit(results, model.next_id());
        assert!(matches!(
            edit,
            Err(CsgError::Validation {
                mesh_id: 1,
                source: ValidationError::EmptyMesh
            })
        ));
        assert_eq!(model.len(), 3);
    }
}
