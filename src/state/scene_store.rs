//! Scene object store
//!
//! Authoritative list of user-placed particles and the current selection.
//! The object list is replaced as a whole on every mutation, so a snapshot
//! taken with [`SceneStore::snapshot`] never observes a half-applied change.

use cgmath::Vector3;
use std::fmt;
use std::sync::Arc;

/// Mass given to newly placed particles.
pub const DEFAULT_PARTICLE_MASS: f32 = 1.0;

/// Height above the clicked ground point at which new particles spawn.
pub const PARTICLE_SPAWN_HEIGHT: f32 = 0.5;

/// Stable identifier of a user-placed particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "particle-{}", self.0)
    }
}

/// A particle placed by the user.
///
/// `position` is the spawn position only. Once the body is live its
/// transform belongs to the physics engine and is never written back here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractiveObject {
    pub id: ObjectId,
    pub mass: f32,
    pub position: Vector3<f32>,
}

#[derive(Debug, Clone)]
pub struct SceneStore {
    objects: Arc<[InteractiveObject]>,
    selected: Option<ObjectId>,
    next_id: u64,
}

impl SceneStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::from(Vec::new()),
            selected: None,
            next_id: 1,
        }
    }

    pub fn objects(&self) -> &[InteractiveObject] {
        &self.objects
    }

    /// Cheap shared handle to the current object list.
    pub fn snapshot(&self) -> Arc<[InteractiveObject]> {
        Arc::clone(&self.objects)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&InteractiveObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&InteractiveObject> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Appends a new particle and returns its freshly minted id.
    pub fn insert(&mut self, position: Vector3<f32>, mass: f32) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let mut objects = Vec::with_capacity(self.objects.len() + 1);
        objects.extend_from_slice(&self.objects);
        objects.push(InteractiveObject { id, mass, position });
        self.objects = objects.into();

        id
    }

    /// Replaces the mass of `id`. Unknown ids and non-positive masses are
    /// ignored; returns whether anything changed.
    pub fn set_mass(&mut self, id: ObjectId, mass: f32) -> bool {
        if !(mass > 0.0) || !self.contains(id) {
            return false;
        }

        self.objects = self
            .objects
            .iter()
            .map(|object| {
                if object.id == id {
                    InteractiveObject { mass, ..*object }
                } else {
                    *object
                }
            })
            .collect();
        true
    }

    /// Sets or clears the selection. Selecting an id that is not in the
    /// store leaves the selection untouched and returns `false`.
    pub fn set_selected(&mut self, id: Option<ObjectId>) -> bool {
        match id {
            Some(id) if !self.contains(id) => false,
            _ => {
                self.selected = id;
                true
            }
        }
    }

    /// Removes every particle and the selection. Ids are never reused.
    pub fn clear(&mut self) {
        self.objects = Arc::from(Vec::new());
        self.selected = None;
    }

    pub(crate) fn debug_check(&self) {
        debug_assert!(
            self.selected.map_or(true, |id| self.contains(id)),
            "selection must reference a stored object"
        );
        debug_assert!(
            self.objects
                .iter()
                .enumerate()
                .all(|(i, a)| self.objects[i + 1..].iter().all(|b| a.id != b.id)),
            "object ids must be unique"
        );
        debug_assert!(self.objects.iter().all(|object| object.mass > 0.0));
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}
