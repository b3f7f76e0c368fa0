//! The per-service shape graph.
//!
//! Wraps the shape [`Arena`] with a name index and helpers for finding the
//! payload-root structures the generator emits serializers for. The graph is
//! handed to the generator read-only; cyclic schemas are built by allocating
//! a shape first and patching its members afterwards via [`ShapeGraph::shape_mut`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::ids::ShapeId;
use crate::shape::{Shape, ShapeKind};

/// A service's complete type graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeGraph {
    shapes: Arena<ShapeId, Shape>,
    by_name: HashMap<String, ShapeId>,
}

impl ShapeGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shape and returns its stable ID.
    ///
    /// Shape names are unique per service; adding a second shape with an
    /// existing name re-points the name index at the new node.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        let name = shape.name.clone();
        let id = self.shapes.alloc(shape);
        self.by_name.insert(name, id);
        id
    }

    /// Returns the shape with the given ID.
    pub fn shape(&self, id: ShapeId) -> &Shape {
        self.shapes.get(id)
    }

    /// Returns a mutable reference to the shape with the given ID.
    ///
    /// Used by loaders to patch member edges after allocation, which is how
    /// cyclic references are constructed.
    pub fn shape_mut(&mut self, id: ShapeId) -> &mut Shape {
        self.shapes.get_mut(id)
    }

    /// Looks up a shape ID by name.
    pub fn lookup(&self, name: &str) -> Option<ShapeId> {
        self.by_name.get(name).copied()
    }

    /// Returns the number of shapes in the graph.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if the graph has no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterates over all shapes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.shapes.iter()
    }

    /// Iterates over the structures marked as wire payload roots.
    pub fn payload_roots(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.shapes.iter().filter(|(_, s)| s.is_payload_root())
    }

    /// Marks a structure as a wire payload root.
    ///
    /// Has no effect on non-structure shapes.
    pub fn mark_payload_root(&mut self, id: ShapeId) {
        if let ShapeKind::Structure { payload_root, .. } = &mut self.shapes.get_mut(id).kind {
            *payload_root = true;
        }
    }
}
