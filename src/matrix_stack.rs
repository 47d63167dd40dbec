//! Save/restore stack for the current model matrix.
//!
//! Builders place each box relative to a shared parent transform. Before a box is
//! drawn the parent is pushed, the box's own transforms are multiplied onto it, and
//! after the draw the parent is popped back so sibling boxes start from the same
//! matrix again.
//!
//! ```
//! use parlour::{Mat4, TransformStack, Vec3};
//!
//! let mut stack = TransformStack::new();
//! let mut model = Mat4::from_rotation_y(0.5);
//!
//! stack.push(model);
//! model *= Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
//! model = stack.pop();
//!
//! assert_eq!(model, Mat4::from_rotation_y(0.5));
//! assert_eq!(stack.depth(), 0);
//! ```

use glam::Mat4;

/// LIFO stack of model matrix snapshots.
///
/// Matrices are `Copy`, so every push stores an independent value. Pushes and pops
/// must balance before a builder returns; popping an empty stack is a bug in the
/// caller and panics.
#[derive(Clone, Debug, Default)]
pub struct TransformStack {
    saved: Vec<Mat4>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves a copy of `matrix`.
    pub fn push(&mut self, matrix: Mat4) {
        self.saved.push(matrix);
    }

    /// Removes and returns the most recently saved matrix.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty (unbalanced push/pop).
    pub fn pop(&mut self) -> Mat4 {
        match self.saved.pop() {
            Some(matrix) => matrix,
            None => unreachable!("transform stack underflow: pop without matching push"),
        }
    }

    /// Number of matrices currently saved.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}
