//! Freehand drawing data kept beside map and canvas panel documents.
//!
//! Strokes are stored in a sibling `<title>_canvas.json` so the main document
//! stays small. A stroke is built point by point in a [`StrokeBuffer`] owned
//! by the input thread and only committed to the [`CanvasDocument`] once the
//! pointer is released.

use serde::{Deserialize, Serialize};

/// One committed pen stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Points in canvas coordinates, in drawing order.
    pub points: Vec<[f32; 2]>,
    pub color: String,
    pub width: f32,
}

/// Contents of a `_canvas.json` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasDocument {
    pub strokes: Vec<Stroke>,
}

impl CanvasDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Remove and return the most recent stroke.
    pub fn undo(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

/// A stroke being drawn.
///
/// Every method takes `&mut self`: points are appended by whichever thread
/// owns the buffer and no other thread can observe a half-built stroke.
#[derive(Debug, Default)]
pub struct StrokeBuffer {
    active: Option<Stroke>,
}

impl StrokeBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke, discarding any unfinished one.
    pub fn begin(&mut self, color: impl Into<String>, width: f32) {
        self.active = Some(Stroke {
            points: Vec::new(),
            color: color.into(),
            width,
        });
    }

    /// Append a point; ignored when no stroke is active.
    pub fn push(&mut self, x: f32, y: f32) {
        if let Some(stroke) = self.active.as_mut() {
            stroke.points.push([x, y]);
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Points collected so far in the active stroke.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.active.as_ref().map_or(0, |stroke| stroke.points.len())
    }

    /// End the stroke. Strokes without points are dropped.
    pub fn finish(&mut self) -> Option<Stroke> {
        self.active.take().filter(|stroke| !stroke.points.is_empty())
    }

    /// End the stroke and commit it to `canvas`. Returns whether one was added.
    pub fn commit_to(&mut self, canvas: &mut CanvasDocument) -> bool {
        match self.finish() {
            Some(stroke) => {
                canvas.push(stroke);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}
