//! Actors, positions, and canvas bounds
//!
//! An actor is a positioned, instructable entity on the stage. Positions are
//! real-valued and always constrained to the canvas rectangle; headings are
//! degrees and accumulate without bound.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Actor identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Create a new random ActorId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point on the canvas, relative to its center
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset from the canvas center
    pub x: f64,
    /// Vertical offset from the canvas center
    pub y: f64,
}

impl Position {
    /// Create a position from coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position
    pub fn distance(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An actor: a named, positioned entity owning one program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Unique actor ID, stable for the actor's lifetime
    pub id: ActorId,

    /// Display name
    pub name: String,

    /// Current position, always within canvas bounds
    pub position: Position,

    /// Heading in degrees; accumulates without modulo
    pub heading: f64,

    /// Reference to the actor's display image
    pub image_ref: String,
}

impl Actor {
    /// Create a new actor at the canvas origin, heading 0
    pub fn new(name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            position: Position::default(),
            heading: 0.0,
            image_ref: image_ref.into(),
        }
    }
}

/// The clamping rectangle for actor positions
///
/// Centered at the canvas origin and inset from each edge by the padding
/// margin (the visual half-size of an actor's on-screen footprint), so a
/// clamped actor never pokes outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    /// Maximum absolute x coordinate
    pub max_x: f64,
    /// Maximum absolute y coordinate
    pub max_y: f64,
}

impl CanvasBounds {
    /// Derive bounds from a canvas size and edge padding
    pub fn new(canvas_width: f64, canvas_height: f64, padding: f64) -> Self {
        Self {
            max_x: canvas_width / 2.0 - padding,
            max_y: canvas_height / 2.0 - padding,
        }
    }

    /// Constrain a position to the bounds, each axis independently
    pub fn clamp(&self, position: Position) -> Position {
        Position {
            x: position.x.clamp(-self.max_x, self.max_x),
            y: position.y.clamp(-self.max_y, self.max_y),
        }
    }

    /// Check whether a position lies within the bounds
    pub fn contains(&self, position: &Position) -> bool {
        position.x.abs() <= self.max_x && position.y.abs() <= self.max_y
    }
}
