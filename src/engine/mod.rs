//! Engine orchestrator and public API
//!
//! This module provides the main `Engine` struct that coordinates all
//! subsystems — registry, executor, bubbles, proximity monitor, swap engine
//! — and exposes the command/observation surface a UI shell consumes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

// Submodules
pub mod actor;
pub mod bubble;
pub mod error;
pub mod executor;
pub mod instruction;
pub mod proximity;
pub mod registry;
pub mod swap;

use bubble::BubbleBoard;
use proximity::ProximityMonitor;
use registry::ActorRegistry;

/// Configuration for the Troupe engine
///
/// Defaults mirror the sandbox this engine was built for: an 800×600 canvas
/// padded by half an actor footprint, 300 ms per instruction step, and hero
/// mode triggering inside 140 canvas units at most once per 2 s per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Canvas width in canvas units
    pub canvas_width: f64,

    /// Canvas height in canvas units
    pub canvas_height: f64,

    /// Inset from each canvas edge; equals the visual half-size of an
    /// actor's on-screen footprint
    pub canvas_padding: f64,

    /// Delay that elapses before each instruction step takes effect
    pub step_delay: Duration,

    /// Extra delay between repeat passes
    pub pass_delay: Duration,

    /// Distance below which two actors count as close
    pub proximity_threshold: f64,

    /// Minimum time between successive swaps for the same actor pair
    pub swap_cooldown: Duration,

    /// Delay before a successful swap flashes its acknowledgement bubbles
    pub swap_flash_delay: Duration,

    /// How long swap acknowledgement bubbles stay up
    pub swap_flash_duration: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            canvas_padding: 56.0,
            step_delay: Duration::from_millis(300),
            pass_delay: Duration::from_millis(200),
            proximity_threshold: 140.0,
            swap_cooldown: Duration::from_millis(2000),
            swap_flash_delay: Duration::from_millis(100),
            swap_flash_duration: Duration::from_millis(2000),
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> EngineResult<CanvasBounds> {
        if !self.canvas_width.is_finite() || self.canvas_width <= 0.0 {
            return Err(EngineError::Config(format!(
                "canvas width must be positive, got {}",
                self.canvas_width
            )));
        }
        if !self.canvas_height.is_finite() || self.canvas_height <= 0.0 {
            return Err(EngineError::Config(format!(
                "canvas height must be positive, got {}",
                self.canvas_height
            )));
        }
        if !self.canvas_padding.is_finite() || self.canvas_padding < 0.0 {
            return Err(EngineError::Config(format!(
                "canvas padding must be non-negative, got {}",
                self.canvas_padding
            )));
        }
        if !self.proximity_threshold.is_finite() || self.proximity_threshold <= 0.0 {
            return Err(EngineError::Config(format!(
                "proximity threshold must be positive, got {}",
                self.proximity_threshold
            )));
        }

        let bounds = CanvasBounds::new(self.canvas_width, self.canvas_height, self.canvas_padding);
        if bounds.max_x <= 0.0 || bounds.max_y <= 0.0 {
            return Err(EngineError::Config(format!(
                "padding {} leaves no room on a {}x{} canvas",
                self.canvas_padding, self.canvas_width, self.canvas_height
            )));
        }
        Ok(bounds)
    }
}

pub(crate) struct EngineInner {
    pub(crate) config: EngineConfig,
    pub(crate) bounds: CanvasBounds,
    pub(crate) registry: RwLock<ActorRegistry>,
    pub(crate) bubbles: RwLock<BubbleBoard>,
    pub(crate) monitor: ProximityMonitor,
    pub(crate) swap_enabled: AtomicBool,
}

/// The engine facade: commands in, observable state out
///
/// Cheap to clone; clones share one stage. All timing (instruction steps,
/// bubble removal, swap flashes) runs on the ambient tokio runtime, so the
/// engine must be driven from within one. There is no per-actor mutual
/// exclusion: re-running an actor mid-flight or editing its program during
/// a run is allowed and may interleave visibly.
#[derive(Clone)]
pub struct Engine {
    pub(crate) inner: Arc<EngineInner>,
}

impl Engine {
    /// Create an engine with the given configuration
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let bounds = config.validate()?;
        let monitor = ProximityMonitor::new(config.proximity_threshold, config.swap_cooldown);

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                bounds,
                registry: RwLock::new(ActorRegistry::new()),
                bubbles: RwLock::new(BubbleBoard::new()),
                monitor,
                swap_enabled: AtomicBool::new(false),
            }),
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    // ----- commands -----

    /// Add an actor at the canvas origin with an empty program
    pub fn add_actor(&self, name: impl Into<String>, image_ref: impl Into<String>) -> ActorId {
        let id = self.inner.registry.write().add(name, image_ref);
        tracing::debug!(%id, "actor added");
        self.notify_state_change();
        id
    }

    /// Remove an actor, its program, and any pending bubble
    ///
    /// Cooldown entries involving the actor are retained; they persist for
    /// the process lifetime. Returns false for an unknown id.
    pub fn remove_actor(&self, id: ActorId) -> bool {
        let removed = self.inner.registry.write().remove(&id);
        if removed {
            self.inner.bubbles.write().remove(&id);
            tracing::debug!(%id, "actor removed");
            self.notify_state_change();
        } else {
            tracing::debug!(%id, "ignoring removal of unknown actor");
        }
        removed
    }

    /// Place an actor directly (drag), clamped to the canvas
    pub fn drag_actor(&self, id: ActorId, x: f64, y: f64) {
        let moved = {
            let mut registry = self.inner.registry.write();
            match registry.get_mut(&id) {
                Some(actor) => {
                    actor.position = self.inner.bounds.clamp(Position::new(x, y));
                    true
                }
                None => false,
            }
        };

        if moved {
            self.notify_state_change();
        } else {
            tracing::debug!(%id, "ignoring drag of unknown actor");
        }
    }

    /// Append an instruction to an actor's program
    pub fn append_instruction(&self, id: ActorId, instruction: Instruction) {
        if !self.inner.registry.write().append_instruction(&id, instruction) {
            tracing::debug!(%id, "ignoring instruction drop on unknown actor");
        }
    }

    /// Coerce and store user input for one field of a program entry
    ///
    /// Index and field resolution read the current list; malformed numeric
    /// input degrades to the block type's default.
    pub fn edit_instruction_field(&self, id: ActorId, index: usize, field: &str, raw: &str) {
        if !self.inner.registry.write().edit_instruction(&id, index, field, raw) {
            tracing::debug!(%id, index, "ignoring edit of missing program entry");
        }
    }

    /// Remove the program entry at `index`
    pub fn remove_instruction(&self, id: ActorId, index: usize) {
        if !self.inner.registry.write().remove_instruction(&id, index) {
            tracing::debug!(%id, index, "ignoring removal of missing program entry");
        }
    }

    /// Reinitialize the stage: zero every pose, clear all programs,
    /// bubbles, and swap cooldowns
    ///
    /// Runs already in flight keep their snapshots; their remaining steps
    /// apply to the reset actors (or lapse as no-ops if a target is gone).
    pub fn reset_all(&self) {
        {
            let mut registry = self.inner.registry.write();
            registry.reset_poses();
            registry.clear_programs();
        }
        self.inner.bubbles.write().clear();
        self.inner.monitor.reset();
        tracing::info!("stage reset");
    }

    /// Enable or disable hero mode
    ///
    /// Enabling immediately re-checks proximity, so two actors already
    /// standing close together may trigger a swap right away.
    pub fn set_swap_enabled(&self, enabled: bool) {
        self.inner.swap_enabled.store(enabled, Ordering::Relaxed);
        tracing::debug!(enabled, "hero mode toggled");
        if enabled {
            self.notify_state_change();
        }
    }

    /// Whether hero mode is currently enabled
    pub fn swap_enabled(&self) -> bool {
        self.inner.swap_enabled.load(Ordering::Relaxed)
    }

    // ----- observations -----

    /// Snapshot of all actors in insertion order
    pub fn actors(&self) -> Vec<ActorView> {
        let registry = self.inner.registry.read();
        registry
            .actors()
            .iter()
            .map(|actor| ActorView {
                id: actor.id,
                name: actor.name.clone(),
                position: actor.position,
                heading: actor.heading,
                image_ref: actor.image_ref.clone(),
                program_len: registry.program(&actor.id).map_or(0, |p| p.len()),
            })
            .collect()
    }

    /// Snapshot of one actor, if live
    pub fn actor(&self, id: ActorId) -> Option<ActorView> {
        let registry = self.inner.registry.read();
        registry.get(&id).map(|actor| ActorView {
            id: actor.id,
            name: actor.name.clone(),
            position: actor.position,
            heading: actor.heading,
            image_ref: actor.image_ref.clone(),
            program_len: registry.program(&id).map_or(0, |p| p.len()),
        })
    }

    /// Snapshot of an actor's program with live field values
    pub fn program(&self, id: ActorId) -> Option<Program> {
        self.inner.registry.read().program(&id).cloned()
    }

    /// The actor's live bubble, if any
    pub fn bubble(&self, id: ActorId) -> Option<Bubble> {
        self.inner.bubbles.read().get(&id).cloned()
    }
}

/// Observable actor state for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorView {
    /// Actor ID
    pub id: ActorId,

    /// Display name
    pub name: String,

    /// Current position
    pub position: Position,

    /// Current heading in degrees
    pub heading: f64,

    /// Reference to the display image
    pub image_ref: String,

    /// Number of instructions in the actor's program
    pub program_len: usize,
}

// Re-export commonly used types
pub use actor::{Actor, ActorId, CanvasBounds, Position};
pub use bubble::{Bubble, BubbleKind};
pub use error::{EngineError, EngineResult};
pub use executor::RunHandle;
pub use instruction::{Instruction, InstructionKind, Program};
