//! Troupe – a timed block-program execution engine for a sprite stage
//!
//! This crate implements the headless core of a block-programming sandbox:
//! - Actors ("sprites") with a position, heading, and an ordered program of
//!   typed instruction blocks
//! - A program executor that interprets instructions over time, with fixed
//!   step/pass delays and a single-level repeat construct
//! - Transient speech/thought bubbles with timed removal
//! - Hero mode: proximity-triggered, cooldown-gated exchange of type-matched
//!   instruction parameters between two actors' programs
//!
//! The drag-and-drop palette, toolbar, and rendering are external concerns:
//! a UI shell issues commands against [`Engine`] and re-renders from its
//! observable state on every mutation.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Engine core modules implementing the sandbox model
pub mod engine;

// Re-export key types for convenience
pub use engine::{Engine, EngineConfig};

/// Current version of the Troupe engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
