//! Proximity monitoring and hero-mode swap triggering
//!
//! After every batch of actor-state changes the monitor scans actor pairs in
//! insertion order for closeness. The first pair within the threshold whose
//! cooldown has lapsed triggers a program swap; remaining pairs are left for
//! a later pass. Close pairs still cooling are skipped without refreshing
//! their timestamp.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use super::Engine;
use super::actor::{ActorId, Position};
use super::bubble::speech_payload;
use super::swap::swap_programs;

/// Last-triggered timestamps per unordered actor pair
///
/// Entries persist for the process lifetime; only a global reset clears
/// them. Entries for removed actors are retained harmlessly.
#[derive(Debug, Default)]
pub struct CooldownTable {
    last_triggered: HashMap<(ActorId, ActorId), Instant>,
}

impl CooldownTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: ActorId, b: ActorId) -> (ActorId, ActorId) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Whether the pair is outside its cooldown window at `now`
    pub fn ready(&self, a: ActorId, b: ActorId, now: Instant, window: Duration) -> bool {
        match self.last_triggered.get(&Self::key(a, b)) {
            Some(at) => now.duration_since(*at) >= window,
            None => true,
        }
    }

    /// Record a trigger for the pair at `now`
    pub fn record(&mut self, a: ActorId, b: ActorId, now: Instant) {
        self.last_triggered.insert(Self::key(a, b), now);
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.last_triggered.clear();
    }
}

/// Scans actor pairs for closeness, gated by per-pair cooldowns
#[derive(Debug)]
pub struct ProximityMonitor {
    threshold: f64,
    window: Duration,
    cooldowns: Mutex<CooldownTable>,
}

impl ProximityMonitor {
    /// Create a monitor with a distance threshold and cooldown window
    pub fn new(threshold: f64, window: Duration) -> Self {
        Self {
            threshold,
            window,
            cooldowns: Mutex::new(CooldownTable::new()),
        }
    }

    /// Find the first qualifying pair and start its cooldown
    ///
    /// Qualifying means closer than the threshold with no running cooldown.
    /// At most one pair per invocation is returned; a close pair still in
    /// cooldown is skipped without updating its timestamp.
    pub fn observe(&self, poses: &[(ActorId, Position)]) -> Option<(ActorId, ActorId)> {
        let now = Instant::now();
        let mut cooldowns = self.cooldowns.lock();

        for i in 0..poses.len() {
            for j in i + 1..poses.len() {
                let (a, position_a) = poses[i];
                let (b, position_b) = poses[j];

                let distance = position_a.distance(&position_b);
                if distance >= self.threshold {
                    continue;
                }
                if !cooldowns.ready(a, b, now, self.window) {
                    continue;
                }

                cooldowns.record(a, b, now);
                tracing::info!(%a, %b, distance, "proximity collision detected");
                return Some((a, b));
            }
        }
        None
    }

    /// Forget every pair's cooldown
    pub fn reset(&self) {
        self.cooldowns.lock().clear();
    }
}

impl Engine {
    /// Feed the monitor after a batch of actor-state changes
    ///
    /// No-op unless hero mode is enabled and at least two actors exist.
    pub(crate) fn notify_state_change(&self) {
        if !self.swap_enabled() {
            return;
        }
        let poses = self.inner.registry.read().poses();
        if poses.len() < 2 {
            return;
        }
        if let Some((a, b)) = self.inner.monitor.observe(&poses) {
            self.trigger_swap(a, b);
        }
    }

    /// Swap type-matched parameters between two actors' programs
    fn trigger_swap(&self, a: ActorId, b: ActorId) {
        let (program_a, program_b) = {
            let registry = self.inner.registry.read();
            (
                registry.program(&a).cloned().unwrap_or_default(),
                registry.program(&b).cloned().unwrap_or_default(),
            )
        };

        if program_a.is_empty() && program_b.is_empty() {
            tracing::debug!(%a, %b, "no programs to swap");
            return;
        }

        if let Some((swapped_a, swapped_b)) = swap_programs(&program_a, &program_b) {
            {
                let mut registry = self.inner.registry.write();
                registry.set_program(&a, swapped_a);
                registry.set_program(&b, swapped_b);
            }
            tracing::info!(%a, %b, "programs exchanged");
            self.schedule_swap_flash(a, b);
        }
    }

    /// Surface the swap on both actors as a transient bubble
    ///
    /// Runs after a short delay so the program replacement commits first;
    /// each actor flashes the first Say/Think now present in its program.
    fn schedule_swap_flash(&self, a: ActorId, b: ActorId) {
        let delay = self.inner.config.swap_flash_delay;
        let duration = self.inner.config.swap_flash_duration;

        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            for actor in [a, b] {
                let first_speech = engine
                    .inner
                    .registry
                    .read()
                    .program(&actor)
                    .and_then(|program| program.iter().find(|i| i.is_speech()).cloned());
                if let Some(instruction) = first_speech {
                    if let Some((text, kind)) = speech_payload(&instruction) {
                        engine.show_bubble(actor, text, kind, duration);
                    }
                }
            }
        });
    }
}
