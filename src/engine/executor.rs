//! Timed interpretation of one actor's program
//!
//! A run snapshots the program at start, expands the first Repeat block into
//! a pass count, and then applies one instruction per step with a fixed step
//! delay, reading the actor's pose fresh at each application. Runs are
//! background tasks: concurrent runs against the same actor are permitted by
//! the model and may interleave.

use std::time::Duration;
use tokio::task::JoinHandle;

use super::Engine;
use super::actor::{ActorId, Position};
use super::bubble::BubbleKind;
use super::instruction::{
    DEFAULT_GOTO_COORD, DEFAULT_MOVE_STEPS, DEFAULT_SPEECH_SECS, DEFAULT_TURN_DEGREES,
    Instruction, parse_int, parse_int_or,
};

/// A cancellable, in-flight program run
pub struct RunHandle {
    actor: ActorId,
    handle: JoinHandle<()>,
}

impl RunHandle {
    /// The actor this run is driving
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Abort the run; steps not yet applied never happen
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Whether the run has finished (or was aborted)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to finish
    pub async fn wait(self) {
        let _ = self.handle.await;
    }
}

/// The expanded shape of one run: a loop body and a pass count
///
/// The first Repeat block found supplies the pass count and is excluded from
/// the body; every other instruction stays in program order. A program with
/// no Repeat is a single pass over the whole program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExecutionPlan {
    pub passes: u64,
    pub steps: Vec<Instruction>,
}

impl ExecutionPlan {
    pub fn for_program(program: &[Instruction]) -> Self {
        let mut repeat: Option<(usize, &str)> = None;
        for (index, instruction) in program.iter().enumerate() {
            if let Instruction::Repeat { count } = instruction {
                repeat = Some((index, count));
                break;
            }
        }

        match repeat {
            Some((index, count)) => {
                // Parse failure degrades to a single pass; a count below 1
                // is treated as 1.
                let passes = parse_int(count).map(|n| n.max(1)).unwrap_or(1) as u64;
                let steps = program
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != index)
                    .map(|(_, instruction)| instruction.clone())
                    .collect();
                Self { passes, steps }
            }
            None => Self {
                passes: 1,
                steps: program.to_vec(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Engine {
    /// Start a background run of an actor's current program
    ///
    /// The program is snapshotted at this moment; later edits or swaps do
    /// not reach steps already scheduled. An unknown actor or an empty
    /// program yields a run that finishes immediately.
    pub fn run_actor(&self, actor: ActorId) -> RunHandle {
        let program = self
            .inner
            .registry
            .read()
            .program(&actor)
            .cloned()
            .unwrap_or_default();
        let plan = ExecutionPlan::for_program(&program);

        let engine = self.clone();
        let handle = tokio::spawn(async move { engine.drive(actor, plan).await });
        RunHandle { actor, handle }
    }

    /// Run every actor with a non-empty program, in insertion order
    ///
    /// Each actor's run advances independently; no cross-actor ordering is
    /// guaranteed beyond the shared scheduler's interleaving.
    pub fn run_all(&self) -> Vec<RunHandle> {
        let runnable: Vec<ActorId> = {
            let registry = self.inner.registry.read();
            registry
                .actors()
                .iter()
                .filter(|actor| registry.program(&actor.id).is_some_and(|p| !p.is_empty()))
                .map(|actor| actor.id)
                .collect()
        };

        runnable.into_iter().map(|id| self.run_actor(id)).collect()
    }

    async fn drive(self, actor: ActorId, plan: ExecutionPlan) {
        if plan.is_empty() {
            tracing::debug!(%actor, "nothing to run");
            return;
        }

        let step_delay = self.inner.config.step_delay;
        let pass_delay = self.inner.config.pass_delay;

        for pass in 0..plan.passes {
            for instruction in &plan.steps {
                // The step delay elapses before the effect is applied.
                tokio::time::sleep(step_delay).await;
                if !self.apply_instruction(actor, instruction) {
                    tracing::debug!(%actor, "target actor gone, abandoning run");
                    return;
                }
            }
            if pass + 1 < plan.passes {
                tokio::time::sleep(pass_delay).await;
            }
        }
    }

    /// Apply one instruction to the actor's current state
    ///
    /// The instruction's parameters come from the run-start snapshot; the
    /// actor's pose is read fresh here. Returns false if the actor no
    /// longer exists.
    pub(crate) fn apply_instruction(&self, actor: ActorId, instruction: &Instruction) -> bool {
        let bounds = self.inner.bounds;
        let mut pending_bubble: Option<(String, BubbleKind, Duration)> = None;

        {
            let mut registry = self.inner.registry.write();
            let Some(state) = registry.get_mut(&actor) else {
                return false;
            };

            match instruction {
                Instruction::Move { steps } => {
                    let steps = parse_int_or(steps, DEFAULT_MOVE_STEPS) as f64;
                    let radians = state.heading.to_radians();
                    let target = Position::new(
                        state.position.x + radians.cos() * steps,
                        state.position.y + radians.sin() * steps,
                    );
                    state.position = bounds.clamp(target);
                }
                Instruction::Turn { degrees } => {
                    state.heading += parse_int_or(degrees, DEFAULT_TURN_DEGREES) as f64;
                }
                Instruction::GoTo { x, y } => {
                    let target = Position::new(
                        parse_int_or(x, DEFAULT_GOTO_COORD) as f64,
                        parse_int_or(y, DEFAULT_GOTO_COORD) as f64,
                    );
                    state.position = bounds.clamp(target);
                }
                Instruction::Repeat { .. } => {
                    // A Repeat block only supplies the pass count; executed
                    // as a step (a later duplicate) it has no effect.
                }
                Instruction::Say { text, duration } => {
                    let secs = parse_int_or(duration, DEFAULT_SPEECH_SECS).max(0) as u64;
                    pending_bubble =
                        Some((text.clone(), BubbleKind::Say, Duration::from_secs(secs)));
                }
                Instruction::Think { text, duration } => {
                    let secs = parse_int_or(duration, DEFAULT_SPEECH_SECS).max(0) as u64;
                    pending_bubble =
                        Some((text.clone(), BubbleKind::Think, Duration::from_secs(secs)));
                }
            }
        }

        if let Some((text, kind, duration)) = pending_bubble {
            self.show_bubble(actor, text, kind, duration);
        }
        self.notify_state_change();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::instruction::InstructionKind;

    fn mv(steps: &str) -> Instruction {
        Instruction::Move {
            steps: steps.to_string(),
        }
    }

    fn turn(degrees: &str) -> Instruction {
        Instruction::Turn {
            degrees: degrees.to_string(),
        }
    }

    fn repeat(count: &str) -> Instruction {
        Instruction::Repeat {
            count: count.to_string(),
        }
    }

    #[test]
    fn test_plan_without_repeat_is_one_pass() {
        let program = vec![mv("5"), turn("10")];
        let plan = ExecutionPlan::for_program(&program);
        assert_eq!(plan.passes, 1);
        assert_eq!(plan.steps, program);
    }

    #[test]
    fn test_plan_excludes_repeat_from_body() {
        let program = vec![mv("5"), repeat("3"), turn("10")];
        let plan = ExecutionPlan::for_program(&program);
        assert_eq!(plan.passes, 3);
        assert_eq!(plan.steps, vec![mv("5"), turn("10")]);
    }

    #[test]
    fn test_plan_repeat_parse_failure_means_one_pass() {
        let plan = ExecutionPlan::for_program(&[mv("5"), repeat("lots")]);
        assert_eq!(plan.passes, 1);

        let plan = ExecutionPlan::for_program(&[mv("5"), repeat("0")]);
        assert_eq!(plan.passes, 1);

        let plan = ExecutionPlan::for_program(&[mv("5"), repeat("-4")]);
        assert_eq!(plan.passes, 1);
    }

    #[test]
    fn test_plan_lone_repeat_has_empty_body() {
        let plan = ExecutionPlan::for_program(&[repeat("3")]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_only_first_repeat_is_honored() {
        let plan = ExecutionPlan::for_program(&[repeat("2"), repeat("5")]);
        assert_eq!(plan.passes, 2);
        // The second Repeat stays in the body as an inert step.
        assert_eq!(plan.steps, vec![repeat("5")]);
    }

    #[test]
    fn test_plan_default_block_counts() {
        let plan = ExecutionPlan::for_program(&[
            Instruction::default_for(InstructionKind::Repeat),
            Instruction::default_for(InstructionKind::Move),
        ]);
        assert_eq!(plan.passes, 3);
        assert_eq!(plan.steps.len(), 1);
    }
}
