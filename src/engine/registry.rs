//! Actor registry: the stage's data store
//!
//! Owns the set of live actors and their assigned programs. Pure mutation
//! and lookup operations, no timing or policy: the executor and the swap
//! engine write through here, and the UI reads snapshots out. Actors keep
//! their insertion order, which the proximity scan depends on.

use std::collections::HashMap;

use super::actor::{Actor, ActorId, Position};
use super::instruction::{Instruction, Program};

/// Insertion-ordered store of actors and their programs
#[derive(Debug, Default)]
pub struct ActorRegistry {
    actors: Vec<Actor>,
    programs: HashMap<ActorId, Program>,
}

impl ActorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new actor at the origin with an empty program
    pub fn add(&mut self, name: impl Into<String>, image_ref: impl Into<String>) -> ActorId {
        let actor = Actor::new(name, image_ref);
        let id = actor.id;
        self.programs.insert(id, Vec::new());
        self.actors.push(actor);
        id
    }

    /// Remove an actor, cascading deletion of its program
    ///
    /// Returns false if no such actor is live.
    pub fn remove(&mut self, id: &ActorId) -> bool {
        let before = self.actors.len();
        self.actors.retain(|a| a.id != *id);
        self.programs.remove(id);
        self.actors.len() != before
    }

    /// Whether an actor with this id is live
    pub fn contains(&self, id: &ActorId) -> bool {
        self.actors.iter().any(|a| a.id == *id)
    }

    /// Look up an actor by id
    pub fn get(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == *id)
    }

    /// Look up an actor mutably by id
    pub fn get_mut(&mut self, id: &ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == *id)
    }

    /// Number of live actors
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the stage is empty
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// All live actors in insertion order
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Snapshot of (id, position) pairs in insertion order
    pub fn poses(&self) -> Vec<(ActorId, Position)> {
        self.actors.iter().map(|a| (a.id, a.position)).collect()
    }

    /// An actor's program, if the actor is live
    pub fn program(&self, id: &ActorId) -> Option<&Program> {
        self.programs.get(id)
    }

    /// Replace an actor's program wholesale
    ///
    /// Returns false (without storing anything) if the actor is gone; a
    /// program never outlives its owner.
    pub fn set_program(&mut self, id: &ActorId, program: Program) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.programs.insert(*id, program);
        true
    }

    /// Append an instruction to an actor's program
    pub fn append_instruction(&mut self, id: &ActorId, instruction: Instruction) -> bool {
        match self.programs.get_mut(id) {
            Some(program) => {
                program.push(instruction);
                true
            }
            None => false,
        }
    }

    /// Edit one field of the instruction at `index`, reading the current list
    pub fn edit_instruction(&mut self, id: &ActorId, index: usize, field: &str, raw: &str) -> bool {
        match self.programs.get_mut(id).and_then(|p| p.get_mut(index)) {
            Some(instruction) => {
                instruction.set_field(field, raw);
                true
            }
            None => false,
        }
    }

    /// Remove the instruction at `index`, reading the current list
    pub fn remove_instruction(&mut self, id: &ActorId, index: usize) -> bool {
        match self.programs.get_mut(id) {
            Some(program) if index < program.len() => {
                program.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Zero every actor's position and heading
    pub fn reset_poses(&mut self) {
        for actor in &mut self.actors {
            actor.position = Position::default();
            actor.heading = 0.0;
        }
    }

    /// Empty every actor's program
    pub fn clear_programs(&mut self) {
        for program in self.programs.values_mut() {
            program.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::instruction::InstructionKind;

    #[test]
    fn test_add_creates_empty_program_at_origin() {
        let mut registry = ActorRegistry::new();
        let id = registry.add("Lucario", "images/lucario.png");

        let actor = registry.get(&id).unwrap();
        assert_eq!(actor.position, Position::default());
        assert_eq!(actor.heading, 0.0);
        assert!(registry.program(&id).unwrap().is_empty());
    }

    #[test]
    fn test_remove_cascades_program() {
        let mut registry = ActorRegistry::new();
        let id = registry.add("Groudon", "images/groudon.png");
        registry.append_instruction(&id, Instruction::default_for(InstructionKind::Move));

        assert!(registry.remove(&id));
        assert!(!registry.contains(&id));
        assert!(registry.program(&id).is_none());
        assert!(!registry.remove(&id));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut registry = ActorRegistry::new();
        let a = registry.add("first", "a.png");
        let b = registry.add("second", "b.png");
        let c = registry.add("third", "c.png");
        registry.remove(&b);

        let order: Vec<ActorId> = registry.actors().iter().map(|a| a.id).collect();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn test_index_edits_read_current_list() {
        let mut registry = ActorRegistry::new();
        let id = registry.add("Rayquaza", "images/rayquaza.png");
        registry.append_instruction(&id, Instruction::default_for(InstructionKind::Move));
        registry.append_instruction(&id, Instruction::default_for(InstructionKind::Turn));
        registry.append_instruction(&id, Instruction::default_for(InstructionKind::Say));

        assert!(registry.remove_instruction(&id, 0));
        // After removal, index 0 is the former Turn block.
        assert!(registry.edit_instruction(&id, 0, "degrees", "90"));
        assert_eq!(
            registry.program(&id).unwrap()[0],
            Instruction::Turn {
                degrees: "90".to_string()
            }
        );
    }

    #[test]
    fn test_out_of_range_index_is_refused() {
        let mut registry = ActorRegistry::new();
        let id = registry.add("Lucario", "images/lucario.png");
        assert!(!registry.remove_instruction(&id, 0));
        assert!(!registry.edit_instruction(&id, 3, "steps", "5"));
    }

    #[test]
    fn test_set_program_requires_live_actor() {
        let mut registry = ActorRegistry::new();
        let id = registry.add("Groudon", "images/groudon.png");
        registry.remove(&id);
        assert!(!registry.set_program(&id, vec![Instruction::default_for(InstructionKind::Move)]));
        assert!(registry.program(&id).is_none());
    }
}
