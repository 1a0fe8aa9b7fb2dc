//! Pairwise exchange of type-matched instruction parameters
//!
//! Given two programs, blocks are grouped by tag with their per-tag order
//! preserved; for every tag present in both programs, payloads are exchanged
//! positionally up to the shorter group's length. Tags and block identity
//! stay with their original program; only the mutable parameters move.

use std::collections::HashMap;
use std::mem;

use super::instruction::{Instruction, InstructionKind, Program};

/// Exchange matching payloads between two programs
///
/// Operates on copies so the exchange is transactional: the caller commits
/// both returned programs as whole-value replacements. Returns `None` when
/// the programs share no tag (a normal outcome, not an error).
pub fn swap_programs(a: &Program, b: &Program) -> Option<(Program, Program)> {
    let mut swapped_a = a.clone();
    let mut swapped_b = b.clone();
    let groups_b: HashMap<InstructionKind, Vec<usize>> = group_by_kind(b).into_iter().collect();

    let mut exchanged = false;
    for (kind, indices_a) in group_by_kind(a) {
        let Some(indices_b) = groups_b.get(&kind) else {
            continue;
        };
        // Pair up positionally, up to the shorter group.
        for (&i, &j) in indices_a.iter().zip(indices_b.iter()) {
            exchange_payload(&mut swapped_a[i], &mut swapped_b[j]);
            exchanged = true;
            tracing::debug!(%kind, "exchanged instruction payload");
        }
    }

    if exchanged {
        Some((swapped_a, swapped_b))
    } else {
        tracing::debug!("no matching instruction kinds to exchange");
        None
    }
}

/// Indices of a program's blocks grouped by tag, per-tag order preserved
///
/// The outer order follows each tag's first occurrence in the program.
fn group_by_kind(program: &Program) -> Vec<(InstructionKind, Vec<usize>)> {
    let mut order: Vec<InstructionKind> = Vec::new();
    let mut groups: HashMap<InstructionKind, Vec<usize>> = HashMap::new();

    for (index, instruction) in program.iter().enumerate() {
        let kind = instruction.kind();
        let entry = groups.entry(kind).or_default();
        if entry.is_empty() {
            order.push(kind);
        }
        entry.push(index);
    }

    order
        .into_iter()
        .map(|kind| {
            let indices = groups.remove(&kind).unwrap_or_default();
            (kind, indices)
        })
        .collect()
}

/// Exchange the mutable parameters of two same-tag blocks
///
/// Single numeric field for Move/Turn/Repeat, both coordinates together for
/// GoTo, text and duration together for Say/Think.
fn exchange_payload(a: &mut Instruction, b: &mut Instruction) {
    match (a, b) {
        (Instruction::Move { steps: a }, Instruction::Move { steps: b }) => mem::swap(a, b),
        (Instruction::Turn { degrees: a }, Instruction::Turn { degrees: b }) => mem::swap(a, b),
        (Instruction::Repeat { count: a }, Instruction::Repeat { count: b }) => mem::swap(a, b),
        (
            Instruction::GoTo { x: ax, y: ay },
            Instruction::GoTo { x: bx, y: by },
        ) => {
            mem::swap(ax, bx);
            mem::swap(ay, by);
        }
        (
            Instruction::Say {
                text: at,
                duration: ad,
            },
            Instruction::Say {
                text: bt,
                duration: bd,
            },
        )
        | (
            Instruction::Think {
                text: at,
                duration: ad,
            },
            Instruction::Think {
                text: bt,
                duration: bd,
            },
        ) => {
            mem::swap(at, bt);
            mem::swap(ad, bd);
        }
        (a, b) => {
            // Grouping pairs blocks by tag, so this arm never runs.
            tracing::debug!(left = %a.kind(), right = %b.kind(), "refusing cross-tag exchange");
        }
    }
}
