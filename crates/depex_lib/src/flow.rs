//! Recognizers for the jump shapes the compiler emits for IF and WHILE.
//!
//! Offsets are relative to the jump instruction itself. Both shapes start
//! with a JMPF whose target is just past an unconditional JMP:
//!
//! ```text
//! IF:    JMPF c, +o1 ; then... ; JMP +o2 ; else... ;   (o2 > 0)
//! WHILE: JMPF c, +o1 ; body... ; JMP -n            ;   (back to the loop head)
//! ```

use crate::instruction::{Instruction, Slot};
use crate::opcode::Opcode;

fn active_at(block: &[Slot], idx: usize) -> Option<&Instruction> {
    block.get(idx).and_then(Slot::active)
}

fn closing_jump(block: &[Slot], ptr: usize) -> Option<(usize, usize, i32)> {
    let begin = active_at(block, ptr)?;
    if begin.opcode != Opcode::JMPF {
        return None;
    }
    let offset1 = begin.jump_offset()?;
    if offset1 < 2 {
        return None;
    }
    let offset1 = offset1 as usize;
    let jmp_idx = ptr.checked_add(offset1 - 1)?;
    let end = active_at(block, jmp_idx)?;
    if end.opcode != Opcode::JMP {
        return None;
    }
    Some((offset1, jmp_idx, end.jump_offset()?))
}

/// IF shape at `ptr`: returns `(offset1, offset2)`. The then-branch spans
/// `ptr+1 .. ptr+offset1-1`, the else-branch the `offset2 - 1` slots after
/// the closing JMP.
pub fn detect_if(block: &[Slot], ptr: usize) -> Option<(usize, usize)> {
    let (offset1, jmp_idx, offset2) = closing_jump(block, ptr)?;
    if offset2 <= 0 {
        return None;
    }
    let offset2 = offset2 as usize;
    if jmp_idx.checked_add(offset2)? > block.len() {
        return None;
    }
    Some((offset1, offset2))
}

pub fn detect_while(block: &[Slot], ptr: usize) -> Option<usize> {
    let (offset1, jmp_idx, offset2) = closing_jump(block, ptr)?;
    if offset2 > 0 {
        return None;
    }
    // The loop head may not lie after the conditional that guards the body.
    if (jmp_idx as i64) + (offset2 as i64) > ptr as i64 {
        log::warn!("malformed loop at {ptr}: forward offset {offset1} exceeds backward span {}", -offset2);
        return None;
    }
    Some(offset1)
}

/// Scans a chain of conditional jumps starting at `ptr` (elided slots are
/// skipped) until one of them closes an IF or WHILE. Returns the distance
/// from `ptr` to that final jump.
pub fn detect_conditional(block: &[Slot], ptr: usize) -> Option<usize> {
    for (i, slot) in block.iter().enumerate().skip(ptr) {
        let Some(ins) = slot.active() else {
            continue;
        };
        if !ins.opcode.is_conditional() {
            return None;
        }
        if detect_if(block, i).is_some() || detect_while(block, i).is_some() {
            return Some(i - ptr);
        }
    }
    None
}
