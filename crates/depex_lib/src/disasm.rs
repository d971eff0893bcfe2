//! Structured recovery of function bodies.
//!
//! Works on an arena of [`Slot`]s that [`premap`] has already folded. Every
//! sub-block handed to a recursive call is a slice of that arena, so jump
//! offsets read from the binary stay valid at every depth.

use std::fmt;

use crate::AssemblyLevel;
use crate::error::{DisassemblyError, DisassemblyFailure};
use crate::expr::{self, Scope};
use crate::flow;
use crate::instruction::{Instruction, Slot};
use crate::opcode::Opcode;
use crate::premap::premap;
use crate::strings::StringTable;

pub const ELIDED_MARKER: &str = "; <folded>";

/// Deepest IF/WHILE/ELSEIF nesting, and the most jumps in one condition,
/// recovered structurally. Anything deeper is dumped raw.
pub const MAX_NESTING: usize = 128;

fn tabs(indent: usize) -> String {
    "\t".repeat(indent)
}

#[derive(Debug, Clone, PartialEq)]
enum Cond {
    Leaf(String),
    Join(Box<Cond>, &'static str, Box<Cond>),
}

impl Cond {
    fn nested(&self) -> String {
        match self {
            Cond::Leaf(_) => self.to_string(),
            Cond::Join(..) => format!("({self})"),
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cond::Leaf(t) => write!(f, "({t})"),
            Cond::Join(l, op, r) => write!(f, "{} {op} {}", l.nested(), r.nested()),
        }
    }
}

/// Reduces the conditional jumps in `block[ptr..=last]` to one expression.
///
/// Each non-final jump is pushed with its target; when the scan reaches a
/// position at or past a pending target, that entry is combined with the
/// expression built since (JMPF joins with `&&`, JMPT with `||`).
fn reduce_condition(block: &[Slot], ptr: usize, last: usize, strings: &StringTable) -> Result<Cond, DisassemblyFailure> {
    let mut stack: Vec<(Cond, &'static str, usize)> = Vec::new();
    let mut leaves = 0;
    for (pos, slot) in block.iter().enumerate().take(last + 1).skip(ptr) {
        let Some(ins) = slot.active() else {
            continue;
        };
        leaves += 1;
        if leaves > MAX_NESTING {
            return Err(DisassemblyFailure::TooDeep);
        }
        let text = ins.args.first().map(|a| a.render(strings)).unwrap_or_default();
        let mut expr = Cond::Leaf(text);
        while let Some(&(_, _, target)) = stack.last() {
            if target > pos {
                break;
            }
            let Some((lhs, op, _)) = stack.pop() else {
                break;
            };
            expr = Cond::Join(Box::new(lhs), op, Box::new(expr));
        }
        if pos == last {
            if !stack.is_empty() {
                return Err(DisassemblyFailure::MalformedCondition);
            }
            return Ok(expr);
        }
        let op = if ins.opcode == Opcode::JMPT { "||" } else { "&&" };
        let target = ins
            .jump_offset()
            .filter(|&o| o > 0)
            .map(|o| pos + o as usize)
            .filter(|&t| t <= last)
            .ok_or(DisassemblyFailure::MalformedCondition)?;
        stack.push((expr, op, target));
    }
    Err(DisassemblyFailure::MalformedCondition)
}

fn resolve(block: &[Slot], ptr: usize, scope: &Scope<'_>) -> Result<(usize, String), DisassemblyError> {
    let span = flow::detect_conditional(block, ptr)
        .ok_or_else(|| DisassemblyError::new(ptr, DisassemblyFailure::UnresolvedConditional))?;
    let last = ptr + span;
    let cond = reduce_condition(block, ptr, last, scope.strings).map_err(|r| DisassemblyError::new(ptr, r))?;
    Ok((last, cond.to_string()))
}

fn elseif_start(block: &[Slot]) -> Option<usize> {
    let first = block.iter().position(|s| !s.is_elided())?;
    if !block[first].active()?.opcode.is_conditional() {
        return None;
    }
    let last = first + flow::detect_conditional(block, first)?;
    let (o1, o2) = flow::detect_if(block, last)?;
    (last + o1 + o2 - 1 == block.len()).then_some(first)
}

fn nesting_guard(depth: usize, ptr: usize) -> Result<(), DisassemblyError> {
    if depth >= MAX_NESTING {
        return Err(DisassemblyError::new(ptr, DisassemblyFailure::TooDeep));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn if_branches(
    block: &[Slot],
    last: usize,
    offsets: (usize, usize),
    cond: String,
    keyword: &str,
    scope: &Scope<'_>,
    indent: usize,
    depth: usize,
) -> Result<Vec<String>, DisassemblyError> {
    let (o1, o2) = offsets;
    let pad = tabs(indent);
    let mut out = vec![format!("{pad}{keyword} {cond}")];

    let then = &block[last + 1..last + o1 - 1];
    match block_at(then, scope, indent + 1, depth + 1) {
        Ok(lines) => out.extend(lines),
        Err(e) => return Err(e.shifted(out, last + 1)),
    }

    let start = last + o1;
    let other = &block[start..start + o2 - 1];
    if let Some(first) = elseif_start(other) {
        match else_if(other, first, scope, indent, depth + 1) {
            Ok(lines) => out.extend(lines),
            Err(e) => return Err(e.shifted(out, start)),
        }
    } else if other.iter().any(|s| !s.is_elided()) {
        out.push(format!("{pad}ELSE"));
        match block_at(other, scope, indent + 1, depth + 1) {
            Ok(lines) => out.extend(lines),
            Err(e) => return Err(e.shifted(out, start)),
        }
    }
    Ok(out)
}

fn else_if(block: &[Slot], first: usize, scope: &Scope<'_>, indent: usize, depth: usize) -> Result<Vec<String>, DisassemblyError> {
    nesting_guard(depth, first)?;
    let (last, cond) = resolve(block, first, scope)?;
    let offsets = flow::detect_if(block, last)
        .ok_or_else(|| DisassemblyError::new(first, DisassemblyFailure::UnresolvedConditional))?;
    if_branches(block, last, offsets, cond, "ELSEIF", scope, indent, depth)
}

fn conditional(
    block: &[Slot],
    ptr: usize,
    scope: &Scope<'_>,
    indent: usize,
    depth: usize,
) -> Result<(Vec<String>, usize), DisassemblyError> {
    nesting_guard(depth, ptr)?;
    let (last, cond) = resolve(block, ptr, scope)?;
    let pad = tabs(indent);

    if let Some((o1, o2)) = flow::detect_if(block, last) {
        let mut out = if_branches(block, last, (o1, o2), cond, "IF", scope, indent, depth)?;
        out.push(format!("{pad}ENDIF"));
        return Ok((out, last + o1 + o2 - 1 - ptr));
    }

    if let Some(o1) = flow::detect_while(block, last) {
        let mut out = vec![format!("{pad}WHILE {cond}")];
        match block_at(&block[last + 1..last + o1 - 1], scope, indent + 1, depth + 1) {
            Ok(lines) => out.extend(lines),
            Err(e) => return Err(e.shifted(out, last + 1)),
        }
        out.push(format!("{pad}ENDWHILE"));
        return Ok((out, last + o1 - ptr));
    }

    Err(DisassemblyError::new(ptr, DisassemblyFailure::UnresolvedConditional))
}

/// Structured disassembly of `block`. On failure the error carries the
/// lines emitted so far and the slot index where recovery stopped.
pub fn disassemble_block(block: &[Slot], scope: &Scope<'_>, indent: usize) -> Result<Vec<String>, DisassemblyError> {
    block_at(block, scope, indent, 0)
}

fn block_at(block: &[Slot], scope: &Scope<'_>, indent: usize, depth: usize) -> Result<Vec<String>, DisassemblyError> {
    let pad = tabs(indent);
    let mut out = Vec::new();
    let mut ptr = 0;
    while ptr < block.len() {
        let Some(ins) = block[ptr].active() else {
            ptr += 1;
            continue;
        };
        if ins.opcode.is_conditional() {
            match conditional(block, ptr, scope, indent, depth) {
                Ok((lines, consumed)) => {
                    out.extend(lines);
                    ptr += consumed;
                }
                Err(e) => return Err(e.shifted(out, 0)),
            }
            continue;
        }
        match expr::line(scope, ins) {
            Some(text) => out.push(format!("{pad}{text}")),
            None => {
                let e = DisassemblyError::new(ptr, DisassemblyFailure::StrayJump);
                return Err(e.shifted(out, 0));
            }
        }
        ptr += 1;
    }
    Ok(out)
}

pub fn raw_dump(block: &[Slot], strings: &StringTable, indent: usize) -> Vec<String> {
    let pad = tabs(indent);
    block
        .iter()
        .map(|slot| match slot {
            Slot::Active(ins) => format!("{pad}{}", ins.render_raw(strings)),
            Slot::Elided(_) => format!("{pad}{ELIDED_MARKER}"),
        })
        .collect()
}

/// Structured disassembly that always yields output: on failure the
/// recovered prefix is kept and the rest is dumped raw one level deeper.
pub fn disassemble_total(block: &[Slot], scope: &Scope<'_>, indent: usize) -> Vec<String> {
    match disassemble_block(block, scope, indent) {
        Ok(lines) => lines,
        Err(e) => {
            log::warn!("structure recovery failed: {e}; dumping {} remaining slots", block.len() - e.ptr_delta);
            let mut out = e.partial;
            out.extend(raw_dump(&block[e.ptr_delta..], scope.strings, indent + 1));
            out
        }
    }
}

pub fn function_body(instructions: &[Instruction], scope: &Scope<'_>, level: AssemblyLevel, indent: usize) -> Vec<String> {
    let mut arena: Vec<Slot> = instructions.iter().cloned().map(Slot::Active).collect();
    match level {
        AssemblyLevel::Bytecode => raw_dump(&arena, scope.strings, indent),
        AssemblyLevel::Stripped => {
            premap(&mut arena, scope);
            let pad = tabs(indent);
            arena.iter().filter_map(Slot::active).map(|i| format!("{pad}{}", i.render_raw(scope.strings))).collect()
        }
        AssemblyLevel::Full => {
            premap(&mut arena, scope);
            disassemble_total(&arena, scope, indent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdata::VData;

    struct Body {
        strings: StringTable,
        slots: Vec<Slot>,
    }

    impl Body {
        fn new() -> Self {
            Self { strings: StringTable::new(), slots: Vec::new() }
        }

        fn id(&mut self, s: &str) -> VData {
            VData::Identifier(self.strings.add_string(s).unwrap())
        }

        fn push(&mut self, op: Opcode, args: Vec<VData>) -> &mut Self {
            self.slots.push(Slot::Active(Instruction::new(op, args)));
            self
        }

        fn call(&mut self, method: &str) -> &mut Self {
            let (m, obj, none) = (self.id(method), self.id("self"), self.id("::NoneVar"));
            self.push(Opcode::CALLMETHOD, vec![m, obj, none])
        }

        fn jmpf(&mut self, cond: &str, off: i32) -> &mut Self {
            let c = self.id(cond);
            self.push(Opcode::JMPF, vec![c, VData::Integer(off)])
        }

        fn jmpt(&mut self, cond: &str, off: i32) -> &mut Self {
            let c = self.id(cond);
            self.push(Opcode::JMPT, vec![c, VData::Integer(off)])
        }

        fn assign(&mut self, dest: &str, src: &str) -> &mut Self {
            let (d, s) = (self.id(dest), self.id(src));
            self.push(Opcode::ASSIGN, vec![d, s])
        }

        fn jmp(&mut self, off: i32) -> &mut Self {
            self.push(Opcode::JMP, vec![VData::Integer(off)])
        }

        fn ret(&mut self) -> &mut Self {
            self.push(Opcode::RETURN, vec![VData::None])
        }

        fn full(&mut self) -> Vec<String> {
            premap(&mut self.slots, &Scope::new(&self.strings, []));
            disassemble_total(&self.slots, &Scope::new(&self.strings, []), 0)
        }
    }

    #[test]
    fn if_else_end_to_end() {
        let mut b = Body::new();
        b.jmpf("a", 3).call("Open").jmp(2).call("Close").ret();
        assert_eq!(b.full(), vec!["IF (a)", "\tself.Open()", "ELSE", "\tself.Close()", "ENDIF", "RETURN"]);
    }

    #[test]
    fn if_without_else_branch() {
        let mut b = Body::new();
        b.jmpf("a", 3).call("Open").jmp(1).ret();
        assert_eq!(b.full(), vec!["IF (a)", "\tself.Open()", "ENDIF", "RETURN"]);
    }

    #[test]
    fn while_loop_with_folded_condition() {
        let mut b = Body::new();
        let (t, i) = (b.id("::temp0"), b.id("i"));
        b.push(Opcode::CMP_LT, vec![t.clone(), i, VData::Integer(10)]);
        b.push(Opcode::JMPF, vec![t, VData::Integer(3)]);
        b.call("Tick").jmp(-3).ret();
        assert_eq!(b.full(), vec!["WHILE ((i) < (10))", "\tself.Tick()", "ENDWHILE", "RETURN"]);
    }

    #[test]
    fn else_if_chains_flatten() {
        // IF a / A / ELSEIF b / B / ELSE / C / ENDIF
        let mut b = Body::new();
        b.jmpf("a", 3).call("A").jmp(5);
        b.jmpf("b", 3).call("B").jmp(2).call("C");
        b.ret();
        assert_eq!(
            b.full(),
            vec!["IF (a)", "\tself.A()", "ELSEIF (b)", "\tself.B()", "ELSE", "\tself.C()", "ENDIF", "RETURN"]
        );
    }

    #[test]
    fn else_with_leading_statement_nests() {
        let mut b = Body::new();
        b.jmpf("a", 3).call("A").jmp(5);
        b.call("Pre").jmpf("b", 3).call("B").jmp(1);
        let lines = b.full();
        assert_eq!(
            lines,
            vec!["IF (a)", "\tself.A()", "ELSE", "\tself.Pre()", "\tIF (b)", "\t\tself.B()", "\tENDIF", "ENDIF"]
        );
    }

    #[test]
    fn or_and_chain_reduces_with_nesting() {
        // a || (b && c) compiled through ::temp0 / ::temp1
        let mut b = Body::new();
        b.assign("::temp0", "a").jmpt("::temp0", 5);
        b.assign("::temp1", "b").jmpf("::temp1", 2);
        b.assign("::temp1", "c");
        b.assign("::temp0", "::temp1");
        b.jmpf("::temp0", 3).call("Go").jmp(1);
        assert_eq!(b.full(), vec!["IF (a) || ((b) && (c))", "\tself.Go()", "ENDIF"]);
    }

    #[test]
    fn or_then_and_groups_left() {
        // (a || b) && c
        let mut b = Body::new();
        b.assign("::temp0", "a").jmpt("::temp0", 2);
        b.assign("::temp0", "b");
        b.jmpf("::temp0", 2);
        b.assign("::temp0", "c");
        b.jmpf("::temp0", 3).call("Go").jmp(1);
        assert_eq!(b.full(), vec!["IF ((a) || (b)) && (c)", "\tself.Go()", "ENDIF"]);
    }

    #[test]
    fn nested_structures_indent() {
        let mut b = Body::new();
        // WHILE x { IF y { A } }
        b.jmpf("x", 5).jmpf("y", 3).call("A").jmp(1).jmp(-4);
        assert_eq!(b.full(), vec!["WHILE (x)", "\tIF (y)", "\t\tself.A()", "\tENDIF", "ENDWHILE"]);
    }

    #[test]
    fn failure_keeps_prefix_and_dumps_rest() {
        let mut b = Body::new();
        b.call("First").jmpf("a", 9).call("Second").ret();
        let lines = b.full();
        assert_eq!(lines[0], "self.First()");
        assert_eq!(lines[1], "\tjumpf a 9");
        assert_eq!(lines[2], "\tcallmethod Second self ::NoneVar");
        assert_eq!(lines[3], "\treturn none");
    }

    #[test]
    fn nested_failure_splices_partial_lines() {
        let mut b = Body::new();
        // IF a { B ; <stray jump> }
        b.jmpf("a", 4).call("B").jmp(7).jmp(1).ret();
        let scope = Scope::new(&b.strings, []);
        let err = disassemble_block(&b.slots, &scope, 0).unwrap_err();
        assert_eq!(err.reason, DisassemblyFailure::StrayJump);
        assert_eq!(err.ptr_delta, 2);
        assert_eq!(err.partial, vec!["IF (a)", "\tself.B()"]);
        let lines = disassemble_total(&b.slots, &scope, 0);
        assert_eq!(lines, vec!["IF (a)", "\tself.B()", "\tjump 7", "\tjump 1", "\treturn none"]);
    }

    #[test]
    fn deep_nesting_falls_back_to_raw_dump() {
        const DEPTH: usize = 10_000;
        let mut b = Body::new();
        for k in 0..DEPTH {
            b.jmpf("x", (2 * (DEPTH - k) + 1) as i32);
        }
        b.call("Core");
        for _ in 0..DEPTH {
            b.jmp(1);
        }
        b.ret();

        let scope = Scope::new(&b.strings, []);
        let err = disassemble_block(&b.slots, &scope, 0).unwrap_err();
        assert_eq!(err.reason, DisassemblyFailure::TooDeep);
        assert_eq!(err.ptr_delta, MAX_NESTING);
        assert_eq!(err.partial.len(), MAX_NESTING);

        let lines = disassemble_total(&b.slots, &scope, 0);
        assert_eq!(lines.len(), b.slots.len());
        assert_eq!(lines[0], "IF (x)");
        assert_eq!(lines[MAX_NESTING - 1], format!("{}IF (x)", tabs(MAX_NESTING - 1)));
        assert_eq!(lines[MAX_NESTING], format!("\tjumpf x {}", 2 * (DEPTH - MAX_NESTING) + 1));
        assert_eq!(lines.last().unwrap(), "\treturn none");
    }

    #[test]
    fn long_condition_chains_fall_back() {
        let mut b = Body::new();
        let n = MAX_NESTING + 1;
        for k in 0..n - 1 {
            b.jmpt("x", (n - 1 - k) as i32);
        }
        b.jmpf("y", 3).call("Go").jmp(1);
        let scope = Scope::new(&b.strings, []);
        let err = disassemble_block(&b.slots, &scope, 0).unwrap_err();
        assert_eq!(err.reason, DisassemblyFailure::TooDeep);
        assert_eq!(err.ptr_delta, 0);
    }

    #[test]
    fn raw_dump_marks_folded_slots() {
        let mut b = Body::new();
        let (t, x, y) = (b.id("::temp0"), b.id("x"), b.id("y"));
        b.push(Opcode::IADD, vec![t.clone(), x, VData::Integer(1)]);
        b.push(Opcode::ASSIGN, vec![y, t]);
        let scope = Scope::new(&b.strings, []);
        premap(&mut b.slots, &scope);
        assert_eq!(raw_dump(&b.slots, &b.strings, 1), vec![format!("\t{ELIDED_MARKER}"), "\tassign y (x) + (1)".to_string()]);
    }

    #[test]
    fn assembly_levels() {
        let mut b = Body::new();
        let (t, x, y) = (b.id("::temp0"), b.id("x"), b.id("y"));
        let code = vec![
            Instruction::new(Opcode::IADD, vec![t.clone(), x, VData::Integer(1)]),
            Instruction::new(Opcode::ASSIGN, vec![y, t]),
        ];
        let scope = Scope::new(&b.strings, []);
        assert_eq!(
            function_body(&code, &scope, AssemblyLevel::Bytecode, 0),
            vec!["iadd ::temp0 x 1", "assign y ::temp0"]
        );
        assert_eq!(function_body(&code, &scope, AssemblyLevel::Stripped, 0), vec!["assign y (x) + (1)"]);
        assert_eq!(function_body(&code, &scope, AssemblyLevel::Full, 1), vec!["\ty = (x) + (1)"]);
        assert_eq!(code[0].opcode, Opcode::IADD);
    }
}
