//! Folds compiler temporaries into the expressions that consume them.
//!
//! `IADD ::temp1 a b ; ASSIGN x ::temp1` becomes an elided IADD followed by
//! `ASSIGN x "(a) + (b)"`. A temporary is folded only when exactly one
//! instruction reads it before it is next written, so calls whose results
//! are ignored or reused keep their own line.

use std::collections::HashMap;

use crate::expr::{self, Scope};
use crate::instruction::Slot;
use crate::names;
use crate::strings::TString;
use crate::vdata::VData;

fn temp_name(scope: &Scope<'_>, v: &VData) -> Option<TString> {
    let t = v.as_identifier()?;
    names::is_temp(scope.name(t)).then_some(t)
}

fn downstream_reads(block: &[Slot], scope: &Scope<'_>) -> Vec<usize> {
    let mut pending: HashMap<TString, usize> = HashMap::new();
    let mut reads = vec![0; block.len()];
    for (i, slot) in block.iter().enumerate().rev() {
        let ins = slot.instruction();
        let dest = ins.opcode.dest_index();
        if let Some(t) = ins.dest().and_then(|d| temp_name(scope, d)) {
            reads[i] = pending.insert(t, 0).unwrap_or(0);
        }
        for (k, a) in ins.args.iter().enumerate() {
            if Some(k) == dest {
                continue;
            }
            if let Some(t) = temp_name(scope, a) {
                *pending.entry(t).or_default() += 1;
            }
        }
    }
    reads
}

fn rename_autovar(scope: &Scope<'_>, v: &mut VData) {
    if let VData::Identifier(t) = v {
        if let Some(prop) = names::autovar_property(scope.name(*t)) {
            *v = VData::Term(prop.to_string());
        }
    }
}

/// Rewrites `block` in place and returns the number of slots elided.
/// Running it again on its own output changes nothing.
pub fn premap(block: &mut [Slot], scope: &Scope<'_>) -> usize {
    let reads = downstream_reads(block, scope);
    let mut terms: HashMap<TString, VData> = HashMap::new();
    let mut elided = 0usize;

    for i in 0..block.len() {
        let Slot::Active(ins) = &mut block[i] else {
            continue;
        };
        let dest_idx = ins.opcode.dest_index();
        for (k, a) in ins.args.iter_mut().enumerate() {
            if Some(k) != dest_idx {
                if let Some(term) = a.as_identifier().and_then(|t| terms.get(&t)) {
                    *a = term.clone();
                    continue;
                }
            }
            rename_autovar(scope, a);
        }

        let Some(temp) = ins.dest().and_then(|d| temp_name(scope, d)) else {
            continue;
        };
        let ins = ins.clone();
        if ins.opcode.is_inlinable() && reads[i] == 1 {
            if let Some(term) = expr::term(scope, &ins) {
                terms.insert(temp, term);
                block[i] = Slot::Elided(ins);
                elided += 1;
                continue;
            }
        }
        terms.remove(&temp);
    }

    log::debug!("premap elided {} of {} instructions", elided, block.len());
    elided
}
