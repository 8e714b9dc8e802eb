//! Function verifier.
//!
//! `Instruction::well_formed` checks one instruction in isolation. The
//! verifier adds what needs the whole function or unit: block structure,
//! label definitions, address widths and the input/output lists.

use alloc::{format, string::String, vec, vec::Vec};

use thiserror::Error;

use crate::{
    entity::{EntityRef, RegisterIndex},
    function::Function,
    inst::{BranchInst, DisplayInst, Instruction, LabelInst},
    unit::{PointerSize, Unit},
};

/// Verifier error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct VerifierError {
    /// Error message describing what's wrong
    pub message: String,
    /// Optional location, e.g. "%main block1 inst0"
    pub location: Option<String>,
}

impl VerifierError {
    pub fn new(message: String) -> Self {
        Self {
            message,
            location: None,
        }
    }

    pub fn with_location(message: String, location: String) -> Self {
        Self {
            message,
            location: Some(location),
        }
    }
}

/// Verify a function for the given pointer size.
///
/// Returns every problem found, not only the first one.
pub fn verify(func: &Function, pointer_size: PointerSize) -> Result<(), Vec<VerifierError>> {
    let mut errors = Vec::new();

    verify_interface(func, &mut errors);
    verify_insts(func, pointer_size, &mut errors);
    verify_labels(func, &mut errors);

    log::debug!(
        "verified function %{}: {} error(s)",
        func.name(),
        errors.len()
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Verify every function of a unit against the unit's pointer size.
pub fn verify_unit(unit: &Unit) -> Result<(), Vec<VerifierError>> {
    let mut errors = Vec::new();
    for func in unit.functions() {
        if let Err(func_errors) = verify(func, unit.pointer_size()) {
            errors.extend(func_errors);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn inst_location(func: &Function, block: usize, inst: usize) -> String {
    format!("%{} block{} inst{}", func.name(), block, inst)
}

fn verify_interface(func: &Function, errors: &mut Vec<VerifierError>) {
    let lists: [(&str, &[RegisterIndex]); 2] = [("input", func.inputs()), ("output", func.outputs())];
    for (what, regs) in lists {
        for reg in regs {
            if !func.register_file().is_valid(*reg) {
                errors.push(VerifierError::with_location(
                    format!("{} register {} out of range ({} registers)", what, reg, func.reg_num()),
                    format!("%{}", func.name()),
                ));
            }
        }
    }
}

fn verify_insts(func: &Function, pointer_size: PointerSize, errors: &mut Vec<VerifierError>) {
    let pointer_family = pointer_size.family();
    for (b, block) in func.blocks().iter().enumerate() {
        if block.is_empty() {
            errors.push(VerifierError::with_location(
                String::from("empty block"),
                format!("%{} block{}", func.name(), b),
            ));
        }
        let last = block.inst_count().saturating_sub(1);
        for (i, inst) in block.insts().iter().enumerate() {
            if let Err(err) = inst.well_formed(func) {
                errors.push(VerifierError::with_location(
                    format!("{}: {}", DisplayInst::new(inst, func), err),
                    inst_location(func, b, i),
                ));
                continue;
            }

            let address = match inst {
                Instruction::Load(load) => Some(load.address()),
                Instruction::Store(store) => Some(store.address()),
                _ => None,
            };
            if let Some(address) = address {
                let family = func.get_register(address).family();
                if family != pointer_family {
                    errors.push(VerifierError::with_location(
                        format!(
                            "address register {} is {}, expected {} for {}",
                            address, family, pointer_family, pointer_size
                        ),
                        inst_location(func, b, i),
                    ));
                }
            }

            if inst.is_terminator() && i != last {
                errors.push(VerifierError::with_location(
                    String::from("branch in the middle of a block"),
                    inst_location(func, b, i),
                ));
            }
            if inst.is_member_of::<LabelInst>() && i != 0 {
                errors.push(VerifierError::with_location(
                    String::from("label in the middle of a block"),
                    inst_location(func, b, i),
                ));
            }
        }
    }
}

fn verify_labels(func: &Function, errors: &mut Vec<VerifierError>) {
    let mut defined = vec![0usize; func.label_num()];
    for inst in func.insts() {
        if let Some(label) = inst.try_cast::<LabelInst>() {
            if let Some(count) = defined.get_mut(label.label().index()) {
                *count += 1;
            }
        }
    }

    for (index, count) in defined.iter().enumerate() {
        if *count > 1 {
            errors.push(VerifierError::with_location(
                format!("label L{} defined {} times", index, count),
                format!("%{}", func.name()),
            ));
        }
    }

    for (b, block) in func.blocks().iter().enumerate() {
        for (i, inst) in block.insts().iter().enumerate() {
            let Some(branch) = inst.try_cast::<BranchInst>() else {
                continue;
            };
            if defined.get(branch.label().index()) == Some(&0) {
                errors.push(VerifierError::with_location(
                    format!("branch to undefined label {}", branch.label()),
                    inst_location(func, b, i),
                ));
            }
        }
    }
}
