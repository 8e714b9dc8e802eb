//! Fixed-width instruction IR for GPU compute kernels.
//!
//! This crate defines the in-memory form of kernel code:
//! - Types (s8 ... f64), memory spaces and typed immediates
//! - Registers, register families and the per-function register file
//! - Instructions: one fixed-size cell per instruction, eleven operand shapes
//! - Functions made of basic blocks, and units of functions
//! - A verifier, a text printer and a parser for the printed form

#![no_std]

extern crate alloc;

mod block;
mod entity;
mod entity_map;
mod function;
mod inst;
mod parser;
mod register;
mod types;
mod unit;
mod value;
mod verifier;

pub use block::BasicBlock;
pub use entity::{EntityRef, LabelIndex, RegisterIndex, TupleIndex, ValueIndex};
pub use entity_map::PrimaryMap;
pub use function::Function;
pub use inst::{
    BinaryInst, BranchInst, ConvertInst, DisplayInst, FenceInst, InstClass, InstVariant,
    Instruction, InstructionError, LabelInst, LoadImmInst, LoadInst, Opcode, StoreInst,
    TernaryInst, TextureInst, UnaryInst, MAX_VALUE_NUM,
};
pub use parser::{parse_function, parse_unit, ParseError};
pub use register::{Family, Register, RegisterFile};
pub use types::{MemorySpace, Type};
pub use unit::{PointerSize, Unit};
pub use value::Value;
pub use verifier::{verify, verify_unit, VerifierError};
