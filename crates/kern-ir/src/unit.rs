//! Compilation units.

use alloc::vec::Vec;
use core::fmt;

use crate::{function::Function, register::Family};

/// Width of a memory address on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerSize {
    Ptr32,
    #[default]
    Ptr64,
}

impl PointerSize {
    /// Register family that holds an address.
    pub fn family(&self) -> Family {
        match self {
            PointerSize::Ptr32 => Family::DWord,
            PointerSize::Ptr64 => Family::QWord,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PointerSize::Ptr32 => "ptr32",
            PointerSize::Ptr64 => "ptr64",
        }
    }
}

impl fmt::Display for PointerSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of finished kernel functions sharing one pointer size.
///
/// Functions keep the order they were added in; names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unit {
    pointer_size: PointerSize,
    functions: Vec<Function>,
}

impl Unit {
    pub fn new(pointer_size: PointerSize) -> Self {
        Self {
            pointer_size,
            functions: Vec::new(),
        }
    }

    pub fn pointer_size(&self) -> PointerSize {
        self.pointer_size
    }

    /// Family of address registers in this unit.
    pub fn pointer_family(&self) -> Family {
        self.pointer_size.family()
    }

    /// Add a finished function.
    ///
    /// # Panics
    ///
    /// Panics if a function with the same name already exists, or if the
    /// name would not survive printing and parsing.
    pub fn add_function(&mut self, func: Function) {
        if !Function::is_valid_name(func.name()) {
            panic!("invalid function name {:?}", func.name());
        }
        if self.contains(func.name()) {
            panic!("function %{} already exists in unit", func.name());
        }
        self.functions.push(func);
    }

    /// Get a function by name.
    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|func| func.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_function(name).is_some()
    }

    /// Functions in the order they were added
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "unit {} {{", self.pointer_size)?;
        for func in &self.functions {
            writeln!(f)?;
            write!(f, "{}", func)?;
        }
        writeln!(f, "}}")
    }
}
