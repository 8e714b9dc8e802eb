//! Instruction opcodes.

use core::fmt;

/// Operand shape of an instruction; one per `Instruction` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstClass {
    Unary,
    Binary,
    Ternary,
    Convert,
    LoadImm,
    Load,
    Store,
    Branch,
    Label,
    Texture,
    Fence,
}

macro_rules! opcodes {
    ($($(#[$doc:meta])* $name:ident => $mnemonic:literal, $class:ident;)*) => {
        /// Instruction opcode
        ///
        /// The opcode fully determines which `Instruction` variant holds the
        /// operands, see [`Opcode::class`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $($(#[$doc])* $name,)*
        }

        impl Opcode {
            /// Every opcode, in declaration order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$name,)*];

            /// Variant that carries the operands of this opcode.
            pub fn class(self) -> InstClass {
                match self {
                    $(Opcode::$name => InstClass::$class,)*
                }
            }

            /// Lowercase mnemonic used by the text form.
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$name => $mnemonic,)*
                }
            }
        }
    };
}

opcodes! {
    /// Move
    Mov => "mov", Unary;
    /// Cosine
    Cos => "cos", Unary;
    /// Sine
    Sin => "sin", Unary;
    /// Tangent
    Tan => "tan", Unary;
    /// Logarithm
    Log => "log", Unary;
    /// Square root
    Sqr => "sqr", Unary;
    /// Reciprocal square root
    Rsq => "rsq", Unary;
    /// Base-2 exponential
    Exp2 => "exp2", Unary;
    /// Power
    Pow => "pow", Binary;
    Mul => "mul", Binary;
    Add => "add", Binary;
    Sub => "sub", Binary;
    Div => "div", Binary;
    Rem => "rem", Binary;
    /// Shift left
    Shl => "shl", Binary;
    /// Logical shift right
    Shr => "shr", Binary;
    /// Arithmetic shift right
    Asr => "asr", Binary;
    /// Bit scan forward
    Bsf => "bsf", Binary;
    /// Bit scan backward
    Bsb => "bsb", Binary;
    Or => "or", Binary;
    Xor => "xor", Binary;
    And => "and", Binary;
    /// Multiply-add: dst = src0 * src1 + src2
    Mad => "mad", Ternary;
    /// Type conversion
    Cvt => "cvt", Convert;
    /// Branch, optionally predicated
    Bra => "bra", Branch;
    /// Texture sample
    Tex => "tex", Texture;
    /// Load an immediate from the function's value table
    LoadI => "loadi", LoadImm;
    /// Load contiguous values from memory
    Load => "load", Load;
    /// Store contiguous values to memory
    Store => "store", Store;
    /// Order loads and stores of one memory space
    Fence => "fence", Fence;
    /// Branch target marker
    Label => "label", Label;
}

impl Opcode {
    /// Look up an opcode by mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic() == mnemonic)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
