//! Architecture contract shared by every supported ISA.
//!
//! Consumers (loader, syscall layer, debugger) talk to the emulated CPU through these traits
//! and never handle raw engine register numbers for PC/SP/stack purposes. Each ISA declares
//! its own closed register enum, so a register of one architecture cannot be handed to
//! another architecture's variant.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use thiserror::Error;

use crate::engine::Engine;
use crate::kind::ArchType;
use crate::word::WordSize;

/// Errors surfaced while parsing register names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown register '{0}'")]
pub struct ParseRegisterError(pub String);

/// Architecture-scoped register identifier.
pub trait RegisterId:
    Copy + Eq + Hash + Debug + Display + FromStr<Err = ParseRegisterError> + 'static
{
    /// Engine register number.
    fn raw(self) -> u32;

    fn from_raw(raw: u32) -> Option<Self>;

    /// Canonical name from the architecture manual.
    fn name(self) -> &'static str;
}

/// Result of a contract operation on `A`: failures are the engine's own errors.
pub type ArchResult<A, T> = Result<T, <<A as Architecture>::Engine as Engine>::Error>;

/// Fixed binding of the contract to one ISA: register set, word width, and the engine it drives.
pub trait Architecture {
    type Reg: RegisterId;
    type Engine: Engine;

    const ARCH: ArchType;
    const WORD: WordSize;

    fn engine(&self) -> &Self::Engine;
    fn engine_mut(&mut self) -> &mut Self::Engine;
    fn into_engine(self) -> Self::Engine
    where
        Self: Sized;

    fn read_register(&self, reg: Self::Reg) -> ArchResult<Self, u64> {
        self.engine().reg_read(reg.raw())
    }

    fn write_register(&mut self, reg: Self::Reg, value: u64) -> ArchResult<Self, ()> {
        self.engine_mut().reg_write(reg.raw(), value)
    }
}

pub trait ProgramCounterAccess: Architecture {
    fn program_counter_register(&self) -> Self::Reg;

    /// PC as seen by consumers resolving call targets. May carry a mode adjustment.
    fn program_counter(&self) -> ArchResult<Self, u64>;

    /// Writes the raw target address; never adjusted.
    fn set_program_counter(&mut self, address: u64) -> ArchResult<Self, ()>;
}

pub trait StackPointerAccess: Architecture {
    fn stack_pointer_register(&self) -> Self::Reg;
    fn stack_pointer(&self) -> ArchResult<Self, u64>;
    fn set_stack_pointer(&mut self, address: u64) -> ArchResult<Self, ()>;
}

/// Word-sized stack access. The stack grows downward on every supported ISA.
pub trait StackAccess: StackPointerAccess {
    /// Decrement SP by one word, store `value` there, and return the new SP.
    fn push(&mut self, value: u64) -> ArchResult<Self, u64>;

    /// Load the word at SP, then increment SP by one word.
    fn pop(&mut self) -> ArchResult<Self, u64>;

    /// Load the word at `SP + offset` without moving SP. No bounds checking is done here.
    fn read_stack_at(&self, offset: i64) -> ArchResult<Self, u64>;

    fn write_stack_at(&mut self, offset: i64, value: u64) -> ArchResult<Self, ()>;
}

pub trait RegisterCatalog: Architecture {
    /// Registers in dump order: general purpose, SP, link register, PC, status.
    fn register_catalog(&self) -> &'static [Self::Reg];

    fn register_name(&self, reg: Self::Reg) -> Option<&'static str>;

    /// Name lookup by engine register number; numbers outside the catalog yield `None`.
    fn register_name_raw(&self, raw: u32) -> Option<&'static str> {
        Self::Reg::from_raw(raw).and_then(|reg| self.register_name(reg))
    }

    fn register_by_name(&self, name: &str) -> Option<Self::Reg> {
        name.parse::<Self::Reg>()
            .ok()
            .filter(|reg| self.register_catalog().contains(reg))
    }
}

/// The full capability set every ISA variant provides.
pub trait ArchContract: ProgramCounterAccess + StackAccess + RegisterCatalog {}

impl<A: ProgramCounterAccess + StackAccess + RegisterCatalog> ArchContract for A {}

/// Declares a closed register enum with its engine numbering, canonical names and
/// additional accepted spellings.
macro_rules! registers {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $raw:literal => $label:literal),+ $(,)?
        }
        aliases { $($alias:literal => $target:ident),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::arch::RegisterId for $name {
            fn raw(self) -> u32 {
                match self {
                    $($name::$variant => $raw),+
                }
            }

            fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $($raw => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::arch::RegisterId::name(*self))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::arch::ParseRegisterError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($label => Ok($name::$variant),)+
                    $($alias => Ok($name::$target),)*
                    _ => Err($crate::arch::ParseRegisterError(s.to_string())),
                }
            }
        }
    };
}

// Declared after the macro so the variant modules can invoke it.
pub mod arm;
pub mod arm64;
pub mod mips;
pub mod x86;
pub mod x8664;

mod stack;

pub use arm::{Arm, ArmReg};
pub use arm64::{Arm64, Arm64Reg};
pub use mips::{Mips, MipsReg};
pub use x86::{X86Reg, X86};
pub use x8664::{X8664Reg, X8664};
