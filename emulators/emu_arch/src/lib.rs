//! Architecture abstraction for an emulated CPU.
//!
//! Binds a uniform contract (program counter, stack pointer, word-sized stack access and a
//! register catalog) to each supported ISA on top of an opaque execution [`Engine`]. The layer
//! holds no CPU state of its own: every call is translated into engine register/memory
//! accesses and engine errors are returned as-is.

pub mod arch;
pub mod context;
pub mod cpu;
pub mod engine;
pub mod kind;
pub mod word;

pub use arch::{
    ArchContract, ArchResult, Architecture, Arm, Arm64, Arm64Reg, ArmReg, Mips, MipsReg,
    ParseRegisterError, ProgramCounterAccess, RegisterCatalog, RegisterId, StackAccess,
    StackPointerAccess, X86Reg, X8664Reg, X86, X8664,
};
pub use context::{ContextError, RegisterContext};
pub use cpu::{AnyReg, Cpu, RegisterAccessError};
pub use engine::{Engine, EngineError, MemoryEngine};
pub use kind::{ArchType, ParseArchError, SessionConfig};
pub use word::WordSize;
