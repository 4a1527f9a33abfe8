//! Architecture-tagged CPU session.
//!
//! Consumers that only learn the architecture at runtime (from a loaded binary or a config
//! file) hold a [`Cpu`], which picks the ISA variant from an [`ArchType`] at construction.
//! Registers are addressed through [`AnyReg`], which remembers the architecture it was
//! resolved on, so a register taken from one session is refused by a session of another
//! architecture.

use std::fmt;

use log::debug;
use thiserror::Error;

use crate::arch::{
    ArchContract, ArchResult, Architecture, Arm, Arm64, Arm64Reg, ArmReg, Mips, MipsReg,
    ProgramCounterAccess, RegisterCatalog, RegisterId, StackAccess, StackPointerAccess, X86Reg,
    X8664Reg, X86, X8664,
};
use crate::engine::Engine;
use crate::kind::{ArchType, SessionConfig};
use crate::word::WordSize;

/// Register of whichever architecture a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyReg {
    Arm(ArmReg),
    Arm64(Arm64Reg),
    X86(X86Reg),
    X8664(X8664Reg),
    Mips(MipsReg),
}

macro_rules! any_reg_from {
    ($($variant:ident($reg:ty)),+ $(,)?) => {
        $(impl From<$reg> for AnyReg {
            fn from(reg: $reg) -> Self {
                AnyReg::$variant(reg)
            }
        })+
    };
}

any_reg_from! {
    Arm(ArmReg),
    Arm64(Arm64Reg),
    X86(X86Reg),
    X8664(X8664Reg),
    Mips(MipsReg),
}

impl AnyReg {
    pub fn arch(self) -> ArchType {
        match self {
            AnyReg::Arm(_) => ArchType::Arm,
            AnyReg::Arm64(_) => ArchType::Arm64,
            AnyReg::X86(_) => ArchType::X86,
            AnyReg::X8664(_) => ArchType::X8664,
            AnyReg::Mips(_) => ArchType::Mips,
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            AnyReg::Arm(reg) => reg.raw(),
            AnyReg::Arm64(reg) => reg.raw(),
            AnyReg::X86(reg) => reg.raw(),
            AnyReg::X8664(reg) => reg.raw(),
            AnyReg::Mips(reg) => reg.raw(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AnyReg::Arm(reg) => reg.name(),
            AnyReg::Arm64(reg) => reg.name(),
            AnyReg::X86(reg) => reg.name(),
            AnyReg::X8664(reg) => reg.name(),
            AnyReg::Mips(reg) => reg.name(),
        }
    }
}

impl fmt::Display for AnyReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.arch(), self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterAccessError<E: std::error::Error> {
    #[error("register {reg} does not belong to a {session} session")]
    ArchMismatch { session: ArchType, reg: AnyReg },
    #[error("engine error: {0}")]
    Engine(E),
}

#[derive(Debug)]
pub enum Cpu<E: Engine> {
    Arm(Arm<E>),
    Arm64(Arm64<E>),
    X86(X86<E>),
    X8664(X8664<E>),
    Mips(Mips<E>),
}

macro_rules! dispatch {
    ($cpu:expr, $inner:ident => $body:expr) => {
        match $cpu {
            Cpu::Arm($inner) => $body,
            Cpu::Arm64($inner) => $body,
            Cpu::X86($inner) => $body,
            Cpu::X8664($inner) => $body,
            Cpu::Mips($inner) => $body,
        }
    };
}

fn dump<A: ArchContract>(arch: &A) -> ArchResult<A, Vec<(&'static str, u64)>> {
    arch.register_catalog()
        .iter()
        .map(|reg| Ok((reg.name(), arch.read_register(*reg)?)))
        .collect()
}

// Pairs a session with a register of the same architecture; any other pairing is refused.
macro_rules! dispatch_reg {
    ($cpu:expr, $reg:expr, ($inner:ident, $id:ident) => $body:expr) => {{
        let session = $cpu.arch();
        match ($cpu, $reg) {
            (Cpu::Arm($inner), AnyReg::Arm($id)) => $body.map_err(RegisterAccessError::Engine),
            (Cpu::Arm64($inner), AnyReg::Arm64($id)) => $body.map_err(RegisterAccessError::Engine),
            (Cpu::X86($inner), AnyReg::X86($id)) => $body.map_err(RegisterAccessError::Engine),
            (Cpu::X8664($inner), AnyReg::X8664($id)) => $body.map_err(RegisterAccessError::Engine),
            (Cpu::Mips($inner), AnyReg::Mips($id)) => $body.map_err(RegisterAccessError::Engine),
            (_, reg) => Err(RegisterAccessError::ArchMismatch { session, reg }),
        }
    }};
}

fn catalog_lookup<A: RegisterCatalog>(arch: &A, raw: u32) -> Option<A::Reg> {
    A::Reg::from_raw(raw).filter(|reg| arch.register_catalog().contains(reg))
}

fn catalog_raw<A: RegisterCatalog>(arch: &A) -> Vec<u32> {
    arch.register_catalog().iter().map(|reg| reg.raw()).collect()
}

impl<E: Engine> Cpu<E> {
    pub fn new(arch: ArchType, engine: E) -> Self {
        debug!("new {arch} session ({} byte words)", arch.word_size().bytes());
        match arch {
            ArchType::Arm => Cpu::Arm(Arm::new(engine)),
            ArchType::Arm64 => Cpu::Arm64(Arm64::new(engine)),
            ArchType::X86 => Cpu::X86(X86::new(engine)),
            ArchType::X8664 => Cpu::X8664(X8664::new(engine)),
            ArchType::Mips => Cpu::Mips(Mips::new(engine)),
        }
    }

    pub fn from_config(config: &SessionConfig, engine: E) -> Self {
        Self::new(config.arch, engine)
    }

    pub fn arch(&self) -> ArchType {
        match self {
            Cpu::Arm(_) => ArchType::Arm,
            Cpu::Arm64(_) => ArchType::Arm64,
            Cpu::X86(_) => ArchType::X86,
            Cpu::X8664(_) => ArchType::X8664,
            Cpu::Mips(_) => ArchType::Mips,
        }
    }

    pub fn word_size(&self) -> WordSize {
        self.arch().word_size()
    }

    pub fn engine(&self) -> &E {
        dispatch!(self, cpu => cpu.engine())
    }

    pub fn engine_mut(&mut self) -> &mut E {
        dispatch!(self, cpu => cpu.engine_mut())
    }

    pub fn into_engine(self) -> E {
        dispatch!(self, cpu => cpu.into_engine())
    }

    pub fn program_counter(&self) -> Result<u64, E::Error> {
        dispatch!(self, cpu => cpu.program_counter())
    }

    pub fn set_program_counter(&mut self, address: u64) -> Result<(), E::Error> {
        dispatch!(self, cpu => cpu.set_program_counter(address))
    }

    pub fn stack_pointer(&self) -> Result<u64, E::Error> {
        dispatch!(self, cpu => cpu.stack_pointer())
    }

    pub fn set_stack_pointer(&mut self, address: u64) -> Result<(), E::Error> {
        dispatch!(self, cpu => cpu.set_stack_pointer(address))
    }

    pub fn push(&mut self, value: u64) -> Result<u64, E::Error> {
        dispatch!(self, cpu => cpu.push(value))
    }

    pub fn pop(&mut self) -> Result<u64, E::Error> {
        dispatch!(self, cpu => cpu.pop())
    }

    pub fn read_stack_at(&self, offset: i64) -> Result<u64, E::Error> {
        dispatch!(self, cpu => cpu.read_stack_at(offset))
    }

    pub fn write_stack_at(&mut self, offset: i64, value: u64) -> Result<(), E::Error> {
        dispatch!(self, cpu => cpu.write_stack_at(offset, value))
    }

    pub fn pc_register_raw(&self) -> u32 {
        dispatch!(self, cpu => cpu.program_counter_register().raw())
    }

    pub fn sp_register_raw(&self) -> u32 {
        dispatch!(self, cpu => cpu.stack_pointer_register().raw())
    }

    pub fn register_catalog_raw(&self) -> Vec<u32> {
        dispatch!(self, cpu => catalog_raw(cpu))
    }

    pub fn register_name_raw(&self, raw: u32) -> Option<&'static str> {
        dispatch!(self, cpu => cpu.register_name_raw(raw))
    }

    pub fn pc_register(&self) -> AnyReg {
        dispatch!(self, cpu => cpu.program_counter_register().into())
    }

    pub fn sp_register(&self) -> AnyReg {
        dispatch!(self, cpu => cpu.stack_pointer_register().into())
    }

    /// Catalog register with the given name or alias (case-insensitive).
    pub fn register_by_name(&self, name: &str) -> Option<AnyReg> {
        dispatch!(self, cpu => cpu.register_by_name(name).map(AnyReg::from))
    }

    /// Catalog register with the given engine number.
    pub fn register_by_raw(&self, raw: u32) -> Option<AnyReg> {
        dispatch!(self, cpu => catalog_lookup(cpu, raw).map(AnyReg::from))
    }

    pub fn read_register(&self, reg: AnyReg) -> Result<u64, RegisterAccessError<E::Error>> {
        dispatch_reg!(self, reg, (cpu, id) => cpu.read_register(id))
    }

    pub fn write_register(
        &mut self,
        reg: AnyReg,
        value: u64,
    ) -> Result<(), RegisterAccessError<E::Error>> {
        dispatch_reg!(self, reg, (cpu, id) => cpu.write_register(id, value))
    }

    /// Catalog registers and their current values, in dump order.
    pub fn dump_registers(&self) -> Result<Vec<(&'static str, u64)>, E::Error> {
        dispatch!(self, cpu => dump(cpu))
    }
}
