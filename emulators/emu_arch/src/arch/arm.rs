//! 32-bit ARM (A32/T32).
//!
//! Register numbers follow the Unicorn engine's ARM constants.

use log::trace;

use super::{
    stack, ArchResult, Architecture, ProgramCounterAccess, RegisterCatalog, RegisterId,
    StackAccess, StackPointerAccess,
};
use crate::engine::Engine;
use crate::kind::ArchType;
use crate::word::WordSize;

/// CPSR T bit: set while executing Thumb code.
pub const CPSR_THUMB: u64 = 1 << 5;

registers! {
    /// Core registers visible in both ARM and Thumb state.
    pub enum ArmReg {
        R0 = 66 => "R0",
        R1 = 67 => "R1",
        R2 = 68 => "R2",
        R3 = 69 => "R3",
        R4 = 70 => "R4",
        R5 = 71 => "R5",
        R6 = 72 => "R6",
        R7 = 73 => "R7",
        R8 = 74 => "R8",
        R9 = 75 => "R9",
        R10 = 76 => "R10",
        R11 = 77 => "R11",
        R12 = 78 => "R12",
        Sp = 12 => "SP",
        Lr = 10 => "LR",
        Pc = 11 => "PC",
        Cpsr = 3 => "CPSR",
    }
    aliases {
        "R13" => Sp,
        "R14" => Lr,
        "R15" => Pc,
        "IP" => R12,
        "FP" => R11,
    }
}

const CATALOG: [ArmReg; 17] = [
    ArmReg::R0,
    ArmReg::R1,
    ArmReg::R2,
    ArmReg::R3,
    ArmReg::R4,
    ArmReg::R5,
    ArmReg::R6,
    ArmReg::R7,
    ArmReg::R8,
    ArmReg::R9,
    ArmReg::R10,
    ArmReg::R11,
    ArmReg::R12,
    ArmReg::Sp,
    ArmReg::Lr,
    ArmReg::Pc,
    ArmReg::Cpsr,
];

#[derive(Debug)]
pub struct Arm<E> {
    engine: E,
}

impl<E: Engine> Arm<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// True when CPSR selects the Thumb instruction set.
    pub fn is_thumb(&self) -> Result<bool, E::Error> {
        let cpsr = self.engine.reg_read(ArmReg::Cpsr.raw())?;
        Ok(cpsr & CPSR_THUMB != 0)
    }
}

impl<E: Engine> Architecture for Arm<E> {
    type Reg = ArmReg;
    type Engine = E;

    const ARCH: ArchType = ArchType::Arm;
    const WORD: WordSize = WordSize::Four;

    fn engine(&self) -> &E {
        &self.engine
    }

    fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn into_engine(self) -> E {
        self.engine
    }
}

impl<E: Engine> ProgramCounterAccess for Arm<E> {
    fn program_counter_register(&self) -> ArmReg {
        ArmReg::Pc
    }

    // In Thumb state the reported PC carries bit 0 set, the interworking
    // convention for call targets.
    fn program_counter(&self) -> ArchResult<Self, u64> {
        let thumb = self.is_thumb()?;
        let pc = self.engine.reg_read(ArmReg::Pc.raw())?;
        Ok(if thumb { pc.wrapping_add(1) } else { pc })
    }

    fn set_program_counter(&mut self, address: u64) -> ArchResult<Self, ()> {
        let address = Self::WORD.truncate(address);
        trace!("arm: pc <- 0x{address:X}");
        self.engine.reg_write(ArmReg::Pc.raw(), address)
    }
}

impl<E: Engine> StackPointerAccess for Arm<E> {
    fn stack_pointer_register(&self) -> ArmReg {
        ArmReg::Sp
    }

    fn stack_pointer(&self) -> ArchResult<Self, u64> {
        self.engine.reg_read(ArmReg::Sp.raw())
    }

    fn set_stack_pointer(&mut self, address: u64) -> ArchResult<Self, ()> {
        let address = Self::WORD.truncate(address);
        trace!("arm: sp <- 0x{address:X}");
        self.engine.reg_write(ArmReg::Sp.raw(), address)
    }
}

impl<E: Engine> StackAccess for Arm<E> {
    fn push(&mut self, value: u64) -> ArchResult<Self, u64> {
        stack::push(&mut self.engine, ArmReg::Sp.raw(), Self::WORD, value)
    }

    fn pop(&mut self) -> ArchResult<Self, u64> {
        stack::pop(&mut self.engine, ArmReg::Sp.raw(), Self::WORD)
    }

    fn read_stack_at(&self, offset: i64) -> ArchResult<Self, u64> {
        stack::read_at(&self.engine, ArmReg::Sp.raw(), Self::WORD, offset)
    }

    fn write_stack_at(&mut self, offset: i64, value: u64) -> ArchResult<Self, ()> {
        stack::write_at(&mut self.engine, ArmReg::Sp.raw(), Self::WORD, offset, value)
    }
}

impl<E: Engine> RegisterCatalog for Arm<E> {
    fn register_catalog(&self) -> &'static [ArmReg] {
        &CATALOG
    }

    fn register_name(&self, reg: ArmReg) -> Option<&'static str> {
        CATALOG.contains(&reg).then(|| reg.name())
    }
}
