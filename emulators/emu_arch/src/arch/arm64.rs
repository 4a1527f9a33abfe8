//! 64-bit ARM (A64).
//!
//! Register numbers follow the Unicorn engine's ARM64 constants. A64 has no alternate
//! instruction encoding, so the PC is always reported raw.

use log::trace;

use super::{
    stack, ArchResult, Architecture, ProgramCounterAccess, RegisterCatalog, RegisterId,
    StackAccess, StackPointerAccess,
};
use crate::engine::Engine;
use crate::kind::ArchType;
use crate::word::WordSize;

registers! {
    pub enum Arm64Reg {
        X0 = 199 => "X0",
        X1 = 200 => "X1",
        X2 = 201 => "X2",
        X3 = 202 => "X3",
        X4 = 203 => "X4",
        X5 = 204 => "X5",
        X6 = 205 => "X6",
        X7 = 206 => "X7",
        X8 = 207 => "X8",
        X9 = 208 => "X9",
        X10 = 209 => "X10",
        X11 = 210 => "X11",
        X12 = 211 => "X12",
        X13 = 212 => "X13",
        X14 = 213 => "X14",
        X15 = 214 => "X15",
        X16 = 215 => "X16",
        X17 = 216 => "X17",
        X18 = 217 => "X18",
        X19 = 218 => "X19",
        X20 = 219 => "X20",
        X21 = 220 => "X21",
        X22 = 221 => "X22",
        X23 = 222 => "X23",
        X24 = 223 => "X24",
        X25 = 224 => "X25",
        X26 = 225 => "X26",
        X27 = 226 => "X27",
        X28 = 227 => "X28",
        X29 = 1 => "X29",
        X30 = 2 => "X30",
        Sp = 4 => "SP",
        Pc = 260 => "PC",
    }
    aliases {
        "FP" => X29,
        "LR" => X30,
        "X31" => Sp,
    }
}

const CATALOG: [Arm64Reg; 33] = [
    Arm64Reg::X0,
    Arm64Reg::X1,
    Arm64Reg::X2,
    Arm64Reg::X3,
    Arm64Reg::X4,
    Arm64Reg::X5,
    Arm64Reg::X6,
    Arm64Reg::X7,
    Arm64Reg::X8,
    Arm64Reg::X9,
    Arm64Reg::X10,
    Arm64Reg::X11,
    Arm64Reg::X12,
    Arm64Reg::X13,
    Arm64Reg::X14,
    Arm64Reg::X15,
    Arm64Reg::X16,
    Arm64Reg::X17,
    Arm64Reg::X18,
    Arm64Reg::X19,
    Arm64Reg::X20,
    Arm64Reg::X21,
    Arm64Reg::X22,
    Arm64Reg::X23,
    Arm64Reg::X24,
    Arm64Reg::X25,
    Arm64Reg::X26,
    Arm64Reg::X27,
    Arm64Reg::X28,
    Arm64Reg::X29,
    Arm64Reg::X30,
    Arm64Reg::Sp,
    Arm64Reg::Pc,
];

#[derive(Debug)]
pub struct Arm64<E> {
    engine: E,
}

impl<E: Engine> Arm64<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: Engine> Architecture for Arm64<E> {
    type Reg = Arm64Reg;
    type Engine = E;

    const ARCH: ArchType = ArchType::Arm64;
    const WORD: WordSize = WordSize::Eight;

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

impl<E: Engine> ProgramCounterAccess for Arm64<E> {
    fn program_counter_register(&self) -> Arm64Reg {
        Arm64Reg::Pc
    }

    fn program_counter(&self) -> ArchResult<Self, u64> {
        self.engine.reg_read(Arm64Reg::Pc.raw())
    }

    fn set_program_counter(&mut self, address: u64) -> ArchResult<Self, ()> {
        let address = Self::WORD.truncate(address);
        trace!("arm64: pc <- 0x{address:X}");
        self.engine.reg_write(Arm64Reg::Pc.raw(), address)
    }
}

impl<E: Engine> StackPointerAccess for Arm64<E> {
    fn stack_pointer_register(&self) -> Arm64Reg {
        Arm64Reg::Sp
    }

    fn stack_pointer(&self) -> ArchResult<Self, u64> {
        self.engine.reg_read(Arm64Reg::Sp.raw())
    }

    fn set_stack_pointer(&mut self, address: u64) -> ArchResult<Self, ()> {
        let address = Self::WORD.truncate(address);
        trace!("arm64: sp <- 0x{address:X}");
        self.engine.reg_write(Arm64Reg::Sp.raw(), address)
    }
}

impl<E: Engine> StackAccess for Arm64<E> {
    fn push(&mut self, value: u64) -> ArchResult<Self, u64> {
        stack::push(&mut self.engine, Arm64Reg::Sp.raw(), Self::WORD, value)
    }

    fn pop(&mut self) -> ArchResult<Self, u64> {
        stack::pop(&mut self.engine, Arm64Reg::Sp.raw(), Self::WORD)
    }

    fn read_stack_at(&self, offset: i64) -> ArchResult<Self, u64> {
        stack::read_at(&self.engine, Arm64Reg::Sp.raw(), Self::WORD, offset)
    }

    fn write_stack_at(&mut self, offset: i64, value: u64) -> ArchResult<Self, ()> {
        stack::write_at(&mut self.engine, Arm64Reg::Sp.raw(), Self::WORD, offset, value)
    }
}

impl<E: Engine> RegisterCatalog for Arm64<E> {
    fn register_catalog(&self) -> &'static [Arm64Reg] {
        &CATALOG
    }

    fn register_name(&self, reg: Arm64Reg) -> Option<&'static str> {
        CATALOG.contains(&reg).then(|| reg.name())
    }
}
