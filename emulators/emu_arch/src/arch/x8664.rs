//! x86-64 (AMD64).
//!
//! Register numbers follow the Unicorn engine's x86 constants; RFLAGS shares the EFLAGS number.

use log::trace;

use super::{
    stack, ArchResult, Architecture, ProgramCounterAccess, RegisterCatalog, RegisterId,
    StackAccess, StackPointerAccess,
};
use crate::engine::Engine;
use crate::kind::ArchType;
use crate::word::WordSize;

registers! {
    pub enum X8664Reg {
        Rax = 35 => "RAX",
        Rcx = 38 => "RCX",
        Rdx = 40 => "RDX",
        Rbx = 37 => "RBX",
        Rbp = 36 => "RBP",
        Rsi = 43 => "RSI",
        Rdi = 39 => "RDI",
        R8 = 106 => "R8",
        R9 = 107 => "R9",
        R10 = 108 => "R10",
        R11 = 109 => "R11",
        R12 = 110 => "R12",
        R13 = 111 => "R13",
        R14 = 112 => "R14",
        R15 = 113 => "R15",
        Rsp = 44 => "RSP",
        Rip = 41 => "RIP",
        Rflags = 25 => "RFLAGS",
    }
    aliases {
        "EFLAGS" => Rflags,
    }
}

const CATALOG: [X8664Reg; 18] = [
    X8664Reg::Rax,
    X8664Reg::Rcx,
    X8664Reg::Rdx,
    X8664Reg::Rbx,
    X8664Reg::Rbp,
    X8664Reg::Rsi,
    X8664Reg::Rdi,
    X8664Reg::R8,
    X8664Reg::R9,
    X8664Reg::R10,
    X8664Reg::R11,
    X8664Reg::R12,
    X8664Reg::R13,
    X8664Reg::R14,
    X8664Reg::R15,
    X8664Reg::Rsp,
    X8664Reg::Rip,
    X8664Reg::Rflags,
];

#[derive(Debug)]
pub struct X8664<E> {
    engine: E,
}

impl<E: Engine> X8664<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: Engine> Architecture for X8664<E> {
    type Reg = X8664Reg;
    type Engine = E;

    const ARCH: ArchType = ArchType::X8664;
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

impl<E: Engine> ProgramCounterAccess for X8664<E> {
    fn program_counter_register(&self) -> X8664Reg {
        X8664Reg::Rip
    }

    fn program_counter(&self) -> ArchResult<Self, u64> {
        self.engine.reg_read(X8664Reg::Rip.raw())
    }

    fn set_program_counter(&mut self, address: u64) -> ArchResult<Self, ()> {
        let address = Self::WORD.truncate(address);
        trace!("x8664: pc <- 0x{address:X}");
        self.engine.reg_write(X8664Reg::Rip.raw(), address)
    }
}

impl<E: Engine> StackPointerAccess for X8664<E> {
    fn stack_pointer_register(&self) -> X8664Reg {
        X8664Reg::Rsp
    }

    fn stack_pointer(&self) -> ArchResult<Self, u64> {
        self.engine.reg_read(X8664Reg::Rsp.raw())
    }

    fn set_stack_pointer(&mut self, address: u64) -> ArchResult<Self, ()> {
        let address = Self::WORD.truncate(address);
        trace!("x8664: sp <- 0x{address:X}");
        self.engine.reg_write(X8664Reg::Rsp.raw(), address)
    }
}

impl<E: Engine> StackAccess for X8664<E> {
    fn push(&mut self, value: u64) -> ArchResult<Self, u64> {
        stack::push(&mut self.engine, X8664Reg::Rsp.raw(), Self::WORD, value)
    }

    fn pop(&mut self) -> ArchResult<Self, u64> {
        stack::pop(&mut self.engine, X8664Reg::Rsp.raw(), Self::WORD)
    }

    fn read_stack_at(&self, offset: i64) -> ArchResult<Self, u64> {
        stack::read_at(&self.engine, X8664Reg::Rsp.raw(), Self::WORD, offset)
    }

    fn write_stack_at(&mut self, offset: i64, value: u64) -> ArchResult<Self, ()> {
        stack::write_at(&mut self.engine, X8664Reg::Rsp.raw(), Self::WORD, offset, value)
    }
}

impl<E: Engine> RegisterCatalog for X8664<E> {
    fn register_catalog(&self) -> &'static [X8664Reg] {
        &CATALOG
    }

    fn register_name(&self, reg: X8664Reg) -> Option<&'static str> {
        CATALOG.contains(&reg).then(|| reg.name())
    }
}
