//! 32-bit x86 (IA-32).
//!
//! Register numbers follow the Unicorn engine's x86 constants.

use log::trace;

use super::{
    stack, ArchResult, Architecture, ProgramCounterAccess, RegisterCatalog, RegisterId,
    StackAccess, StackPointerAccess,
};
use crate::engine::Engine;
use crate::kind::ArchType;
use crate::word::WordSize;

registers! {
    pub enum X86Reg {
        Eax = 19 => "EAX",
        Ecx = 22 => "ECX",
        Edx = 24 => "EDX",
        Ebx = 21 => "EBX",
        Ebp = 20 => "EBP",
        Esi = 29 => "ESI",
        Edi = 23 => "EDI",
        Esp = 30 => "ESP",
        Eip = 26 => "EIP",
        Eflags = 25 => "EFLAGS",
    }
    aliases {}
}

const CATALOG: [X86Reg; 10] = [
    X86Reg::Eax,
    X86Reg::Ecx,
    X86Reg::Edx,
    X86Reg::Ebx,
    X86Reg::Ebp,
    X86Reg::Esi,
    X86Reg::Edi,
    X86Reg::Esp,
    X86Reg::Eip,
    X86Reg::Eflags,
];

#[derive(Debug)]
pub struct X86<E> {
    engine: E,
}

impl<E: Engine> X86<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: Engine> Architecture for X86<E> {
    type Reg = X86Reg;
    type Engine = E;

    const ARCH: ArchType = ArchType::X86;
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

impl<E: Engine> ProgramCounterAccess for X86<E> {
    fn program_counter_register(&self) -> X86Reg {
        X86Reg::Eip
    }

    fn program_counter(&self) -> ArchResult<Self, u64> {
        self.engine.reg_read(X86Reg::Eip.raw())
    }

    fn set_program_counter(&mut self, address: u64) -> ArchResult<Self, ()> {
        let address = Self::WORD.truncate(address);
        trace!("x86: pc <- 0x{address:X}");
        self.engine.reg_write(X86Reg::Eip.raw(), address)
    }
}

impl<E: Engine> StackPointerAccess for X86<E> {
    fn stack_pointer_register(&self) -> X86Reg {
        X86Reg::Esp
    }

    fn stack_pointer(&self) -> ArchResult<Self, u64> {
        self.engine.reg_read(X86Reg::Esp.raw())
    }

    fn set_stack_pointer(&mut self, address: u64) -> ArchResult<Self, ()> {
        let address = Self::WORD.truncate(address);
        trace!("x86: sp <- 0x{address:X}");
        self.engine.reg_write(X86Reg::Esp.raw(), address)
    }
}

impl<E: Engine> StackAccess for X86<E> {
    fn push(&mut self, value: u64) -> ArchResult<Self, u64> {
        stack::push(&mut self.engine, X86Reg::Esp.raw(), Self::WORD, value)
    }

    fn pop(&mut self) -> ArchResult<Self, u64> {
        stack::pop(&mut self.engine, X86Reg::Esp.raw(), Self::WORD)
    }

    fn read_stack_at(&self, offset: i64) -> ArchResult<Self, u64> {
        stack::read_at(&self.engine, X86Reg::Esp.raw(), Self::WORD, offset)
    }

    fn write_stack_at(&mut self, offset: i64, value: u64) -> ArchResult<Self, ()> {
        stack::write_at(&mut self.engine, X86Reg::Esp.raw(), Self::WORD, offset, value)
    }
}

impl<E: Engine> RegisterCatalog for X86<E> {
    fn register_catalog(&self) -> &'static [X86Reg] {
        &CATALOG
    }

    fn register_name(&self, reg: X86Reg) -> Option<&'static str> {
        CATALOG.contains(&reg).then(|| reg.name())
    }
}
