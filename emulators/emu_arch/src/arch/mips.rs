//! 32-bit little-endian MIPS (O32 register names).
//!
//! Register numbers follow the Unicorn engine's MIPS constants: PC is 1, `$n` is `n + 2`.

use log::trace;

use super::{
    stack, ArchResult, Architecture, ProgramCounterAccess, RegisterCatalog, RegisterId,
    StackAccess, StackPointerAccess,
};
use crate::engine::Engine;
use crate::kind::ArchType;
use crate::word::WordSize;

registers! {
    pub enum MipsReg {
        Zero = 2 => "ZERO",
        At = 3 => "AT",
        V0 = 4 => "V0",
        V1 = 5 => "V1",
        A0 = 6 => "A0",
        A1 = 7 => "A1",
        A2 = 8 => "A2",
        A3 = 9 => "A3",
        T0 = 10 => "T0",
        T1 = 11 => "T1",
        T2 = 12 => "T2",
        T3 = 13 => "T3",
        T4 = 14 => "T4",
        T5 = 15 => "T5",
        T6 = 16 => "T6",
        T7 = 17 => "T7",
        S0 = 18 => "S0",
        S1 = 19 => "S1",
        S2 = 20 => "S2",
        S3 = 21 => "S3",
        S4 = 22 => "S4",
        S5 = 23 => "S5",
        S6 = 24 => "S6",
        S7 = 25 => "S7",
        T8 = 26 => "T8",
        T9 = 27 => "T9",
        K0 = 28 => "K0",
        K1 = 29 => "K1",
        Gp = 30 => "GP",
        Fp = 32 => "FP",
        Sp = 31 => "SP",
        Ra = 33 => "RA",
        Pc = 1 => "PC",
    }
    aliases {
        "S8" => Fp,
        "$0" => Zero,
        "$1" => At,
        "$2" => V0,
        "$3" => V1,
        "$4" => A0,
        "$5" => A1,
        "$6" => A2,
        "$7" => A3,
        "$8" => T0,
        "$9" => T1,
        "$10" => T2,
        "$11" => T3,
        "$12" => T4,
        "$13" => T5,
        "$14" => T6,
        "$15" => T7,
        "$16" => S0,
        "$17" => S1,
        "$18" => S2,
        "$19" => S3,
        "$20" => S4,
        "$21" => S5,
        "$22" => S6,
        "$23" => S7,
        "$24" => T8,
        "$25" => T9,
        "$26" => K0,
        "$27" => K1,
        "$28" => Gp,
        "$29" => Sp,
        "$30" => Fp,
        "$31" => Ra,
        "$ZERO" => Zero,
        "$AT" => At,
        "$V0" => V0,
        "$V1" => V1,
        "$A0" => A0,
        "$A1" => A1,
        "$A2" => A2,
        "$A3" => A3,
        "$T0" => T0,
        "$T1" => T1,
        "$T2" => T2,
        "$T3" => T3,
        "$T4" => T4,
        "$T5" => T5,
        "$T6" => T6,
        "$T7" => T7,
        "$S0" => S0,
        "$S1" => S1,
        "$S2" => S2,
        "$S3" => S3,
        "$S4" => S4,
        "$S5" => S5,
        "$S6" => S6,
        "$S7" => S7,
        "$T8" => T8,
        "$T9" => T9,
        "$K0" => K0,
        "$K1" => K1,
        "$GP" => Gp,
        "$SP" => Sp,
        "$FP" => Fp,
        "$S8" => Fp,
        "$RA" => Ra,
    }
}

const CATALOG: [MipsReg; 33] = [
    MipsReg::Zero,
    MipsReg::At,
    MipsReg::V0,
    MipsReg::V1,
    MipsReg::A0,
    MipsReg::A1,
    MipsReg::A2,
    MipsReg::A3,
    MipsReg::T0,
    MipsReg::T1,
    MipsReg::T2,
    MipsReg::T3,
    MipsReg::T4,
    MipsReg::T5,
    MipsReg::T6,
    MipsReg::T7,
    MipsReg::S0,
    MipsReg::S1,
    MipsReg::S2,
    MipsReg::S3,
    MipsReg::S4,
    MipsReg::S5,
    MipsReg::S6,
    MipsReg::S7,
    MipsReg::T8,
    MipsReg::T9,
    MipsReg::K0,
    MipsReg::K1,
    MipsReg::Gp,
    MipsReg::Fp,
    MipsReg::Sp,
    MipsReg::Ra,
    MipsReg::Pc,
];

#[derive(Debug)]
pub struct Mips<E> {
    engine: E,
}

impl<E: Engine> Mips<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: Engine> Architecture for Mips<E> {
    type Reg = MipsReg;
    type Engine = E;

    const ARCH: ArchType = ArchType::Mips;
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

impl<E: Engine> ProgramCounterAccess for Mips<E> {
    fn program_counter_register(&self) -> MipsReg {
        MipsReg::Pc
    }

    fn program_counter(&self) -> ArchResult<Self, u64> {
        self.engine.reg_read(MipsReg::Pc.raw())
    }

    fn set_program_counter(&mut self, address: u64) -> ArchResult<Self, ()> {
        let address = Self::WORD.truncate(address);
        trace!("mips: pc <- 0x{address:X}");
        self.engine.reg_write(MipsReg::Pc.raw(), address)
    }
}

impl<E: Engine> StackPointerAccess for Mips<E> {
    fn stack_pointer_register(&self) -> MipsReg {
        MipsReg::Sp
    }

    fn stack_pointer(&self) -> ArchResult<Self, u64> {
        self.engine.reg_read(MipsReg::Sp.raw())
    }

    fn set_stack_pointer(&mut self, address: u64) -> ArchResult<Self, ()> {
        let address = Self::WORD.truncate(address);
        trace!("mips: sp <- 0x{address:X}");
        self.engine.reg_write(MipsReg::Sp.raw(), address)
    }
}

impl<E: Engine> StackAccess for Mips<E> {
    fn push(&mut self, value: u64) -> ArchResult<Self, u64> {
        stack::push(&mut self.engine, MipsReg::Sp.raw(), Self::WORD, value)
    }

    fn pop(&mut self) -> ArchResult<Self, u64> {
        stack::pop(&mut self.engine, MipsReg::Sp.raw(), Self::WORD)
    }

    fn read_stack_at(&self, offset: i64) -> ArchResult<Self, u64> {
        stack::read_at(&self.engine, MipsReg::Sp.raw(), Self::WORD, offset)
    }

    fn write_stack_at(&mut self, offset: i64, value: u64) -> ArchResult<Self, ()> {
        stack::write_at(&mut self.engine, MipsReg::Sp.raw(), Self::WORD, offset, value)
    }
}

impl<E: Engine> RegisterCatalog for Mips<E> {
    fn register_catalog(&self) -> &'static [MipsReg] {
        &CATALOG
    }

    fn register_name(&self, reg: MipsReg) -> Option<&'static str> {
        CATALOG.contains(&reg).then(|| reg.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;

    #[test]
    fn stack_frame_offsets() {
        let mut engine = MemoryEngine::new();
        engine.map(0x7FFE_F000, 0x1000).unwrap();
        let mut cpu = Mips::new(engine);
        cpu.set_stack_pointer(0x7FFE_FF00).unwrap();
        cpu.write_stack_at(0x10, 0xAABB).unwrap();
        cpu.write_stack_at(-4, 0xCCDD).unwrap();
        assert_eq!(cpu.read_stack_at(0x10).unwrap(), 0xAABB);
        assert_eq!(cpu.pop().unwrap(), 0);
        assert_eq!(cpu.stack_pointer().unwrap(), 0x7FFE_FF04);
        assert_eq!(cpu.read_stack_at(-8).unwrap(), 0xCCDD);
    }

    #[test]
    fn numeric_and_abi_names() {
        let cpu = Mips::new(MemoryEngine::new());
        assert_eq!(cpu.register_by_name("$29"), Some(MipsReg::Sp));
        assert_eq!(cpu.register_by_name("s8"), Some(MipsReg::Fp));
        assert_eq!(cpu.register_by_name("$31"), Some(MipsReg::Ra));
        assert_eq!(cpu.register_by_name("$32"), None);
        assert_eq!(cpu.register_name_raw(2), Some("ZERO"));
        assert_eq!(cpu.register_name_raw(34), None);
    }

    #[test]
    fn dollar_abi_names() {
        let cpu = Mips::new(MemoryEngine::new());
        assert_eq!(cpu.register_by_name("$sp"), Some(MipsReg::Sp));
        assert_eq!(cpu.register_by_name("$ra"), Some(MipsReg::Ra));
        assert_eq!(cpu.register_by_name("$fp"), Some(MipsReg::Fp));
        assert_eq!(cpu.register_by_name("$s8"), Some(MipsReg::Fp));
        assert_eq!(cpu.register_by_name("$zero"), Some(MipsReg::Zero));
        assert_eq!(cpu.register_by_name("$t9"), Some(MipsReg::T9));
        assert_eq!(cpu.register_by_name("$pc"), None);
        for reg in cpu.register_catalog().iter().filter(|reg| **reg != MipsReg::Pc) {
            let spelled = format!("${}", reg.name().to_ascii_lowercase());
            assert_eq!(cpu.register_by_name(&spelled), Some(*reg), "{spelled}");
        }
    }

    #[test]
    fn catalog_ends_with_sp_ra_pc() {
        let cpu = Mips::new(MemoryEngine::new());
        let catalog = cpu.register_catalog();
        assert_eq!(catalog.len(), 33);
        assert_eq!(&catalog[30..], &[MipsReg::Sp, MipsReg::Ra, MipsReg::Pc]);
    }
}
