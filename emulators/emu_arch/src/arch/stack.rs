//! Downward-growing word stack over an engine, parameterised by SP register and word width.

use log::trace;

use crate::engine::Engine;
use crate::word::WordSize;

pub(crate) fn push<E: Engine>(
    engine: &mut E,
    sp_reg: u32,
    word: WordSize,
    value: u64,
) -> Result<u64, E::Error> {
    let sp = word.step_down(engine.reg_read(sp_reg)?);
    engine.mem_write(sp, &word.pack(value))?;
    engine.reg_write(sp_reg, sp)?;
    trace!("push 0x{value:X} -> sp=0x{sp:X}");
    Ok(sp)
}

pub(crate) fn pop<E: Engine>(engine: &mut E, sp_reg: u32, word: WordSize) -> Result<u64, E::Error> {
    let sp = word.truncate(engine.reg_read(sp_reg)?);
    let value = word.unpack(&engine.mem_read(sp, word.bytes())?);
    let next = word.step_up(sp);
    engine.reg_write(sp_reg, next)?;
    trace!("pop 0x{value:X} <- sp=0x{sp:X}");
    Ok(value)
}

pub(crate) fn read_at<E: Engine>(
    engine: &E,
    sp_reg: u32,
    word: WordSize,
    offset: i64,
) -> Result<u64, E::Error> {
    let address = word.offset_address(engine.reg_read(sp_reg)?, offset);
    let value = word.unpack(&engine.mem_read(address, word.bytes())?);
    trace!("stack[sp{offset:+}] -> 0x{value:X} @ 0x{address:X}");
    Ok(value)
}

pub(crate) fn write_at<E: Engine>(
    engine: &mut E,
    sp_reg: u32,
    word: WordSize,
    offset: i64,
    value: u64,
) -> Result<(), E::Error> {
    let address = word.offset_address(engine.reg_read(sp_reg)?, offset);
    trace!("stack[sp{offset:+}] = 0x{value:X} @ 0x{address:X}");
    engine.mem_write(address, &word.pack(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, MemoryEngine};

    const SP: u32 = 1;

    fn engine_with_stack(sp: u64) -> MemoryEngine {
        let mut engine = MemoryEngine::new();
        engine.map(0x8000, 0x1000).unwrap();
        engine.reg_write(SP, sp).unwrap();
        engine
    }

    #[test]
    fn push_writes_little_endian_below_sp() {
        let mut engine = engine_with_stack(0x8100);
        let sp = push(&mut engine, SP, WordSize::Four, 0xAABB_CCDD).unwrap();
        assert_eq!(sp, 0x80FC);
        assert_eq!(engine.mem_read(0x80FC, 4).unwrap(), vec![0xDD, 0xCC, 0xBB, 0xAA]);
    }

    #[test]
    fn failed_push_leaves_sp_untouched() {
        let mut engine = engine_with_stack(0x8002);
        let err = push(&mut engine, SP, WordSize::Eight, 1).unwrap_err();
        assert_eq!(err, EngineError::Unmapped { address: 0x7FFA, len: 8 });
        assert_eq!(engine.reg_read(SP).unwrap(), 0x8002);
    }

    #[test]
    fn failed_pop_leaves_sp_untouched() {
        let mut engine = engine_with_stack(0x9000);
        assert!(pop(&mut engine, SP, WordSize::Four).is_err());
        assert_eq!(engine.reg_read(SP).unwrap(), 0x9000);
    }

    #[test]
    fn offsets_are_signed() {
        let mut engine = engine_with_stack(0x8100);
        write_at(&mut engine, SP, WordSize::Eight, -8, 0x1122).unwrap();
        write_at(&mut engine, SP, WordSize::Eight, 16, 0x3344).unwrap();
        assert_eq!(read_at(&engine, SP, WordSize::Eight, -8).unwrap(), 0x1122);
        assert_eq!(engine.mem_read(0x8110, 2).unwrap(), vec![0x44, 0x33]);
        assert_eq!(engine.reg_read(SP).unwrap(), 0x8100);
    }
}
