use emu_arch::{ArchType, Cpu, MemoryEngine};
use proptest::prelude::*;

const STACK_BASE: u64 = 0x10_0000;
const STACK_SIZE: u64 = 0x1_0000;
const STACK_TOP: u64 = STACK_BASE + STACK_SIZE;

fn session(arch: ArchType) -> Cpu<MemoryEngine> {
    let mut engine = MemoryEngine::new();
    engine.map(STACK_BASE, STACK_SIZE).unwrap();
    let mut cpu = Cpu::new(arch, engine);
    cpu.set_stack_pointer(STACK_TOP - 0x100).unwrap();
    cpu
}

fn any_arch() -> impl Strategy<Value = ArchType> {
    prop::sample::select(ArchType::ALL.to_vec())
}

proptest! {
    #[test]
    fn push_then_pop_round_trips(arch in any_arch(), value in any::<u64>()) {
        let mut cpu = session(arch);
        let before = cpu.stack_pointer().unwrap();
        let width = arch.word_size().bytes() as u64;

        let after_push = cpu.push(value).unwrap();
        prop_assert_eq!(after_push, before - width);
        prop_assert_eq!(cpu.stack_pointer().unwrap(), before - width);

        let popped = cpu.pop().unwrap();
        prop_assert_eq!(popped, arch.word_size().truncate(value));
        prop_assert_eq!(cpu.stack_pointer().unwrap(), before);
    }

    #[test]
    fn pop_increments_by_one_word(arch in any_arch()) {
        let mut cpu = session(arch);
        let before = cpu.stack_pointer().unwrap();
        cpu.pop().unwrap();
        prop_assert_eq!(cpu.stack_pointer().unwrap(), before + arch.word_size().bytes() as u64);
    }

    #[test]
    fn offset_write_then_read(
        arch in any_arch(),
        slot in -32i64..32,
        value in any::<u64>()
    ) {
        let mut cpu = session(arch);
        let sp = cpu.stack_pointer().unwrap();
        let offset = slot * arch.word_size().bytes() as i64;
        cpu.write_stack_at(offset, value).unwrap();
        prop_assert_eq!(cpu.read_stack_at(offset).unwrap(), arch.word_size().truncate(value));
        prop_assert_eq!(cpu.stack_pointer().unwrap(), sp);
    }

    #[test]
    fn nested_pushes_pop_in_reverse(
        arch in any_arch(),
        values in prop::collection::vec(any::<u32>(), 1..64)
    ) {
        let mut cpu = session(arch);
        let before = cpu.stack_pointer().unwrap();
        for value in &values {
            cpu.push(u64::from(*value)).unwrap();
        }
        for value in values.iter().rev() {
            prop_assert_eq!(cpu.pop().unwrap(), u64::from(*value));
        }
        prop_assert_eq!(cpu.stack_pointer().unwrap(), before);
    }

    #[test]
    fn stack_pointer_holds_one_word(
        arch in any_arch(),
        high in 1u64..=0xFFFF_FFFF,
        value in any::<u64>()
    ) {
        let mut cpu = session(arch);
        let requested = (high << 32) | (STACK_TOP - 0x100);
        cpu.set_stack_pointer(requested).unwrap();
        let s = cpu.stack_pointer().unwrap();
        prop_assert_eq!(s, arch.word_size().truncate(requested));

        if arch.word_size().bytes() == 4 {
            let width = 4;
            prop_assert_eq!(cpu.push(value).unwrap(), s - width);
            prop_assert_eq!(cpu.pop().unwrap(), value & 0xFFFF_FFFF);
            prop_assert_eq!(cpu.stack_pointer().unwrap(), s);
        }
    }
}

#[test]
fn faults_outside_mapping_propagate() {
    for arch in ArchType::ALL {
        let mut cpu = session(arch);
        cpu.set_stack_pointer(STACK_BASE).unwrap();
        assert!(cpu.push(1).is_err(), "{arch}: push below mapping");
        assert_eq!(cpu.stack_pointer().unwrap(), STACK_BASE);
        assert!(cpu.read_stack_at(-1).is_err(), "{arch}: read below mapping");

        cpu.set_stack_pointer(STACK_TOP).unwrap();
        assert!(cpu.pop().is_err(), "{arch}: pop above mapping");
        assert_eq!(cpu.stack_pointer().unwrap(), STACK_TOP);
    }
}
