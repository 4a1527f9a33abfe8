//! Save and restore of the catalog registers of a session.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpu::{Cpu, RegisterAccessError};
use crate::engine::Engine;
use crate::kind::ArchType;

/// Register values captured from a session, keyed by canonical register name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterContext {
    pub arch: ArchType,
    pub registers: Vec<(String, u64)>,
}

#[derive(Debug, Error)]
pub enum ContextError<E: std::error::Error> {
    #[error("context was captured on {found}, session is {expected}")]
    ArchMismatch { expected: ArchType, found: ArchType },
    #[error("unknown register '{0}' in context")]
    UnknownRegister(String),
    #[error("engine error: {0}")]
    Engine(E),
}

impl<E: std::error::Error> From<RegisterAccessError<E>> for ContextError<E> {
    fn from(err: RegisterAccessError<E>) -> Self {
        match err {
            RegisterAccessError::ArchMismatch { session, reg } => ContextError::ArchMismatch {
                expected: session,
                found: reg.arch(),
            },
            RegisterAccessError::Engine(err) => ContextError::Engine(err),
        }
    }
}

impl RegisterContext {
    pub fn get(&self, name: &str) -> Option<u64> {
        self.registers
            .iter()
            .find(|(reg, _)| reg.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

impl<E: Engine> Cpu<E> {
    pub fn save_context(&self) -> Result<RegisterContext, E::Error> {
        let registers = self
            .dump_registers()?
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        Ok(RegisterContext {
            arch: self.arch(),
            registers,
        })
    }

    /// Write every register of `context` back. Names are all resolved before anything is
    /// written, so a context with an unknown register leaves the session untouched.
    pub fn restore_context(
        &mut self,
        context: &RegisterContext,
    ) -> Result<(), ContextError<E::Error>> {
        if context.arch != self.arch() {
            return Err(ContextError::ArchMismatch {
                expected: self.arch(),
                found: context.arch,
            });
        }
        let writes = context
            .registers
            .iter()
            .map(|(name, value)| {
                self.register_by_name(name)
                    .map(|reg| (reg, *value))
                    .ok_or_else(|| ContextError::UnknownRegister(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!("restoring {} registers on {}", writes.len(), self.arch());
        for (reg, value) in writes {
            self.write_register(reg, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;

    #[test]
    fn save_then_restore() {
        let mut cpu = Cpu::new(ArchType::Arm64, MemoryEngine::new());
        cpu.set_stack_pointer(0x7000).unwrap();
        cpu.set_program_counter(0x40_0000).unwrap();
        let saved = cpu.save_context().unwrap();
        assert_eq!(saved.registers.len(), 33);
        assert_eq!(saved.get("sp"), Some(0x7000));

        cpu.set_stack_pointer(0).unwrap();
        cpu.set_program_counter(0).unwrap();
        cpu.restore_context(&saved).unwrap();
        assert_eq!(cpu.stack_pointer().unwrap(), 0x7000);
        assert_eq!(cpu.program_counter().unwrap(), 0x40_0000);
    }

    #[test]
    fn restore_rejects_other_arch() {
        let arm = Cpu::new(ArchType::Arm, MemoryEngine::new());
        let saved = arm.save_context().unwrap();
        let mut x86 = Cpu::new(ArchType::X86, MemoryEngine::new());
        assert!(matches!(
            x86.restore_context(&saved),
            Err(ContextError::ArchMismatch {
                expected: ArchType::X86,
                found: ArchType::Arm
            })
        ));
    }

    #[test]
    fn unknown_register_leaves_state_untouched() {
        let mut cpu = Cpu::new(ArchType::Mips, MemoryEngine::new());
        let context = RegisterContext {
            arch: ArchType::Mips,
            registers: vec![("SP".to_string(), 0x1000), ("HI".to_string(), 1)],
        };
        assert!(matches!(
            cpu.restore_context(&context),
            Err(ContextError::UnknownRegister(name)) if name == "HI"
        ));
        assert_eq!(cpu.stack_pointer().unwrap(), 0);
    }

    #[test]
    fn json_round_trip() {
        let mut cpu = Cpu::new(ArchType::X86, MemoryEngine::new());
        cpu.set_program_counter(0x0804_8000).unwrap();
        let json = cpu.save_context().unwrap().to_json().unwrap();
        assert!(json.starts_with(r#"{"arch":"x86","registers":[["EAX",0]"#));
        let restored = RegisterContext::from_json(&json).unwrap();
        assert_eq!(restored.get("EIP"), Some(0x0804_8000));
    }
}
