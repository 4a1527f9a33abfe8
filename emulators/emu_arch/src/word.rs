/// Native machine word of an architecture. Stack slots, PC and SP values are one word wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordSize {
    Four,
    Eight,
}

impl WordSize {
    pub const fn bytes(self) -> usize {
        match self {
            WordSize::Four => 4,
            WordSize::Eight => 8,
        }
    }

    pub const fn bits(self) -> u32 {
        (self.bytes() * 8) as u32
    }

    pub const fn mask(self) -> u64 {
        match self {
            WordSize::Four => 0xFFFF_FFFF,
            WordSize::Eight => u64::MAX,
        }
    }

    /// Little-endian encoding, truncated to the word width.
    pub fn pack(self, value: u64) -> Vec<u8> {
        value.to_le_bytes()[..self.bytes()].to_vec()
    }

    /// Little-endian decoding. Missing high bytes read as zero, extra bytes are ignored.
    pub fn unpack(self, bytes: &[u8]) -> u64 {
        bytes
            .iter()
            .take(self.bytes())
            .enumerate()
            .fold(0u64, |acc, (idx, byte)| acc | (u64::from(*byte) << (idx * 8)))
    }

    pub fn truncate(self, value: u64) -> u64 {
        value & self.mask()
    }

    /// `address + offset`, wrapping modulo the word width.
    pub fn offset_address(self, address: u64, offset: i64) -> u64 {
        self.truncate(address.wrapping_add(offset as u64))
    }

    /// Slot below `address` (push direction).
    pub fn step_down(self, address: u64) -> u64 {
        self.truncate(address.wrapping_sub(self.bytes() as u64))
    }

    /// Slot above `address` (pop direction).
    pub fn step_up(self, address: u64) -> u64 {
        self.truncate(address.wrapping_add(self.bytes() as u64))
    }
}
