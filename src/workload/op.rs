use rand::Rng;

use crate::error::{Error, Result};

/// A raw workload request in `1..=100`, classified by an [`OpMix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpCode(u8);

impl OpCode {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for OpCode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&code) {
            Ok(Self(code))
        } else {
            Err(Error::InvalidOpCode(code))
        }
    }
}

/// What a worker does with one op code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Read `size()` then record a counter-only operation.
    Read,
    Pop,
    /// Push the next node from the worker's pool.
    Push,
}

/// Thresholds splitting `1..=100` into reads, pops and pushes.
///
/// Codes up to `read_max` read, codes up to `pop_max` pop, the rest push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpMix {
    pub read_max: u8,
    pub pop_max: u8,
}

impl OpMix {
    pub fn new(read_max: u8, pop_max: u8) -> Result<Self> {
        let mix = Self { read_max, pop_max };
        mix.validate()?;
        Ok(mix)
    }

    pub fn validate(&self) -> Result<()> {
        if self.read_max > self.pop_max {
            return Err(Error::InvalidConfig(format!(
                "read threshold {} exceeds pop threshold {}",
                self.read_max, self.pop_max
            )));
        }
        if self.pop_max > OpCode::MAX {
            return Err(Error::InvalidConfig(format!(
                "pop threshold {} exceeds {}",
                self.pop_max,
                OpCode::MAX
            )));
        }
        Ok(())
    }

    pub fn classify(&self, code: OpCode) -> Operation {
        match code.get() {
            c if c <= self.read_max => Operation::Read,
            c if c <= self.pop_max => Operation::Pop,
            _ => Operation::Push,
        }
    }
}

impl Default for OpMix {
    /// Half reads, a quarter pops, a quarter pushes.
    fn default() -> Self {
        Self {
            read_max: 50,
            pop_max: 75,
        }
    }
}
