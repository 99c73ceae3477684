use core::fmt;

/// Points a player distributes across the three stats at mint time.
pub const STAT_BUDGET: u32 = 100;
pub const MAX_STAT: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StatAllocation {
    pub attack: u32,
    pub health: u32,
    pub defense: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocationError {
    StatOutOfRange { stat: &'static str, value: u32 },
    WrongTotal { total: u32 },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::StatOutOfRange { stat, value } => {
                write!(f, "{} must be between 0 and {}, got {}", stat, MAX_STAT, value)
            }
            AllocationError::WrongTotal { total } => write!(
                f,
                "allocate exactly {} points, got {}",
                STAT_BUDGET, total
            ),
        }
    }
}

impl std::error::Error for AllocationError {}

impl StatAllocation {
    pub const fn new(attack: u32, health: u32, defense: u32) -> Self {
        Self {
            attack,
            health,
            defense,
        }
    }

    /// Sum of the three stats, computed in u64 so oversized inputs cannot wrap.
    pub fn total(&self) -> u64 {
        self.attack as u64 + self.health as u64 + self.defense as u64
    }

    /// Points still to allocate. Negative when over budget.
    pub fn remaining(&self) -> i64 {
        STAT_BUDGET as i64 - self.total() as i64
    }

    /// Share of the budget used, clamped to [0, 100].
    pub fn allocation_percent(&self) -> u32 {
        self.total().min(STAT_BUDGET as u64) as u32 * 100 / STAT_BUDGET
    }

    pub fn validate(&self) -> Result<(), AllocationError> {
        for (stat, value) in self.named() {
            if value > MAX_STAT {
                return Err(AllocationError::StatOutOfRange { stat, value });
            }
        }
        let total = self.total();
        if total != STAT_BUDGET as u64 {
            return Err(AllocationError::WrongTotal {
                total: total.min(u32::MAX as u64) as u32,
            });
        }
        Ok(())
    }

    /// Values in submission order: attack, health, defense.
    pub fn values(&self) -> [u32; 3] {
        [self.attack, self.health, self.defense]
    }

    fn named(&self) -> [(&'static str, u32); 3] {
        [
            ("attack", self.attack),
            ("health", self.health),
            ("defense", self.defense),
        ]
    }
}

/// Floor a raw input into [0, MAX_STAT].
pub fn clamp_stat(value: i64) -> u32 {
    value.clamp(0, MAX_STAT as i64) as u32
}
