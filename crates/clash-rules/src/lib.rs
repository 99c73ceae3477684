pub mod battle;
pub mod stats;
pub mod window;

pub use battle::{apply_reward, attack_reward, health_bonus, monster_power};
pub use stats::{clamp_stat, AllocationError, StatAllocation, MAX_STAT, STAT_BUDGET};
pub use window::{DecryptWindow, WindowError, MAX_DECRYPT_DURATION_DAYS, SECONDS_PER_DAY};
