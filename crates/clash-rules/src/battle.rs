/// Health points per point of attack bonus.
pub const HEALTH_BONUS_DIVISOR: u32 = 10;
pub const MONSTER_POWER_WEAK: u32 = 5;
pub const MONSTER_POWER_STRONG: u32 = 15;

/// Bonus added on every attack: floor(health / 10).
pub fn health_bonus(health: u32) -> u32 {
    health / HEALTH_BONUS_DIVISOR
}

/// Monster contribution, chosen by an encrypted coin flip.
pub fn monster_power(strong: bool) -> u32 {
    if strong {
        MONSTER_POWER_STRONG
    } else {
        MONSTER_POWER_WEAK
    }
}

/// Score gained by one attack.
pub fn attack_reward(health: u32, strong: bool) -> u32 {
    health_bonus(health) + monster_power(strong)
}

/// Add a reward to a score. Saturates so the score never goes down.
pub fn apply_reward(score: u32, reward: u32) -> u32 {
    score.saturating_add(reward)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_bonus_floors() {
        assert_eq!(health_bonus(0), 0);
        assert_eq!(health_bonus(9), 0);
        assert_eq!(health_bonus(30), 3);
        assert_eq!(health_bonus(35), 3);
        assert_eq!(health_bonus(100), 10);
    }

    #[test]
    fn reward_for_health_30_is_8_or_18() {
        assert_eq!(attack_reward(30, false), 8);
        assert_eq!(attack_reward(30, true), 18);
    }

    #[test]
    fn reward_stays_in_bonus_range() {
        for health in 0..=100 {
            let bonus = health_bonus(health);
            for strong in [false, true] {
                let reward = attack_reward(health, strong);
                assert!(reward >= bonus + MONSTER_POWER_WEAK);
                assert!(reward <= bonus + MONSTER_POWER_STRONG);
            }
        }
    }

    #[test]
    fn apply_reward_saturates() {
        assert_eq!(apply_reward(10, 8), 18);
        assert_eq!(apply_reward(u32::MAX - 3, 18), u32::MAX);
    }
}
