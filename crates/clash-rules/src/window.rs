use core::fmt;

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
pub const MAX_DECRYPT_DURATION_DAYS: u32 = 365;

/// Validity window of a user-decryption authorization.
/// Valid for `start_time <= now < start_time + duration_days * 1 day`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecryptWindow {
    pub start_time: i64,
    pub duration_days: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowError {
    InvalidDuration { days: u32 },
    NotStarted { starts_at: i64 },
    Expired { expired_at: i64 },
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowError::InvalidDuration { days } => write!(
                f,
                "decrypt duration must be 1..={} days, got {}",
                MAX_DECRYPT_DURATION_DAYS, days
            ),
            WindowError::NotStarted { starts_at } => {
                write!(f, "decrypt authorization starts at {}", starts_at)
            }
            WindowError::Expired { expired_at } => {
                write!(f, "decrypt authorization expired at {}", expired_at)
            }
        }
    }
}

impl std::error::Error for WindowError {}

impl DecryptWindow {
    pub const fn new(start_time: i64, duration_days: u32) -> Self {
        Self {
            start_time,
            duration_days,
        }
    }

    pub fn expires_at(&self) -> i64 {
        self.start_time
            .saturating_add(self.duration_days as i64 * SECONDS_PER_DAY)
    }

    pub fn check(&self, now: i64) -> Result<(), WindowError> {
        if self.duration_days == 0 || self.duration_days > MAX_DECRYPT_DURATION_DAYS {
            return Err(WindowError::InvalidDuration {
                days: self.duration_days,
            });
        }
        if now < self.start_time {
            return Err(WindowError::NotStarted {
                starts_at: self.start_time,
            });
        }
        let expires_at = self.expires_at();
        if now >= expires_at {
            return Err(WindowError::Expired { expired_at: expires_at });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: i64 = 1_700_000_000;

    #[test]
    fn seven_day_window() {
        let window = DecryptWindow::new(START, 7);
        assert_eq!(window.expires_at(), START + 7 * SECONDS_PER_DAY);
        assert!(window.check(START).is_ok());
        assert!(window.check(START + 7 * SECONDS_PER_DAY - 1).is_ok());
        assert_eq!(
            window.check(START + 7 * SECONDS_PER_DAY),
            Err(WindowError::Expired {
                expired_at: START + 7 * SECONDS_PER_DAY
            })
        );
    }

    #[test]
    fn rejects_future_start() {
        let window = DecryptWindow::new(START, 1);
        assert_eq!(
            window.check(START - 1),
            Err(WindowError::NotStarted { starts_at: START })
        );
    }

    #[test]
    fn rejects_bad_durations() {
        assert_eq!(
            DecryptWindow::new(START, 0).check(START),
            Err(WindowError::InvalidDuration { days: 0 })
        );
        assert_eq!(
            DecryptWindow::new(START, MAX_DECRYPT_DURATION_DAYS + 1).check(START),
            Err(WindowError::InvalidDuration { days: 366 })
        );
        assert!(DecryptWindow::new(START, MAX_DECRYPT_DURATION_DAYS)
            .check(START)
            .is_ok());
    }
}
