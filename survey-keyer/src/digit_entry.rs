//! Two-digit option entry without a confirm key.

use std::time::{Duration, Instant};

/// How long a leading digit waits for a second one.
pub const DEFAULT_DIGIT_TIMEOUT: Duration = Duration::from_millis(500);

/// Result of a digit press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitOutcome {
    /// Select this value now.
    Commit(u32),

    /// The digit may start a two-digit value; wait for the deadline.
    Buffered(u8),
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    digit: u8,
    deadline: Instant,
}

/// Buffer for a pending leading digit.
///
/// Holds at most one digit and one deadline. Every press, flush or cancel
/// disarms the previous deadline.
#[derive(Debug, Clone)]
pub struct DigitBuffer {
    pending: Option<Pending>,
    timeout: Duration,
}

impl Default for DigitBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_DIGIT_TIMEOUT)
    }
}

impl DigitBuffer {
    /// Create a buffer with the given second-digit window.
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: None,
            timeout,
        }
    }

    /// The second-digit window.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Feed a digit for a question whose highest value is `max_value`.
    pub fn press(&mut self, digit: u8, max_value: u32, now: Instant) -> DigitOutcome {
        let digit = digit % 10;
        if let Some(pending) = self.pending.take() {
            return DigitOutcome::Commit(u32::from(pending.digit) * 10 + u32::from(digit));
        }
        let max_first_digit = max_value / 10;
        if digit >= 1 && u32::from(digit) <= max_first_digit {
            self.pending = Some(Pending {
                digit,
                deadline: now + self.timeout,
            });
            DigitOutcome::Buffered(digit)
        } else {
            DigitOutcome::Commit(u32::from(digit))
        }
    }

    /// Commit the buffered digit if its deadline has passed.
    pub fn expire(&mut self, now: Instant) -> Option<u32> {
        match self.pending {
            Some(pending) if pending.deadline <= now => self.flush(),
            _ => None,
        }
    }

    /// Commit the buffered digit regardless of its deadline.
    pub fn flush(&mut self) -> Option<u32> {
        self.pending.take().map(|p| u32::from(p.digit))
    }

    /// Drop the buffered digit without committing.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// The buffered digit, if any.
    pub fn pending(&self) -> Option<u8> {
        self.pending.map(|p| p.digit)
    }

    /// When the buffered digit auto-commits.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_digits_within_window() {
        let start = Instant::now();
        let mut buffer = DigitBuffer::default();
        assert_eq!(buffer.press(1, 14, start), DigitOutcome::Buffered(1));
        assert_eq!(
            buffer.press(2, 14, start + Duration::from_millis(200)),
            DigitOutcome::Commit(12)
        );
        assert_eq!(buffer.pending(), None);
    }

    #[test]
    fn expiry_commits_single_digit() {
        let start = Instant::now();
        let mut buffer = DigitBuffer::default();
        buffer.press(1, 14, start);
        assert_eq!(buffer.expire(start + Duration::from_millis(499)), None);
        assert_eq!(buffer.expire(start + Duration::from_millis(500)), Some(1));
        assert_eq!(buffer.deadline(), None);
    }

    #[test]
    fn unambiguous_digits_commit_immediately() {
        let now = Instant::now();
        let mut buffer = DigitBuffer::default();
        assert_eq!(buffer.press(0, 14, now), DigitOutcome::Commit(0));
        assert_eq!(buffer.press(2, 14, now), DigitOutcome::Commit(2));
        assert_eq!(buffer.press(1, 9, now), DigitOutcome::Commit(1));
    }

    #[test]
    fn flush_and_cancel() {
        let now = Instant::now();
        let mut buffer = DigitBuffer::new(Duration::from_secs(1));
        buffer.press(2, 25, now);
        assert_eq!(buffer.flush(), Some(2));
        assert_eq!(buffer.flush(), None);

        buffer.press(1, 25, now);
        buffer.cancel();
        assert_eq!(buffer.expire(now + Duration::from_secs(5)), None);
    }

    #[test]
    fn rearming_replaces_deadline() {
        let start = Instant::now();
        let mut buffer = DigitBuffer::default();
        buffer.press(1, 14, start);
        buffer.flush();
        let later = start + Duration::from_millis(300);
        buffer.press(1, 14, later);
        assert_eq!(buffer.deadline(), Some(later + DEFAULT_DIGIT_TIMEOUT));
    }
}
