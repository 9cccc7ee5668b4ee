use std::time::{Duration, Instant};

use crate::runner::ds::error::JErrorType;

/// How many ticks pass between clock reads.
const CLOCK_CHECK_INTERVAL: u32 = 256;

/// Cooperative wall-clock budget for one unit of script execution.
///
/// The interpreter calls [`ExecutionBudget::tick`] on every loop iteration
/// and function call. Once the deadline passes every further tick fails,
/// so the interruption cannot be swallowed by script code.
pub struct ExecutionBudget {
    deadline: Option<Instant>,
    limit: Duration,
    ticks: u32,
    exhausted: bool,
}

impl ExecutionBudget {
    pub fn unlimited() -> Self {
        ExecutionBudget {
            deadline: None,
            limit: Duration::ZERO,
            ticks: 0,
            exhausted: false,
        }
    }

    /// Starts a new budget of `limit` from now; `None` removes the limit.
    pub fn reset(&mut self, limit: Option<Duration>) {
        self.deadline = limit.map(|l| Instant::now() + l);
        self.limit = limit.unwrap_or(Duration::ZERO);
        self.ticks = 0;
        self.exhausted = false;
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn tick(&mut self) -> Result<(), JErrorType> {
        if self.exhausted {
            return Err(self.interruption());
        }
        let deadline = match self.deadline {
            Some(d) => d,
            None => return Ok(()),
        };
        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
            self.exhausted = true;
            return Err(self.interruption());
        }
        Ok(())
    }

    fn interruption(&self) -> JErrorType {
        JErrorType::Interrupted(format!(
            "script execution exceeded {} ms",
            self.limit.as_millis()
        ))
    }
}

impl Default for ExecutionBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}
