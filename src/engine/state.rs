use serde::{Deserialize, Serialize};

/// Stream driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverState {
    Running,
    ConsumerDead,
    Stopped,
}

impl DriverState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &DriverState) -> bool {
        use DriverState::*;

        matches!(
            (self, target),
            (Running, ConsumerDead) | (Running, Stopped) | (ConsumerDead, Stopped)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Running => "Running",
            Self::ConsumerDead => "ConsumerDead",
            Self::Stopped => "Stopped",
        }
    }
}

impl Default for DriverState {
    fn default() -> Self {
        Self::Running
    }
}

/// Why the tick loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// Liveness check saw the consumer gone
    ConsumerExited,
    /// A write hit a closed pipe
    BrokenPipe,
    /// Stop flag raised from outside the loop
    StopRequested,
    /// Configured frame limit reached
    FrameLimit,
}
