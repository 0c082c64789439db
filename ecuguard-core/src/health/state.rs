//! Health monitor run state

/// Monitor lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MonitorState {
    #[default]
    Stopped,
    /// Periodic checks run on `tick`
    Running,
}

/// Lifecycle requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MonitorEvent {
    Start,
    Stop,
}

impl MonitorState {
    /// Process an event and return the new state
    ///
    /// Returns `None` for a transition the monitor rejects.
    pub fn transition(self, event: MonitorEvent) -> Option<Self> {
        use MonitorEvent::*;
        use MonitorState::*;

        match (self, event) {
            (Stopped, Start) => Some(Running),
            (Running, Start) => None,
            (_, Stop) => Some(Stopped),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, MonitorState::Running)
    }
}
