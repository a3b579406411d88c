//! Shared mutable context threaded through every link-state handler.
//!
//! `LinkContext` is the blackboard the handlers read from and write to:
//! the pending radio event, the observed advertising status, retry
//! bookkeeping, and the one-shot advertising request the lifecycle manager
//! applies after each step.

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Link-level events fed to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Connect,
    Disconnect,
}

// ---------------------------------------------------------------------------
// Outputs (written by handlers; consumed by the lifecycle manager)
// ---------------------------------------------------------------------------

/// What the handlers want the radio to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertiseRequest {
    Start,
    Stop,
}

/// Radio commands produced by the last FSM step.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadioCommands {
    pub advertise: Option<AdvertiseRequest>,
}

// ---------------------------------------------------------------------------
// LinkContext
// ---------------------------------------------------------------------------

pub struct LinkContext {
    // -- Timing --
    /// Steps elapsed since the current state was entered.
    pub ticks_in_state: u64,

    // -- Input --
    /// Event being delivered this step.  Cleared by the engine.
    pub pending: Option<LinkEvent>,

    // -- Radio status (written by the lifecycle manager) --
    /// Whether the radio last accepted an advertising start.
    pub advertising: bool,
    /// Polls since the last advertising start attempt.
    pub polls_since_attempt: u32,
    /// Polls between advertising retries while disconnected.
    pub retry_every: u32,

    // -- Output --
    pub commands: RadioCommands,

    // -- Statistics --
    /// Connections accepted since boot.
    pub sessions: u32,
}

impl LinkContext {
    pub fn new(retry_every: u32) -> Self {
        Self {
            ticks_in_state: 0,
            pending: None,
            advertising: false,
            polls_since_attempt: 0,
            retry_every: retry_every.max(1),
            commands: RadioCommands::default(),
            sessions: 0,
        }
    }

    /// Request an advertising change.  A later request in the same step
    /// overrides an earlier one.
    pub fn request(&mut self, req: AdvertiseRequest) {
        self.commands.advertise = Some(req);
    }

    /// Take the pending advertising request, leaving none.
    pub fn take_request(&mut self) -> Option<AdvertiseRequest> {
        self.commands.advertise.take()
    }

    /// Returns `true` when a failed advertising start is due for another try.
    pub fn retry_due(&self) -> bool {
        !self.advertising && self.polls_since_attempt >= self.retry_every
    }
}
