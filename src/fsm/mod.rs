//! Function-pointer finite state machine engine for the radio link.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  StateTable                                                 │
//! │  ┌──────────────┬───────────┬──────────┬───────────────────┐│
//! │  │ LinkState    │ on_enter  │ on_exit  │ on_update         ││
//! │  ├──────────────┼───────────┼──────────┼───────────────────┤│
//! │  │ Disconnected │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> ││
//! │  │ Connected    │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> ││
//! │  └──────────────┴───────────┴──────────┴───────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step the engine calls `on_update` for the **current** state.  The
//! handler sees the pending [`LinkEvent`](context::LinkEvent) (if any) in the
//! context.  If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the current
//! pointer.  Handlers never touch the radio: they write requests into
//! [`LinkContext::commands`](context::LinkContext) and the lifecycle manager
//! applies them afterwards.

pub mod context;
pub mod states;

use context::{LinkContext, LinkEvent};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Link states.  Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LinkState {
    Disconnected = 0,
    Connected = 1,
}

impl LinkState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert an index back to `LinkState`.  Asserts in debug builds;
    /// returns `Disconnected` (the recovery state) in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Disconnected,
            1 => Self::Connected,
            _ => {
                debug_assert!(false, "invalid link state index: {idx}");
                Self::Disconnected
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut LinkContext);

/// Signature for the per-step update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut LinkContext) -> Option<LinkState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single link state.
pub struct StateDescriptor {
    pub id: LinkState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The link state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `LinkState as usize`.
    table: [StateDescriptor; LinkState::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonic step counter.
    tick_count: u64,
    /// Step at which the current state was entered.
    state_entry_tick: u64,
    /// Number of transitions executed since construction.
    transitions: u32,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; LinkState::COUNT], initial: LinkState) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut LinkContext) {
        info!("Link FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one step, consuming `ctx.pending`.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    /// 3. Clear the pending event.
    pub fn tick(&mut self, ctx: &mut LinkContext) {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;

        let next = (self.table[self.current].on_update)(ctx);
        ctx.pending = None;

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Deliver `event` and step once.
    pub fn handle(&mut self, event: LinkEvent, ctx: &mut LinkContext) {
        ctx.pending = Some(event);
        self.tick(ctx);
    }

    pub fn current_state(&self) -> LinkState {
        LinkState::from_index(self.current)
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: LinkState, ctx: &mut LinkContext) {
        let next_idx = next_id as usize;
        if next_idx == self.current {
            return;
        }

        info!(
            "Link FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        self.transitions = self.transitions.wrapping_add(1);
        ctx.ticks_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
