//! Concrete link-state handlers and table builder.
//!
//! ```text
//!  DISCONNECTED ──[connect]──▶ CONNECTED
//!    ▲   │                         │
//!    │   └─[retry due]─▶ re-advertise
//!    └────────[disconnect]─────────┘
//! ```
//!
//! DISCONNECTED is both the initial state and the recovery target; there is
//! no terminal state.

use super::context::{AdvertiseRequest, LinkContext, LinkEvent};
use super::{LinkState, StateDescriptor};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; LinkState::COUNT] {
    [
        // Index 0: Disconnected
        StateDescriptor {
            id: LinkState::Disconnected,
            name: "Disconnected",
            on_enter: Some(disconnected_enter),
            on_exit: None,
            on_update: disconnected_update,
        },
        // Index 1: Connected
        StateDescriptor {
            id: LinkState::Connected,
            name: "Connected",
            on_enter: Some(connected_enter),
            on_exit: Some(connected_exit),
            on_update: connected_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISCONNECTED: advertising, waiting for a controller
// ═══════════════════════════════════════════════════════════════════════════

fn disconnected_enter(ctx: &mut LinkContext) {
    ctx.request(AdvertiseRequest::Start);
    info!("DISCONNECTED: advertising for a controller");
}

fn disconnected_update(ctx: &mut LinkContext) -> Option<LinkState> {
    match ctx.pending {
        Some(LinkEvent::Connect) => Some(LinkState::Connected),
        Some(LinkEvent::Disconnect) => {
            warn!("DISCONNECTED: ignoring disconnect with no active link");
            None
        }
        None => {
            if ctx.retry_due() {
                info!(
                    "DISCONNECTED: retrying advertising after {} polls",
                    ctx.polls_since_attempt
                );
                ctx.request(AdvertiseRequest::Start);
            }
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECTED: one controller attached
// ═══════════════════════════════════════════════════════════════════════════

fn connected_enter(ctx: &mut LinkContext) {
    ctx.sessions = ctx.sessions.wrapping_add(1);
    ctx.request(AdvertiseRequest::Stop);
    info!("CONNECTED: controller attached (session {})", ctx.sessions);
}

fn connected_exit(ctx: &mut LinkContext) {
    info!(
        "CONNECTED: session {} ended after {} steps",
        ctx.sessions, ctx.ticks_in_state
    );
}

fn connected_update(ctx: &mut LinkContext) -> Option<LinkState> {
    match ctx.pending {
        Some(LinkEvent::Disconnect) => Some(LinkState::Disconnected),
        Some(LinkEvent::Connect) => {
            warn!("CONNECTED: ignoring second connect, one controller at a time");
            None
        }
        None => None,
    }
}
