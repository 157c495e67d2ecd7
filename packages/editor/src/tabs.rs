//! # Tab Multiplexer
//!
//! Exclusive-disclosure controller over the fixed tray tabs.
//!
//! Invariants:
//! - at most one tab is active at any observable point
//! - at most one content panel is open at any observable point
//! - a loading tab ignores activation entirely (this is the guard that
//!   prevents a second save/cancel request while one is in flight)
//!
//! Switching from one open panel to another replaces content in place,
//! with no intermediate closed state. The multiplexer persists for the
//! whole editing session; there is no teardown.

use crate::context::AppContext;
use mosaic_model::{ModelEvent, TabEvent, TabId};
use serde::Serialize;

/// Disclosure state of the tray as a whole.
///
/// `Opening` and `Closing` are passed through synchronously during an
/// activation; transition hooks observe them, the context only ever
/// rests at `Closed` or `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrayState {
    Closed,
    Opening,
    Open,
    Closing,
}

/// What an activation click did.
#[derive(Debug, Clone, PartialEq)]
pub enum TrayTransition {
    /// A content panel opened from the closed state.
    Opened(TabId),
    /// The open panel's own tab was clicked again.
    Closed(TabId),
    /// A different panel replaced the open one, no intermediate close.
    Replaced { from: TabId, to: TabId },
    /// An action tab (no panel) toggled its active flag.
    Action { id: TabId, activated: bool },
    /// The click was ignored (loading guard or unknown tab).
    Ignored,
}

type TransitionHook = Box<dyn FnMut(TrayState) + Send>;

/// Exclusive controller over the tray tabs.
pub struct TabMultiplexer {
    hooks: Vec<TransitionHook>,
}

impl TabMultiplexer {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Observe `Opening`/`Closing` transitions (animation hooks).
    pub fn on_transition(&mut self, hook: impl FnMut(TrayState) + Send + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Handle a click on a tab's activator.
    pub fn activate(&mut self, ctx: &mut AppContext, id: TabId) -> TrayTransition {
        let Some(tab) = ctx.tab(id) else {
            tracing::warn!(tab = %id, "activation of unknown tab");
            return TrayTransition::Ignored;
        };
        if tab.loading {
            tracing::debug!(tab = %id, "activation ignored while loading");
            return TrayTransition::Ignored;
        }
        let was_active = tab.active;
        let previously_open = self.open_panel(ctx);

        // Exclusivity: deactivate everything else first.
        let others: Vec<TabId> = ctx
            .tabs
            .iter()
            .filter(|t| t.id != id && t.active)
            .map(|t| t.id)
            .collect();
        for other in others {
            ctx.set_tab_active(other, false);
        }

        if was_active {
            // Second click on the active tab closes/toggles it off.
            ctx.set_tab_active(id, false);
            if id.has_panel() {
                self.transition(TrayState::Closing);
                ctx.tray = TrayState::Closed;
                ctx.bus.emit(ModelEvent::Tab(TabEvent::TrayClosed));
                return TrayTransition::Closed(id);
            }
            return TrayTransition::Action {
                id,
                activated: false,
            };
        }

        ctx.set_tab_active(id, true);

        if id.has_panel() {
            match previously_open {
                Some(from) => {
                    // Re-render in place; the tray never passes Closed.
                    ctx.tray = TrayState::Open;
                    ctx.bus.emit(ModelEvent::Tab(TabEvent::TrayOpened { id }));
                    TrayTransition::Replaced { from, to: id }
                }
                None => {
                    self.transition(TrayState::Opening);
                    ctx.tray = TrayState::Open;
                    ctx.bus.emit(ModelEvent::Tab(TabEvent::TrayOpened { id }));
                    TrayTransition::Opened(id)
                }
            }
        } else {
            // Action tabs close any open panel without animation.
            if previously_open.is_some() {
                ctx.tray = TrayState::Closed;
                ctx.bus.emit(ModelEvent::Tab(TabEvent::TrayClosed));
            }
            TrayTransition::Action {
                id,
                activated: true,
            }
        }
    }

    /// The panel-bearing tab currently disclosed, if any.
    fn open_panel(&self, ctx: &AppContext) -> Option<TabId> {
        if ctx.tray != TrayState::Open {
            return None;
        }
        ctx.tabs
            .iter()
            .find(|t| t.active && t.id.has_panel())
            .map(|t| t.id)
    }

    fn transition(&mut self, state: TrayState) {
        for hook in self.hooks.iter_mut() {
            hook(state);
        }
    }
}

impl Default for TabMultiplexer {
    fn default() -> Self {
        Self::new()
    }
}
