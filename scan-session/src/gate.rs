//! View gating on the session signal.
//!
//! Every screen branches three ways on the signal. `Unresolved` must never
//! be treated as `Absent`: doing so redirects signed-in users to the login
//! screen for a moment on every start.

use serde::Serialize;

use crate::identity::Identity;
use crate::signal::SessionSignal;

/// Navigation targets a gate may redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Home,
    Login,
    Dashboard,
}

impl Route {
    /// Path of the route.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }
}

/// What a screen should do for the current signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// Show a neutral loading state and take no navigation action
    Loading,
    /// Navigate elsewhere
    Redirect { to: Route },
    /// Render the screen, with the identity when there is one
    Render { identity: Option<Identity> },
}

/// Access policy of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewGate {
    /// Renders for everyone once resolved (landing page)
    Public,
    /// Requires a signed-in identity (dashboard, scan form)
    Protected,
    /// Sign-in screen: signed-in users are sent on to the dashboard
    Entry,
}

impl ViewGate {
    /// Decide what the screen does for `signal`.
    pub fn decide(&self, signal: &SessionSignal) -> GateDecision {
        match (self, signal) {
            (_, SessionSignal::Unresolved) => GateDecision::Loading,

            (ViewGate::Public, SessionSignal::Absent) => GateDecision::Render { identity: None },
            (ViewGate::Public, SessionSignal::Present(identity)) => GateDecision::Render {
                identity: Some(identity.clone()),
            },

            (ViewGate::Protected, SessionSignal::Absent) => GateDecision::Redirect { to: Route::Login },
            (ViewGate::Protected, SessionSignal::Present(identity)) => GateDecision::Render {
                identity: Some(identity.clone()),
            },

            (ViewGate::Entry, SessionSignal::Absent) => GateDecision::Render { identity: None },
            (ViewGate::Entry, SessionSignal::Present(_)) => GateDecision::Redirect {
                to: Route::Dashboard,
            },
        }
    }
}
