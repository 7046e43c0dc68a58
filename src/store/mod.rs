//! Client-side state for the endpoint host views.
//!
//! Every change goes through [`Store::dispatch`]: the action is reduced into
//! the state first, then [`HostMiddleware`] looks at the result and issues
//! whatever fetches it implies, feeding their outcomes back through the same
//! reducer.

pub mod action;
pub mod middleware;
pub mod reducer;
pub mod selectors;
pub mod state;

use std::mem;

use log::{debug, info};

pub use action::HostAction;
pub use middleware::HostMiddleware;
pub use reducer::{host_reducer, RouteTransition};
pub use selectors::{Location, UiQueryParams};
pub use state::{HostDetailsState, HostListState, HostState};

use crate::client::EndpointApi;

pub struct Store<A> {
    state: HostState,
    middleware: HostMiddleware<A>,
}

impl<A: EndpointApi> Store<A> {
    pub fn new(api: A) -> Self {
        Self {
            state: HostState::default(),
            middleware: HostMiddleware::new(api),
        }
    }

    pub fn with_metadata_index_pattern(api: A, pattern: &str) -> Self {
        Self {
            state: HostState::default(),
            middleware: HostMiddleware::with_index_pattern(api, pattern),
        }
    }

    pub fn state(&self) -> &HostState {
        &self.state
    }

    /// Reduce `action`, then let the middleware act on the new state. Returns
    /// once every follow-up action has been reduced.
    pub async fn dispatch(&mut self, action: HostAction) {
        debug!("Dispatching {}", action.type_name());
        self.state = host_reducer(mem::take(&mut self.state), &action);

        let snapshot = self.state.clone();
        let Store { state, middleware } = self;
        middleware
            .handle(&action, &snapshot, &mut |follow_up: HostAction| {
                info!("Middleware dispatched {}", follow_up.type_name());
                *state = host_reducer(mem::take(state), &follow_up);
            })
            .await;
    }
}
