use crate::{Effect, FeedError, FeedState, FetchPurpose, Msg};

pub const SIMULATED_LOAD_FAILURE: &str = "Simulated network error. This is just a test!";
pub const SIMULATED_PAGINATION_FAILURE: &str = "Simulated pagination error. This is just a test!";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: FeedState, msg: Msg) -> (FeedState, Vec<Effect>) {
    let effects = match msg {
        Msg::LoadRequested { refresh, reachable } => {
            if !reachable {
                state.fail_load(FeedError::NetworkUnavailable);
                return (state, Vec::new());
            }
            state.begin_load(refresh);
            if state.take_forced_failure() {
                state.fail_load(FeedError::classify(SIMULATED_LOAD_FAILURE));
                return (
                    state,
                    vec![Effect::SimulatedFailure {
                        message: SIMULATED_LOAD_FAILURE,
                    }],
                );
            }
            vec![Effect::FetchPage {
                page: 1,
                purpose: FetchPurpose::Reload,
            }]
        }
        Msg::FirstPageFetched(response) => {
            state.replace_items(response.results);
            Vec::new()
        }
        Msg::LoadFailed { error } => {
            state.fail_load(error);
            Vec::new()
        }
        Msg::LoadMoreRequested { reachable } => {
            // Conditions may have changed while reachability was being checked.
            if state.load_more_blocked() {
                return (state, Vec::new());
            }
            if !reachable {
                state.set_offline(true);
                return (state, Vec::new());
            }
            state.begin_load_more();
            if state.take_forced_failure() {
                state.fail_load_more();
                return (
                    state,
                    vec![Effect::SimulatedFailure {
                        message: SIMULATED_PAGINATION_FAILURE,
                    }],
                );
            }
            vec![Effect::FetchPage {
                page: state.page() + 1,
                purpose: FetchPurpose::NextPage,
            }]
        }
        Msg::NextPageFetched { page, response } => {
            if !response.results.is_empty() {
                state.append_page(page, response.results);
                Vec::new()
            } else if state.settings().wrap_at_end {
                vec![Effect::FetchPage {
                    page: 1,
                    purpose: FetchPurpose::WrapAround,
                }]
            } else {
                state.mark_end_reached();
                Vec::new()
            }
        }
        Msg::WrapPageFetched(response) => {
            state.append_page(1, response.results);
            Vec::new()
        }
        Msg::LoadMoreFailed { .. } => {
            state.fail_load_more();
            Vec::new()
        }
        Msg::ConnectivityChanged { connected } => {
            state.connectivity_changed(connected);
            Vec::new()
        }
        Msg::ForceNextFailure => {
            state.arm_forced_failure();
            Vec::new()
        }
    };

    (state, effects)
}
