use std::sync::Once;

use jobfeed_core::{
    update, Effect, FeedError, FeedSettings, FeedState, FeedStatus, FetchPurpose, JobPosting,
    JobsPage, Msg, SIMULATED_LOAD_FAILURE, SIMULATED_PAGINATION_FAILURE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(feed_logging::initialize_for_tests);
}

fn page_of(ids: &[i64]) -> JobsPage {
    JobsPage::new(ids.iter().copied().map(JobPosting::new).collect())
}

fn ids(state: &FeedState) -> Vec<i64> {
    state.items().iter().map(|job| job.id.0).collect()
}

fn fetch(page: u32, purpose: FetchPurpose) -> Vec<Effect> {
    vec![Effect::FetchPage { page, purpose }]
}

/// Runs a full, successful load of `first` from a fresh state.
fn loaded(settings: FeedSettings, first: &[i64]) -> FeedState {
    let (state, _) = update(
        FeedState::new(settings),
        Msg::LoadRequested {
            refresh: false,
            reachable: true,
        },
    );
    let (state, _) = update(state, Msg::FirstPageFetched(page_of(first)));
    state
}

fn load_more(state: FeedState) -> (FeedState, Vec<Effect>) {
    update(state, Msg::LoadMoreRequested { reachable: true })
}

#[test]
fn new_state_starts_loading_on_page_one() {
    init_logging();
    let state = FeedState::default();

    assert_eq!(state.status(), FeedStatus::Loading);
    assert_eq!(state.page(), 1);
    assert!(state.items().is_empty());
    assert!(state.error().is_none());
    assert!(!state.is_offline());
}

#[test]
fn load_fetches_page_one_and_dedups() {
    init_logging();
    let (state, effects) = update(
        FeedState::default(),
        Msg::LoadRequested {
            refresh: false,
            reachable: true,
        },
    );
    assert_eq!(effects, fetch(1, FetchPurpose::Reload));
    assert_eq!(state.status(), FeedStatus::Loading);

    let (state, effects) = update(state, Msg::FirstPageFetched(page_of(&[4, 1, 4, 2])));

    assert!(effects.is_empty());
    assert_eq!(ids(&state), vec![4, 1, 2]);
    assert_eq!(state.page(), 1);
    assert_eq!(state.status(), FeedStatus::Idle);
    assert!(state.error().is_none());
    assert!(!state.is_offline());
}

#[test]
fn unreachable_load_fails_before_fetching() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1, 2]);

    let (state, effects) = update(
        state,
        Msg::LoadRequested {
            refresh: true,
            reachable: false,
        },
    );

    assert!(effects.is_empty());
    assert!(state.is_offline());
    assert_eq!(state.error(), Some(&FeedError::NetworkUnavailable));
    assert_eq!(state.status(), FeedStatus::Idle);
    assert_eq!(ids(&state), vec![1, 2]);
}

#[test]
fn refresh_replaces_items_and_resets_page() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1, 2]);
    let (state, _) = load_more(state);
    let (state, _) = update(
        state,
        Msg::NextPageFetched {
            page: 2,
            response: page_of(&[3, 4]),
        },
    );
    assert_eq!(state.page(), 2);

    let (state, effects) = update(
        state,
        Msg::LoadRequested {
            refresh: true,
            reachable: true,
        },
    );
    assert_eq!(state.status(), FeedStatus::Refreshing);
    assert_eq!(state.page(), 1);
    assert_eq!(effects, fetch(1, FetchPurpose::Reload));

    let (state, _) = update(state, Msg::FirstPageFetched(page_of(&[9, 9, 8])));
    assert_eq!(ids(&state), vec![9, 8]);
    assert_eq!(state.page(), 1);
    assert_eq!(state.status(), FeedStatus::Idle);
}

#[test]
fn failed_load_keeps_items_and_classifies_message() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1]);

    let (state, _) = update(
        state,
        Msg::LoadRequested {
            refresh: true,
            reachable: true,
        },
    );
    let (state, _) = update(
        state,
        Msg::LoadFailed {
            error: FeedError::classify("http status 500 Internal Server Error"),
        },
    );
    assert_eq!(
        state.error(),
        Some(&FeedError::FetchFailed(
            "http status 500 Internal Server Error".to_string()
        ))
    );
    assert!(!state.is_offline());
    assert_eq!(ids(&state), vec![1]);
    assert_eq!(state.status(), FeedStatus::Idle);

    let (state, _) = update(
        state,
        Msg::LoadRequested {
            refresh: false,
            reachable: true,
        },
    );
    assert!(state.error().is_none());
    let (state, _) = update(
        state,
        Msg::LoadFailed {
            error: FeedError::classify("network error: connection refused"),
        },
    );
    assert_eq!(state.error(), Some(&FeedError::NetworkUnavailable));
    assert!(state.is_offline());
    assert_eq!(
        state.view().error.as_deref(),
        Some("No internet connection. Please check your network settings and try again.")
    );
}

#[test]
fn load_more_dedups_against_accumulated_items() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1, 2]);

    let (state, effects) = load_more(state);
    assert_eq!(state.status(), FeedStatus::LoadingMore);
    assert_eq!(effects, fetch(2, FetchPurpose::NextPage));

    let (state, effects) = update(
        state,
        Msg::NextPageFetched {
            page: 2,
            response: page_of(&[2, 3]),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(ids(&state), vec![1, 2, 3]);
    assert_eq!(state.page(), 2);
    assert_eq!(state.status(), FeedStatus::Idle);
}

#[test]
fn empty_page_wraps_back_to_page_one() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1, 2]);
    let (state, _) = load_more(state);
    let (state, _) = update(
        state,
        Msg::NextPageFetched {
            page: 2,
            response: page_of(&[3]),
        },
    );
    let (state, effects) = load_more(state);
    assert_eq!(effects, fetch(3, FetchPurpose::NextPage));

    let (state, effects) = update(
        state,
        Msg::NextPageFetched {
            page: 3,
            response: page_of(&[]),
        },
    );
    assert_eq!(effects, fetch(1, FetchPurpose::WrapAround));
    assert_eq!(state.status(), FeedStatus::LoadingMore);
    assert_eq!(state.page(), 2);

    let (state, _) = update(state, Msg::WrapPageFetched(page_of(&[1, 2, 4])));
    assert_eq!(ids(&state), vec![1, 2, 3, 4]);
    assert_eq!(state.page(), 1);
    assert_eq!(state.status(), FeedStatus::Idle);

    let (_, effects) = load_more(state);
    assert_eq!(effects, fetch(2, FetchPurpose::NextPage));
}

#[test]
fn empty_page_ends_feed_when_wrapping_is_off() {
    init_logging();
    let settings = FeedSettings {
        wrap_at_end: false,
        ..FeedSettings::default()
    };
    let state = loaded(settings, &[1]);
    let (state, _) = load_more(state);
    let (state, effects) = update(
        state,
        Msg::NextPageFetched {
            page: 2,
            response: page_of(&[]),
        },
    );

    assert!(effects.is_empty());
    assert!(state.end_reached());
    assert_eq!(state.page(), 1);
    assert_eq!(state.status(), FeedStatus::Idle);

    let (state, effects) = load_more(state);
    assert!(effects.is_empty());
    assert_eq!(state.status(), FeedStatus::Idle);

    let (state, _) = update(
        state,
        Msg::LoadRequested {
            refresh: true,
            reachable: true,
        },
    );
    let (state, _) = update(state, Msg::FirstPageFetched(page_of(&[1])));
    assert!(!state.end_reached());
}

#[test]
fn load_more_is_noop_while_busy_or_offline() {
    init_logging();
    let initial = FeedState::default();
    let (state, effects) = load_more(initial.clone());
    assert!(effects.is_empty());
    assert_eq!(state, initial);

    let state = loaded(FeedSettings::default(), &[1]);
    let (in_flight, _) = load_more(state);
    let (again, effects) = load_more(in_flight.clone());
    assert!(effects.is_empty());
    assert_eq!(again, in_flight);

    let state = loaded(FeedSettings::default(), &[1]);
    let (offline, _) = update(state, Msg::ConnectivityChanged { connected: false });
    let (after, effects) = load_more(offline.clone());
    assert!(effects.is_empty());
    assert_eq!(after, offline);
}

#[test]
fn unreachable_load_more_only_marks_offline() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1, 2]);

    let (state, effects) = update(state, Msg::LoadMoreRequested { reachable: false });

    assert!(effects.is_empty());
    assert!(state.is_offline());
    assert!(state.error().is_none());
    assert_eq!(state.status(), FeedStatus::Idle);
    assert_eq!(ids(&state), vec![1, 2]);
}

#[test]
fn load_more_failure_is_silent() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1, 2]);
    let before = state.clone();

    let (state, _) = load_more(state);
    let (state, effects) = update(
        state,
        Msg::LoadMoreFailed {
            message: "http status 502".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn reconnect_clears_only_network_errors() {
    init_logging();
    let (state, _) = update(
        FeedState::default(),
        Msg::LoadRequested {
            refresh: false,
            reachable: false,
        },
    );
    assert!(state.error().is_some());

    let (state, effects) = update(state, Msg::ConnectivityChanged { connected: true });
    assert!(effects.is_empty());
    assert!(state.error().is_none());
    assert!(!state.is_offline());

    let (state, _) = update(
        state,
        Msg::LoadRequested {
            refresh: false,
            reachable: true,
        },
    );
    let (state, _) = update(
        state,
        Msg::LoadFailed {
            error: FeedError::classify("http status 404"),
        },
    );
    let (state, _) = update(state, Msg::ConnectivityChanged { connected: true });
    assert_eq!(
        state.error(),
        Some(&FeedError::FetchFailed("http status 404".to_string()))
    );
}

#[test]
fn forced_failure_fires_once_on_load() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1]);
    let (state, _) = update(state, Msg::ForceNextFailure);
    assert!(state.forced_failure_armed());

    let (state, effects) = update(
        state,
        Msg::LoadRequested {
            refresh: true,
            reachable: true,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::SimulatedFailure {
            message: SIMULATED_LOAD_FAILURE
        }]
    );
    assert!(!state.forced_failure_armed());
    assert_eq!(state.error(), Some(&FeedError::NetworkUnavailable));
    assert_eq!(ids(&state), vec![1]);

    let (state, _) = update(state, Msg::ConnectivityChanged { connected: true });
    let (_, effects) = update(
        state,
        Msg::LoadRequested {
            refresh: true,
            reachable: true,
        },
    );
    assert_eq!(effects, fetch(1, FetchPurpose::Reload));
}

#[test]
fn forced_failure_fires_once_on_load_more() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1]);
    let (state, _) = update(state, Msg::ForceNextFailure);

    let (state, effects) = load_more(state);
    assert_eq!(
        effects,
        vec![Effect::SimulatedFailure {
            message: SIMULATED_PAGINATION_FAILURE
        }]
    );
    assert_eq!(state.status(), FeedStatus::Idle);
    assert!(state.error().is_none());
    assert!(!state.forced_failure_armed());

    let (_, effects) = load_more(state);
    assert_eq!(effects, fetch(2, FetchPurpose::NextPage));
}

#[test]
fn refresh_during_load_more_keeps_refreshing_status() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1]);
    let (state, _) = load_more(state);
    let (state, _) = update(
        state,
        Msg::LoadRequested {
            refresh: true,
            reachable: true,
        },
    );
    assert_eq!(state.status(), FeedStatus::Refreshing);

    let (state, _) = update(
        state,
        Msg::NextPageFetched {
            page: 2,
            response: page_of(&[2]),
        },
    );
    assert_eq!(state.status(), FeedStatus::Refreshing);

    let (state, _) = update(state, Msg::FirstPageFetched(page_of(&[5])));
    assert_eq!(ids(&state), vec![5]);
    assert_eq!(state.status(), FeedStatus::Idle);
}

#[test]
fn view_reports_one_status_flag_at_a_time() {
    init_logging();
    let state = loaded(FeedSettings::default(), &[1]);
    let (state, _) = load_more(state);
    let view = state.view();

    assert!(view.loading_more);
    assert!(!view.loading);
    assert!(!view.refreshing);
    assert!(view.is_busy());
}
