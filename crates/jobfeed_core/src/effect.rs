#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FetchPage { page: u32, purpose: FetchPurpose },
    /// An armed test failure was consumed instead of fetching.
    SimulatedFailure { message: &'static str },
}

/// Why a page is being fetched; decides which message its result becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    /// Full load or pull-to-refresh of page 1.
    Reload,
    /// Next page during infinite scroll.
    NextPage,
    /// Page 1 again after the feed ran dry.
    WrapAround,
}
