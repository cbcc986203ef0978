use crate::config::StabilizeConfig;
use crate::error::ScrapeError;
use crate::session::PageSession;

/// Phase of the stabilization loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Item count grew on the last probe
    Probing,
    /// Item count has been flat for at least one probe
    IdleCounting,
    /// Item count stayed flat for the configured number of probes
    Stable,
}

/// Bookkeeping for stabilization-by-idleness.
///
/// Termination is "no new items for N consecutive probes" rather than a
/// fixed scroll count: pages load at variable speed, so a fixed iteration
/// count would either waste time or cut off content.
#[derive(Debug, Clone)]
pub struct StabilizationState {
    last_observed_count: usize,
    idle_rounds: u32,
    max_idle_rounds: u32,
}

impl StabilizationState {
    pub fn new(initial_count: usize, max_idle_rounds: u32) -> Self {
        Self {
            last_observed_count: initial_count,
            idle_rounds: 0,
            max_idle_rounds,
        }
    }

    /// Record one probe's item count
    pub fn observe(&mut self, count: usize) {
        if count == self.last_observed_count {
            self.idle_rounds += 1;
        } else {
            self.last_observed_count = count;
            self.idle_rounds = 0;
        }
    }

    pub fn phase(&self) -> Phase {
        if self.idle_rounds >= self.max_idle_rounds {
            Phase::Stable
        } else if self.idle_rounds > 0 {
            Phase::IdleCounting
        } else {
            Phase::Probing
        }
    }

    pub fn last_observed_count(&self) -> usize {
        self.last_observed_count
    }

    pub fn idle_rounds(&self) -> u32 {
        self.idle_rounds
    }
}

/// A scrollable region that can be nudged and re-counted.
///
/// The live implementation drives a browser; tests drive the state machine
/// with a scripted count source instead of real scrolling.
pub trait ScrollProbe {
    /// Issue one large scroll delta
    async fn scroll(&mut self) -> Result<(), ScrapeError>;

    /// Count the items currently materialized
    async fn count(&mut self) -> Result<usize, ScrapeError>;
}

/// Live probe over the session's current document context.
///
/// The session must already be scoped to the region being stabilized
/// (e.g. inside the reviews frame).
pub struct LiveScrollProbe<'a> {
    pub session: &'a PageSession,
    pub item_selector: &'a str,
    pub scroll_step: i64,
}

impl ScrollProbe for LiveScrollProbe<'_> {
    async fn scroll(&mut self) -> Result<(), ScrapeError> {
        self.session.scroll_by(self.scroll_step).await
    }

    async fn count(&mut self) -> Result<usize, ScrapeError> {
        self.session.count_now(self.item_selector).await
    }
}

/// Drive a lazy list until its item count stops growing.
///
/// Each probe cycle issues two large scroll deltas, pauses for the settle
/// interval, then re-counts. Returns the final item count once the count
/// has been flat for `max_idle_rounds` consecutive probes.
pub async fn stabilize<P: ScrollProbe>(
    probe: &mut P,
    config: &StabilizeConfig,
) -> Result<usize, ScrapeError> {
    let initial = probe.count().await?;
    let mut state = StabilizationState::new(initial, config.max_idle_rounds);

    while state.phase() != Phase::Stable {
        probe.scroll().await?;
        probe.scroll().await?;
        tokio::time::sleep(config.settle()).await;

        let count = probe.count().await?;
        state.observe(count);
        ::log::trace!(
            "Stabilization probe: {} items, {} idle rounds",
            state.last_observed_count(),
            state.idle_rounds()
        );
    }

    ::log::info!(
        "Stopped scrolling after loading {} items",
        state.last_observed_count()
    );
    Ok(state.last_observed_count())
}

/// Wait for the full-reviews container to open, clicking the show-more
/// trigger until the container marker appears.
///
/// Fails with `ContainerNotOpenable` when the marker never shows up within
/// the open budget.
pub async fn open_container(
    session: &PageSession,
    trigger_selector: &str,
    marker_selector: &str,
    config: &StabilizeConfig,
) -> Result<(), ScrapeError> {
    let deadline = tokio::time::Instant::now() + config.open_budget();

    loop {
        if session.is_present_now(marker_selector).await? {
            return Ok(());
        }

        if session.click_if_present(trigger_selector).await? {
            ::log::trace!("Clicked container trigger '{}'", trigger_selector);
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(ScrapeError::ContainerNotOpenable(config.open_budget()));
        }
        tokio::time::sleep(config.open_poll()).await;
    }
}
