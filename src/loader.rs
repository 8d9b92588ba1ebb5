//! The incremental result loader: poll loop, scroll trigger, and the
//! concurrency guards that keep them from corrupting the pagination cursor.
//!
//! One [`SearchLoader`] drives one session. The poll loop repeatedly fetches
//! the next slice of results until the server signals completion, filling
//! pre-allocated skeleton slots as batches arrive. The scroll trigger grows
//! the pool and restarts the loop when the viewport nears document bottom.
//!
//! Mutual exclusion is explicit: the `polling` state makes `start` a no-op
//! while a fetch chain is in flight, and the `batch_loading` guard collapses
//! rapid scroll triggers into one allocation. Waiters observe cycle
//! completion through a watch channel rather than guessing with timers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::models::Query;
use crate::pool::SkeletonPool;
use crate::render::Renderer;
use crate::session::{PollState, Session};
use crate::source::ResultSource;

/// Scroll position snapshot supplied by the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ViewportMetrics {
    /// True when the viewport bottom is within `threshold_px` of the
    /// document bottom.
    pub fn near_bottom(&self, threshold_px: f64) -> bool {
        self.scroll_top + self.viewport_height >= self.document_height - threshold_px
    }
}

/// Broadcast on every settled poll cycle and on state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSignal {
    pub state: PollState,
    /// Count of settled fetches (success or failure) this session.
    pub cycles: u64,
}

/// Read-only view of loader progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderSnapshot {
    pub cursor: usize,
    pub state: PollState,
    pub batch_loading: bool,
    pub allocated: usize,
    pub filled: usize,
}

/// Everything mutable for one session, behind a single lock. All state
/// updates are synchronous within a lock scope; suspension happens only at
/// fetch and timer boundaries.
struct LoaderState<R: Renderer> {
    session: Session,
    pool: SkeletonPool<R::Handle>,
    renderer: R,
}

/// Controller for one incremental-load session.
pub struct SearchLoader<S, R: Renderer> {
    source: Arc<S>,
    settings: Settings,
    state: Arc<Mutex<LoaderState<R>>>,
    signal: Arc<watch::Sender<LoopSignal>>,
}

impl<S, R: Renderer> Clone for SearchLoader<S, R> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            settings: self.settings.clone(),
            state: self.state.clone(),
            signal: self.signal.clone(),
        }
    }
}

impl<S, R> SearchLoader<S, R>
where
    S: ResultSource + 'static,
    R: Renderer + Send + 'static,
    R::Handle: Send,
{
    /// Create a loader for `query` and pre-allocate the initial skeleton
    /// batch for its domain.
    pub fn new(query: Query, source: S, renderer: R, settings: Settings) -> Self {
        let mut state = LoaderState {
            session: Session::new(query),
            pool: SkeletonPool::new(),
            renderer,
        };
        let domain = state.session.query.domain;
        state
            .pool
            .allocate(settings.batch_size(domain), domain, &mut state.renderer);

        let (signal, _) = watch::channel(LoopSignal {
            state: PollState::Idle,
            cycles: 0,
        });

        Self {
            source: Arc::new(source),
            settings,
            state: Arc::new(Mutex::new(state)),
            signal: Arc::new(signal),
        }
    }

    /// Watch poll-loop state transitions and cycle completions.
    pub fn subscribe(&self) -> watch::Receiver<LoopSignal> {
        self.signal.subscribe()
    }

    pub async fn snapshot(&self) -> LoaderSnapshot {
        let st = self.state.lock().await;
        LoaderSnapshot {
            cursor: st.session.cursor,
            state: st.session.state,
            batch_loading: st.session.batch_loading,
            allocated: st.pool.allocated(),
            filled: st.pool.filled(),
        }
    }

    /// Inspect the slot pool (used by front ends to collect rendered slots).
    pub async fn with_pool<T>(&self, f: impl FnOnce(&SkeletonPool<R::Handle>) -> T) -> T {
        let st = self.state.lock().await;
        f(&st.pool)
    }

    /// Start the fetch chain. A no-op while one is already in flight;
    /// restarting after a stop continues the same session — the cursor is
    /// not reset.
    pub async fn start(&self) {
        {
            let mut st = self.state.lock().await;
            if st.session.state == PollState::Polling {
                debug!("start ignored, a fetch chain is already in flight");
                return;
            }
            st.session.state = PollState::Polling;
        }
        self.signal.send_modify(|sig| sig.state = PollState::Polling);

        let loader = self.clone();
        tokio::spawn(async move { loader.run_chain().await });
    }

    /// Force the loop to stop and clear the batch guard. An in-flight
    /// fetch still settles and its batch still renders (index-addressed
    /// fills make that harmless); only the next cycle is suppressed.
    pub async fn stop(&self) {
        {
            let mut st = self.state.lock().await;
            st.session.state = PollState::Stopped;
            st.session.batch_loading = false;
        }
        self.signal.send_modify(|sig| sig.state = PollState::Stopped);
    }

    /// Scroll handler. When the viewport nears document bottom: allocate
    /// one skeleton batch and make sure the poll loop is running. Guarded
    /// by `batch_loading` so rapid scroll events collapse into one
    /// allocation/start; the guard is released when the in-flight cycle
    /// settles.
    ///
    /// Returns true when a batch load was triggered.
    pub async fn on_scroll(&self, metrics: ViewportMetrics) -> bool {
        if !metrics.near_bottom(self.settings.scroll_threshold_px) {
            return false;
        }

        let (mut rx, baseline, needs_start) = {
            let mut st = self.state.lock().await;
            if st.session.batch_loading {
                debug!("scroll trigger ignored, batch already loading");
                return false;
            }
            st.session.batch_loading = true;

            let LoaderState {
                session,
                pool,
                renderer,
            } = &mut *st;
            let domain = session.query.domain;
            pool.allocate(self.settings.batch_size(domain), domain, renderer);

            let rx = self.signal.subscribe();
            let baseline = rx.borrow().cycles;
            (rx, baseline, session.state != PollState::Polling)
        };

        if needs_start {
            self.start().await;
        }

        let loader = self.clone();
        tokio::spawn(async move {
            loop {
                if rx.changed().await.is_err() {
                    break;
                }
                let sig = *rx.borrow_and_update();
                if sig.cycles > baseline || sig.state != PollState::Polling {
                    break;
                }
            }
            let mut st = loader.state.lock().await;
            st.session.batch_loading = false;
        });

        true
    }

    /// Block until the poll loop reaches `Stopped`.
    pub async fn wait_until_stopped(&self) {
        let mut rx = self.signal.subscribe();
        loop {
            if rx.borrow_and_update().state == PollState::Stopped {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// One fetch chain: fetch, render, advance, reschedule. Errors never
    /// end the chain; only a positive "no more data" signal (or a forced
    /// stop) does.
    async fn run_chain(&self) {
        let mut retry_delay = self.settings.error_retry();
        loop {
            let (query, cursor, count) = {
                let st = self.state.lock().await;
                if st.session.state != PollState::Polling {
                    break;
                }
                let domain = st.session.query.domain;
                (
                    st.session.query.clone(),
                    st.session.cursor,
                    self.settings.batch_size(domain),
                )
            };

            match self.source.fetch_page(&query, cursor, count).await {
                Ok(page) => {
                    retry_delay = self.settings.error_retry();

                    let still_polling = {
                        let mut st = self.state.lock().await;
                        let LoaderState {
                            session,
                            pool,
                            renderer,
                        } = &mut *st;
                        let domain = session.query.domain;
                        let rendered = pool.fill(&page.results, session.cursor, domain, renderer);
                        session.cursor += rendered;
                        debug!(cursor = session.cursor, batch = rendered, "rendered batch");
                        session.state == PollState::Polling
                    };
                    self.bump_cycle();

                    // A stop during the fetch still renders the settled
                    // batch, but suppresses the next cycle.
                    if !still_polling {
                        break;
                    }

                    if page.has_more {
                        tokio::time::sleep(self.settings.poll_interval()).await;
                    } else {
                        self.finish().await;
                        break;
                    }
                }
                Err(err) => {
                    warn!(
                        kind = err.kind(),
                        "poll cycle failed, retrying in {:?}: {}", retry_delay, err
                    );
                    self.bump_cycle();
                    tokio::time::sleep(retry_delay).await;
                    retry_delay = next_retry_delay(retry_delay, &self.settings);
                }
            }
        }
    }

    async fn finish(&self) {
        {
            let mut st = self.state.lock().await;
            st.session.state = PollState::Stopped;
            st.session.batch_loading = false;
            info!(cursor = st.session.cursor, "no more data, poll loop stopped");
        }
        self.signal.send_modify(|sig| sig.state = PollState::Stopped);
    }

    fn bump_cycle(&self) {
        self.signal.send_modify(|sig| sig.cycles += 1);
    }
}

/// Exponential backoff with a ceiling; retries stay unbounded in count.
fn next_retry_delay(current: Duration, settings: &Settings) -> Duration {
    let scaled = Duration::from_secs_f64(current.as_secs_f64() * settings.retry_backoff_multiplier);
    scaled.min(settings.max_retry())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_bottom_threshold() {
        let metrics = ViewportMetrics {
            scroll_top: 1000.0,
            viewport_height: 800.0,
            document_height: 2300.0,
        };
        assert!(metrics.near_bottom(500.0));

        let far = ViewportMetrics {
            scroll_top: 0.0,
            viewport_height: 800.0,
            document_height: 2300.0,
        };
        assert!(!far.near_bottom(500.0));
    }

    #[test]
    fn test_retry_delay_backs_off_to_ceiling() {
        let settings = Settings {
            error_retry_ms: 1000,
            max_retry_ms: 3000,
            retry_backoff_multiplier: 2.0,
            ..Default::default()
        };
        let first = settings.error_retry();
        let second = next_retry_delay(first, &settings);
        let third = next_retry_delay(second, &settings);
        assert_eq!(second, Duration::from_millis(2000));
        assert_eq!(third, Duration::from_millis(3000));
        assert_eq!(next_retry_delay(third, &settings), Duration::from_millis(3000));
    }
}
