//! Tick scheduler. Every tick probes the focused space; a probabilistic gate
//! decides when the much heavier full space refresh runs.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::actor::{self, reactor};
use crate::common::config::Config;
use crate::model::{Space, SpaceInfo, WindowSlot};
use crate::sys::yabai::{QueryError, WindowManager};

#[derive(Debug)]
pub enum Event {
    ConfigUpdated(Config),
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

/// Decides, once per tick, whether the space refresh runs. Probabilistic on
/// purpose: expected spacing is `1 / rate` ticks, which keeps the refresh
/// cost bounded without maintaining a second fixed schedule.
pub struct RefreshGate {
    rate: f64,
    rng: StdRng,
}

impl RefreshGate {
    pub fn new(rate: f64) -> RefreshGate { RefreshGate { rate, rng: StdRng::from_os_rng() } }

    pub fn seeded(rate: f64, seed: u64) -> RefreshGate {
        RefreshGate { rate, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn set_rate(&mut self, rate: f64) { self.rate = rate; }

    pub fn fires(&mut self) -> bool { self.rng.random::<f64>() < self.rate }
}

pub struct Poller<W> {
    wm: W,
    rx: Receiver,
    reactor_tx: reactor::Sender,
    period: Duration,
    gate: RefreshGate,
}

impl<W: WindowManager> Poller<W> {
    pub fn new(config: &Config, wm: W, rx: Receiver, reactor_tx: reactor::Sender) -> Poller<W> {
        Poller {
            wm,
            rx,
            reactor_tx,
            period: Duration::from_millis(config.poll.period_ms),
            gate: RefreshGate::new(config.poll.sample_rate),
        }
    }

    pub async fn run(mut self) {
        // One ungated refresh so the first frame does not wait on the gate.
        self.spawn_refresh();

        let mut ticks = tokio::time::interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    self.spawn_focus_probe();
                    if self.gate.fires() {
                        self.spawn_refresh();
                    }
                }

                maybe = self.rx.recv() => {
                    match maybe {
                        Some((span, Event::ConfigUpdated(config))) => {
                            let _guard = span.enter();
                            self.gate.set_rate(config.poll.sample_rate);
                            let period = Duration::from_millis(config.poll.period_ms);
                            if period != self.period {
                                self.period = period;
                                ticks = tokio::time::interval(self.period);
                                ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
                            }
                        }
                        None => return,
                    }
                }
            }
        }
    }

    fn spawn_focus_probe(&self) {
        let wm = self.wm.clone();
        let tx = self.reactor_tx.clone();
        tokio::spawn(async move {
            match wm.focused_space().await {
                Ok(id) => {
                    _ = tx.send(reactor::Event::SpaceFocused(id));
                }
                Err(err) => warn!("focused space query failed: {err}"),
            }
        });
    }

    fn spawn_refresh(&self) {
        let wm = self.wm.clone();
        let tx = self.reactor_tx.clone();
        tokio::spawn(async move {
            match refresh_spaces(&wm).await {
                Ok(spaces) => {
                    _ = tx.send(reactor::Event::SpacesUpdated(spaces));
                }
                // Stale state stays on screen; the next gated tick retries.
                Err(err) => warn!("space refresh aborted: {err}"),
            }
        });
    }
}

/// One refresh pass: enumerate the spaces on the first display, resolve every
/// window id concurrently, and return the merged list for an atomic commit.
///
/// Resolution is index-aligned and never changes a space's window count. A
/// failed lookup leaves a `Failed` slot carrying the original id; duplicate
/// ids each get their own lookup and their own slot. In-flight passes are
/// never cancelled; whichever commit reaches the reactor last wins.
pub async fn refresh_spaces<W: WindowManager>(wm: &W) -> Result<Vec<Space>, QueryError> {
    let (spaces, display) = tokio::join!(wm.spaces(), wm.first_display());
    let display = display?;
    let mut merged: Vec<Space> = spaces?
        .into_iter()
        .filter(|space| space.display == display.index)
        .map(SpaceInfo::into_unresolved)
        .collect();

    let mut lookups = JoinSet::new();
    for (space_idx, space) in merged.iter().enumerate() {
        for (slot_idx, slot) in space.windows.iter().enumerate() {
            let id = slot.window_id();
            let wm = wm.clone();
            lookups.spawn(async move { (space_idx, slot_idx, wm.window(id).await) });
        }
    }

    while let Some(joined) = lookups.join_next().await {
        let Ok((space_idx, slot_idx, outcome)) = joined else { continue };
        let slot = &mut merged[space_idx].windows[slot_idx];
        *slot = match outcome {
            Ok(info) => WindowSlot::Resolved(info),
            Err(err) => {
                let id = slot.window_id();
                debug!(window = id.get(), "window lookup failed: {err}");
                WindowSlot::Failed(id)
            }
        };
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::collections::HashMap;
    use crate::model::{DisplayInfo, SpaceId, WindowId, WindowInfo};

    #[derive(Clone, Default)]
    struct StubWm {
        spaces: Vec<SpaceInfo>,
        display: u32,
        windows: Arc<HashMap<u32, WindowInfo>>,
        focused: u64,
    }

    impl WindowManager for StubWm {
        fn focused_space(&self) -> impl Future<Output = Result<SpaceId, QueryError>> + Send {
            let id = SpaceId::new(self.focused);
            async move { Ok(id) }
        }

        fn spaces(&self) -> impl Future<Output = Result<Vec<SpaceInfo>, QueryError>> + Send {
            let spaces = self.spaces.clone();
            async move { Ok(spaces) }
        }

        fn first_display(&self) -> impl Future<Output = Result<DisplayInfo, QueryError>> + Send {
            let index = self.display;
            async move { Ok(DisplayInfo { index }) }
        }

        fn window(
            &self,
            id: WindowId,
        ) -> impl Future<Output = Result<WindowInfo, QueryError>> + Send {
            let found = self.windows.get(&id.get()).cloned();
            async move {
                found.ok_or(QueryError::CommandFailed {
                    status: 1,
                    stderr: "could not retrieve window details".into(),
                })
            }
        }

        fn focus_space(&self, _index: u64) -> impl Future<Output = Result<(), QueryError>> + Send {
            async move { Ok(()) }
        }
    }

    fn window(id: u32, app: &str) -> WindowInfo {
        WindowInfo {
            id: WindowId::new(id),
            app: Some(app.to_string()),
            title: String::new(),
            is_hidden: false,
            is_minimized: false,
        }
    }

    fn space(id: u64, display: u32, windows: &[u32]) -> SpaceInfo {
        SpaceInfo {
            id: SpaceId::new(id),
            index: id,
            display,
            windows: windows.iter().copied().map(WindowId::new).collect(),
        }
    }

    #[tokio::test]
    async fn keeps_only_spaces_on_the_first_display() {
        let wm = StubWm {
            spaces: vec![space(1, 1, &[]), space(2, 2, &[]), space(3, 2, &[])],
            display: 2,
            ..Default::default()
        };
        let spaces = refresh_spaces(&wm).await.unwrap();
        let ids: Vec<u64> = spaces.iter().map(|s| s.id.get()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test_log::test(tokio::test)]
    async fn resolution_preserves_count_and_keeps_failed_ids() {
        let windows: HashMap<u32, WindowInfo> =
            [(10, window(10, "Slack")), (30, window(30, "Terminal"))].into_iter().collect();
        let wm = StubWm {
            spaces: vec![space(1, 1, &[10, 20, 30])],
            display: 1,
            windows: Arc::new(windows),
            ..Default::default()
        };

        let spaces = refresh_spaces(&wm).await.unwrap();
        assert_eq!(spaces.len(), 1);
        let slots = &spaces[0].windows;
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].as_resolved().map(|w| w.id.get()), Some(10));
        assert_eq!(slots[1], WindowSlot::Failed(WindowId::new(20)));
        assert_eq!(slots[2].as_resolved().map(|w| w.id.get()), Some(30));
    }

    #[tokio::test]
    async fn duplicate_ids_each_resolve_their_own_slot() {
        let windows: HashMap<u32, WindowInfo> =
            [(10, window(10, "Slack"))].into_iter().collect();
        let wm = StubWm {
            spaces: vec![space(1, 1, &[10, 10])],
            display: 1,
            windows: Arc::new(windows),
            ..Default::default()
        };

        let spaces = refresh_spaces(&wm).await.unwrap();
        let slots = &spaces[0].windows;
        assert!(slots.iter().all(|slot| slot.as_resolved().is_some()));
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn gate_rate_converges_over_many_ticks() {
        let mut gate = RefreshGate::seeded(0.06, 0x5eed);
        let ticks = 100_000;
        let fired = (0..ticks).filter(|_| gate.fires()).count() as f64;
        let expected = ticks as f64 * 0.06;
        // ~6.6 standard deviations of slack; deterministic for a fixed seed.
        assert!((fired - expected).abs() < 500.0, "fired {fired}, expected ~{expected}");
    }

    #[test]
    fn gate_extremes() {
        let mut never = RefreshGate::seeded(0.0, 1);
        assert!((0..1000).all(|_| !never.fires()));
        let mut always = RefreshGate::seeded(1.0, 1);
        assert!((0..1000).all(|_| always.fires()));
    }
}
