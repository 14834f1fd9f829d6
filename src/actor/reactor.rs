//! Single-writer store for the widget state. Query tasks race freely; their
//! results are serialized here, and each event replaces exactly one
//! top-level field of the state.

use tokio::sync::oneshot;
use tracing::debug;

use crate::actor::{self, panel, poller};
use crate::common::config::Config;
use crate::model::{Space, SpaceId, WidgetState};

#[derive(Debug)]
pub enum Event {
    /// Full replacement of the space list from a finished refresh pass.
    SpacesUpdated(Vec<Space>),
    /// Focused space id from the per-tick probe.
    SpaceFocused(SpaceId),
    ConfigUpdated(Config),
    /// Snapshot request from the one-shot CLI surface.
    QueryState { response: oneshot::Sender<WidgetState> },
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

pub struct Reactor {
    state: WidgetState,
    rx: Receiver,
    panel_tx: panel::Sender,
    poller_tx: poller::Sender,
}

impl Reactor {
    pub fn new(rx: Receiver, panel_tx: panel::Sender, poller_tx: poller::Sender) -> Reactor {
        Reactor { state: WidgetState::default(), rx, panel_tx, poller_tx }
    }

    pub async fn run(mut self) {
        while let Some((span, event)) = self.rx.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::SpacesUpdated(spaces) => {
                debug!(spaces = spaces.len(), "space list replaced");
                self.state.apply_spaces(spaces);
                self.push_update();
            }
            Event::SpaceFocused(id) => {
                if self.state.focused_space != Some(id) {
                    debug!(space = id.get(), "focus moved");
                }
                self.state.apply_focus(id);
                self.push_update();
            }
            Event::ConfigUpdated(config) => {
                _ = self.poller_tx.try_send(poller::Event::ConfigUpdated(config.clone()));
                _ = self.panel_tx.try_send(panel::Event::ConfigUpdated(config));
            }
            Event::QueryState { response } => {
                _ = response.send(self.state.clone());
            }
        }
    }

    fn push_update(&self) {
        _ = self.panel_tx.send(panel::Event::Update(self.state.clone()));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{SpaceId, SpaceInfo, WindowId};

    fn reactor() -> (Reactor, panel::Receiver, poller::Receiver, Sender) {
        let (tx, rx) = actor::channel();
        let (panel_tx, panel_rx) = actor::channel();
        let (poller_tx, poller_rx) = actor::channel();
        (Reactor::new(rx, panel_tx, poller_tx), panel_rx, poller_rx, tx)
    }

    fn space(id: u64) -> Space {
        SpaceInfo {
            id: SpaceId::new(id),
            index: id,
            display: 1,
            windows: vec![WindowId::new(1)],
        }
        .into_unresolved()
    }

    #[test_log::test(tokio::test)]
    async fn spaces_and_focus_patch_independently() {
        let (mut reactor, mut panel_rx, _poller_rx, _tx) = reactor();

        reactor.handle_event(Event::SpaceFocused(SpaceId::new(7)));
        reactor.handle_event(Event::SpacesUpdated(vec![space(1), space(2)]));

        let (_, first) = panel_rx.recv().await.unwrap();
        let panel::Event::Update(state) = first else { panic!("expected update") };
        assert_eq!(state.focused_space, Some(SpaceId::new(7)));
        assert_eq!(state.spaces.len(), 0);

        let (_, second) = panel_rx.recv().await.unwrap();
        let panel::Event::Update(state) = second else { panic!("expected update") };
        assert_eq!(state.focused_space, Some(SpaceId::new(7)));
        assert_eq!(state.spaces.len(), 2);
    }

    #[tokio::test]
    async fn later_commit_wins() {
        let (mut reactor, mut panel_rx, _poller_rx, _tx) = reactor();

        reactor.handle_event(Event::SpacesUpdated(vec![space(1), space(2)]));
        reactor.handle_event(Event::SpacesUpdated(vec![space(3)]));

        let _ = panel_rx.recv().await.unwrap();
        let (_, event) = panel_rx.recv().await.unwrap();
        let panel::Event::Update(state) = event else { panic!("expected update") };
        let ids: Vec<u64> = state.spaces.iter().map(|s| s.id.get()).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn query_returns_current_snapshot() {
        let (mut reactor, _panel_rx, _poller_rx, _tx) = reactor();
        reactor.handle_event(Event::SpaceFocused(SpaceId::new(4)));

        let (response, snapshot) = oneshot::channel();
        reactor.handle_event(Event::QueryState { response });
        assert_eq!(snapshot.await.unwrap().focused_space, Some(SpaceId::new(4)));
    }

    #[tokio::test]
    async fn config_updates_fan_out() {
        let (mut reactor, mut panel_rx, mut poller_rx, _tx) = reactor();
        reactor.handle_event(Event::ConfigUpdated(Config::default()));

        assert!(matches!(poller_rx.recv().await, Some((_, poller::Event::ConfigUpdated(_)))));
        assert!(matches!(panel_rx.recv().await, Some((_, panel::Event::ConfigUpdated(_)))));
    }
}
