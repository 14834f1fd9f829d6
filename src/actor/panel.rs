//! Turns state updates into rendered frames. Updates are debounced and a
//! frame identical to the previous one is not re-written.

use std::io::{self, Write};

use tokio::time::Duration;
use tracing::warn;

use crate::actor;
use crate::common::config::Config;
use crate::model::WidgetState;
use crate::sys::timer::Timer;
use crate::ui::grid::{self, Frame, GridOptions};

#[derive(Debug)]
pub enum Event {
    Update(WidgetState),
    ConfigUpdated(Config),
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

/// Output seam for rendered frames.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> io::Result<()>;
}

/// Writes each frame as a block of lines terminated by a blank line, the
/// shape a status-bar feeder is expected to produce on stdout.
pub struct StdoutSink;

impl FrameSink for StdoutSink {
    fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for line in &frame.lines {
            writeln!(stdout, "{line}")?;
        }
        writeln!(stdout)?;
        stdout.flush()
    }
}

pub struct Panel<S> {
    options: GridOptions,
    rx: Receiver,
    sink: S,
    last_signature: Option<u64>,
}

impl<S: FrameSink> Panel<S> {
    pub fn new(config: &Config, rx: Receiver, sink: S) -> Panel<S> {
        Panel { options: GridOptions::from(config), rx, sink, last_signature: None }
    }

    pub async fn run(mut self) {
        const DEBOUNCE: Duration = Duration::from_millis(150);

        let mut pending: Option<WidgetState> = None;
        let mut timer = Timer::manual();

        loop {
            tokio::select! {
                _ = &mut timer, if pending.is_some() => {
                    if let Some(state) = pending.take() {
                        self.repaint(&state);
                    }
                }

                maybe = self.rx.recv() => {
                    match maybe {
                        Some((span, event)) => {
                            let _guard = span.enter();
                            match event {
                                Event::Update(state) => {
                                    pending = Some(state);
                                    timer.set_next_fire(DEBOUNCE);
                                }
                                Event::ConfigUpdated(config) => self.handle_config_updated(config),
                            }
                        }
                        None => {
                            if let Some(state) = pending.take() {
                                self.repaint(&state);
                            }
                            break;
                        }
                    }
                }
            }
        }
    }

    fn handle_config_updated(&mut self, config: Config) {
        self.options = GridOptions::from(&config);
        // force a repaint even if the next frame happens to look the same
        self.last_signature = None;
    }

    fn repaint(&mut self, state: &WidgetState) {
        let frame = grid::render(state, &self.options);
        let signature = frame.signature();
        if self.last_signature == Some(signature) {
            return;
        }
        self.last_signature = Some(signature);
        if let Err(err) = self.sink.write_frame(&frame) {
            warn!("could not write frame: {err}");
        }
    }
}
