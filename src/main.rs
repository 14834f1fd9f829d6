use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::oneshot;
use tracing::{info, warn};

use spacegrid::actor::panel::{Panel, StdoutSink};
use spacegrid::actor::poller::{Poller, refresh_spaces};
use spacegrid::actor::reactor::{self, Reactor};
use spacegrid::actor::{self, config_watcher};
use spacegrid::common::config::{self, Config};
use spacegrid::common::log;
use spacegrid::sys::note;
use spacegrid::sys::yabai::{WindowManager, Yabai};

#[derive(Parser)]
#[command(
    name = "spacegrid",
    version,
    about = "Per-space window grid for the yabai window manager"
)]
struct Cli {
    /// Configuration file to use instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Poll the window manager and write frames to stdout until killed.
    Run,
    /// Focus the space with the given index.
    Focus { index: u64 },
    /// Append a line to the note file.
    Note {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Run one refresh pass and print the merged state as JSON.
    Query,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sigpipe::reset();
    log::init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config::config_file);
    let config = Config::load(&config_path)?;
    let yabai = Yabai::new(config.yabai.program.clone());

    match cli.command.unwrap_or(Cmd::Run) {
        Cmd::Run => run_widget(config, config_path, yabai).await,
        Cmd::Focus { index } => yabai
            .focus_space(index)
            .await
            .with_context(|| format!("could not focus space {index}")),
        Cmd::Note { text } => {
            let file = config.note.file();
            note::append_note(&file, &text.join(" "))
                .with_context(|| format!("could not append to {}", file.display()))
        }
        Cmd::Query => query_once(&yabai).await,
    }
}

async fn run_widget(config: Config, config_path: PathBuf, yabai: Yabai) -> anyhow::Result<()> {
    let (reactor_tx, reactor_rx) = actor::channel();
    let (panel_tx, panel_rx) = actor::channel();
    let (poller_tx, poller_rx) = actor::channel();

    let _watcher = match config_watcher::spawn(config_path, reactor_tx.clone()) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            warn!("config hot reload disabled: {err}");
            None
        }
    };

    let panel = Panel::new(&config, panel_rx, StdoutSink);
    let reactor = Reactor::new(reactor_rx, panel_tx, poller_tx);
    let poller = Poller::new(&config, yabai, poller_rx, reactor_tx);

    info!(
        period_ms = config.poll.period_ms,
        sample_rate = config.poll.sample_rate,
        "spacegrid starting"
    );

    tokio::spawn(panel.run());
    tokio::spawn(reactor.run());
    poller.run().await;
    Ok(())
}

/// One-shot variant of the widget loop: refresh, merge through the reducer,
/// print the snapshot.
async fn query_once(yabai: &Yabai) -> anyhow::Result<()> {
    let (reactor_tx, reactor_rx) = actor::channel();
    let (panel_tx, _panel_rx) = actor::channel();
    let (poller_tx, _poller_rx) = actor::channel();
    let reactor_task = tokio::spawn(Reactor::new(reactor_rx, panel_tx, poller_tx).run());

    let (spaces, focused) = tokio::join!(refresh_spaces(yabai), yabai.focused_space());
    _ = reactor_tx.send(reactor::Event::SpacesUpdated(spaces.context("space refresh failed")?));
    _ = reactor_tx.send(reactor::Event::SpaceFocused(focused.context("focus query failed")?));

    let (response, snapshot) = oneshot::channel();
    _ = reactor_tx.send(reactor::Event::QueryState { response });
    let state = snapshot.await.context("state store went away")?;
    println!("{}", serde_json::to_string_pretty(&state)?);

    drop(reactor_tx);
    reactor_task.await?;
    Ok(())
}
