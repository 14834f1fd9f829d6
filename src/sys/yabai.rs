//! Typed client for the `yabai` command-line interface.
//!
//! Every query shells out to the binary with a fixed argument template and
//! parses the JSON it prints on stdout. The display filtering the widget
//! needs is done in-process rather than through an external JSON filter.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::process::Command;

use crate::model::{DisplayInfo, SpaceId, SpaceInfo, WindowId, WindowInfo};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command exited with status {status}: {stderr}")]
    CommandFailed { status: i32, stderr: String },
    #[error("malformed query output: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Query surface of the window manager, as a trait so the refresh and probe
/// logic can be driven against stubs in tests.
pub trait WindowManager: Clone + Send + Sync + 'static {
    /// Id of the currently focused space.
    fn focused_space(&self) -> impl Future<Output = Result<SpaceId, QueryError>> + Send;
    /// All spaces across all displays, in the manager's order.
    fn spaces(&self) -> impl Future<Output = Result<Vec<SpaceInfo>, QueryError>> + Send;
    /// The display the manager enumerates as "first".
    fn first_display(&self) -> impl Future<Output = Result<DisplayInfo, QueryError>> + Send;
    /// Detail for one window.
    fn window(&self, id: WindowId) -> impl Future<Output = Result<WindowInfo, QueryError>> + Send;
    /// Switches focus to the space with the given index. Fire-and-forget.
    fn focus_space(&self, index: u64) -> impl Future<Output = Result<(), QueryError>> + Send;
}

#[derive(Debug, Clone)]
pub struct Yabai {
    program: Arc<PathBuf>,
}

impl Yabai {
    pub fn new(program: impl Into<PathBuf>) -> Yabai { Yabai { program: Arc::new(program.into()) } }

    async fn output<I, S>(&self, args: I) -> Result<Vec<u8>, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let output = Command::new(&*self.program).args(args).output().await.map_err(|source| {
            QueryError::Spawn { program: self.program.display().to_string(), source }
        })?;
        if !output.status.success() {
            return Err(QueryError::CommandFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    async fn query<T, I, S>(&self, args: I) -> Result<T, QueryError>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let stdout = self.output(args).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }
}

impl WindowManager for Yabai {
    fn focused_space(&self) -> impl Future<Output = Result<SpaceId, QueryError>> + Send {
        async move {
            let space: SpaceInfo = self.query(["-m", "query", "--spaces", "--space"]).await?;
            Ok(space.id)
        }
    }

    fn spaces(&self) -> impl Future<Output = Result<Vec<SpaceInfo>, QueryError>> + Send {
        self.query(["-m", "query", "--spaces"])
    }

    fn first_display(&self) -> impl Future<Output = Result<DisplayInfo, QueryError>> + Send {
        self.query(["-m", "query", "--displays", "--display", "first"])
    }

    fn window(&self, id: WindowId) -> impl Future<Output = Result<WindowInfo, QueryError>> + Send {
        async move {
            let id = id.get().to_string();
            self.query(["-m", "query", "--windows", "--window", id.as_str()]).await
        }
    }

    fn focus_space(&self, index: u64) -> impl Future<Output = Result<(), QueryError>> + Send {
        async move {
            let index = index.to_string();
            self.output(["-m", "space", "--focus", index.as_str()]).await?;
            Ok(())
        }
    }
}
