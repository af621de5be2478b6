//! Shared fixtures for the rustcomplete end-to-end tests
//!
//! Stand-ins for racer and cargo are small shell scripts written into a
//! scratch directory, and [`RecordingHost`] plays the editor.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rustcomplete_completion::{
    AutoCompleteOptions, ChooserCallback, EditorHost, Location, RequestId, ViewId,
};
use tokio::sync::Notify;

/// Write an executable `sh` script named `name` into `dir`
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// A fake `cargo` answering `locate-project` with `manifest`
///
/// Every invocation appends a line to `<dir>/cargo-calls`.
#[cfg(unix)]
pub fn fake_cargo(dir: &Path, manifest: &Path) -> std::io::Result<PathBuf> {
    let calls = dir.join("cargo-calls");
    write_script(
        dir,
        "cargo",
        &format!(
            "echo \"$@\" >> '{}'\necho '{{\"root\":\"{}\"}}'",
            calls.display(),
            manifest.display()
        ),
    )
}

/// A fake `racer` printing `output`
///
/// The arguments, `RUST_SRC_PATH` and stdin it received are saved as
/// `<dir>/racer-args`, `<dir>/racer-env` and `<dir>/racer-stdin`.
#[cfg(unix)]
pub fn fake_racer(dir: &Path, output: &str) -> std::io::Result<PathBuf> {
    write_script(
        dir,
        "racer",
        &format!(
            "echo \"$@\" > '{args}'\nprintf '%s' \"$RUST_SRC_PATH\" > '{env}'\ncat > '{stdin}'\ncat <<'RACER_EOF'\n{output}\nRACER_EOF",
            args = dir.join("racer-args").display(),
            env = dir.join("racer-env").display(),
            stdin = dir.join("racer-stdin").display(),
        ),
    )
}

/// Number of times the fake cargo in `dir` was run
pub fn cargo_calls(dir: &Path) -> usize {
    std::fs::read_to_string(dir.join("cargo-calls"))
        .map(|calls| calls.lines().count())
        .unwrap_or(0)
}

/// Editor double recording every call it receives
#[derive(Default)]
pub struct RecordingHost {
    current: Mutex<Option<RequestId>>,
    pub triggered: Mutex<Vec<ViewId>>,
    pub opened: Mutex<Vec<Location>>,
    pub choosers: Mutex<Vec<(Vec<String>, ChooserCallback)>>,
    notify: Notify,
}

impl RecordingHost {
    pub fn at(id: RequestId) -> Arc<Self> {
        let host = Self::default();
        *host.current.lock() = Some(id);
        Arc::new(host)
    }

    pub fn move_cursor(&self, id: RequestId) {
        *self.current.lock() = Some(id);
    }

    /// Wait until the host is called back, by any method
    pub async fn called(&self) {
        self.notify.notified().await;
    }
}

impl EditorHost for RecordingHost {
    fn current_request_id(&self) -> Option<RequestId> {
        *self.current.lock()
    }

    fn trigger_completion(&self, view: ViewId, _options: AutoCompleteOptions) {
        self.triggered.lock().push(view);
        self.notify.notify_one();
    }

    fn open_location(&self, location: &Location) {
        self.opened.lock().push(location.clone());
        self.notify.notify_one();
    }

    fn show_chooser(&self, labels: Vec<String>, on_select: ChooserCallback) {
        self.choosers.lock().push((labels, on_select));
        self.notify.notify_one();
    }
}
