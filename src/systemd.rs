//! Thin wrapper around systemd sd_notify integration.
//!
//! All functions are no-ops when `enabled` is false or on non-Linux platforms.
//! This keeps the rest of the codebase free from `#[cfg]` conditionals.

/// Holds the runtime flag controlling whether sd-notify messages are sent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SystemdNotifier {
    enabled: bool,
}

impl SystemdNotifier {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Send `READY=1` once configuration is loaded and the client is built.
    pub(crate) fn notify_ready(&self) {
        if self.enabled {
            send(&[NotifyMsg::Ready]);
        }
    }

    /// Send `STATUS=<msg>`, shown by `systemctl status`.
    pub(crate) fn notify_status(&self, msg: &str) {
        if self.enabled {
            send(&[NotifyMsg::Status(msg)]);
        }
    }

    /// Send `STOPPING=1`.
    pub(crate) fn notify_stopping(&self) {
        if self.enabled {
            send(&[NotifyMsg::Stopping]);
        }
    }
}

enum NotifyMsg<'a> {
    Ready,
    Status(&'a str),
    Stopping,
}

#[cfg(target_os = "linux")]
fn send(msgs: &[NotifyMsg<'_>]) {
    let states: Vec<sd_notify::NotifyState<'_>> = msgs
        .iter()
        .map(|m| match m {
            NotifyMsg::Ready => sd_notify::NotifyState::Ready,
            NotifyMsg::Status(s) => sd_notify::NotifyState::Status(s),
            NotifyMsg::Stopping => sd_notify::NotifyState::Stopping,
        })
        .collect();
    if let Err(e) = sd_notify::notify(false, &states) {
        tracing::debug!(error = %e, "sd_notify failed");
    }
}

#[cfg(not(target_os = "linux"))]
fn send(_msgs: &[NotifyMsg<'_>]) {}
