//! Live updates for open editor pages.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use livery_model::{StatusKind, StatusMessage};

/// Messages pushed to connected editor pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Connection established
    Connected,

    /// The state file changed on disk; the form must be re-rendered
    Reload,

    /// The customization changed; previews should re-render
    Preview { revision: u64 },

    /// New status banner
    Status { kind: StatusKind, message: String },

    /// Banner dismissed
    StatusCleared,
}

impl From<&StatusMessage> for LiveMessage {
    fn from(status: &StatusMessage) -> Self {
        Self::Status {
            kind: status.kind,
            message: status.message.clone(),
        }
    }
}

/// Broadcasts live messages to every connected page.
#[derive(Debug, Clone)]
pub struct LiveHub {
    sender: broadcast::Sender<LiveMessage>,
}

impl LiveHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected pages.
    pub fn send(&self, msg: LiveMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveMessage> {
        self.sender.subscribe()
    }
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client script for the editor page.
///
/// Connects back to the serving host, reloads the preview frames on `preview` messages and
/// renders the status banner.
pub fn live_client_script(path: &str) -> String {
    format!(
        r#"
(function() {{
  'use strict';

  const proto = location.protocol === 'https:' ? 'wss://' : 'ws://';
  let attempts = 0;

  function showStatus(kind, message) {{
    const banner = document.getElementById('status');
    if (!banner) return;
    banner.className = 'status status-' + kind;
    banner.querySelector('.status-text').textContent = message;
    banner.hidden = false;
  }}

  function clearStatus() {{
    const banner = document.getElementById('status');
    if (banner) banner.hidden = true;
  }}

  function refreshPreviews(revision) {{
    document.querySelectorAll('iframe[data-preview]').forEach(function(frame) {{
      const url = new URL(frame.src, location.href);
      url.searchParams.set('rev', revision);
      frame.src = url.toString();
    }});
  }}

  window.livery = {{ showStatus: showStatus, clearStatus: clearStatus, refreshPreviews: refreshPreviews }};

  function connect() {{
    const ws = new WebSocket(proto + location.host + '{}');

    ws.onopen = function() {{
      attempts = 0;
    }};

    ws.onmessage = function(event) {{
      const msg = JSON.parse(event.data);

      switch (msg.type) {{
        case 'reload':
          location.reload();
          break;
        case 'preview':
          refreshPreviews(msg.revision);
          break;
        case 'status':
          showStatus(msg.kind, msg.message);
          break;
        case 'status_cleared':
          clearStatus();
          break;
      }}
    }};

    ws.onclose = function() {{
      if (attempts < 10) {{
        attempts++;
        setTimeout(connect, 1000 * attempts);
      }}
    }};
  }}

  connect();
}})();
"#,
        path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_broadcasts_messages() {
        let hub = LiveHub::new();
        let mut rx = hub.subscribe();

        hub.send(LiveMessage::Preview { revision: 3 });

        assert_eq!(rx.try_recv().unwrap(), LiveMessage::Preview { revision: 3 });
    }

    #[test]
    fn serializes_messages() {
        let msg = LiveMessage::from(&StatusMessage::error("Failed to save template"));
        let json = serde_json::to_string(&msg).unwrap();

        assert_eq!(
            json,
            r#"{"type":"status","kind":"error","message":"Failed to save template"}"#
        );
        assert_eq!(
            serde_json::to_string(&LiveMessage::StatusCleared).unwrap(),
            r#"{"type":"status_cleared"}"#
        );
    }

    #[test]
    fn reload_is_tagged() {
        assert_eq!(
            serde_json::to_string(&LiveMessage::Reload).unwrap(),
            r#"{"type":"reload"}"#
        );
        assert!(live_client_script("/__live").contains("case 'reload':"));
    }

    #[test]
    fn script_targets_path() {
        assert!(live_client_script("/__live").contains("location.host + '/__live'"));
    }
}
