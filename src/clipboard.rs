use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::validate::{validate_url, UrlStatus};

/// One-shot clipboard read running off the UI thread.
pub struct ClipboardProbe {
    rx: Option<Receiver<String>>,
}

impl ClipboardProbe {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("clipboard-probe".into())
            .spawn(move || match read_text() {
                Ok(text) => {
                    let _ = tx.send(text);
                }
                Err(e) => log::debug!("clipboard read failed: {}", e),
            });
        if let Err(e) = spawned {
            log::debug!("could not start clipboard probe: {}", e);
            return Self::disabled();
        }
        Self { rx: Some(rx) }
    }

    pub fn disabled() -> Self {
        Self { rx: None }
    }

    #[cfg(test)]
    fn from_receiver(rx: Receiver<String>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Returns a URL once the read lands and holds one. Never blocks.
    pub fn poll(&mut self) -> Option<String> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(text) => {
                self.rx = None;
                url_hint(&text)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.rx = None;
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }
}

fn read_text() -> Result<String, arboard::Error> {
    arboard::Clipboard::new()?.get_text()
}

/// Clipboard text worth offering as the URL.
pub fn url_hint(text: &str) -> Option<String> {
    let text = text.trim();
    match validate_url(text) {
        UrlStatus::Valid => Some(text.to_string()),
        _ => None,
    }
}
