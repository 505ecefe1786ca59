//! Typewriter title: reveals `data-fulltext` one character at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{Component, EventBus};
use crate::page::{Page, ids};

pub const DEFAULT_SPEED: Duration = Duration::from_millis(50);
pub const CURSOR_CLASS: &str = "typing-cursor";

/// The successive contents of the title while typing `text`, starting
/// from the empty string.
pub fn frames(text: &str) -> Vec<String> {
    let mut frames = vec![String::new()];
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        frames.push(current.clone());
    }
    frames
}

pub struct Typewriter<P> {
    page: Arc<P>,
    speed: Duration,
    token: CancellationToken,
    started: bool,
    task: Option<JoinHandle<bool>>,
}

impl<P: Page + 'static> Typewriter<P> {
    pub fn new(page: Arc<P>) -> Self {
        Self {
            page,
            speed: DEFAULT_SPEED,
            token: CancellationToken::new(),
            started: false,
            task: None,
        }
    }

    pub fn with_speed(mut self, speed: Duration) -> Self {
        self.speed = speed;
        self
    }

    /// Types the title inline. Returns `false` if there is no title or the
    /// run was torn down before the end; after teardown the title is left
    /// untouched.
    pub async fn type_out(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        let Some(text) = prepare(self.page.as_ref()) else {
            return false;
        };
        type_chars(self.page.as_ref(), &text, self.speed, &self.token).await
    }

    /// Waits for a run started by [`Component::initialize`]. Returns whether
    /// it typed the whole text.
    pub async fn finished(&mut self) -> bool {
        match self.task.take() {
            Some(task) => task.await.unwrap_or(false),
            None => false,
        }
    }
}

impl<P: Page + 'static> Component for Typewriter<P> {
    fn initialize(&mut self, _bus: &EventBus) -> bool {
        if !self.page.has_element(ids::ANIMATED_TITLE) {
            return false;
        }
        // One run per page load.
        if self.started {
            return true;
        }
        self.started = true;

        let page = self.page.clone();
        let speed = self.speed;
        let token = self.token.clone();
        self.task = Some(tokio::spawn(async move {
            match prepare(page.as_ref()) {
                Some(text) => type_chars(page.as_ref(), &text, speed, &token).await,
                None => false,
            }
        }));
        true
    }

    fn teardown(&mut self) {
        self.token.cancel();
    }
}

impl<P> Drop for Typewriter<P> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn prepare<P: Page + ?Sized>(page: &P) -> Option<String> {
    if !page.has_element(ids::ANIMATED_TITLE) {
        return None;
    }
    let text = page
        .attribute(ids::ANIMATED_TITLE, ids::FULLTEXT_ATTRIBUTE)
        .unwrap_or_default();
    page.add_class(ids::ANIMATED_TITLE, CURSOR_CLASS);
    page.set_inner_html(ids::ANIMATED_TITLE, "");
    page.set_style(ids::ANIMATED_TITLE, "visibility", "visible");
    Some(text)
}

/// Appends one character, then waits `speed` before the next; the cursor
/// is removed after the last wait.
async fn type_chars<P: Page + ?Sized>(
    page: &P,
    text: &str,
    speed: Duration,
    token: &CancellationToken,
) -> bool {
    let mut buf = [0u8; 4];
    for c in text.chars() {
        if token.is_cancelled() {
            return false;
        }
        page.append_text(ids::ANIMATED_TITLE, c.encode_utf8(&mut buf));
        tokio::select! {
            biased;
            _ = token.cancelled() => return false,
            _ = tokio::time::sleep(speed) => {}
        }
    }
    page.remove_class(ids::ANIMATED_TITLE, CURSOR_CLASS);
    true
}
