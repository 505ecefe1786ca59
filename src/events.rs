//! Page events and the component lifecycle.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A DOM event addressed to an element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Blur(String),
    Focus(String),
    Input(String),
}

impl FormEvent {
    pub fn blur(id: &str) -> Self {
        FormEvent::Blur(id.to_string())
    }

    pub fn focus(id: &str) -> Self {
        FormEvent::Focus(id.to_string())
    }

    pub fn input(id: &str) -> Self {
        FormEvent::Input(id.to_string())
    }

    /// Id of the element the event fired on.
    pub fn target(&self) -> &str {
        match self {
            FormEvent::Blur(id) | FormEvent::Focus(id) | FormEvent::Input(id) => id,
        }
    }
}

/// Fan-out of page events to every initialized component.
///
/// Each subscriber owns an unbounded queue, so a burst of events never
/// evicts an earlier one.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<UnboundedSender<FormEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to current subscribers and returns how many there
    /// are. Subscribers whose receiver is gone are dropped.
    pub fn emit(&self, event: FormEvent) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        subscribers.len()
    }

    pub fn subscribe(&self) -> UnboundedReceiver<FormEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }
}

/// A page behavior with an explicit lifecycle.
pub trait Component {
    /// Registers the component's listeners. Returns `false`, registering
    /// nothing, when the page lacks the elements the component needs.
    fn initialize(&mut self, bus: &EventBus) -> bool;

    /// Stops listening. Calling it twice is harmless.
    fn teardown(&mut self);
}

/// Runs `handler` for each event on `bus`, one at a time, until `token`
/// is cancelled or the bus is dropped.
pub(crate) fn listen<F, Fut>(
    bus: &EventBus,
    token: CancellationToken,
    mut handler: F,
) -> JoinHandle<()>
where
    F: FnMut(FormEvent) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                received = rx.recv() => match received {
                    Some(event) => handler(event).await,
                    None => break,
                },
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_event_target() {
        assert_eq!(FormEvent::blur("cep").target(), "cep");
        assert_eq!(FormEvent::input("password-field").target(), "password-field");
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(FormEvent::blur("cep")), 0);
    }

    #[tokio::test]
    async fn test_listen_stops_on_cancel() {
        let bus = EventBus::new();
        let token = CancellationToken::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        let handle = listen(&bus, token.clone(), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        bus.emit(FormEvent::input("x"));
        for _ in 0..100 {
            if seen.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        token.cancel();
        handle.await.expect("listener task panicked");

        assert_eq!(bus.emit(FormEvent::input("x")), 0);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_burst_before_listener_runs_is_delivered_in_order() {
        let bus = EventBus::new();
        let token = CancellationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        let _handle = listen(&bus, token.clone(), move |event| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(event);
            }
        });

        // Nothing yields between these emits, so the listener sees them all
        // queued at once.
        bus.emit(FormEvent::blur("cep"));
        for _ in 0..200 {
            bus.emit(FormEvent::input("password-field"));
        }

        for _ in 0..100 {
            if seen.lock().unwrap().len() == 201 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 201);
        assert_eq!(seen[0], FormEvent::blur("cep"));
        token.cancel();
    }

    #[test]
    fn test_emit_prunes_dropped_subscribers() {
        let bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        assert_eq!(bus.emit(FormEvent::focus("x")), 1);
        drop(kept);
        assert_eq!(bus.emit(FormEvent::focus("x")), 0);
    }
}
