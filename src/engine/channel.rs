use crate::foundation::error::FramewireError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Create a connected producer/consumer pair.
///
/// The channel is an unbounded, ordered FIFO bridging one background
/// producer task to one polling consumer. Items appear to the consumer in
/// exactly the order they were sent; nothing is reordered or coalesced.
pub fn channel<T>() -> (Channel<T>, Collector<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            queue: VecDeque::new(),
            closed: false,
            error: None,
        }),
    });
    (
        Channel {
            shared: Arc::clone(&shared),
        },
        Collector { shared },
    )
}

#[derive(Debug)]
struct Shared<T> {
    state: Mutex<State<T>>,
}

#[derive(Debug)]
struct State<T> {
    queue: VecDeque<T>,
    closed: bool,
    error: Option<FramewireError>,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Producer half of a handoff channel.
///
/// `send` never blocks. The lifecycle is enforced by ownership: [`close`]
/// and [`fail`] consume the handle, so a producer cannot send after closing
/// or close twice. Dropping the handle without closing (a cancelled task)
/// closes the channel so the poller cannot spin forever.
///
/// [`close`]: Channel::close
/// [`fail`]: Channel::fail
#[derive(Debug)]
pub struct Channel<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Channel<T> {
    /// Append one item to the queue. Never blocks.
    pub fn send(&self, item: T) {
        let mut state = self.shared.lock();
        state.queue.push_back(item);
    }

    /// Mark the producer as done. Must be called after the last `send`; the
    /// consumer relies on this ordering to use `finished` as a race-free
    /// termination signal.
    pub fn close(self) {
        self.shared.lock().closed = true;
    }

    /// Close the channel with an error attached instead of a clean finish.
    ///
    /// Items already sent stay available to the consumer; no further items
    /// follow.
    pub fn fail(self, error: FramewireError) {
        let mut state = self.shared.lock();
        state.error = Some(error);
        state.closed = true;
    }
}

impl<T> Drop for Channel<T> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        if !state.closed {
            state.closed = true;
        }
    }
}

/// Consumer half of a handoff channel, polled periodically.
///
/// The consumer must always drain available items *before* checking
/// [`finished`], never the reverse, otherwise items appended between the
/// drain and the close could be invisible. [`drain`] and [`finished`] take
/// the same lock, so a typical poll loop is simply: drain, check finished,
/// sleep, repeat.
///
/// Dropping the collector does not cancel the producing task; it runs to
/// stream end or engine shutdown. That leak window is accepted and
/// intentional, as there is no per-stream cancellation token.
///
/// [`drain`]: Collector::drain
/// [`finished`]: Collector::finished
#[derive(Debug)]
pub struct Collector<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Collector<T> {
    /// Remove and return everything currently buffered, without blocking.
    /// Returns an empty vector when nothing is ready.
    pub fn drain(&self) -> Vec<T> {
        let mut state = self.shared.lock();
        state.queue.drain(..).collect()
    }

    /// Remove and return the oldest buffered item, if any.
    pub fn try_recv(&self) -> Option<T> {
        self.shared.lock().queue.pop_front()
    }

    /// Whether at least one item is currently buffered.
    pub fn items_available(&self) -> bool {
        !self.shared.lock().queue.is_empty()
    }

    /// Whether the producer has closed the channel and everything sent has
    /// been consumed.
    pub fn finished(&self) -> bool {
        let state = self.shared.lock();
        state.closed && state.queue.is_empty()
    }

    /// Take the error attached by a failed producer, if any. Meaningful once
    /// [`Collector::finished`] is observed; a clean finish leaves `None`.
    pub fn take_error(&self) -> Option<FramewireError> {
        self.shared.lock().error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_arrive_in_send_order() {
        let (tx, rx) = channel();
        tx.send(1);
        tx.send(2);
        tx.send(3);
        assert_eq!(rx.drain(), vec![1, 2, 3]);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn finished_requires_close_and_empty() {
        let (tx, rx) = channel();
        tx.send(1);
        assert!(!rx.finished());
        tx.close();
        // Closed but not yet drained: unconsumed items keep it unfinished.
        assert!(!rx.finished());
        assert_eq!(rx.drain(), vec![1]);
        assert!(rx.finished());
    }

    #[test]
    fn try_recv_pops_one_at_a_time() {
        let (tx, rx) = channel();
        tx.send("a");
        tx.send("b");
        assert_eq!(rx.try_recv(), Some("a"));
        assert!(rx.items_available());
        assert_eq!(rx.try_recv(), Some("b"));
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn fail_attaches_the_error_and_closes() {
        let (tx, rx) = channel::<u32>();
        tx.send(7);
        tx.fail(FramewireError::truncated("mid-frame end"));
        assert_eq!(rx.drain(), vec![7]);
        assert!(rx.finished());
        assert!(matches!(
            rx.take_error(),
            Some(FramewireError::Truncated(_))
        ));
        assert!(rx.take_error().is_none());
    }

    #[test]
    fn dropped_producer_closes_the_channel() {
        let (tx, rx) = channel::<u32>();
        tx.send(1);
        drop(tx);
        assert_eq!(rx.drain(), vec![1]);
        assert!(rx.finished());
        assert!(rx.take_error().is_none());
    }

    #[test]
    fn threaded_producer_never_loses_or_duplicates() {
        let (tx, rx) = channel();
        let producer = std::thread::spawn(move || {
            for i in 0..1000u32 {
                tx.send(i);
                if i % 64 == 0 {
                    std::thread::yield_now();
                }
            }
            tx.close();
        });

        let mut seen = Vec::new();
        loop {
            seen.extend(rx.drain());
            if rx.finished() {
                break;
            }
            std::thread::yield_now();
        }
        producer.join().unwrap();
        assert_eq!(seen, (0..1000u32).collect::<Vec<_>>());
    }
}
