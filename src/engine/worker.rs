use crate::engine::channel::{Collector, channel};
use crate::engine::pump::pump_images;
use crate::foundation::config::Config;
use crate::foundation::error::FramewireResult;
use anyhow::Context as _;
use image::RgbImage;
use std::future::Future;
use std::path::PathBuf;
use std::thread;

/// Background execution engine: one dedicated worker thread hosting a
/// cooperative task scheduler for the life of the process.
///
/// All streaming decode work runs here, never on the consumer thread. The
/// engine is started explicitly before first use, passed by reference to
/// anything that submits work, and stopped explicitly with
/// [`Engine::shutdown`] (or on drop). There is no hidden global instance.
///
/// The scheduler is a tokio current-thread runtime driven by the worker
/// thread, so any number of streaming tasks (for example the two output
/// pipelines of one renderer subprocess) multiplex cooperatively on the one
/// thread without blocking each other.
pub struct Engine {
    handle: tokio::runtime::Handle,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Engine {
    /// Start the worker thread and its scheduler.
    pub fn start() -> FramewireResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("build engine runtime")?;
        let handle = runtime.handle().clone();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let worker = thread::Builder::new()
            .name("framewire-engine".into())
            .spawn(move || {
                tracing::debug!("engine worker thread started");
                runtime.block_on(async {
                    let _ = shutdown_rx.await;
                });
                // Dropping the runtime cancels in-flight streaming tasks
                // (their readers and subprocess handles are dropped with
                // them) before the worker thread exits.
                drop(runtime);
                tracing::debug!("engine worker thread stopped");
            })
            .context("spawn engine worker thread")?;

        Ok(Self {
            handle,
            shutdown: Some(shutdown_tx),
            worker: Some(worker),
        })
    }

    /// Run a closure once on the worker thread. Never blocks the caller and
    /// may be called from any thread.
    pub fn submit<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.spawn(async move { f() });
    }

    /// Schedule a long-running streaming task. Never blocks the caller.
    ///
    /// The task's only channel back to the caller is whatever
    /// [`Channel`](crate::engine::channel::Channel) it writes to; its
    /// lifetime is bounded by the engine's.
    pub fn submit_stream<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let _ = self.spawn_stream(fut);
    }

    pub(crate) fn spawn_stream<F>(&self, fut: F) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut)
    }

    /// Enter the scheduler context, for APIs that must be called inside a
    /// runtime (subprocess spawning).
    pub(crate) fn enter(&self) -> tokio::runtime::EnterGuard<'_> {
        self.handle.enter()
    }

    /// Decode a wire-format file into images in the background.
    ///
    /// Returns immediately; the consumer polls the collector until it is
    /// finished. A failed decode closes the collector with the error
    /// attached.
    pub fn decode_file(&self, path: impl Into<PathBuf>, config: &Config) -> Collector<RgbImage> {
        let path = path.into();
        let block_size = config.block_size;
        let (tx, rx) = channel();
        self.submit_stream(async move {
            let file = match tokio::fs::File::open(&path).await {
                Ok(f) => f,
                Err(e) => {
                    tx.fail(
                        anyhow::Error::new(e)
                            .context(format!("open stream file '{}'", path.display()))
                            .into(),
                    );
                    return;
                }
            };
            pump_images(file, block_size, tx).await;
        });
        rx
    }

    /// Decode the wire format from standard input in the background.
    ///
    /// A stdin read that never completes can delay engine shutdown until
    /// input (or end-of-input) arrives; that is a property of reading stdin
    /// asynchronously, accepted here rather than worked around.
    pub fn decode_stdin(&self, config: &Config) -> Collector<RgbImage> {
        let block_size = config.block_size;
        let (tx, rx) = channel();
        self.submit_stream(async move {
            pump_images(tokio::io::stdin(), block_size, tx).await;
        });
        rx
    }

    /// Stop the engine: reject further work, cancel in-flight streaming
    /// tasks, and release their OS resources before returning.
    pub fn shutdown(self) {
        // Consuming self ends all borrows that could submit; Drop stops the
        // worker.
    }

    fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("engine worker thread panicked during shutdown");
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn wait_until(mut cond: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out waiting for engine");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn submitted_closures_run_on_the_worker() {
        let engine = Engine::start().unwrap();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        engine.submit(move || {
            assert_eq!(
                thread::current().name(),
                Some("framewire-engine"),
                "work must run on the engine thread"
            );
            flag.store(true, Ordering::SeqCst);
        });
        wait_until(|| ran.load(Ordering::SeqCst));
        engine.shutdown();
    }

    #[test]
    fn streaming_tasks_feed_channels() {
        let engine = Engine::start().unwrap();
        let (tx, rx) = crate::engine::channel::channel();
        engine.submit_stream(async move {
            for i in 0..5u32 {
                tx.send(i);
                tokio::task::yield_now().await;
            }
            tx.close();
        });

        let mut seen = Vec::new();
        wait_until(|| {
            seen.extend(rx.drain());
            rx.finished()
        });
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        engine.shutdown();
    }

    #[test]
    fn shutdown_joins_the_worker_thread() {
        let engine = Engine::start().unwrap();
        engine.submit(|| {});
        engine.shutdown();
    }
}
