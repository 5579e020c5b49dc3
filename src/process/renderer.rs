use crate::engine::channel::{Collector, channel};
use crate::engine::pump::{pump_images, pump_lines};
use crate::engine::worker::Engine;
use crate::foundation::config::Config;
use crate::foundation::error::{FramewireError, FramewireResult};
use image::RgbImage;
use std::process::Stdio;
use tokio::io::AsyncWriteExt as _;
use tokio::process::Command;

/// Fixed arguments instructing the renderer to read its script from stdin.
const RENDERER_ARGS: &[&str] = &["-s", "-"];

/// A live render: the renderer subprocess plus the channels carrying its two
/// output streams.
///
/// Spawning walks a one-way state machine (spawned, write input, drain both
/// outputs, exited) with no transition back. Both output streams are
/// drained by independent tasks on the engine, so neither pipe's OS buffer
/// can fill up while the other is still being read (which would deadlock the
/// renderer).
#[derive(Debug)]
pub struct RenderJob {
    /// Decoded frames, in production order.
    pub images: Collector<RgbImage>,
    /// Human-readable diagnostic lines from the renderer.
    pub messages: Collector<String>,
    /// Exactly one item once the process has exited: `Ok(())` on success or
    /// [`FramewireError::Exit`] on a nonzero status. Independent of the
    /// frames already delivered; those remain valid and are not retracted.
    pub status: Collector<FramewireResult<()>>,
}

impl RenderJob {
    /// Spawn the configured renderer and stream `script` to it.
    ///
    /// A missing or unexecutable renderer fails here, synchronously, with
    /// [`FramewireError::Launch`]; no stream processing starts.
    #[tracing::instrument(skip(engine, config, script))]
    pub fn spawn(engine: &Engine, config: &Config, script: &str) -> FramewireResult<RenderJob> {
        let exe = config
            .renderer
            .clone()
            .ok_or_else(|| FramewireError::launch("no renderer executable configured"))?;

        // tokio child handles must be created inside the scheduler context.
        let _guard = engine.enter();
        let mut child = Command::new(&exe)
            .args(RENDERER_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FramewireError::launch(format!(
                    "failed to spawn renderer '{}': {e}",
                    exe.display()
                ))
            })?;
        tracing::debug!(renderer = %exe.display(), pid = ?child.id(), "renderer spawned");

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| FramewireError::launch("renderer stdin was not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FramewireError::launch("renderer stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| FramewireError::launch("renderer stderr was not piped"))?;

        let (image_tx, images) = channel();
        let (message_tx, messages) = channel();
        let (status_tx, status) = channel();

        let image_task = engine.spawn_stream(pump_images(stdout, config.block_size, image_tx));
        let message_task = engine.spawn_stream(pump_lines(stderr, message_tx));

        let script = script.to_owned();
        engine.submit_stream(async move {
            // A renderer that exits early closes its end of the pipe; the
            // exit status carries the failure, so a short write is not fatal
            // here.
            if let Err(e) = stdin.write_all(script.as_bytes()).await {
                tracing::warn!(error = %e, "renderer closed stdin before the script was fully sent");
            }
            // End-of-input tells the renderer the script is fully sent.
            drop(stdin);

            let _ = image_task.await;
            let _ = message_task.await;

            match child.wait().await {
                Ok(exit) if exit.success() => status_tx.send(Ok(())),
                Ok(exit) => status_tx.send(Err(FramewireError::exit(exit.code()))),
                Err(e) => status_tx.send(Err(anyhow::Error::new(e)
                    .context("wait for renderer exit")
                    .into())),
            }
            status_tx.close();
        });

        Ok(RenderJob {
            images,
            messages,
            status,
        })
    }
}
