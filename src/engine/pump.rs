use crate::engine::channel::Channel;
use crate::wire::frame::{Frame, decode_payload};
use crate::wire::scanner::PayloadScanner;
use image::RgbImage;
use tokio::io::{AsyncBufReadExt as _, AsyncRead, AsyncReadExt as _, BufReader};

/// Decode a wire-format byte stream into images, pushing each into `tx`.
///
/// Runs as a streaming task on the engine. On the sentinel or a clean end of
/// input the channel is closed; on any structural error it is failed and the
/// stream is abandoned. Nothing is retried.
pub(crate) async fn pump_images<R>(mut reader: R, block_size: usize, tx: Channel<RgbImage>)
where
    R: AsyncRead + Unpin,
{
    let mut scanner = PayloadScanner::new();
    let mut buf = vec![0u8; block_size.max(1)];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "frame stream read failed");
                tx.fail(anyhow::Error::new(e).context("read block from stream").into());
                return;
            }
        };
        if n == 0 {
            break;
        }
        scanner.push(&String::from_utf8_lossy(&buf[..n]));

        while let Some(payload) = scanner.next_payload() {
            match decode_payload(&payload) {
                Ok(Frame::Sentinel) => {
                    tx.close();
                    return;
                }
                Ok(Frame::Data(frame)) => match frame.into_image() {
                    Ok(img) => tx.send(img),
                    Err(e) => {
                        tracing::warn!(error = %e, "frame stream aborted");
                        tx.fail(e);
                        return;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "frame stream aborted");
                    tx.fail(e);
                    return;
                }
            }
        }
    }

    match scanner.finish() {
        Ok(()) => tx.close(),
        Err(e) => {
            tracing::warn!(error = %e, "frame stream ended mid-frame");
            tx.fail(e);
        }
    }
}

/// Stream diagnostic lines into `tx`, one item per line.
///
/// Line terminators are stripped; invalid UTF-8 is replaced lossily, since
/// diagnostics are human-readable text, not structured data.
pub(crate) async fn pump_lines<R>(reader: R, tx: Channel<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();
    loop {
        raw.clear();
        let n = match reader.read_until(b'\n', &mut raw).await {
            Ok(n) => n,
            Err(e) => {
                tx.fail(anyhow::Error::new(e).context("read diagnostic line").into());
                return;
            }
        };
        if n == 0 {
            tx.close();
            return;
        }
        let line = String::from_utf8_lossy(&raw)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        tx.send(line);
    }
}
