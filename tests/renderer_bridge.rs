//! Bridge tests against a stub renderer: a shell script that consumes the
//! script on stdin, writes wire-format frames to stdout and diagnostics to
//! stderr.
#![cfg(unix)]

use framewire::{Config, Engine, FrameRgb, FramewireError, RenderJob, encode_frame, encode_sentinel};
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn sh_available() -> bool {
    std::path::Path::new("/bin/sh").exists()
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("framewire_bridge_{}_{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_stub(dir: &PathBuf, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt as _;
    let path = dir.join("renderer.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn wire_file(dir: &PathBuf, frames: &[FrameRgb], terminated: bool) -> PathBuf {
    let mut out = String::new();
    for f in frames {
        out.push_str(&encode_frame(f).unwrap());
        out.push('\n');
    }
    if terminated {
        out.push_str(&encode_sentinel());
    }
    let path = dir.join("frames.wif");
    std::fs::write(&path, out).unwrap();
    path
}

fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for renderer");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn renderer_output_flows_through_both_channels() {
    if !sh_available() {
        eprintln!("skipping: /bin/sh not available");
        return;
    }
    init_logging();

    let dir = fixture_dir("ok");
    let frames = [
        FrameRgb {
            width: 1,
            height: 1,
            data: vec![10, 20, 30],
        },
        FrameRgb {
            width: 2,
            height: 1,
            data: vec![1, 2, 3, 4, 5, 6],
        },
    ];
    let data = wire_file(&dir, &frames, true);
    let stub = write_stub(
        &dir,
        &format!(
            "cat > /dev/null\n\
             echo 'rendering scene' >&2\n\
             cat '{}'\n\
             echo 'render complete' >&2\n",
            data.display()
        ),
    );

    let engine = Engine::start().unwrap();
    let config = Config {
        block_size: 32,
        renderer: Some(stub),
    };
    let job = RenderJob::spawn(&engine, &config, "sphere { radius 1 }\n").unwrap();

    let mut images = Vec::new();
    let mut messages = Vec::new();
    let mut status = Vec::new();
    wait_until(|| {
        images.extend(job.images.drain());
        messages.extend(job.messages.drain());
        status.extend(job.status.drain());
        job.images.finished() && job.messages.finished() && job.status.finished()
    });

    assert!(job.images.take_error().is_none());
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].get_pixel(0, 0).0, [10, 20, 30]);
    assert_eq!(images[1].get_pixel(1, 0).0, [4, 5, 6]);

    assert_eq!(messages, vec!["rendering scene", "render complete"]);

    assert_eq!(status.len(), 1);
    assert!(status[0].is_ok());

    engine.shutdown();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn script_is_written_to_renderer_stdin() {
    if !sh_available() {
        eprintln!("skipping: /bin/sh not available");
        return;
    }
    init_logging();

    let dir = fixture_dir("stdin");
    // Echo the received script to stderr, then terminate the frame stream.
    let stub = write_stub(
        &dir,
        "sed 's/^/script: /' >&2\nprintf '%s' '<<<AAAAAA==>>>'\n",
    );

    let engine = Engine::start().unwrap();
    let config = Config {
        renderer: Some(stub),
        ..Config::default()
    };
    let job = RenderJob::spawn(&engine, &config, "line one\nline two\n").unwrap();

    let mut messages = Vec::new();
    wait_until(|| {
        messages.extend(job.messages.drain());
        job.messages.finished()
    });
    assert_eq!(messages, vec!["script: line one", "script: line two"]);

    engine.shutdown();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn nonzero_exit_is_reported_without_retracting_frames() {
    if !sh_available() {
        eprintln!("skipping: /bin/sh not available");
        return;
    }
    init_logging();

    let dir = fixture_dir("fail");
    let frames = [FrameRgb {
        width: 1,
        height: 1,
        data: vec![7, 8, 9],
    }];
    // No sentinel: the renderer dies before finishing.
    let data = wire_file(&dir, &frames, false);
    let stub = write_stub(
        &dir,
        &format!(
            "cat > /dev/null\n\
             cat '{}'\n\
             echo 'out of memory' >&2\n\
             exit 3\n",
            data.display()
        ),
    );

    let engine = Engine::start().unwrap();
    let config = Config {
        renderer: Some(stub),
        ..Config::default()
    };
    let job = RenderJob::spawn(&engine, &config, "scene\n").unwrap();

    let mut images = Vec::new();
    let mut status = Vec::new();
    wait_until(|| {
        images.extend(job.images.drain());
        status.extend(job.status.drain());
        job.images.finished() && job.status.finished()
    });

    // Frames decoded before the failure remain valid.
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].get_pixel(0, 0).0, [7, 8, 9]);

    assert_eq!(status.len(), 1);
    assert!(matches!(
        status[0],
        Err(FramewireError::Exit { code: Some(3) })
    ));

    engine.shutdown();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_executable_fails_at_spawn() {
    init_logging();

    let engine = Engine::start().unwrap();
    let config = Config {
        renderer: Some(PathBuf::from("/nonexistent/renderer")),
        ..Config::default()
    };
    let err = RenderJob::spawn(&engine, &config, "scene\n").unwrap_err();
    assert!(matches!(err, FramewireError::Launch(_)));

    let config = Config::default();
    let err = RenderJob::spawn(&engine, &config, "scene\n").unwrap_err();
    assert!(matches!(err, FramewireError::Launch(_)));

    engine.shutdown();
}
