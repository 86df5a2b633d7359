//! Tests for progress counters and rendering.

use parfetch::progress::{render_line, ProgressBarOpts, ProgressRenderer, ProgressState, RenderStyle};
use parfetch::CancellationToken;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Writer shared with the test so the rendered text can be inspected.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

#[test]
fn test_render_line_format() {
    let line = render_line(50, 500, 1000, 100, Duration::from_millis(1500));
    let expected = format!(
        "\r50%[{}>{}]  500 B/1.00 KB  100 B/s    in 1.5s",
        "=".repeat(24),
        " ".repeat(25)
    );
    assert_eq!(line, expected);
}

#[test]
fn test_render_line_caps_overflowing_percent() {
    let full = render_line(100, 10, 10, 0, Duration::ZERO);
    let over = render_line(250, 10, 10, 0, Duration::ZERO);
    assert_eq!(full.matches('=').count(), over.matches('=').count());
}

#[test]
fn test_progress_percent_and_speed() {
    let state = ProgressState::new(Duration::from_millis(100));
    assert_eq!(state.percent(), None);

    state.start(4000);
    state.add(1000);
    state.add(1000);
    assert_eq!(state.transferred(), 2000);
    assert_eq!(state.percent(), Some(50));
    assert_eq!(state.instantaneous_speed(), 20_000);
}

#[tokio::test]
async fn test_concurrent_writers() {
    let state = Arc::new(ProgressState::new(Duration::from_millis(10)));
    state.start(8 * 1000);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            tokio::spawn(async move {
                for _ in 0..1000 {
                    state.add(1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(state.transferred(), 8000);
    assert_eq!(state.percent(), Some(100));
}

#[tokio::test]
async fn test_renderer_draws_until_stopped() {
    let state = Arc::new(ProgressState::new(Duration::from_millis(5)));
    state.start(1000);
    state.add(400);

    let out = Captured::default();
    let renderer =
        ProgressRenderer::with_writer(state.clone(), RenderStyle::Line, Box::new(out.clone()));
    let stop = CancellationToken::new();
    let handle = tokio::spawn(renderer.run(stop.clone()));

    tokio::time::sleep(Duration::from_millis(30)).await;
    stop.cancel();
    let mut renderer = handle.await.unwrap();
    state.finish();
    renderer.finish();

    let text = out.text();
    assert!(text.contains("\r40%["));
    assert!(text.ends_with('\n'));
    let last = text.trim_end().rsplit('\r').next().unwrap();
    assert!(last.starts_with("100%["));
    assert!(last.contains("400 B/1.00 KB"));
}

#[tokio::test]
async fn test_hidden_renderer_writes_nothing() {
    let state = Arc::new(ProgressState::new(Duration::from_millis(5)));
    state.start(10);
    state.add(10);

    let out = Captured::default();
    let mut renderer =
        ProgressRenderer::with_writer(state, RenderStyle::Hidden, Box::new(out.clone()));
    renderer.finish();
    renderer.abandon();

    assert!(out.text().is_empty());
}

#[test]
fn test_bar_opts() {
    let hidden = ProgressBarOpts::hidden();
    assert!(!RenderStyle::Bar(hidden).is_enabled());
    assert!(RenderStyle::Bar(ProgressBarOpts::default()).is_enabled());

    let bar = ProgressBarOpts::with_pip_style().to_progress_bar(100);
    assert_eq!(bar.length(), Some(100));
}
