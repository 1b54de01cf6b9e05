use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use nativeview_core::input::buttons;
use nativeview_core::{
    BackendRef, BindingError, BindingResult, BoundaryCall, FrameRate, InputEvent, LifecycleGate,
    ModuleLoader, ModuleSpec, RecordingBackend, SurfaceDescriptor, SurfaceLifecycleState,
    ViewSession,
};

fn session(rate: u32) -> (Arc<RecordingBackend>, ViewSession) {
    let _ = env_logger::builder().is_test(true).try_init();
    let rec = Arc::new(RecordingBackend::new());
    let s = ViewSession::new(SurfaceDescriptor::default(), rec.clone(), FrameRate::new(rate));
    (rec, s)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn activate_forwards_init_then_full_size_reshape() {
    let (rec, mut s) = session(1);
    assert!(rec.calls().is_empty(), "create must not cross the boundary");

    s.activate().expect("activate");
    s.shutdown();

    let calls = rec.non_display_calls();
    assert_eq!(
        calls,
        vec![
            BoundaryCall::Init,
            BoundaryCall::Reshape { x: 0, y: 0, width: 400, height: 400 },
            BoundaryCall::Dispose,
        ]
    );
}

#[test]
fn init_precedes_everything_and_happens_once() {
    let (rec, mut s) = session(120);
    s.activate().expect("activate");
    s.activate().expect("second activate is a no-op");

    s.input(InputEvent::Enter { x: 0, y: 0 });
    s.resize(0, 0);
    thread::sleep(Duration::from_millis(30));
    s.shutdown();

    let calls = rec.calls();
    assert_eq!(calls[0], BoundaryCall::Init);
    assert_eq!(rec.count(|c| matches!(c, BoundaryCall::Init)), 1);
    assert!(calls.contains(&BoundaryCall::Reshape { x: 0, y: 0, width: 1, height: 1 }));
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn move_then_click_is_forwarded_in_order() {
    let (rec, mut s) = session(1);
    s.activate().expect("activate");

    s.input(InputEvent::Move { x: 10, y: 10 });
    s.input(InputEvent::Click { x: 10, y: 10, button: buttons::LEFT, count: 1 });
    s.shutdown();

    assert_eq!(
        rec.non_display_calls(),
        vec![
            BoundaryCall::Init,
            BoundaryCall::Reshape { x: 0, y: 0, width: 400, height: 400 },
            BoundaryCall::MouseMove { x: 10, y: 10 },
            BoundaryCall::MouseClick { x: 10, y: 10, button: 1, click_count: 1 },
            BoundaryCall::Dispose,
        ]
    );
}

#[test]
fn sixty_hz_for_one_second_with_interleaved_input() {
    let (rec, mut s) = session(60);
    s.activate().expect("activate");

    let started = Instant::now();
    let mut sent = Vec::new();
    let mut i = 0;
    while started.elapsed() < Duration::from_secs(1) {
        let ev = InputEvent::Move { x: i, y: -i };
        s.input(ev);
        sent.push(ev.to_call());
        i += 1;
        thread::sleep(Duration::from_millis(7));
    }
    let stats = s.shutdown().expect("first shutdown");

    // Timer scheduling on shared CI hosts is loose; bound it, don't pin it.
    let displays = rec.display_count();
    assert!((45..=65).contains(&displays), "got {displays} displays");
    assert_eq!(displays as u64, stats.forwarded);

    let stamps: Vec<Instant> = rec
        .records()
        .into_iter()
        .filter(|r| matches!(r.call, BoundaryCall::Display))
        .map(|r| r.at)
        .collect();
    let gaps: Vec<Duration> = stamps.windows(2).map(|w| w[1] - w[0]).collect();
    let mean = gaps.iter().sum::<Duration>() / gaps.len() as u32;
    assert!(
        mean > Duration::from_millis(12) && mean < Duration::from_millis(22),
        "mean gap {mean:?}"
    );

    let moves: Vec<BoundaryCall> = rec
        .calls()
        .into_iter()
        .filter(|c| matches!(c, BoundaryCall::MouseMove { .. }))
        .collect();
    assert_eq!(moves, sent);
}

// ============================================================================
// Disposal
// ============================================================================

#[test]
fn display_after_dispose_is_rejected() {
    let (rec, mut s) = session(1);
    s.activate().expect("activate");
    s.shutdown();

    s.redraw();
    s.input(InputEvent::Wheel { delta: -1.0 });
    s.resize(10, 10);

    assert_eq!(rec.calls().last(), Some(&BoundaryCall::Dispose));
    assert_eq!(s.state(), SurfaceLifecycleState::Disposed);
    assert_eq!(s.translator().rejected_calls(), 3);
}

#[test]
fn no_display_observed_after_shutdown_with_slow_frames() {
    let rec = Arc::new(RecordingBackend::with_display_delay(Duration::from_millis(8)));
    let mut s = ViewSession::new(SurfaceDescriptor::default(), rec.clone(), FrameRate::new(200));
    s.activate().expect("activate");

    thread::sleep(Duration::from_millis(80));
    s.shutdown();
    let at_shutdown = rec.calls();
    thread::sleep(Duration::from_millis(50));

    assert_eq!(at_shutdown.last(), Some(&BoundaryCall::Dispose));
    assert_eq!(rec.calls(), at_shutdown);
}

#[test]
fn concurrent_ui_input_and_frames_never_interleave_past_dispose() {
    let (rec, mut s) = session(500);
    s.activate().expect("activate");

    let translator = Arc::clone(s.translator());
    let ui = thread::spawn(move || {
        for i in 0..2_000 {
            translator.forward(InputEvent::Drag { x: i, y: i, button: buttons::LEFT });
        }
    });

    thread::sleep(Duration::from_millis(5));
    s.shutdown();
    ui.join().expect("ui thread");

    let calls = rec.calls();
    let dispose_at = calls
        .iter()
        .position(|c| *c == BoundaryCall::Dispose)
        .expect("dispose forwarded");
    assert_eq!(dispose_at, calls.len() - 1, "calls after dispose: {:?}", &calls[dispose_at..]);

    let drags: Vec<i32> = calls
        .iter()
        .filter_map(|c| match c {
            BoundaryCall::MouseDrag { x, .. } => Some(*x),
            _ => None,
        })
        .collect();
    assert!(drags.windows(2).all(|w| w[0] < w[1]), "drag order broken");
}

// ============================================================================
// Gate
// ============================================================================

struct FailingLoader;

impl ModuleLoader for FailingLoader {
    fn load(&self, spec: &ModuleSpec) -> BindingResult<BackendRef> {
        Err(BindingError::NoCandidate { dir: spec.search_dir().to_path_buf() })
    }
}

#[test]
fn load_failure_leaves_nothing_to_call() {
    let gate = LifecycleGate::new();
    let err = gate
        .ensure_ready(&FailingLoader, &ModuleSpec::scan("/nonexistent"))
        .err()
        .expect("load fails");

    assert!(err.to_string().contains("no backend library found"));
    assert!(!gate.is_ready());
    assert!(gate.backend().is_none());
}
