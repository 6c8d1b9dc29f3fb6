use super::*;
use crate::foundation::core::{Canvas, Rgba8};
use crate::video::sink::InMemorySink;
use crate::video::source::InMemoryFrames;

fn fps() -> Fps {
    Fps::new(1, 1).unwrap()
}

fn numbered(n: u8) -> InMemoryFrames {
    InMemoryFrames::from_frames(
        (0..n)
            .map(|i| PixelBuffer::filled(2, 2, Rgba8::opaque(i * 10, 0, 0)).unwrap())
            .collect(),
    )
    .unwrap()
}

/// Decodes like a 2x2 sequence of `len` frames until it reaches `fail_at`.
struct Flaky {
    len: u64,
    fail_at: u64,
    wrong_size: bool,
}

impl FrameSource for Flaky {
    fn len(&self) -> u64 {
        self.len
    }

    fn dimensions(&self) -> Canvas {
        Canvas {
            width: 2,
            height: 2,
        }
    }

    fn decode(&mut self, index: u64) -> MediaLabResult<PixelBuffer> {
        if index != self.fail_at {
            return PixelBuffer::new(2, 2);
        }
        if self.wrong_size {
            PixelBuffer::new(3, 3)
        } else {
            Err(MediaLabError::decode(index, "corrupt frame"))
        }
    }
}

#[test]
fn progress_is_reported_after_every_frame() {
    let mut input = numbered(4);
    let mut seen = Vec::new();
    let mut progress = |p: f64| seen.push(p);
    let mut sink = InMemorySink::new();

    let outcome = SequentialDriver::new(fps())
        .apply(&FrameEffect::Reverse, &mut input, None, &mut progress, &mut sink)
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed { frames: 4 });
    assert_eq!(seen, vec![25.0, 50.0, 75.0, 100.0]);
    assert!(sink.is_complete());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height, cfg.frame_count), (2, 2, 4));
    let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn reversing_twice_restores_the_input() {
    let original = numbered(5);
    let mut driver = SequentialDriver::new(fps());

    let mut first = original.clone();
    let mut sink = InMemorySink::new();
    driver
        .apply(&FrameEffect::Reverse, &mut first, None, &mut NoProgress, &mut sink)
        .unwrap();

    let mut reversed = InMemoryFrames::from_frames(sink.into_frames()).unwrap();
    let mut sink = InMemorySink::new();
    driver
        .apply(&FrameEffect::Reverse, &mut reversed, None, &mut NoProgress, &mut sink)
        .unwrap();

    assert_eq!(sink.into_frames(), original.into_frames());
}

#[test]
fn cancelling_from_progress_discards_partial_output() {
    let mut input = numbered(4);
    let mut driver = SequentialDriver::new(fps());
    let token = driver.cancel_token();
    let mut seen = Vec::new();
    let mut progress = |p: f64| {
        seen.push(p);
        if p >= 50.0 {
            token.cancel();
        }
    };
    let mut sink = InMemorySink::new();

    let outcome = driver
        .apply(&FrameEffect::Reverse, &mut input, None, &mut progress, &mut sink)
        .unwrap();

    assert_eq!(outcome, RunOutcome::Cancelled { completed: 2 });
    assert_eq!(seen, vec![25.0, 50.0]);
    assert!(sink.config().is_none());
    assert!(sink.frames().is_empty());
    assert!(!driver.cancel_token().is_cancelled());
}

#[test]
fn stale_cancel_requests_do_not_leak_into_the_next_run() {
    let mut input = numbered(2);
    let mut driver = SequentialDriver::new(fps());
    driver.cancel_token().cancel();

    let mut sink = InMemorySink::new();
    let outcome = driver
        .apply(&FrameEffect::Reverse, &mut input, None, &mut NoProgress, &mut sink)
        .unwrap();
    assert_eq!(outcome, RunOutcome::Completed { frames: 2 });
}

#[test]
fn decode_failure_aborts_without_touching_the_sink() {
    let mut input = Flaky {
        len: 3,
        fail_at: 1,
        wrong_size: false,
    };
    let mut sink = InMemorySink::new();
    let err = SequentialDriver::new(fps())
        .apply(&FrameEffect::Reverse, &mut input, None, &mut NoProgress, &mut sink)
        .unwrap_err();

    assert!(matches!(err, MediaLabError::Decode { index: 1, .. }));
    assert!(sink.config().is_none());
}

#[test]
fn frames_of_the_wrong_size_are_decode_failures() {
    let mut input = Flaky {
        len: 2,
        fail_at: 0,
        wrong_size: true,
    };
    let mut driver = SequentialDriver::new(fps());
    let mut run = driver
        .start(&FrameEffect::MotionBlur { blur_frames: 2 }, &mut input, None)
        .unwrap();

    let err = run.step(&mut NoProgress).unwrap_err();
    assert!(matches!(err, MediaLabError::Decode { index: 0, .. }));
    // The run stays aborted.
    assert!(run.step(&mut NoProgress).is_err());
    assert!(run.assemble(&mut InMemorySink::new()).is_err());
}

#[test]
fn runs_can_be_stepped_by_the_host() {
    let mut a = numbered(3);
    let mut b = numbered(3);
    let mut driver = SequentialDriver::new(fps());
    let effect = FrameEffect::CrossFade {
        cross_fade_secs: 1.0,
    };
    let mut run = driver.start(&effect, &mut a, Some(&mut b)).unwrap();
    assert_eq!(run.output_length(), 5);

    let mut steps = Vec::new();
    loop {
        let step = run.step(&mut NoProgress).unwrap();
        steps.push(step);
        if matches!(step, Step::Finished { .. }) {
            break;
        }
    }
    assert_eq!(steps.len(), 5);
    assert_eq!(steps[0], Step::Progress { completed: 1, total: 5 });
    assert_eq!(
        run.state(),
        RunState {
            current_index: 5,
            completed_count: 5,
            cancelled: false,
        }
    );
    // Stepping a finished run is a no-op.
    assert_eq!(run.step(&mut NoProgress).unwrap(), Step::Finished { total: 5 });

    let frames = run.into_frames().unwrap();
    let reds: Vec<u8> = frames.iter().map(|f| f.data()[0]).collect();
    assert_eq!(reds, vec![0, 10, 20, 10, 20]);
}

#[test]
fn prepare_errors_surface_before_any_frame() {
    let mut input = numbered(2);
    let mut driver = SequentialDriver::new(fps());
    let effect = FrameEffect::CrossFade {
        cross_fade_secs: 1.0,
    };
    let err = driver.start(&effect, &mut input, None).unwrap_err();
    assert!(matches!(err, MediaLabError::Validation(_)));
}

fn cross_fade_through(
    driver: &mut SequentialDriver,
    first: &mut dyn FrameSource,
    second: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
) -> MediaLabResult<RunOutcome> {
    let effect = FrameEffect::CrossFade {
        cross_fade_secs: 1.0,
    };
    driver.apply(&effect, first, Some(second), &mut NoProgress, sink)
}

#[test]
fn apply_accepts_a_second_source_borrowed_apart_from_the_driver() {
    let mut driver = SequentialDriver::new(fps());
    let mut sink = InMemorySink::new();
    {
        let mut a = numbered(3);
        let mut b = numbered(3);
        let outcome = cross_fade_through(&mut driver, &mut a, &mut b, &mut sink).unwrap();
        assert_eq!(outcome, RunOutcome::Completed { frames: 5 });
    }
    let reds: Vec<u8> = sink.frames().iter().map(|(_, f)| f.data()[0]).collect();
    assert_eq!(reds, vec![0, 10, 20, 10, 20]);

    // The driver is free again once the run is done.
    let mut again = numbered(1);
    let outcome = driver
        .apply(&FrameEffect::Reverse, &mut again, None, &mut NoProgress, &mut InMemorySink::new())
        .unwrap();
    assert_eq!(outcome, RunOutcome::Completed { frames: 1 });
}
