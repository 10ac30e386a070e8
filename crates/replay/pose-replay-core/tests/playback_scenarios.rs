use pose_replay_core::{
    JumpEvent, PlaybackController, PlaybackEvent, PlaybackMode, PoseFrame, ReplayConfig,
    ReplaySession, TickOutcome,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Drive `c` from a host ticking at `host_hz` until playback completes.
/// Returns every index shown, starting with the current one.
fn autoplay(c: &mut PlaybackController, host_hz: f64) -> Vec<usize> {
    let dt = 1000.0 / host_hz;
    let mut shown = vec![c.current_frame_index().expect("non-empty sequence")];
    let mut t = 0.0;
    // Generous bound: never more than one step per tick.
    for _ in 0..(c.frame_count() * 20 + 20) {
        match c.tick(t) {
            TickOutcome::Advanced { to, .. } => shown.push(to),
            TickOutcome::Completed => return shown,
            TickOutcome::Waiting => {}
            other => panic!("unexpected tick outcome {other:?}"),
        }
        t += dt;
    }
    panic!("playback never completed; shown={shown:?}");
}

fn frames(n: u32) -> Vec<PoseFrame> {
    (0..n).map(|i| PoseFrame::new(i, f64::from(i) * 33.3)).collect()
}

/// it should visit 0..N-1 in order, then stop at index 0, for any host rate
#[test]
fn autoplay_visits_every_frame_once_then_rewinds() {
    init_logging();
    for host_hz in [20.0, 30.0, 60.0, 144.0] {
        for n in 1..=40usize {
            let mut c = PlaybackController::new(n, 30.0);
            assert!(c.play());
            let shown = autoplay(&mut c, host_hz);
            assert_eq!(shown, (0..n).collect::<Vec<_>>(), "n={n} host_hz={host_hz}");
            assert_eq!(c.mode(), PlaybackMode::Stopped);
            assert_eq!(c.current_frame_index(), Some(0));
        }
    }
}

#[test]
fn autoplay_event_trace() {
    let mut c = PlaybackController::new(3, 30.0);
    c.play();
    autoplay(&mut c, 60.0);
    assert_eq!(
        c.drain_events(),
        vec![
            PlaybackEvent::Started { index: 0 },
            PlaybackEvent::Advanced { from: 0, to: 1 },
            PlaybackEvent::Advanced { from: 1, to: 2 },
            PlaybackEvent::Completed { frame_count: 3 },
        ]
    );
}

/// it should always land in Stopped at clamp(k) when seeking during playback
#[test]
fn seek_during_playback_stops_at_clamped_index() {
    for n in 1..=12usize {
        let last = n as i64 - 1;
        for k in [-5, 0, 1, last, last + 1, last + 100] {
            let mut c = PlaybackController::new(n, 30.0);
            c.play();
            c.tick(0.0);
            let got = c.seek(k);
            let expected = k.clamp(0, last) as usize;
            assert_eq!(got, Some(expected), "n={n} k={k}");
            assert_eq!(c.mode(), PlaybackMode::Stopped);
            assert_eq!(c.current_frame_index(), Some(expected));
            // No stale step after the scrub.
            assert_eq!(c.tick(10_000.0), TickOutcome::Idle);
            assert_eq!(c.current_frame_index(), Some(expected));
        }
    }
}

#[test]
fn seek_clamps_far_out_of_range_targets() {
    for n in 1..=20usize {
        let mut c = PlaybackController::new(n, 30.0);
        assert_eq!(c.seek(n as i64 + 100), Some(n - 1));
        assert_eq!(c.seek(-5), Some(0));
    }
}

#[test]
fn empty_sequence_is_inert() {
    let mut c = PlaybackController::new(0, 30.0);
    assert!(!c.play());
    assert_eq!(c.mode(), PlaybackMode::Stopped);
    assert_eq!(c.current_frame_index(), None);
    assert_eq!(c.tick(100.0), TickOutcome::Idle);
    assert_eq!(c.seek(3), None);
    assert!(!c.toggle());
    assert!(c.events().is_empty());
}

/// it should cancel the clock on reload so ticks for the old sequence cannot move the new index
#[test]
fn reload_mid_playback_cancels_pending_ticks() {
    let mut c = PlaybackController::new(10, 30.0);
    let old = c.load(10);
    c.play();
    c.tick(0.0);
    c.tick(40.0);
    c.tick(80.0);
    assert_eq!(c.current_frame_index(), Some(3));

    let new = c.load(2);
    assert_ne!(old, new);
    assert_eq!(c.current_frame_index(), Some(0));
    assert_eq!(c.mode(), PlaybackMode::Stopped);
    assert_eq!(c.tick_session(old, 120.0), TickOutcome::Stale);
    assert_eq!(c.tick(120.0), TickOutcome::Idle);

    c.play();
    assert_eq!(c.tick_session(new, 160.0), TickOutcome::Advanced { from: 0, to: 1 });
    assert_eq!(c.tick_session(new, 200.0), TickOutcome::Completed);
}

#[test]
fn emptying_a_sequence_is_signalled_once() {
    let mut c = PlaybackController::new(0, 30.0);
    c.clear();
    assert!(c.drain_events().is_empty());

    let s = c.load(4);
    assert_eq!(
        c.drain_events(),
        vec![PlaybackEvent::SequenceLoaded {
            session: s,
            frame_count: 4
        }]
    );
    c.play();
    let cleared = c.clear();
    assert!(!c.is_playing());
    assert_eq!(c.current_frame_index(), None);
    let events = c.drain_events();
    assert_eq!(
        events.last(),
        Some(&PlaybackEvent::SequenceEmptied { session: cleared })
    );
}

/// 3 frames at [0, 33, 67] ms with an event on frame 1 only
#[test]
fn three_frame_hop_scenario() {
    init_logging();
    let seq = vec![
        PoseFrame::new(0, 0.0),
        PoseFrame::new(1, 33.0),
        PoseFrame::new(2, 67.0),
    ];
    let mut s = ReplaySession::with_sequence(
        ReplayConfig::default(),
        seq,
        Some(JumpEvent::new(1, 1)),
    )
    .unwrap();

    let mut trace = vec![(0usize, s.scene().is_airborne())];
    assert!(s.play());
    let mut t = 0.0;
    loop {
        match s.tick(t) {
            TickOutcome::Advanced { to, .. } => trace.push((to, s.scene().is_airborne())),
            TickOutcome::Completed => break,
            _ => {}
        }
        t += 16.7;
        assert!(t < 1000.0, "never completed");
    }
    assert_eq!(trace, vec![(0, false), (1, true), (2, false)]);
    assert!(!s.state().is_playing);
    assert_eq!(s.state().current_frame_index, Some(0));
    assert_eq!(s.readout().unwrap().to_string(), "Frame 1/3 - 0.00s");
}

#[test]
fn session_reload_resets_to_start() {
    let mut s = ReplaySession::with_sequence(ReplayConfig::default(), frames(8), None).unwrap();
    s.seek(6);
    s.load(frames(4), None);
    assert_eq!(s.state().current_frame_index, Some(0));
    assert_eq!(s.controls().scrub_max, 3);

    s.clear();
    assert_eq!(s.state().current_frame_index, None);
    assert!(!s.controls().enabled);
    assert!(s.scene().is_blank());
    assert!(s
        .drain_events()
        .iter()
        .any(|e| matches!(e, PlaybackEvent::SequenceEmptied { .. })));
}
