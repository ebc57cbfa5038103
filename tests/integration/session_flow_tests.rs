//! Integration tests for the full session pipeline: serial intake →
//! session controller → calibration → telemetry, driven through the
//! port traits exactly as the device main loop drives them.

use crate::mock_hw::{MockAdc, MockClock, MockConsole};

use strainlog::app::service::SessionService;
use strainlog::config::SystemConfig;
use strainlog::session::StateId;
use strainlog::telemetry;

fn boot() -> (SessionService, MockAdc, MockConsole, MockClock) {
    let mut service = SessionService::new(SystemConfig::default());
    service.start();
    (service, MockAdc::new(), MockConsole::new(), MockClock::new())
}

fn tick(
    service: &mut SessionService,
    adc: &mut MockAdc,
    console: &mut MockConsole,
    clock: &MockClock,
) -> StateId {
    service.tick(adc, console, clock)
}

/// Drive the device from boot into a running session.
fn configure(
    service: &mut SessionService,
    adc: &mut MockAdc,
    console: &mut MockConsole,
    clock: &mut MockClock,
    duration: &str,
    weight: &str,
) {
    tick(service, adc, console, clock); // flush the duration prompt
    console.reply(duration);
    tick(service, adc, console, clock);
    console.reply(weight);
    tick(service, adc, console, clock);
    clock.advance_secs(1.0); // settle window
    let state = tick(service, adc, console, clock);
    assert_eq!(state, StateId::Running, "configure should start the run");
}

/// One ready conversion at a given offset from the previous tick.
fn sample_after(
    service: &mut SessionService,
    adc: &mut MockAdc,
    console: &mut MockConsole,
    clock: &mut MockClock,
    raw: i32,
    dt_secs: f64,
) -> StateId {
    clock.advance_secs(dt_secs);
    adc.push_sample(raw);
    tick(service, adc, console, clock)
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn full_session_transcript_matches_the_protocol() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    configure(&mut service, &mut adc, &mut console, &mut clock, "2", "1.0");

    sample_after(&mut service, &mut adc, &mut console, &mut clock, 408_550, 0.5);
    sample_after(&mut service, &mut adc, &mut console, &mut clock, 408_550, 0.5);
    let state = sample_after(&mut service, &mut adc, &mut console, &mut clock, 408_550, 1.0);
    assert_eq!(state, StateId::Finished);

    // Finished -> rerun prompt on the next tick.
    let state = tick(&mut service, &mut adc, &mut console, &clock);
    assert_eq!(state, StateId::AwaitingRerunDecision);

    let tx = &console.tx;
    let pos = |needle: &str| {
        tx.iter()
            .position(|l| l == needle)
            .unwrap_or_else(|| panic!("missing line {needle:?} in {tx:#?}"))
    };

    // Ordering of the protocol phases.
    assert!(pos(telemetry::PROMPT_DURATION) < pos(telemetry::PROMPT_CAL_WEIGHT));
    assert!(pos(telemetry::PROMPT_CAL_WEIGHT) < pos("CONFIG RECEIVED"));
    assert!(pos("CONFIG RECEIVED") < pos(telemetry::MARKER_READY));
    assert!(pos(telemetry::MARKER_READY) < pos(telemetry::MARKER_START));
    assert!(pos(telemetry::MARKER_START) < pos(telemetry::MARKER_DONE));
    assert!(pos(telemetry::MARKER_DONE) < pos(telemetry::PROMPT_RERUN));

    assert_eq!(console.lines_matching("time: ").len(), 3);
    assert_eq!(console.lines_matching("Average raw value: ").len(), 1);
}

#[test]
fn sample_line_honours_the_collector_contract() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    configure(&mut service, &mut adc, &mut console, &mut clock, "10", "1.0");

    sample_after(&mut service, &mut adc, &mut console, &mut clock, 408_550, 0.5);

    // delta = 210.53 counts over the positive slope -> 1.005877 g
    assert_eq!(
        console.tx.last().unwrap(),
        "time: 0.500000 raw: 408550 modified_weight: 1.005877"
    );
}

#[test]
fn boundary_sample_is_included_in_the_statistics() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    configure(&mut service, &mut adc, &mut console, &mut clock, "2", "1.0");

    sample_after(&mut service, &mut adc, &mut console, &mut clock, 100, 1.0);
    assert_eq!(service.state(), StateId::Running);
    // Elapsed hits the duration exactly: processed first, then closed.
    let state = sample_after(&mut service, &mut adc, &mut console, &mut clock, 400, 1.0);
    assert_eq!(state, StateId::Finished);
    assert_eq!(service.run_sample_count(), 2);

    let summary = service.last_summary().unwrap();
    assert!((summary.average_raw - 250.0).abs() < 1e-9);
}

#[test]
fn no_ready_sample_means_no_output_and_no_termination() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    configure(&mut service, &mut adc, &mut console, &mut clock, "1", "1.0");
    let written = console.tx.len();

    // Ten seconds of idle polling, well past the duration: with no
    // conversion ready the run stays open and the wire stays quiet.
    for _ in 0..100 {
        clock.advance_secs(0.1);
        tick(&mut service, &mut adc, &mut console, &clock);
    }
    assert_eq!(service.state(), StateId::Running);
    assert_eq!(console.tx.len(), written);
}

// ── Clamping ──────────────────────────────────────────────────

#[test]
fn zero_duration_is_clamped_up_and_echoed() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    configure(&mut service, &mut adc, &mut console, &mut clock, "0", "5.0");
    assert!(console.tx.contains(&"Duration (s): 1".to_string()));
}

#[test]
fn oversized_duration_is_clamped_down_and_echoed() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    configure(&mut service, &mut adc, &mut console, &mut clock, "999", "5.0");
    assert!(console.tx.contains(&"Duration (s): 60".to_string()));
}

#[test]
fn malformed_duration_parses_to_default_and_clamps() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    configure(&mut service, &mut adc, &mut console, &mut clock, "garbage", "5.0");
    assert!(console.tx.contains(&"Duration (s): 1".to_string()));
}

// ── Degenerate calibration weight ─────────────────────────────

#[test]
fn zero_calibration_weight_reports_undefined_percent_error() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    configure(&mut service, &mut adc, &mut console, &mut clock, "1", "0");
    sample_after(&mut service, &mut adc, &mut console, &mut clock, 408_550, 1.5);

    assert!(console.tx.contains(
        &"Percent error (%): undefined (calibration weight is zero)".to_string()
    ));
    for line in &console.tx {
        assert!(!line.contains("inf") && !line.contains("NaN"), "{line}");
    }
    assert_eq!(service.last_summary().unwrap().percent_error, None);
}

// ── Rerun cycle ───────────────────────────────────────────────

#[test]
fn affirmative_rerun_resets_state_and_runs_again() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    configure(&mut service, &mut adc, &mut console, &mut clock, "1", "1.0");
    sample_after(&mut service, &mut adc, &mut console, &mut clock, 1000, 1.0);
    tick(&mut service, &mut adc, &mut console, &clock); // rerun prompt

    console.reply("y");
    let state = tick(&mut service, &mut adc, &mut console, &clock);
    assert_eq!(state, StateId::AwaitingConfig);
    assert_eq!(service.run_sample_count(), 0, "aggregates must reset");

    // A complete second session with a different configuration.
    console.reply("2 10.0");
    tick(&mut service, &mut adc, &mut console, &clock);
    clock.advance_secs(1.0);
    let state = tick(&mut service, &mut adc, &mut console, &clock);
    assert_eq!(state, StateId::Running);

    sample_after(&mut service, &mut adc, &mut console, &mut clock, 500, 2.5);
    let summary = service.last_summary().unwrap();
    assert!(
        (summary.average_raw - 500.0).abs() < 1e-9,
        "summary must reflect only the second run"
    );
    assert_eq!(summary.calibration_weight_g, 10.0);
}

#[test]
fn negative_rerun_reply_halts_permanently() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    configure(&mut service, &mut adc, &mut console, &mut clock, "1", "1.0");
    sample_after(&mut service, &mut adc, &mut console, &mut clock, 1000, 1.0);
    tick(&mut service, &mut adc, &mut console, &clock);

    console.reply("n");
    let state = tick(&mut service, &mut adc, &mut console, &clock);
    assert_eq!(state, StateId::Halted);
    assert_eq!(console.tx.last().unwrap(), telemetry::HALT_NOTICE);

    // Once halted nothing is read and nothing is written, ever.
    let written = console.tx.len();
    let reads_before = adc.read_calls;
    for _ in 0..50 {
        clock.advance_secs(1.0);
        adc.push_sample(777);
        console.reply("y");
        tick(&mut service, &mut adc, &mut console, &clock);
    }
    assert_eq!(service.state(), StateId::Halted);
    assert_eq!(console.tx.len(), written);
    assert_eq!(adc.read_calls, reads_before);
}

#[test]
fn non_affirmative_words_halt_too() {
    for reply in ["maybe", "ok", "1", ""] {
        let (mut service, mut adc, mut console, mut clock) = boot();
        configure(&mut service, &mut adc, &mut console, &mut clock, "1", "1.0");
        sample_after(&mut service, &mut adc, &mut console, &mut clock, 1000, 1.0);
        tick(&mut service, &mut adc, &mut console, &clock);

        console.reply(reply);
        let state = tick(&mut service, &mut adc, &mut console, &clock);
        assert_eq!(state, StateId::Halted, "reply {reply:?} must halt");
    }
}

// ── Poll discipline ───────────────────────────────────────────

#[test]
fn adc_is_never_read_outside_a_run() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    adc.push_sample(123);

    for _ in 0..10 {
        clock.advance_secs(0.1);
        tick(&mut service, &mut adc, &mut console, &clock);
    }
    assert_eq!(service.state(), StateId::AwaitingConfig);
    assert_eq!(adc.read_calls, 0, "no sampling before the run starts");
}

#[test]
fn idle_hint_relaxes_when_waiting_on_the_operator() {
    let (mut service, mut adc, mut console, mut clock) = boot();
    let config = SystemConfig::default();
    assert_eq!(service.idle_hint_ms(), config.idle_backoff_ms);

    configure(&mut service, &mut adc, &mut console, &mut clock, "5", "1.0");
    assert_eq!(service.idle_hint_ms(), config.poll_interval_ms);
}
