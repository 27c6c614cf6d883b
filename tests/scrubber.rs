use std::{cell::RefCell, rc::Rc, time::Duration};

use histscrub::{Direction, RunMode, Scheduler, Scrubber, ScrubberError, ScrubberOptions, VirtualClock};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn run<T>(s: &mut Scrubber<T>, clock: &mut VirtualClock, duration: Duration) {
    clock.run_for(duration, |id, c| s.handle_timer(id, c));
}

fn record<T>(s: &mut Scrubber<T>) -> Rc<RefCell<Vec<usize>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    s.on_input(move |_, i| sink.borrow_mut().push(i));
    seen
}

#[test]
fn looping_frames_wrap_around() {
    init_tracing();
    let mut clock = VirtualClock::new();
    let mut s = Scrubber::new(0..5, ScrubberOptions::new(), &mut clock).unwrap();
    assert!(matches!(s.run_mode(), RunMode::RunningFrame(_)));
    assert_eq!(s.readout(), "0");
    let seen = record(&mut s);
    run(&mut s, &mut clock, ms(16 * 5));
    assert_eq!(*seen.borrow(), vec![1, 2, 3, 4, 0]);
    assert_eq!(*s.value(), 0);
    assert_eq!(clock.pending(), 1);
}

#[test]
fn alternate_bounces_at_the_ends() {
    init_tracing();
    let mut clock = VirtualClock::new();
    let mut options = ScrubberOptions::new();
    options.set_alternate(true);
    let mut s = Scrubber::new(vec![0, 1, 2, 3], options, &mut clock).unwrap();
    let seen = record(&mut s);
    run(&mut s, &mut clock, ms(16 * 3));
    assert_eq!(s.index(), 3);
    run(&mut s, &mut clock, ms(16));
    assert_eq!(s.index(), 2);
    assert_eq!(s.direction(), Direction::Backward);
    run(&mut s, &mut clock, ms(16 * 3));
    assert_eq!(*seen.borrow(), vec![1, 2, 3, 2, 1, 0, 1]);
    assert_eq!(s.direction(), Direction::Forward);
}

#[test]
fn without_loop_stops_at_the_end() {
    let mut clock = VirtualClock::new();
    let mut options = ScrubberOptions::new();
    options.set_loop(false);
    let mut s = Scrubber::new(vec!['a', 'b', 'c'], options, &mut clock).unwrap();
    run(&mut s, &mut clock, ms(1000));
    assert_eq!(*s.value(), 'c');
    assert_eq!(s.run_mode(), RunMode::Stopped);
    assert_eq!(s.button_label(), "Play");
    assert_eq!(clock.pending(), 0);
}

#[test]
fn interval_mode_keeps_one_handle() {
    let mut clock = VirtualClock::new();
    let mut options = ScrubberOptions::new();
    options.set_delay(ms(100));
    let mut s = Scrubber::new(0..10, options, &mut clock).unwrap();
    let RunMode::RunningInterval(handle) = s.run_mode() else {
        panic!("expected interval mode, got {:?}", s.run_mode());
    };
    run(&mut s, &mut clock, ms(350));
    assert_eq!(s.index(), 3);
    assert_eq!(s.run_mode(), RunMode::RunningInterval(handle));
    assert_eq!(clock.pending(), 1);
}

#[test]
fn loop_delay_holds_then_resumes() {
    init_tracing();
    let mut clock = VirtualClock::new();
    let mut options = ScrubberOptions::new();
    options.set_loop_delay(ms(500));
    let mut s = Scrubber::new(vec![0, 1, 2], options, &mut clock).unwrap();
    run(&mut s, &mut clock, ms(48));
    assert_eq!(s.index(), 2);
    assert!(matches!(s.run_mode(), RunMode::PendingLoopDelay { .. }));
    assert_eq!(s.button_label(), "Pause");
    assert_eq!(clock.pending(), 1);
    run(&mut s, &mut clock, ms(499));
    assert_eq!(s.index(), 2);
    run(&mut s, &mut clock, ms(1));
    assert_eq!(s.index(), 0);
    assert!(matches!(s.run_mode(), RunMode::RunningFrame(_)));
    assert_eq!(clock.pending(), 1);
}

#[test]
fn pause_cancels_every_callback() {
    let configs: [fn(&mut ScrubberOptions<u32>); 3] = [
        |_| {},
        |o| {
            o.set_delay(ms(20));
        },
        |o| {
            o.set_loop_delay(ms(200));
        },
    ];
    for configure in configs {
        let mut clock = VirtualClock::new();
        let mut options = ScrubberOptions::new();
        configure(&mut options);
        let mut s = Scrubber::new(0..3u32, options, &mut clock).unwrap();
        run(&mut s, &mut clock, ms(60));
        assert!(s.is_running());
        s.pause(&mut clock);
        assert_eq!(clock.pending(), 0);
        assert_eq!(s.run_mode(), RunMode::Stopped);
    }
}

#[test]
fn dragging_while_running_stops() {
    let mut clock = VirtualClock::new();
    let mut s = Scrubber::new(0..10, ScrubberOptions::new(), &mut clock).unwrap();
    let seen = record(&mut s);
    s.drag(7, &mut clock);
    assert_eq!(s.run_mode(), RunMode::Stopped);
    assert_eq!(clock.pending(), 0);
    assert_eq!(s.index(), 7);
    s.drag(42, &mut clock);
    assert_eq!(s.index(), 9);
    assert_eq!(*seen.borrow(), vec![7, 9]);
}

#[test]
fn play_and_pause_are_idempotent() {
    let mut clock = VirtualClock::new();
    let mut options = ScrubberOptions::new();
    options.set_autoplay(false);
    let mut s = Scrubber::new(0..4, options, &mut clock).unwrap();
    s.pause(&mut clock);
    assert_eq!(s.index(), 0);
    s.play(&mut clock);
    assert_eq!(s.index(), 1);
    s.play(&mut clock);
    assert_eq!(s.index(), 1);
    assert_eq!(clock.pending(), 1);
}

#[test]
fn random_clicks_keep_a_single_handle() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let configs: [fn(&mut ScrubberOptions<usize>); 3] = [
        |_| {},
        |o| {
            o.set_delay(ms(25)).set_alternate(true);
        },
        |o| {
            o.set_loop_delay(ms(40)).set_loop(true);
        },
    ];
    for configure in configs {
        let mut clock = VirtualClock::new();
        let mut options = ScrubberOptions::new();
        configure(&mut options);
        let mut s = Scrubber::new(0..6usize, options, &mut clock).unwrap();
        for _ in 0..300 {
            match rng.random_range(0..4) {
                0 => s.click(&mut clock),
                1 => {
                    let to = rng.random_range(0..8);
                    s.drag(to, &mut clock);
                }
                2 => s.pause(&mut clock),
                _ => {
                    let elapsed = ms(rng.random_range(0..120));
                    run(&mut s, &mut clock, elapsed);
                }
            }
            assert!(clock.pending() <= 1);
            assert_eq!(clock.pending() == 1, s.is_running());
            if let Some(t) = s.run_mode().timer() {
                assert!(clock.is_pending(t));
            }
            assert!(s.index() < s.len());
        }
    }
}

#[test]
fn construction_errors() {
    let mut clock = VirtualClock::new();
    let empty: Vec<i32> = Vec::new();
    assert_eq!(
        Scrubber::new(empty, ScrubberOptions::new(), &mut clock).err(),
        Some(ScrubberError::EmptyValues)
    );
    let mut options = ScrubberOptions::new();
    options.set_initial(3);
    assert_eq!(
        Scrubber::new(vec![1, 2, 3], options, &mut clock).err(),
        Some(ScrubberError::InitialOutOfRange { initial: 3, len: 3 })
    );
    assert_eq!(clock.pending(), 0);
}

#[test]
fn custom_readout() {
    let mut clock = VirtualClock::new();
    let mut options = ScrubberOptions::with_format(|v: &f64, i, all: &[f64]| {
        format!("{v:.1} ({}/{})", i + 1, all.len())
    });
    options.set_autoplay(false).set_initial(1);
    let s = Scrubber::new(vec![0.25, 0.5, 0.75], options, &mut clock).unwrap();
    assert_eq!(s.readout(), "0.5 (2/3)");
    let html = s.to_html();
    assert_eq!(html.find_all("output")[0].text_content(), "0.5 (2/3)");
    assert_eq!(html.find_all("input")[0].get_attr("value"), Some("1"));
}

#[test]
fn dispose_releases_pending_callbacks() {
    let mut clock = VirtualClock::new();
    let mut options = ScrubberOptions::new();
    options.set_delay(ms(10));
    let s = Scrubber::new(0..3, options, &mut clock).unwrap();
    assert_eq!(clock.pending(), 1);
    s.dispose(&mut clock);
    assert_eq!(clock.pending(), 0);
}
