use std::cell::{Cell, RefCell};
use std::rc::Rc;

use radio_core::{PlaybackController, PlaybackError, PlayerBackend, Station, StationRegistry};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Open(String),
    Play,
    Pause,
    Stop,
    Volume(i32),
    Release,
}

/// Records every command; `fail_open` makes `open` reject the listed URIs.
#[derive(Clone, Default)]
struct RecordingBackend {
    calls: Rc<RefCell<Vec<Call>>>,
    fail_open: Rc<RefCell<Vec<String>>>,
}

impl RecordingBackend {
    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn fail_on(&self, uri: &str) {
        self.fail_open.borrow_mut().push(uri.to_string());
    }
}

impl PlayerBackend for RecordingBackend {
    fn open(&mut self, uri: &str) -> Result<(), PlaybackError> {
        self.calls.borrow_mut().push(Call::Open(uri.to_string()));
        if self.fail_open.borrow().iter().any(|u| u == uri) {
            return Err(PlaybackError::NetworkFailure(format!("{} unreachable", uri)));
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.calls.borrow_mut().push(Call::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.calls.borrow_mut().push(Call::Pause);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlaybackError> {
        self.calls.borrow_mut().push(Call::Stop);
        Ok(())
    }

    fn set_volume(&mut self, percent: i32) -> Result<(), PlaybackError> {
        self.calls.borrow_mut().push(Call::Volume(percent));
        Ok(())
    }

    fn release(&mut self) {
        self.calls.borrow_mut().push(Call::Release);
    }
}

fn two_stations() -> StationRegistry {
    StationRegistry::new(vec![Station::new("A", "u1"), Station::new("B", "u2")])
}

fn stations(n: usize) -> StationRegistry {
    StationRegistry::new(
        (0..n)
            .map(|i| Station::new(format!("Station {}", i), format!("http://radio{}.example/live", i)))
            .collect(),
    )
}

fn controller(
    registry: StationRegistry,
) -> (PlaybackController<RecordingBackend>, RecordingBackend, Rc<Cell<usize>>) {
    let backend = RecordingBackend::default();
    let mut c = PlaybackController::new(registry, backend.clone(), 50);
    let notified = Rc::new(Cell::new(0));
    let counter = notified.clone();
    c.set_on_state_changed(move || counter.set(counter.get() + 1));
    (c, backend, notified)
}

#[test]
fn walkthrough_two_stations() {
    let (mut c, _backend, _) = controller(two_stations());
    assert_eq!(c.current_station(), Some(&Station::new("A", "u1")));

    c.next_station();
    assert_eq!(c.current_station(), Some(&Station::new("B", "u2")));
    assert!(c.is_playing());

    c.next_station();
    assert_eq!(c.current_station(), Some(&Station::new("A", "u1")));

    c.toggle_play_pause();
    assert!(!c.is_playing());
    assert_eq!(c.current_station(), Some(&Station::new("A", "u1")));

    c.previous_station();
    assert_eq!(c.current_station(), Some(&Station::new("B", "u2")));
    assert!(c.is_playing());
}

#[test]
fn full_rotation_returns_to_start() {
    for n in 1..=7 {
        let (mut c, _, _) = controller(stations(n));
        c.next_station();
        let start = c.current_index();
        for _ in 0..n {
            c.next_station();
            assert!(c.current_index() < n);
        }
        assert_eq!(c.current_index(), start, "next cycle, n={}", n);
        for _ in 0..n {
            c.previous_station();
            assert!(c.current_index() < n);
        }
        assert_eq!(c.current_index(), start, "previous cycle, n={}", n);
    }
}

#[test]
fn next_then_previous_is_identity() {
    let (mut c, _, _) = controller(stations(5));
    for _ in 0..3 {
        c.next_station();
    }
    let before = c.current_index();
    c.next_station();
    c.previous_station();
    assert_eq!(c.current_index(), before);
    c.previous_station();
    c.next_station();
    assert_eq!(c.current_index(), before);
}

#[test]
fn empty_registry_rotation_is_noop() {
    let (mut c, backend, notified) = controller(StationRegistry::default());
    c.next_station();
    c.previous_station();
    c.play_current();
    assert_eq!(c.current_index(), 0);
    assert_eq!(c.current_station(), None);
    assert!(!c.is_playing());
    assert!(backend.calls().is_empty());
    assert_eq!(notified.get(), 0);
}

#[test]
fn toggle_twice_restores_state() {
    let (mut c, backend, notified) = controller(two_stations());
    c.play_current();
    assert!(c.is_playing());
    backend.clear();

    c.toggle_play_pause();
    assert!(!c.is_playing());
    c.toggle_play_pause();
    assert!(c.is_playing());
    assert_eq!(backend.calls(), vec![Call::Pause, Call::Play]);
    assert_eq!(notified.get(), 2);

    // From the stopped side as well.
    let (mut c, _, _) = controller(two_stations());
    c.toggle_play_pause();
    c.toggle_play_pause();
    assert!(!c.is_playing());
}

#[test]
fn play_sequence_and_volume_forwarding() {
    let (mut c, backend, notified) = controller(two_stations());
    c.set_volume(30);
    c.play("http://other.example/");
    assert_eq!(
        backend.calls(),
        vec![
            Call::Volume(30),
            Call::Stop,
            Call::Open("http://other.example/".to_string()),
            Call::Volume(30),
            Call::Play,
        ]
    );
    assert!(c.is_playing());
    assert_eq!(notified.get(), 0, "play() alone does not notify");
}

#[test]
fn set_volume_extremes_are_forwarded_verbatim() {
    let (mut c, backend, notified) = controller(stations(3));
    c.next_station();
    let index = c.current_index();
    let playing = c.is_playing();
    let notifications = notified.get();
    backend.clear();

    c.set_volume(0);
    c.set_volume(100);
    assert_eq!(backend.calls(), vec![Call::Volume(0), Call::Volume(100)]);
    assert_eq!(c.volume(), 100);
    assert_eq!(c.current_index(), index);
    assert_eq!(c.is_playing(), playing);
    assert_eq!(notified.get(), notifications);

    c.set_volume(150);
    assert_eq!(backend.calls().last(), Some(&Call::Volume(150)));
}

#[test]
fn rotation_notifies_and_reopens() {
    let (mut c, backend, notified) = controller(two_stations());
    c.next_station();
    assert_eq!(notified.get(), 1);
    assert!(backend.calls().contains(&Call::Open("u2".to_string())));

    backend.clear();
    c.toggle_play_pause();
    assert!(
        !backend.calls().iter().any(|call| matches!(call, Call::Open(_))),
        "toggle pauses the loaded stream instead of re-opening"
    );
}

#[test]
fn failed_open_reports_not_playing() {
    let (mut c, backend, notified) = controller(two_stations());
    backend.fail_on("u2");

    c.next_station();
    assert_eq!(c.current_index(), 1);
    assert!(!c.is_playing());
    assert_eq!(notified.get(), 1);

    c.next_station();
    assert_eq!(c.current_index(), 0);
    assert!(c.is_playing());
}

#[test]
fn stop_keeps_flag_and_release_is_idempotent() {
    let (mut c, backend, _) = controller(two_stations());
    c.play_current();
    c.stop();
    assert!(c.is_playing());

    backend.clear();
    c.release();
    c.release();
    assert_eq!(backend.calls(), vec![Call::Stop, Call::Release]);
    assert!(!c.has_backend());

    drop(c);
    assert_eq!(backend.calls(), vec![Call::Stop, Call::Release]);
}

#[test]
fn drop_releases_backend() {
    let (c, backend, _) = controller(two_stations());
    drop(c);
    assert_eq!(backend.calls(), vec![Call::Stop, Call::Release]);
}
