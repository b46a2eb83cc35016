mod common;

use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use common::{init_tracing, loopback_pair};
use linksoak_core::config::SessionConfig;
use linksoak_core::session::{Session, SessionState};

fn test_config() -> SessionConfig {
    SessionConfig {
        port_a: "portA".to_string(),
        port_b: "portB".to_string(),
        baud_rates: vec![9600, 19200],
        start_baud_index: 0,
        payload_size: 64,
        read_timeout_ms: 100,
        max_consecutive_errors: 5,
        max_data_count: 8,
        settle_delay_ms: 1,
        inter_cycle_delay_ms: 1,
    }
}

#[test]
fn quit_without_start_closes_cleanly() {
    init_tracing();
    let (a, b) = loopback_pair("portA", "portB", 9600);
    let session = Session::establish(test_config(), Box::new(a), Box::new(b))
        .expect("handshake should succeed");
    let handle = session.handle();
    assert_eq!(handle.state(), SessionState::Idle);

    let runner = thread::spawn(move || session.run());
    thread::sleep(Duration::from_millis(20));
    handle.quit();

    let report = runner.join().unwrap();
    assert_eq!(report.errors_a, 0);
    assert_eq!(report.errors_b, 0);
    assert_eq!(handle.state(), SessionState::Closed);
}

#[test]
fn successful_cycles_rotate_baud_rate() {
    init_tracing();
    let (a, b) = loopback_pair("portA", "portB", 9600);
    let baud_a = a.baud_probe();
    let baud_b = b.baud_probe();

    let session = Session::establish(test_config(), Box::new(a), Box::new(b))
        .expect("handshake should succeed");
    let handle = session.handle();
    handle.start();
    assert_eq!(handle.state(), SessionState::Running);

    let runner = thread::spawn(move || session.run());

    // After max_data_count session-wide successes both ports must move
    // to the next rate in the list
    let deadline = Instant::now() + Duration::from_secs(10);
    while *baud_a.lock().unwrap() != 19200 {
        assert!(Instant::now() < deadline, "rotation to 19200 never happened");
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(*baud_b.lock().unwrap(), 19200);

    handle.quit();
    let report = runner.join().unwrap();
    assert_eq!(report.errors_a, 0);
    assert_eq!(report.errors_b, 0);
}

#[test]
fn consecutive_failures_shut_the_session_down() {
    init_tracing();
    let (a, b) = loopback_pair("portA", "portB", 9600);
    let corrupt_a = a.corruptor();

    let session = Session::establish(test_config(), Box::new(a), Box::new(b))
        .expect("handshake should succeed");
    let handle = session.handle();

    // Corrupt the next five frames sent on port A; direction A->B fails
    // five times in a row before any success
    corrupt_a.store(5, Ordering::SeqCst);
    handle.start();

    let report = session.run();

    // Failures are charged to the receiving port
    assert_eq!(report.port_b, "portB");
    assert_eq!(report.errors_b, 5);
    assert_eq!(report.errors_a, 0);
    assert_eq!(handle.state(), SessionState::Closed);
}

#[test]
fn pause_gates_traffic_until_resumed() {
    init_tracing();
    let (a, b) = loopback_pair("portA", "portB", 9600);
    let baud_a = a.baud_probe();

    let mut config = test_config();
    config.max_data_count = 2;
    let session =
        Session::establish(config, Box::new(a), Box::new(b)).expect("handshake should succeed");
    let handle = session.handle();

    let runner = thread::spawn(move || session.run());

    // Never started: no traffic, no rotation
    thread::sleep(Duration::from_millis(50));
    assert_eq!(*baud_a.lock().unwrap(), 9600);
    assert_eq!(handle.state(), SessionState::Idle);

    // Resume and wait for the first rotation as proof of traffic
    handle.start();
    let deadline = Instant::now() + Duration::from_secs(10);
    while *baud_a.lock().unwrap() == 9600 {
        assert!(Instant::now() < deadline, "no traffic after start");
        thread::sleep(Duration::from_millis(5));
    }

    handle.pause();
    assert_eq!(handle.state(), SessionState::Paused);

    handle.quit();
    runner.join().unwrap();
}
