use std::collections::HashMap;
use std::time::Duration;

use termux_rs::adapters::mock::ProbeMock;
use termux_rs::config::SamplerConfig;
use termux_rs::models::events::StreamEvent;
use termux_rs::services;

fn accel_reading(x: f64, y: f64, z: f64) -> HashMap<String, Vec<f64>> {
    HashMap::from([("LSM Accelerometer".to_string(), vec![x, y, z])])
}

fn fast_config() -> SamplerConfig {
    SamplerConfig {
        interval: Duration::from_millis(100),
        log_path: None,
        ..SamplerConfig::default()
    }
}

#[tokio::test]
async fn test_snapshot_after_three_ticks() {
    // Three scripted readings; once exhausted the probe reads empty and the
    // loop skips ticks, so exactly three rows land in the window.
    let probe = ProbeMock::new(&["LSM Accelerometer"]).with_script(vec![
        accel_reading(1.0, 0.0, 0.0),
        accel_reading(2.0, 0.0, 0.0),
        accel_reading(3.0, 0.0, 0.0),
    ]);

    let (handle, service) = services::spawn_service(probe, fast_config(), Some(650)).unwrap();
    handle.await.unwrap();

    let view = service.snapshot();
    assert_eq!(view.time.len(), 3);
    assert_eq!(view.sensors["Accelerometer"]["X"], vec![1.0, 2.0, 3.0]);
    assert_eq!(view.sensors["Accelerometer"]["Y"], vec![0.0, 0.0, 0.0]);
    // Unmatched groups are zero-padded, not absent.
    assert_eq!(view.sensors["Gyroscope"]["X"], vec![0.0, 0.0, 0.0]);
    assert_eq!(view.latest_row["Accelerometer_X"], 3.0);
    assert_eq!(view.previous_row["Accelerometer_X"], 2.0);
}

#[tokio::test]
async fn test_subscribe_emits_retry_hint_then_updates() {
    let probe = ProbeMock::new(&["LSM Accelerometer"]).with_constant(accel_reading(1.0, 2.0, 3.0));
    let (handle, service) = services::spawn_service(probe, fast_config(), Some(800)).unwrap();

    let mut feed = service.clone().subscribe();
    match feed.recv().await {
        Some(StreamEvent::Open { retry_millis }) => assert_eq!(retry_millis, 100),
        other => panic!("Expected start-of-stream marker, got {:?}", other),
    }

    let mut updates = 0;
    while updates < 3 {
        match feed.recv().await {
            Some(StreamEvent::Update(_)) => updates += 1,
            other => panic!("Expected update, got {:?}", other),
        }
    }
    drop(feed);

    handle.await.unwrap();
}

#[tokio::test]
async fn test_independent_subscriptions() {
    let probe = ProbeMock::new(&["LSM Accelerometer"]).with_constant(accel_reading(1.0, 2.0, 3.0));
    let (handle, service) = services::spawn_service(probe, fast_config(), Some(600)).unwrap();

    let mut first = service.clone().subscribe();
    let mut second = service.clone().subscribe();

    // Dropping one feed must not end the other.
    assert!(first.recv().await.is_some());
    drop(first);

    let mut events = 0;
    while events < 3 {
        assert!(second.recv().await.is_some(), "Surviving feed went quiet");
        events += 1;
    }

    handle.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_flushes_partial_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensor_log.csv");
    let config = SamplerConfig {
        interval: Duration::from_millis(50),
        // Far above the number of ticks: only the shutdown flush writes rows.
        write_batch_size: 100,
        log_path: Some(path.clone()),
        ..SamplerConfig::default()
    };
    let probe = ProbeMock::new(&["LSM Accelerometer"]).with_constant(accel_reading(1.0, 0.0, 0.0));

    let (handle, _service) = services::spawn_service(probe, config, Some(400)).unwrap();
    handle.await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert!(lines[0].starts_with("timestamp,Accelerometer_X,Accelerometer_Y"));
    assert!(lines.len() > 1, "Shutdown flush wrote no rows");
}

#[tokio::test]
async fn test_export_flush_makes_rows_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensor_log.csv");
    let config = SamplerConfig {
        interval: Duration::from_millis(50),
        write_batch_size: 100,
        log_path: Some(path.clone()),
        ..SamplerConfig::default()
    };
    let probe = ProbeMock::new(&["LSM Accelerometer"]).with_script(vec![
        accel_reading(1.0, 0.0, 0.0),
        accel_reading(2.0, 0.0, 0.0),
    ]);

    let (handle, service) = services::spawn_service(probe, config, Some(300)).unwrap();

    // Wait until both scripted rows were sampled.
    tokio::time::sleep(Duration::from_millis(250)).await;
    service.flush().unwrap();

    let contents = std::fs::read_to_string(service.log_path().unwrap()).unwrap();
    assert_eq!(contents.lines().count(), 3, "header plus two rows");

    handle.await.unwrap();
}
