//! End-to-end checks of the status stream, from config to protocol bytes

use m2bar::app;
use m2bar::{AppConfig, ConfiguredSource};
use m2bar_core::delay_until_boundary;
use m2bar_types::{BatteryConfig, SourceConfig, ThemeSpec};
use serde_json::{json, Value};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio::io::{AsyncReadExt, DuplexStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Reads the protocol stream and parses complete snapshots
struct BarReader {
    stream: DuplexStream,
    buf: Vec<u8>,
}

impl BarReader {
    fn new(stream: DuplexStream) -> Self {
        Self {
            stream,
            buf: Vec::new(),
        }
    }

    fn parsed(&self) -> Option<Vec<Value>> {
        let text = std::str::from_utf8(&self.buf).ok()?;
        let body = text.strip_prefix("{\"version\":1}[")?;
        serde_json::from_str(&format!("[{}]", body)).ok()
    }

    /// Wait until at least `count` array elements (the leading `[]` included)
    /// have arrived
    async fn elements(&mut self, count: usize) -> Vec<Value> {
        loop {
            if let Some(elements) = self.parsed() {
                if elements.len() >= count {
                    return elements;
                }
            }
            let mut chunk = [0u8; 4096];
            let n = timeout(Duration::from_secs(5), self.stream.read(&mut chunk))
                .await
                .expect("timed out waiting for the bar")
                .unwrap();
            assert!(n > 0, "stream ended early");
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

struct Bar {
    reader: BarReader,
    stop: oneshot::Sender<()>,
    task: JoinHandle<anyhow::Result<()>>,
}

fn spawn_bar(configured: Vec<ConfiguredSource>) -> Bar {
    m2bar_sources::register_all();
    let (writer, reader) = tokio::io::duplex(64 * 1024);
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(app::run_configured(configured, writer, async move {
        let _ = stopped.await;
    }));
    Bar {
        reader: BarReader::new(reader),
        stop,
        task,
    }
}

fn battery(root: &Path, capacity: &str, palette: &[&str]) -> ConfiguredSource {
    std::fs::create_dir_all(root.join("BAT0")).unwrap();
    std::fs::write(root.join("BAT0/capacity"), capacity).unwrap();
    ConfiguredSource {
        config: SourceConfig::Battery(BatteryConfig {
            update_interval_ms: 50,
            sysfs_root: root.display().to_string(),
            ..BatteryConfig::new("BAT0")
        }),
        theme: ThemeSpec::parse(palette, None).unwrap(),
    }
}

#[tokio::test]
async fn test_battery_normal_has_no_status_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut bar = spawn_bar(vec![battery(dir.path(), "42\n", &[])]);

    let elements = bar.reader.elements(2).await;
    assert_eq!(elements[0], json!([]));
    assert_eq!(
        elements[1],
        json!([{"name": "battery", "instance": "BAT0", "full_text": "42%"}])
    );

    bar.stop.send(()).unwrap();
    bar.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_battery_warn_takes_palette_color() {
    let dir = tempfile::tempdir().unwrap();
    let palette = ["#00ff00", "#ffff00", "#ff0000"];
    let mut bar = spawn_bar(vec![battery(dir.path(), "10\n", &palette)]);

    let elements = bar.reader.elements(2).await;
    assert_eq!(
        elements[1],
        json!([{
            "name": "battery",
            "instance": "BAT0",
            "full_text": "10%",
            "color": "#ffff00",
            "_status": "warn"
        }])
    );

    bar.stop.send(()).unwrap();
    bar.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_change_produces_new_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let palette = ["#00ff00", "#ffff00", "#ff0000"];
    let mut bar = spawn_bar(vec![battery(dir.path(), "80\n", &palette)]);

    let elements = bar.reader.elements(2).await;
    assert_eq!(elements[1][0]["color"], json!("#00ff00"));

    std::fs::write(dir.path().join("BAT0/capacity"), "5\n").unwrap();
    let elements = bar.reader.elements(3).await;
    assert_eq!(elements[2][0]["full_text"], json!("5%"));
    assert_eq!(elements[2][0]["color"], json!("#ffff00"));

    bar.stop.send(()).unwrap();
    bar.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_removed_battery_becomes_error_slot() {
    let dir = tempfile::tempdir().unwrap();
    let mut bar = spawn_bar(vec![battery(dir.path(), "50\n", &[])]);
    bar.reader.elements(2).await;

    std::fs::remove_dir_all(dir.path().join("BAT0")).unwrap();
    let elements = bar.reader.elements(3).await;
    assert_eq!(elements[2][0]["full_text"], json!("error"));
    assert_eq!(elements[2][0]["_status"], json!("error"));

    bar.stop.send(()).unwrap();
    bar.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_consumer_close_stops_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let Bar { mut reader, stop, task } = spawn_bar(vec![battery(dir.path(), "60\n", &[])]);
    reader.elements(2).await;
    drop(reader);

    std::fs::write(dir.path().join("BAT0/capacity"), "61\n").unwrap();
    let result = timeout(Duration::from_secs(5), task)
        .await
        .expect("bar kept running after the consumer left");
    result.unwrap().unwrap();
    drop(stop);
}

#[tokio::test]
async fn test_clock_only_config() {
    let config = AppConfig::from_yaml("widgets:\n  - handler: clock\n").unwrap();
    let mut bar = spawn_bar(config.validate().unwrap());

    let elements = bar.reader.elements(2).await;
    assert_eq!(elements[0], json!([]));
    let items = elements[1].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], json!("clock"));
    assert!(items[0].get("_status").is_none());

    // Nothing more until the next minute boundary
    if delay_until_boundary(SystemTime::now(), Duration::from_secs(60)) > Duration::from_secs(2) {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let mut chunk = [0u8; 256];
        let more = timeout(Duration::from_millis(10), bar.reader.stream.read(&mut chunk)).await;
        assert!(more.is_err(), "unexpected update before the minute changed");
    }

    bar.stop.send(()).unwrap();
    bar.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_clock_ticks_on_boundary() {
    let config = AppConfig::from_yaml(
        "widgets:\n  - handler: clock\n    args: [\"%H:%M:%S\", \"%S\"]\n    interval_ms: 1000\n",
    )
    .unwrap();
    let mut bar = spawn_bar(config.validate().unwrap());

    let elements = bar.reader.elements(2).await;
    let first = elements[1][0]["full_text"].clone();

    let elements = bar.reader.elements(3).await;
    let arrived = SystemTime::now();
    let items = elements[2].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], json!("clock"));
    assert_ne!(items[0]["full_text"], first);

    // The new snapshot shows up just after a whole second
    let into_second = arrived
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_millis();
    assert!(into_second < 250, "arrived {into_second}ms into the second");

    bar.stop.send(()).unwrap();
    bar.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_empty_config_emits_empty_snapshot() {
    let mut bar = spawn_bar(Vec::new());

    let elements = bar.reader.elements(2).await;
    assert_eq!(elements, vec![json!([]), json!([])]);

    bar.stop.send(()).unwrap();
    bar.task.await.unwrap().unwrap();
}
