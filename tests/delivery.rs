//! End-to-end delivery scenarios through the public API

use framegate::{
    DischargePolicy, Frame, FrameSink, OverflowPolicy, RequestOutcome, ShutdownOutcome,
    SourceConfig, StreamDescription, VideoStreamSource,
};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Frame(u64),
    Terminated,
}

#[derive(Default)]
struct Host {
    events: Mutex<Vec<Event>>,
}

impl Host {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl FrameSink<&'static str> for Host {
    fn on_frame_delivered(&self, frame: Frame<&'static str>) {
        self.events.lock().unwrap().push(Event::Frame(frame.presentation_time));
    }

    fn on_delivery_terminated(&self) {
        self.events.lock().unwrap().push(Event::Terminated);
    }
}

fn source(config: SourceConfig) -> anyhow::Result<VideoStreamSource<&'static str, Host>> {
    Ok(VideoStreamSource::new(config, StreamDescription::h264(1280, 720), Host::default())?)
}

#[test]
fn stalled_consumer_resumes_on_freshest_frames() -> anyhow::Result<()> {
    let source = source(SourceConfig::default().with_max_queue_size(2))?;

    let _ = source.submit_frame("F1", 1, 1);
    let _ = source.submit_frame("F2", 2, 1);
    let _ = source.submit_frame("F3", 3, 1);
    let buffered: Vec<_> =
        source.coordinator().buffered_frames().into_iter().map(|f| f.payload).collect();
    assert_eq!(buffered, vec!["F2", "F3"]);

    assert_eq!(source.request_next_frame(), RequestOutcome::Delivered);
    assert_eq!(source.request_next_frame(), RequestOutcome::Delivered);

    assert_eq!(source.sink().events(), vec![Event::Frame(2), Event::Frame(3)]);
    assert_eq!(source.buffered(), 0);
    assert_eq!(source.outstanding(), 0);
    Ok(())
}

#[test]
fn three_waiting_requests_get_one_coalesced_termination() -> anyhow::Result<()> {
    let source = source(SourceConfig::default().with_max_queue_size(2))?;
    for _ in 0..3 {
        assert_eq!(source.request_next_frame(), RequestOutcome::Pending);
    }
    assert_eq!(source.outstanding(), 3);
    assert!(source.sink().events().is_empty());

    assert!(matches!(source.shutdown(), ShutdownOutcome::Completed { discharged: 3, .. }));
    assert_eq!(source.sink().events(), vec![Event::Terminated]);
    assert_eq!(source.outstanding(), 0);

    assert_eq!(source.shutdown(), ShutdownOutcome::AlreadyShutDown);
    assert_eq!(source.sink().events(), vec![Event::Terminated]);
    Ok(())
}

#[test]
fn per_request_discharge_answers_every_request() -> anyhow::Result<()> {
    let source = source(SourceConfig::default().with_discharge(DischargePolicy::PerRequest))?;
    for _ in 0..3 {
        let _ = source.request_next_frame();
    }
    let _ = source.shutdown();

    assert_eq!(source.sink().events(), vec![Event::Terminated; 3]);
    let stats = source.stats();
    assert_eq!(stats.requests, stats.requests_settled());
    Ok(())
}

#[test]
fn frames_after_shutdown_produce_nothing() -> anyhow::Result<()> {
    let source = source(SourceConfig::default())?;
    let _ = source.shutdown();

    let _ = source.submit_frame("late", 9, 1);
    assert_eq!(source.request_next_frame(), RequestOutcome::Ignored);

    assert!(source.sink().events().is_empty());
    assert_eq!(source.buffered(), 0);
    Ok(())
}

#[test]
fn interleaved_traffic_keeps_fifo_order() -> anyhow::Result<()> {
    let source = source(SourceConfig::default().with_max_queue_size(3))?;

    let _ = source.request_next_frame();
    let _ = source.submit_frame("a", 1, 1);
    let _ = source.submit_frame("b", 2, 1);
    let _ = source.submit_frame("c", 3, 1);
    let _ = source.request_next_frame();
    let _ = source.request_next_frame();
    let _ = source.request_next_frame();
    let _ = source.submit_frame("d", 4, 1);

    assert_eq!(
        source.sink().events(),
        vec![Event::Frame(1), Event::Frame(2), Event::Frame(3), Event::Frame(4)]
    );
    Ok(())
}

#[test]
fn reject_newest_policy_keeps_first_frames() -> anyhow::Result<()> {
    let source = source(
        SourceConfig::default().with_max_queue_size(2).with_overflow(OverflowPolicy::RejectNewest),
    )?;
    for (n, name) in ["F1", "F2", "F3"].into_iter().enumerate() {
        let _ = source.submit_frame(name, n as u64 + 1, 1);
    }
    let _ = source.request_next_frame();
    let _ = source.request_next_frame();

    assert_eq!(source.sink().events(), vec![Event::Frame(1), Event::Frame(2)]);
    assert_eq!(source.stats().frames_rejected, 1);
    Ok(())
}

#[test]
fn config_file_drives_source_behavior() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("framegate-{}.yaml", std::process::id()));
    std::fs::write(&path, "max_queue_size: 1\ndischarge: per_request\n")?;
    let config = SourceConfig::from_file(&path)?;
    std::fs::remove_file(&path)?;

    let source = source(config)?;
    let _ = source.submit_frame("F1", 1, 1);
    let _ = source.submit_frame("F2", 2, 1);
    assert_eq!(source.buffered(), 1);

    let _ = source.request_next_frame();
    let _ = source.request_next_frame();
    let _ = source.request_next_frame();
    let _ = source.shutdown();

    assert_eq!(
        source.sink().events(),
        vec![Event::Frame(2), Event::Terminated, Event::Terminated]
    );
    Ok(())
}
