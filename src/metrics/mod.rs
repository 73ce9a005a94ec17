use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use spdlog::sink::{RotatingFileSink, RotationPolicy};
use spdlog::{error, info, trace, Logger};
use tokio::sync::mpsc;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

use crate::metrics::event_slot::{Event, MetricAggregator};

mod event_slot;

/// The two pages worth counting: feed views and post publications.
pub enum PageEvent {
    FeedView,
    Publish,
}

impl PageEvent {
    fn key(&self) -> &'static str {
        match self {
            PageEvent::FeedView => "feed",
            PageEvent::Publish => "publish",
        }
    }
}

pub struct MetricEvent {
    pub page: PageEvent,
    pub origin: String,
}

/// Writes aggregated slots as JSON lines through a daily rotating sink,
/// one file per deployment, separate from the application log.
pub struct MetricPublisher {
    logger: Arc<Logger>,
}

impl MetricPublisher {
    pub fn new(base_path: &PathBuf) -> spdlog::Result<Self> {
        let daily: Arc<RotatingFileSink> = Arc::new(
            RotatingFileSink::builder()
                .base_path(base_path)
                .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
                .rotate_on_open(false)
                .build()?
        );

        let logger = Arc::new(Logger::builder().sink(daily).build()?);
        Ok(Self {
            logger,
        })
    }

    pub fn store_slots(&self, history: &Vec<event_slot::EventSlot>) -> io::Result<()> {
        for event_slot in history {
            let json = serde_json::to_string(&event_slot)?;
            info!(logger: self.logger, "{}", &json);
            self.logger.flush();
        }

        Ok(())
    }
}

pub struct MetricWriter {
    metric_aggregator: MetricAggregator,
    metric_publisher: MetricPublisher,
}

impl MetricWriter {
    pub fn new(base_path: &PathBuf, slot_size: Duration) -> spdlog::Result<Self> {
        let metric_aggregator = MetricAggregator::new(slot_size);
        let metric_publisher = MetricPublisher::new(base_path)?;

        Ok(Self {
            metric_aggregator,
            metric_publisher,
        })
    }

    pub fn add_event(&mut self, event: MetricEvent) -> io::Result<()> {
        self.metric_aggregator.add_event(Event {
            page: event.page.key().to_string(),
            origin: event.origin,
            date_time: Utc::now(),
        });
        self.publish_pending()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.metric_aggregator.flush();
        self.publish_pending()
    }

    fn publish_pending(&mut self) -> io::Result<()> {
        if let Some(history) = self.metric_aggregator.take_events() {
            self.metric_publisher.store_slots(&history)?;
        }
        Ok(())
    }
}

/// Owns the receiver task; handlers get cheap cloneable senders from it.
pub struct MetricHandler {
    _receiver_task: JoinHandle<()>,
    sender: Sender<MetricEvent>,
}

impl MetricHandler {
    pub fn new(mut metrics: MetricWriter) -> Self {
        let (tx, mut rx) = mpsc::channel::<MetricEvent>(64);

        let receiver_task = tokio::spawn(async move {
            info!("Starting metrics receiver");
            loop {
                match tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv()).await {
                    Ok(Some(event)) => {
                        if let Err(e) = metrics.add_event(event) {
                            error!("Error writing access metric: {}", e);
                        }
                    }
                    Ok(None) => break,
                    Err(_timeout) => {
                        if let Err(e) = metrics.flush() {
                            error!("Error flushing access metric: {}", e);
                        }
                        trace!("Timeout - flushing metrics");
                    }
                }
            }
        });

        Self {
            _receiver_task: receiver_task,
            sender: tx,
        }
    }

    pub fn new_sender(&self) -> MetricSender {
        MetricSender::new(self.sender.clone())
    }

    pub fn no_op() -> MetricSender {
        MetricSender::no_op()
    }
}

pub struct MetricSender {
    sender_ch: Option<Sender<MetricEvent>>,
}

impl MetricSender {
    pub fn new(sender_ch: Sender<MetricEvent>) -> Self {
        Self {
            sender_ch: Some(sender_ch),
        }
    }

    pub fn no_op() -> Self {
        Self { sender_ch: None }
    }

    pub async fn feed_view(&self, origin: String) {
        self.send(PageEvent::FeedView, origin).await;
    }

    pub async fn publish(&self, origin: String) {
        self.send(PageEvent::Publish, origin).await;
    }

    async fn send(&self, page: PageEvent, origin: String) {
        if let Some(ref sender) = self.sender_ch {
            if let Err(e) = sender.send(MetricEvent { page, origin }).await {
                error!("Error writing {} metrics: {}", e.0.page.key(), e);
            }
        }
    }
}
