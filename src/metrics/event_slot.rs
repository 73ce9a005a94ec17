use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use spdlog::debug;

/// One aggregated time slot for one page, as it gets published: total hits,
/// unique origins, and the slot boundaries.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct EventSlot {
    pub page: String,
    pub unique_total: u64,
    pub total: u64,
    pub origins: HashSet<String>,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
}

pub struct Event {
    pub page: String,
    pub origin: String,
    pub date_time: DateTime<Utc>,
}

impl EventSlot {
    pub fn from_event(event: Event, slot_size: &Duration) -> Self {
        let (slot_start, slot_end) = slot_bounds(&event.date_time, slot_size);
        let mut origins = HashSet::<String>::new();
        origins.insert(event.origin);

        EventSlot {
            page: event.page,
            unique_total: 1,
            total: 1,
            origins,
            slot_start,
            slot_end,
        }
    }
}

/// Return start + end date/time of the slot containing the event.
fn slot_bounds(date_time: &DateTime<Utc>, slot_size: &Duration) -> (DateTime<Utc>, DateTime<Utc>) {
    let slot_size_secs = slot_size.num_seconds();
    let timestamp_seconds = date_time.timestamp();
    let start_timestamp = timestamp_seconds - (timestamp_seconds % slot_size_secs);
    let start = DateTime::<Utc>::from_timestamp(start_timestamp, 0).unwrap();

    let end = start + *slot_size;

    (start, end)
}

pub struct MetricAggregator {
    slot_size: Duration,
    slots: HashMap<String, EventSlot>,
    history: Vec<EventSlot>,
}

impl MetricAggregator {
    pub fn new(slot_size: Duration) -> Self {
        Self {
            slot_size,
            slots: Default::default(),
            history: vec![],
        }
    }

    pub fn add(&mut self, page: &str, origin: &str) {
        self.add_event(Event {
            page: page.to_string(),
            origin: origin.to_string(),
            date_time: Utc::now(),
        })
    }

    pub fn add_event(&mut self, event: Event) {
        if let Some(slot) = self.slots.get_mut(&event.page) {
            if event.date_time < slot.slot_end {
                let inserted = slot.origins.insert(event.origin);
                if inserted {
                    slot.unique_total += 1;
                }
                slot.total += 1;
                return;
            } else {
                // Slot is over; move everything to history and start fresh
                let values: Vec<EventSlot> = self.slots.drain().map(|(_, v)| v).collect();
                self.history.extend(values);
            }
        }

        let page = event.page.clone();
        let slot = EventSlot::from_event(event, &self.slot_size);
        self.slots.insert(page, slot);
    }

    /// Drains expired slots into history. Called periodically so quiet pages
    /// still get published.
    pub fn flush(&mut self) {
        let date_time = Utc::now();
        let mut should_drain = false;
        for (_, slot) in self.slots.iter_mut() {
            if date_time >= slot.slot_end {
                should_drain = true;
                break;
            }
        }

        debug!("Metric flush at {}. Should_drain={}", date_time, should_drain);
        if should_drain {
            let values: Vec<EventSlot> = self.slots.drain().map(|(_, v)| v).collect();
            self.history.extend(values);
        }
    }

    pub fn take_events(&mut self) -> Option<Vec<EventSlot>> {
        if self.history.is_empty() {
            return None;
        }

        Some(std::mem::take(&mut self.history))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn create(origin_no: i32, secs: u32) -> Event {
        Event {
            page: "feed".to_string(),
            origin: format!("10.0.0.{}", origin_no),
            date_time: Utc.with_ymd_and_hms(2026, 08, 01, 01, 02, secs).unwrap(),
        }
    }

    #[test]
    fn test_slots() {
        let mut m = MetricAggregator::new(Duration::seconds(5));
        assert_eq!(m.take_events(), None);
        m.add_event(create(1, 0));
        m.add_event(create(1, 0));
        m.add_event(create(2, 1));
        m.add_event(create(1, 5));
        let events = m.take_events();
        let expected = vec![EventSlot {
            page: "feed".to_string(),
            unique_total: 2,
            total: 3,
            origins: HashSet::from(["10.0.0.1".to_string(), "10.0.0.2".to_string()]),
            slot_start: Utc.with_ymd_and_hms(2026, 08, 01, 01, 02, 00).unwrap(),
            slot_end: Utc.with_ymd_and_hms(2026, 08, 01, 01, 02, 05).unwrap(),
        }];
        assert_eq!(events.unwrap(), expected);

        m.add_event(create(1, 10));
        let events = m.take_events();
        let expected = vec![EventSlot {
            page: "feed".to_string(),
            unique_total: 1,
            total: 1,
            origins: HashSet::from(["10.0.0.1".to_string()]),
            slot_start: Utc.with_ymd_and_hms(2026, 08, 01, 01, 02, 05).unwrap(),
            slot_end: Utc.with_ymd_and_hms(2026, 08, 01, 01, 02, 10).unwrap(),
        }];
        assert_eq!(events.unwrap(), expected);
        assert_eq!(m.take_events(), None);
    }

    #[test]
    fn test_separate_pages_get_separate_slots() {
        let mut m = MetricAggregator::new(Duration::seconds(60));
        m.add_event(Event {
            page: "feed".to_string(),
            origin: "10.0.0.1".to_string(),
            date_time: Utc.with_ymd_and_hms(2026, 08, 01, 01, 02, 00).unwrap(),
        });
        m.add_event(Event {
            page: "publish".to_string(),
            origin: "10.0.0.1".to_string(),
            date_time: Utc.with_ymd_and_hms(2026, 08, 01, 01, 02, 01).unwrap(),
        });
        assert_eq!(m.slots.len(), 2);
        assert_eq!(m.take_events(), None);
    }

    #[test]
    fn test_slot_bounds() {
        let timestamp = Utc.with_ymd_and_hms(2026, 08, 04, 9, 12, 47).unwrap();
        let (start, end) = slot_bounds(&timestamp, &Duration::seconds(60));
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 08, 04, 9, 12, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 08, 04, 9, 13, 0).unwrap());

        let (start, end) = slot_bounds(&timestamp, &Duration::seconds(15));
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 08, 04, 9, 12, 45).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 08, 04, 9, 13, 0).unwrap());
    }
}
