use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use crate::types::{DeviceId, SensorReading};

/// Per-device bounded history of recent readings. Devices are initialized
/// lazily on first `record`; windows are never shared by reference, callers
/// only ever see owned snapshots.
///
/// Locking is per device: one device's window never contends with another's.
/// The outer map lock is held only long enough to clone the per-device handle.
pub struct ContextWindowStore {
    capacity: usize,
    windows: Mutex<HashMap<DeviceId, Arc<Mutex<VecDeque<SensorReading>>>>>,
}

impl ContextWindowStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a reading, evicting the oldest entry once the window exceeds
    /// capacity. Cannot fail.
    pub fn record(&self, reading: SensorReading) {
        let window = self.device_window(&reading.device_id);
        let mut window = window.lock().expect("window lock poisoned");
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(reading);
    }

    /// Order-preserving owned copy of the current window; empty for devices
    /// that have never recorded.
    pub fn snapshot(&self, device_id: &str) -> Vec<SensorReading> {
        let handle = {
            let windows = self.windows.lock().expect("window map lock poisoned");
            windows.get(device_id).cloned()
        };
        match handle {
            Some(window) => {
                let window = window.lock().expect("window lock poisoned");
                window.iter().cloned().collect()
            }
            None => Vec::new(),
        }
    }

    fn device_window(&self, device_id: &str) -> Arc<Mutex<VecDeque<SensorReading>>> {
        let mut windows = self.windows.lock().expect("window map lock poisoned");
        windows
            .entry(device_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(VecDeque::with_capacity(self.capacity))))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::ContextWindowStore;
    use crate::types::SensorReading;

    fn reading(device_id: &str, co: f64, timestamp_ms: u64) -> SensorReading {
        SensorReading {
            device_id: device_id.to_string(),
            co,
            co2: 420.0,
            timestamp_ms,
            temperature: None,
            humidity: None,
        }
    }

    #[test]
    fn unseen_device_snapshots_empty() {
        let store = ContextWindowStore::new(4);
        assert!(store.snapshot("ghost").is_empty());
    }

    #[test]
    fn record_evicts_oldest_past_capacity() {
        let store = ContextWindowStore::new(3);
        for tick in 0..5u64 {
            store.record(reading("dev-1", tick as f64, tick));
        }

        let snapshot = store.snapshot("dev-1");
        assert_eq!(snapshot.len(), 3);
        let co_values: Vec<f64> = snapshot.iter().map(|r| r.co).collect();
        assert_eq!(co_values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn devices_do_not_share_windows() {
        let store = ContextWindowStore::new(2);
        store.record(reading("dev-1", 1.0, 1));
        store.record(reading("dev-2", 9.0, 1));

        assert_eq!(store.snapshot("dev-1").len(), 1);
        assert_eq!(store.snapshot("dev-2")[0].co, 9.0);
    }
}
