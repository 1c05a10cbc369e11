use crate::types::ResourceType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// A delivered load waiting for, or going through, processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub resource_type: ResourceType,
    pub amount: u32,
    pub remaining_ticks: u32,
}

/// Batches that changed phase during one station tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StationTick {
    pub started: Option<Batch>,
    pub completed: Option<Batch>,
}

/// The base facility: a single-server FIFO pipeline turning raw deliveries
/// into processed resources.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessingStation {
    pub received: BTreeMap<ResourceType, u64>,
    pub processed: BTreeMap<ResourceType, u64>,
    pub queue: VecDeque<Batch>,
    pub current: Option<Batch>,
    pub total_processed: u64,
}

impl Default for ProcessingStation {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStation {
    pub fn new() -> Self {
        let zeroed: BTreeMap<ResourceType, u64> =
            ResourceType::ALL.iter().map(|r| (*r, 0)).collect();
        Self {
            received: zeroed.clone(),
            processed: zeroed,
            queue: VecDeque::new(),
            current: None,
            total_processed: 0,
        }
    }

    pub fn receive(&mut self, amount: u32, resource_type: ResourceType) {
        *self.received.entry(resource_type).or_insert(0) += u64::from(amount);
        self.queue.push_back(Batch {
            resource_type,
            amount,
            remaining_ticks: resource_type.processing_time(),
        });
    }

    /// Starts the next queued batch if the line is free, then advances the
    /// batch in flight by one tick.
    pub fn tick(&mut self) -> StationTick {
        let mut outcome = StationTick::default();

        if self.current.is_none() {
            self.current = self.queue.pop_front();
            outcome.started = self.current;
        }

        if let Some(batch) = self.current.as_mut() {
            batch.remaining_ticks = batch.remaining_ticks.saturating_sub(1);
            if batch.remaining_ticks == 0 {
                let done = *batch;
                *self.processed.entry(done.resource_type).or_insert(0) += u64::from(done.amount);
                self.total_processed += u64::from(done.amount);
                self.current = None;
                outcome.completed = Some(done);
            }
        }

        outcome
    }

    pub fn processed_of(&self, resource_type: ResourceType) -> u64 {
        self.processed.get(&resource_type).copied().unwrap_or(0)
    }

    /// Credits earned by everything processed so far.
    pub fn total_value(&self) -> u64 {
        self.processed
            .iter()
            .map(|(resource, amount)| amount * resource.credit_value())
            .sum()
    }

    /// Share of each resource in the processed output, in percent.
    pub fn resource_distribution(&self) -> BTreeMap<ResourceType, f64> {
        let total: u64 = self.processed.values().sum();
        self.processed
            .iter()
            .map(|(resource, amount)| {
                let share = if total == 0 {
                    0.0
                } else {
                    *amount as f64 / total as f64 * 100.0
                };
                (*resource, share)
            })
            .collect()
    }

    pub fn get_status(&self) -> String {
        let status = match (self.current, self.queue.len()) {
            (None, 0) => "Idle",
            (Some(_), 0) => "Processing",
            (_, n) if n >= 5 => "Backlogged",
            _ => "Processing with queue",
        };

        format!(
            "{} | Processed: {} | Queued batches: {} | Value: {} credits",
            status,
            self.total_processed,
            self.queue.len(),
            self.total_value()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_batches() {
        let mut station = ProcessingStation::new();
        station.receive(12, ResourceType::Iron);
        station.receive(5, ResourceType::Gold);

        let first = station.tick();
        assert_eq!(first.completed.map(|b| b.resource_type), Some(ResourceType::Iron));
        assert_eq!(station.processed_of(ResourceType::Iron), 12);
        assert_eq!(station.processed_of(ResourceType::Gold), 0);

        let second = station.tick();
        assert_eq!(second.started.map(|b| b.resource_type), Some(ResourceType::Gold));
        assert!(second.completed.is_none());

        let third = station.tick();
        assert_eq!(third.completed.map(|b| b.amount), Some(5));
        assert_eq!(station.processed_of(ResourceType::Gold), 5);
        assert_eq!(station.total_processed, 17);
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut station = ProcessingStation::new();
        assert_eq!(station.tick(), StationTick::default());
        assert_eq!(station.total_processed, 0);
    }

    #[test]
    fn test_received_counts_before_processing() {
        let mut station = ProcessingStation::new();
        station.receive(7, ResourceType::Platinum);
        assert_eq!(station.received[&ResourceType::Platinum], 7);
        assert_eq!(station.processed_of(ResourceType::Platinum), 0);
    }

    #[test]
    fn test_value_and_distribution() {
        let mut station = ProcessingStation::new();
        station.receive(10, ResourceType::Iron);
        station.receive(10, ResourceType::Water);
        for _ in 0..3 {
            station.tick();
        }
        assert_eq!(station.total_value(), 10 + 20);
        let shares = station.resource_distribution();
        assert!((shares[&ResourceType::Iron] - 50.0).abs() < 1e-9);
        assert_eq!(shares[&ResourceType::Helium], 0.0);
    }
}
