use hbdm::PricePoint;
use std::collections::VecDeque;

/// One hour of one-second ticks.
pub const DEFAULT_LIVE_CAPACITY: usize = 3_600;

/// Bounded buffer behind the live chart.
///
/// Points are kept in arrival order with no dedup or reordering. Once
/// `capacity` is reached each push evicts the oldest point.
#[derive(Debug, Clone)]
pub struct LiveBuffer {
    points: VecDeque<PricePoint>,
    capacity: usize,
}

impl LiveBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity.min(DEFAULT_LIVE_CAPACITY)),
            capacity,
        }
    }

    /// Appends `point`; returns the evicted point when the buffer was full.
    pub fn push(&mut self, point: PricePoint) -> Option<PricePoint> {
        let evicted = if self.points.len() >= self.capacity {
            self.points.pop_front()
        } else {
            None
        };
        self.points.push_back(point);
        evicted
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    /// `(x = ts, y = close)` pairs for the chart.
    pub fn chart_data(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.ts as f64, p.close)).collect()
    }
}

impl Default for LiveBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LIVE_CAPACITY)
    }
}
