use std::collections::VecDeque;

/// Bounded FIFO of past values. The oldest entry is evicted once `capacity`
/// is reached.
#[derive(Clone, Debug)]
pub struct History {
    values: VecDeque<f32>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the bound, dropping the oldest entries if the history no longer fits.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn push(&mut self, value: f32) {
        while self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean of the stored values, 0 when empty.
    pub fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }

    /// Most recent value.
    pub fn latest(&self) -> Option<f32> {
        self.values.back().copied()
    }

    /// The entry pushed just before the most recent one.
    pub fn previous(&self) -> Option<f32> {
        let len = self.values.len();
        if len < 2 {
            return None;
        }
        self.values.get(len - 2).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }
}

/// One history per bar, indexed by bar position.
#[derive(Clone, Debug, Default)]
pub struct BarHistory {
    bars: Vec<History>,
}

impl BarHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Size the arena for `bar_count` bars. New bars start with an empty
    /// history; bars past the new count are dropped.
    pub fn ensure_bars(&mut self, bar_count: usize, capacity: usize) {
        if self.bars.len() == bar_count {
            return;
        }
        if !self.bars.is_empty() {
            log::debug!("Resizing bar history: {} -> {} bars", self.bars.len(), bar_count);
        }
        self.bars.resize_with(bar_count, || History::new(capacity));
    }

    /// Record `value` for `bar` and return the two-sample smoothed amplitude:
    /// the mean of this value and the one before it, or the value itself when
    /// the bar has no earlier entry.
    ///
    /// Call once per bar per frame in bar order so every history stays the same length.
    pub fn update(&mut self, bar: usize, value: f32, capacity: usize) -> f32 {
        if bar >= self.bars.len() {
            self.ensure_bars(bar + 1, capacity);
        }
        let history = &mut self.bars[bar];
        if history.capacity() != capacity.max(1) {
            history.set_capacity(capacity);
        }
        history.push(value);
        match history.previous() {
            Some(prev) => (value + prev) / 2.0,
            None => value,
        }
    }

    pub fn get(&self, bar: usize) -> Option<&History> {
        self.bars.get(bar)
    }
}

/// Rolling history of overall loudness.
#[derive(Clone, Debug)]
pub struct VolumeHistory {
    history: History,
}

impl Default for VolumeHistory {
    fn default() -> Self {
        Self {
            history: History::new(1),
        }
    }
}

impl VolumeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, volume: f32, capacity: usize) {
        if self.history.capacity() != capacity.max(1) {
            self.history.set_capacity(capacity);
        }
        self.history.push(volume);
    }

    pub fn mean(&self) -> f32 {
        self.history.mean()
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

/// All mutable state of one visualizer. Never shared between instances.
#[derive(Clone, Debug, Default)]
pub struct HistoryState {
    pub bars: BarHistory,
    pub volume: VolumeHistory,
}

impl HistoryState {
    pub fn new() -> Self {
        Self::default()
    }
}
