use log::debug;

use crate::config::ScrollConfig;
use crate::error::MorphError;

/// Largest distance, as a fraction of the range, that the target may run
/// ahead of or behind the value. Must stay below one half so the
/// shortest-path step in [`smoothing_step`] keeps the input's direction.
pub const MAX_TARGET_LEAD: f32 = 0.45;

/// Continuous scroll position. `value` chases `target` and both live in
/// `[min, max]`; crossing either bound moves to the neighbouring segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub value: f32,
    pub target: f32,
    min: f32,
    max: f32,
    pub sensitivity: f32,
    pub smoothness: f32,
}

impl ScrollState {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            value: 0.0,
            target: 0.0,
            min: config.min,
            max: config.max,
            sensitivity: config.sensitivity,
            smoothness: config.smoothness,
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn range(&self) -> f32 {
        self.max - self.min
    }
}

/// One exponential smoothing step from `value` toward `target`, going the
/// short way around a window of width `range`.
pub fn smoothing_step(value: f32, target: f32, range: f32, smoothness: f32) -> f32 {
    value + wrapped_diff(target - value, range) * smoothness
}

fn wrapped_diff(diff: f32, range: f32) -> f32 {
    if diff.abs() > range / 2.0 {
        if diff > 0.0 {
            diff - range
        } else {
            diff + range
        }
    } else {
        diff
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexChange {
    Advanced,
    Retreated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub index: usize,
    pub next_index: usize,
    pub progress: f32,
    pub change: Option<IndexChange>,
}

/// Scroll-driven walk over `model_count - 1` transitions. Transition `i`
/// morphs model `i` into model `i + 1`.
#[derive(Debug, Clone)]
pub struct TransitionMachine {
    scroll: ScrollState,
    index: usize,
    model_count: usize,
    progress: f32,
}

impl TransitionMachine {
    pub fn new(model_count: usize, config: &ScrollConfig) -> Result<Self, MorphError> {
        if model_count < 2 {
            return Err(MorphError::TooFewModels(model_count));
        }

        let scroll = ScrollState::new(config);
        Ok(Self {
            progress: scroll.value.clamp(0.0, 1.0),
            scroll,
            index: 0,
            model_count,
        })
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next_index(&self) -> usize {
        (self.index + 1).max(1).min(self.model_count - 1)
    }

    pub fn model_count(&self) -> usize {
        self.model_count
    }

    /// Index of the final transition
    pub fn last_index(&self) -> usize {
        self.model_count - 2
    }

    /// Interpolation factor handed to the shader
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Position within the current segment, used for camera framing
    pub fn section_progress(&self) -> f32 {
        self.scroll.value.clamp(0.0, 1.0)
    }

    /// Raw scroll input, in input units (pixels)
    pub fn scroll_by(&mut self, delta: f32) {
        self.move_target(delta * self.scroll.sensitivity);
    }

    /// Moves the target by `delta` in scroll units. Every input path funnels
    /// through here so the end stops and segment carry are applied once.
    pub fn move_target(&mut self, delta: f32) {
        let ScrollState { value, target, min, max, .. } = self.scroll;
        let range = self.scroll.range();

        let lead = range * MAX_TARGET_LEAD;
        let unwrapped = value + wrapped_diff(target - value, range);
        let desired = (unwrapped + delta).clamp(value - lead, value + lead);

        self.scroll.target = if self.index == 0 && desired < min {
            min
        } else if self.index == self.last_index() && desired > max {
            max
        } else if desired > max {
            min + (desired - max)
        } else if desired < min {
            max + (desired - min)
        } else {
            desired
        };
    }

    pub fn tick(&mut self) -> TickOutcome {
        let range = self.scroll.range();
        let (min, max) = (self.scroll.min, self.scroll.max);

        self.scroll.value =
            smoothing_step(self.scroll.value, self.scroll.target, range, self.scroll.smoothness);
        self.progress = self.scroll.value.clamp(0.0, 1.0);

        let mut change = None;
        if self.scroll.value > max {
            self.index = (self.index + 1).min(self.last_index());
            self.scroll.value = min + (self.scroll.value - max);
            self.progress = 0.0;
            change = Some(IndexChange::Advanced);
        } else if self.scroll.value < min {
            self.index = self.index.saturating_sub(1);
            self.scroll.value = max + (self.scroll.value - min);
            self.progress = 1.0;
            change = Some(IndexChange::Retreated);
        }

        if let Some(direction) = change {
            debug!("Transition {:?} to index {}", direction, self.index);
        }

        TickOutcome {
            index: self.index,
            next_index: self.next_index(),
            progress: self.progress,
            change,
        }
    }
}
