use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::config::TouchConfig;

/// Raw pointer input. `y` values are screen pixels, growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScrollInput {
    Wheel { delta_y: f32 },
    TouchStart { y: f32, time_ms: u64 },
    TouchMove { y: f32 },
    TouchEnd { y: f32, time_ms: u64 },
    TouchCancel,
}

/// Recorded input replayed at fixed ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    pub tick: u32,
    #[serde(flatten)]
    pub input: ScrollInput,
}

#[derive(Debug, Clone, Default)]
pub struct InputScript {
    entries: Vec<ScriptedInput>,
}

impl InputScript {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        let mut entries: Vec<ScriptedInput> = serde_json::from_str(text)?;
        // Stable, so same-tick inputs keep file order
        entries.sort_by_key(|e| e.tick);
        Ok(Self { entries })
    }

    pub fn inputs_at(&self, tick: u32) -> impl Iterator<Item = ScrollInput> + '_ {
        let start = self.entries.partition_point(|e| e.tick < tick);
        self.entries[start..]
            .iter()
            .take_while(move |e| e.tick == tick)
            .map(|e| e.input)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Producer handle; clone freely into event handlers
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: Sender<ScrollInput>,
}

impl InputSender {
    /// Returns false once the consuming session is gone
    pub fn send(&self, input: ScrollInput) -> bool {
        self.sender.send(input).is_ok()
    }
}

/// Multi-producer queue with a single per-tick consumer
#[derive(Debug)]
pub struct InputQueue {
    sender: Sender<ScrollInput>,
    receiver: Receiver<ScrollInput>,
}

impl InputQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Everything queued so far, oldest first
    pub fn drain(&self) -> impl Iterator<Item = ScrollInput> + '_ {
        self.receiver.try_iter()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns touch gestures into scroll deltas in input units. Dragging up
/// scrolls forward, like the wheel.
#[derive(Debug, Clone)]
pub struct TouchTracker {
    config: TouchConfig,
    gesture: Option<Gesture>,
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    origin_y: f32,
    last_y: f32,
    start_ms: u64,
}

impl TouchTracker {
    pub fn new(config: TouchConfig) -> Self {
        Self {
            config,
            gesture: None,
        }
    }

    pub fn is_touching(&self) -> bool {
        self.gesture.is_some()
    }

    /// Delta to feed the scroll target, if this input produces one
    pub fn handle(&mut self, input: ScrollInput) -> Option<f32> {
        match input {
            ScrollInput::Wheel { delta_y } => Some(delta_y),
            ScrollInput::TouchStart { y, time_ms } => {
                self.gesture = Some(Gesture {
                    origin_y: y,
                    last_y: y,
                    start_ms: time_ms,
                });
                None
            }
            ScrollInput::TouchMove { y } => {
                let gesture = self.gesture.as_mut()?;
                let delta = gesture.last_y - y;
                gesture.last_y = y;
                Some(delta * self.config.multiplier)
            }
            ScrollInput::TouchEnd { y, time_ms } => {
                let gesture = self.gesture.take()?;
                let duration = time_ms.saturating_sub(gesture.start_ms);
                let total = gesture.origin_y - y;

                let is_flick = duration < self.config.flick_ms && total.abs() > self.config.flick_px;
                is_flick.then(|| total * self.config.inertia * self.config.multiplier)
            }
            ScrollInput::TouchCancel => {
                self.gesture = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> TouchTracker {
        TouchTracker::new(TouchConfig::default())
    }

    #[test]
    fn test_queue_preserves_order() {
        let queue = InputQueue::new();
        let sender = queue.sender();
        sender.send(ScrollInput::Wheel { delta_y: 1.0 });
        sender.send(ScrollInput::Wheel { delta_y: 2.0 });

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![ScrollInput::Wheel { delta_y: 1.0 }, ScrollInput::Wheel { delta_y: 2.0 }]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_sender_works_across_threads() {
        let queue = InputQueue::new();
        let sender = queue.sender();

        std::thread::spawn(move || {
            for _ in 0..10 {
                sender.send(ScrollInput::Wheel { delta_y: 3.0 });
            }
        })
        .join()
        .unwrap();

        assert_eq!(queue.len(), 10);
    }

    #[test]
    fn test_wheel_passes_through() {
        assert_eq!(tracker().handle(ScrollInput::Wheel { delta_y: -40.0 }), Some(-40.0));
    }

    #[test]
    fn test_drag_up_scrolls_forward() {
        let mut t = tracker();
        assert_eq!(t.handle(ScrollInput::TouchStart { y: 500.0, time_ms: 0 }), None);
        assert_eq!(t.handle(ScrollInput::TouchMove { y: 490.0 }), Some(50.0));
        // Follows the finger, not the origin
        assert_eq!(t.handle(ScrollInput::TouchMove { y: 485.0 }), Some(25.0));
    }

    #[test]
    fn test_move_without_start_is_ignored() {
        assert_eq!(tracker().handle(ScrollInput::TouchMove { y: 10.0 }), None);
    }

    #[test]
    fn test_quick_flick_adds_inertia() {
        let mut t = tracker();
        t.handle(ScrollInput::TouchStart { y: 600.0, time_ms: 1_000 });
        t.handle(ScrollInput::TouchMove { y: 520.0 });

        let inertia = t.handle(ScrollInput::TouchEnd { y: 500.0, time_ms: 1_150 });

        // 100 px * 0.3 * 5
        assert_eq!(inertia, Some(150.0));
        assert!(!t.is_touching());
    }

    #[test]
    fn test_slow_or_short_release_has_no_inertia() {
        let mut t = tracker();
        t.handle(ScrollInput::TouchStart { y: 600.0, time_ms: 0 });
        assert_eq!(t.handle(ScrollInput::TouchEnd { y: 400.0, time_ms: 500 }), None);

        t.handle(ScrollInput::TouchStart { y: 600.0, time_ms: 0 });
        assert_eq!(t.handle(ScrollInput::TouchEnd { y: 580.0, time_ms: 50 }), None);
    }

    #[test]
    fn test_cancel_drops_gesture() {
        let mut t = tracker();
        t.handle(ScrollInput::TouchStart { y: 600.0, time_ms: 0 });
        t.handle(ScrollInput::TouchCancel);
        assert!(!t.is_touching());
        assert_eq!(t.handle(ScrollInput::TouchEnd { y: 100.0, time_ms: 10 }), None);
    }

    #[test]
    fn test_input_script_json() {
        let json = r#"[{"kind":"wheel","delta_y":120.0},{"kind":"touch_cancel"}]"#;
        let inputs: Vec<ScrollInput> = serde_json::from_str(json).unwrap();
        assert_eq!(inputs[0], ScrollInput::Wheel { delta_y: 120.0 });
        assert_eq!(inputs[1], ScrollInput::TouchCancel);
    }

    #[test]
    fn test_script_groups_by_tick() {
        let json = r#"[
            {"tick": 5, "kind": "wheel", "delta_y": 2.0},
            {"tick": 1, "kind": "touch_start", "y": 300.0, "time_ms": 16},
            {"tick": 5, "kind": "wheel", "delta_y": 3.0}
        ]"#;
        let script = InputScript::from_json_str(json).unwrap();

        assert_eq!(script.len(), 3);
        assert_eq!(script.inputs_at(0).count(), 0);
        assert_eq!(
            script.inputs_at(1).collect::<Vec<_>>(),
            vec![ScrollInput::TouchStart { y: 300.0, time_ms: 16 }]
        );
        assert_eq!(
            script.inputs_at(5).collect::<Vec<_>>(),
            vec![ScrollInput::Wheel { delta_y: 2.0 }, ScrollInput::Wheel { delta_y: 3.0 }]
        );
    }
}
