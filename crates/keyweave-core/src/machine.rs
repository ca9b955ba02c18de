use crate::keycodes::{Key, LogicalKey};
use crate::modifiers::ModifierMask;
use crate::sink::{EventSink, KeyEvent, KeyEventKind};
use crate::state::KeyboardState;
use keyweave_protocol::KeyAction;
use tracing::trace;

/// A raw action after keycode lookup and modifier tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyInput {
    pub key: LogicalKey,
    pub action: KeyAction,
    pub unichar: Option<char>,
    pub composed: bool,
    pub modifiers: ModifierMask,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    pub kind: Option<KeyEventKind>,
    /// The sink accepted the event.
    pub emitted: bool,
    /// The caller must fire the emergency terminate once the lock is released.
    pub terminate: bool,
}

/// Press/repeat/release classification for one keyboard.
#[derive(Debug, Clone, Default)]
pub struct KeyStateMachine {
    repeat_latch: Option<LogicalKey>,
    pause_down: bool,
    emergency_terminate: bool,
}

impl KeyStateMachine {
    pub fn new(emergency_terminate: bool) -> Self {
        Self {
            emergency_terminate,
            ..Default::default()
        }
    }

    /// Last key that produced a press event and has not been released.
    pub fn repeat_latch(&self) -> Option<LogicalKey> {
        self.repeat_latch
    }

    pub fn emergency_terminate(&self) -> bool {
        self.emergency_terminate
    }

    pub fn process(
        &mut self,
        input: KeyInput,
        state: &mut KeyboardState,
        sink: &mut dyn EventSink,
    ) -> Transition {
        let key = input.key;
        if !key.is_valid() {
            return Transition::default();
        }

        let mut action = input.action;
        if key == Key::Pause {
            // Pause reports no usable release; every other press releases it.
            match action {
                KeyAction::Release => return Transition::default(),
                KeyAction::Press if self.pause_down => {
                    self.pause_down = false;
                    action = KeyAction::Release;
                }
                KeyAction::Press => self.pause_down = true,
            }
        }

        match action {
            KeyAction::Press => {
                state.update(key, true);
                let kind = if self.repeat_latch == Some(key) {
                    KeyEventKind::Repeat
                } else {
                    KeyEventKind::Press
                };
                self.repeat_latch = Some(key);

                let mods = input.modifiers;
                let event = KeyEvent {
                    kind,
                    key,
                    unichar: if mods.contains(ModifierMask::ALT) {
                        None
                    } else {
                        input.unichar
                    },
                    modifiers: mods,
                    timestamp: input.timestamp,
                    buffered: !input.composed && !key.is_modifier(),
                };

                let terminate = self.emergency_terminate
                    && kind == KeyEventKind::Press
                    && (key == Key::Delete || key == Key::End)
                    && mods.contains(ModifierMask::CTRL)
                    && mods.intersects(ModifierMask::ALT | ModifierMask::ALTGR);

                Transition {
                    kind: Some(kind),
                    emitted: emit(sink, event),
                    terminate,
                }
            }
            KeyAction::Release => {
                state.update(key, false);
                if self.repeat_latch == Some(key) {
                    self.repeat_latch = None;
                }
                let event = KeyEvent {
                    kind: KeyEventKind::Release,
                    key,
                    unichar: None,
                    modifiers: ModifierMask::empty(),
                    timestamp: input.timestamp,
                    buffered: true,
                };
                Transition {
                    kind: Some(KeyEventKind::Release),
                    emitted: emit(sink, event),
                    terminate: false,
                }
            }
        }
    }
}

fn emit(sink: &mut dyn EventSink, event: KeyEvent) -> bool {
    if !sink.wants(event.kind) {
        return false;
    }
    if !sink.has_capacity() {
        trace!("no free event slot, {} of {} dropped", event.kind, event.key);
        return false;
    }
    sink.publish(event);
    true
}
