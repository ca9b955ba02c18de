use crate::backend::KeyboardBackend;
use crate::keycodes::LogicalKey;
use crate::machine::{KeyInput, KeyStateMachine, Transition};
use crate::mapping::{BuildReport, KeyMapping, KeySlot, MappingParams};
use crate::modifiers::{ModifierMask, ModifierTracker};
use crate::sink::EventSink;
use crate::state::KeyboardState;
use crate::terminate::{SignalTerminator, Terminator};
use keyweave_protocol::{DriverConfig, HardwareCode, KeyOverride, RawKeyEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct KeyboardOptions {
    #[builder(default)]
    pub emergency_terminate: bool,
    /// Defaults to the current process.
    #[builder(default, setter(strip_option))]
    pub terminate_pid: Option<u32>,
    #[builder(default)]
    pub overrides: Vec<KeyOverride>,
    #[builder(default = Box::new(SignalTerminator) as Box<dyn Terminator>)]
    pub terminator: Box<dyn Terminator>,
}

impl Default for KeyboardOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl KeyboardOptions {
    pub fn from_config(config: &DriverConfig) -> Self {
        Self {
            emergency_terminate: config.emergency_terminate,
            terminate_pid: config.terminate_pid,
            ..Default::default()
        }
    }
}

/// Result of a mapping rebuild. Never a hard failure.
#[derive(Debug, Clone)]
pub enum RebuildOutcome {
    Rebuilt(BuildReport),
    /// The rebuild failed; the previous mapping stays live.
    Retained(String),
    /// The rebuild failed with no previous mapping; every code is ignored.
    Degraded(String),
}

impl RebuildOutcome {
    pub fn report(&self) -> Option<&BuildReport> {
        match self {
            RebuildOutcome::Rebuilt(report) => Some(report),
            _ => None,
        }
    }
}

struct Core<S> {
    mapping: Arc<KeyMapping>,
    built: bool,
    tracker: ModifierTracker,
    machine: KeyStateMachine,
    state: KeyboardState,
    sink: S,
    overrides: Vec<KeyOverride>,
}

/// One keyboard: live mapping, modifier tracker, state machine and state
/// store behind a single lock.
pub struct Keyboard<B: KeyboardBackend, S: EventSink> {
    backend: B,
    core: Mutex<Core<S>>,
    /// Held from backend query to install so rebuilds land in call order.
    rebuild: Mutex<()>,
    terminator: Box<dyn Terminator>,
    terminate_pid: u32,
    started: Instant,
}

impl<B: KeyboardBackend, S: EventSink> Keyboard<B, S> {
    /// Creates a keyboard with an all-ignored mapping. Call
    /// [`Keyboard::rebuild_mapping`] before feeding events.
    pub fn new(backend: B, sink: S, options: KeyboardOptions) -> Self {
        let mode = backend.modifier_mode();
        info!(
            "⌨️  Keyboard on backend '{}' ({:?} modifiers)",
            backend.name(),
            mode
        );
        Self {
            core: Mutex::new(Core {
                mapping: Arc::new(KeyMapping::ignored()),
                built: false,
                tracker: ModifierTracker::new(mode),
                machine: KeyStateMachine::new(options.emergency_terminate),
                state: KeyboardState::default(),
                sink,
                overrides: options.overrides,
            }),
            rebuild: Mutex::new(()),
            backend,
            terminator: options.terminator,
            terminate_pid: options.terminate_pid.unwrap_or_else(std::process::id),
            started: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Core<S>> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Queries the backend and swaps in a freshly built mapping.
    ///
    /// Concurrent rebuilds run one at a time; the backend query happens
    /// outside the event lock.
    pub fn rebuild_mapping(&self) -> RebuildOutcome {
        let _serial = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);

        let (previous, overrides) = {
            let core = self.lock();
            (
                core.mapping.fingerprint().map(str::to_string),
                core.overrides.clone(),
            )
        };

        let built = self.backend.query_keymap().and_then(|description| {
            MappingParams::builder()
                .description(&description)
                .overrides(&overrides)
                .previous_fingerprint(previous.as_deref())
                .build()
                .build_mapping()
        });

        let mut core = self.lock();
        match built {
            Ok((mapping, report)) => {
                core.mapping = mapping;
                core.built = true;
                info!(
                    "✅ Mapping rebuilt: {} assigned, {} ignored, {} fallbacks",
                    report.assigned,
                    report.ignored,
                    report.fallbacks.len()
                );
                RebuildOutcome::Rebuilt(report)
            }
            Err(e) if core.built => {
                error!("Keymap rebuild failed, keeping previous mapping: {}", e);
                RebuildOutcome::Retained(e.to_string())
            }
            Err(e) => {
                error!("Keymap rebuild failed, all keys ignored: {}", e);
                RebuildOutcome::Degraded(e.to_string())
            }
        }
    }

    /// Replaces the override list and rebuilds so it takes effect.
    pub fn set_overrides(&self, overrides: Vec<KeyOverride>) -> RebuildOutcome {
        self.lock().overrides = overrides;
        self.rebuild_mapping()
    }

    /// Runs one raw key action through lookup, modifier tracking and the
    /// state machine. In tracked modifier mode the event's state field is
    /// rewritten.
    pub fn handle_raw_event(&self, event: &mut RawKeyEvent) -> Transition {
        let timestamp = self.started.elapsed().as_secs_f64();

        let transition = {
            let mut guard = self.lock();
            let core = &mut *guard;

            let key = match core.mapping.lookup(event.code) {
                KeySlot::Assigned(key) => key,
                KeySlot::Ignored => LogicalKey::NONE,
                KeySlot::Unresolved => late_assignment(&mut core.mapping, event.code),
            };
            let modifiers = core.tracker.update(event, core.mapping.modifiers());

            core.machine.process(
                KeyInput {
                    key,
                    action: event.action,
                    unichar: event.unichar,
                    composed: event.composed,
                    modifiers,
                    timestamp,
                },
                &mut core.state,
                &mut core.sink,
            )
        };

        if transition.terminate {
            self.terminator.terminate(self.terminate_pid);
        }
        transition
    }

    pub fn snapshot_state(&self) -> KeyboardState {
        self.lock().state
    }

    pub fn is_down(&self, key: LogicalKey) -> bool {
        self.lock().state.is_down(key)
    }

    pub fn name_of(&self, key: LogicalKey) -> String {
        self.lock().mapping.name_of(key)
    }

    /// The live mapping. Later rebuilds do not affect the returned value.
    pub fn mapping(&self) -> Arc<KeyMapping> {
        Arc::clone(&self.lock().mapping)
    }

    pub fn modifiers(&self) -> ModifierMask {
        self.lock().tracker.current()
    }

    /// Forwards the lock indicators of `leds` to the backend.
    pub fn set_leds(&self, leds: ModifierMask) {
        let leds = leds & ModifierMask::LEDS;
        if let Err(e) = self.backend.set_leds(leds) {
            warn!("Backend '{}' rejected LED update: {}", self.backend.name(), e);
        }
    }

    /// Runs `f` on the state store and sink under the keyboard lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&KeyboardState, &mut S) -> R) -> R {
        let mut guard = self.lock();
        let core = &mut *guard;
        f(&core.state, &mut core.sink)
    }
}

/// Retries the fallback for a code left unresolved by the build. The shared
/// mapping is only copied when a free key exists.
fn late_assignment(mapping: &mut Arc<KeyMapping>, code: HardwareCode) -> LogicalKey {
    if !mapping.has_free_key() {
        return LogicalKey::NONE;
    }
    match Arc::make_mut(mapping).assign_fallback(code) {
        Some(key) => {
            debug!("key [{}] assigned late to {}", code, key.0);
            key
        }
        None => LogicalKey::NONE,
    }
}
