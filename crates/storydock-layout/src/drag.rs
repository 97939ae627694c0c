//! Drag/redock lifecycle.
//!
//! ```text
//! Idle -> Dragging -> Idle
//!            |-- drop on a target       (Accepted)
//!            |-- release outside        (Cancelled: released_outside)
//!            |-- timeout after start    (Cancelled: timed_out)
//!            |-- new drag begins        (Cancelled: superseded)
//!            `-- force_cancel           (Cancelled: programmatic)
//! ```
//!
//! While dragging, the five drop-target overlays are shown and at most one of
//! them is highlighted. Every step returns a [`DragTransition`] describing
//! the state change, so callers can react (relayout, persist, hide overlays)
//! without the controller knowing about them.
//!
//! The cancel timeout runs on a timer thread. The thread only posts a
//! [`DragMessage`]; [`DragController::pump`] applies it on the owning thread
//! and ignores messages for gestures that already ended.

use std::fmt;
use std::sync::mpsc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storydock_core::{EntityId, Region};
use web_time::Instant;

use crate::error::LayoutError;
use crate::registry::PinRegistry;
use crate::timer::CancelTimer;

/// Identifies one drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureId(u64);

impl GestureId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging {
        gesture: GestureId,
        entity: EntityId,
        origin: Region,
        /// Drop target under the pointer, highlighted.
        hovered: Option<Region>,
        started_at: Instant,
    },
}

/// Why a gesture ended without a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    ReleasedOutside,
    TimedOut,
    Superseded,
    Programmatic,
}

/// Inputs that were safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    /// A timeout for a gesture that already ended.
    StaleTimer,
    HoverUnchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DragEffect {
    Started {
        gesture: GestureId,
        entity: EntityId,
        origin: Region,
    },
    Hovered {
        gesture: GestureId,
        target: Option<Region>,
    },
    Accepted {
        gesture: GestureId,
        entity: EntityId,
        from: Region,
        to: Region,
        /// False when dropped on the region it already occupied.
        moved: bool,
    },
    Cancelled {
        gesture: GestureId,
        entity: EntityId,
        reason: CancelReason,
    },
    Noop {
        reason: DragNoopReason,
    },
}

/// One lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragTransition {
    pub transition_id: u64,
    pub from: DragState,
    pub to: DragState,
    pub effect: DragEffect,
}

impl DragTransition {
    /// True when this step ended a gesture, by drop or cancel.
    #[must_use]
    pub const fn ends_gesture(&self) -> bool {
        matches!(
            self.effect,
            DragEffect::Accepted { .. } | DragEffect::Cancelled { .. }
        )
    }
}

/// Posted by the timer thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMessage {
    TimedOut { gesture: GestureId },
}

/// Owns the drag lifecycle and the cancel timer.
#[derive(Debug)]
pub struct DragController {
    state: DragState,
    timeout: Duration,
    timer: Option<CancelTimer>,
    sender: mpsc::Sender<DragMessage>,
    receiver: mpsc::Receiver<DragMessage>,
    gesture_counter: u64,
    transition_counter: u64,
}

impl DragController {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            state: DragState::Idle,
            timeout,
            timer: None,
            sender,
            receiver,
            gesture_counter: 0,
            transition_counter: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Drop-target overlays are shown exactly while a gesture is active.
    #[must_use]
    pub const fn overlays_visible(&self) -> bool {
        self.is_active()
    }

    /// The highlighted drop target.
    #[must_use]
    pub const fn hovered(&self) -> Option<Region> {
        match self.state {
            DragState::Dragging { hovered, .. } => hovered,
            DragState::Idle => None,
        }
    }

    /// Entity being dragged.
    #[must_use]
    pub const fn dragged(&self) -> Option<EntityId> {
        match self.state {
            DragState::Dragging { entity, .. } => Some(entity),
            DragState::Idle => None,
        }
    }

    fn transition(&mut self, from: DragState, effect: DragEffect) -> DragTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        DragTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
        }
    }

    fn noop(&mut self, reason: DragNoopReason) -> DragTransition {
        let state = self.state;
        self.transition(state, DragEffect::Noop { reason })
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }

    /// Start dragging `entity` out of `origin`.
    ///
    /// An active gesture is cancelled first (`Superseded`), so the returned
    /// list holds one or two transitions.
    pub fn begin(&mut self, entity: EntityId, origin: Region) -> Vec<DragTransition> {
        let mut transitions = Vec::with_capacity(2);
        if let Some(cancelled) = self.cancel(CancelReason::Superseded) {
            transitions.push(cancelled);
        }

        self.gesture_counter = self.gesture_counter.saturating_add(1);
        let gesture = GestureId(self.gesture_counter);
        self.timer = CancelTimer::spawn(
            self.timeout,
            self.sender.clone(),
            DragMessage::TimedOut { gesture },
        );
        let from = self.state;
        self.state = DragState::Dragging {
            gesture,
            entity,
            origin,
            hovered: None,
            started_at: Instant::now(),
        };
        tracing::debug!(%gesture, %entity, %origin, "drag started");
        transitions.push(self.transition(
            from,
            DragEffect::Started {
                gesture,
                entity,
                origin,
            },
        ));
        transitions
    }

    /// Highlight the drop target under the pointer (`None` clears it).
    pub fn hover(&mut self, target: Option<Region>) -> DragTransition {
        let from = self.state;
        let DragState::Dragging {
            gesture,
            entity,
            origin,
            hovered,
            started_at,
        } = from
        else {
            return self.noop(DragNoopReason::IdleWithoutActiveDrag);
        };
        if hovered == target {
            return self.noop(DragNoopReason::HoverUnchanged);
        }
        self.state = DragState::Dragging {
            gesture,
            entity,
            origin,
            hovered: target,
            started_at,
        };
        self.transition(from, DragEffect::Hovered { gesture, target })
    }

    /// Release over `target`: move the dragged entity there.
    ///
    /// Fails with [`LayoutError::NoActiveDrag`] when idle. A gesture already
    /// past its timeout is cancelled (`TimedOut`) instead, whether or not
    /// [`pump`](Self::pump) has seen the timer yet, and the registry is left
    /// alone. If the entity disappeared mid-drag the gesture still ends,
    /// overlays are hidden and the registry error is returned.
    pub fn drop_on(
        &mut self,
        target: Region,
        registry: &mut PinRegistry,
    ) -> Result<DragTransition, LayoutError> {
        if let Some(expired) = self.expire_overdue() {
            return Ok(expired);
        }
        let from = self.state;
        let DragState::Dragging {
            gesture,
            entity,
            origin,
            ..
        } = from
        else {
            return Err(LayoutError::NoActiveDrag);
        };
        self.stop_timer();
        self.state = DragState::Idle;

        let moved = registry.set_region(entity, target)?;
        tracing::debug!(%gesture, %entity, from = %origin, to = %target, moved, "drop accepted");
        Ok(self.transition(
            from,
            DragEffect::Accepted {
                gesture,
                entity,
                from: origin,
                to: target,
                moved,
            },
        ))
    }

    /// Release outside every drop target.
    pub fn release_outside(&mut self) -> DragTransition {
        match self.cancel(CancelReason::ReleasedOutside) {
            Some(transition) => transition,
            None => self.noop(DragNoopReason::IdleWithoutActiveDrag),
        }
    }

    /// Cancel any active gesture; `None` when idle.
    pub fn force_cancel(&mut self) -> Option<DragTransition> {
        self.cancel(CancelReason::Programmatic)
    }

    /// Apply timer messages posted since the last call.
    ///
    /// Must be called on the thread that owns the controller. If the timer
    /// thread could not be started, an overdue gesture is cancelled here.
    pub fn pump(&mut self) -> Vec<DragTransition> {
        let mut transitions = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            let DragMessage::TimedOut { gesture } = message;
            let current = match self.state {
                DragState::Dragging { gesture, .. } => Some(gesture),
                DragState::Idle => None,
            };
            if current == Some(gesture) {
                self.timer = None;
                if let Some(cancelled) = self.cancel(CancelReason::TimedOut) {
                    transitions.push(cancelled);
                }
            } else {
                tracing::trace!(%gesture, "ignoring timeout for finished gesture");
                transitions.push(self.noop(DragNoopReason::StaleTimer));
            }
        }

        if self.timer.is_none() {
            transitions.extend(self.expire_overdue());
        }
        transitions
    }

    /// Cancel the active gesture if its timeout has elapsed.
    fn expire_overdue(&mut self) -> Option<DragTransition> {
        let DragState::Dragging { started_at, .. } = self.state else {
            return None;
        };
        if started_at.elapsed() < self.timeout {
            return None;
        }
        self.cancel(CancelReason::TimedOut)
    }

    fn cancel(&mut self, reason: CancelReason) -> Option<DragTransition> {
        let from = self.state;
        let DragState::Dragging {
            gesture,
            entity,
            started_at,
            ..
        } = from
        else {
            return None;
        };
        self.stop_timer();
        self.state = DragState::Idle;
        tracing::debug!(
            %gesture,
            %entity,
            ?reason,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "drag cancelled"
        );
        Some(self.transition(
            from,
            DragEffect::Cancelled {
                gesture,
                entity,
                reason,
            },
        ))
    }
}
