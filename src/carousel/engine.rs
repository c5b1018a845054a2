// src/carousel/engine.rs
//! Carousel rotation engine
//!
//! Owns the slide states, the current index and the two timers a carousel
//! ever has: the rotation timer (next auto-advance) and the stagger timer
//! (incoming slide becomes active shortly after the outgoing one leaves).
//!
//! The engine is sans-IO: callers pass `now` into every operation and ask
//! for `next_deadline()`, then call `poll()` once that instant is reached.
//! The async driver in `runtime` does exactly that with tokio timers.
//!
//! Rules:
//! - at most one rotation timer is pending at any time
//! - auto-rotation only runs while visible and not hovered
//! - zero slides means the engine is disabled and every call is a no-op
//! - a navigate request during an in-flight transition is dropped

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use super::deck::SlideDeck;
use super::slide::{Direction, Slide, SlideState};
use crate::config::CarouselConfig;

// ============================================================================
// Core Types
// ============================================================================

/// What triggered a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationCause {
    /// Rotation timer fired
    Auto,
    /// Prev/next button
    Button,
    /// Arrow key while focused
    Keyboard,
    /// Horizontal swipe
    Swipe,
    /// Indicator dot
    Indicator,
}

impl NavigationCause {
    /// Manual navigation holds off auto-rotation for the grace period
    pub fn is_manual(&self) -> bool {
        !matches!(self, Self::Auto)
    }
}

/// Default period plus index-aligned per-slide overrides.
///
/// An override is how long that slide stays on screen before the next
/// auto-advance. It is looked up for the slide that has just become current.
#[derive(Debug, Clone)]
pub struct RotationSchedule {
    default_period: Duration,
    overrides: Vec<Option<Duration>>,
}

impl RotationSchedule {
    pub fn new(default_period: Duration, overrides: Vec<Option<Duration>>) -> Self {
        Self {
            default_period,
            overrides,
        }
    }

    pub fn period_for(&self, index: usize) -> Duration {
        self.overrides
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(self.default_period)
    }

    pub fn default_period(&self) -> Duration {
        self.default_period
    }
}

/// Pending auto-advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationTimer {
    pub due: Instant,
    /// Sequence number of this schedule, for tracing overlapping timers
    pub id: u64,
}

/// Second half of a transition, waiting out the stagger delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingEnter {
    due: Instant,
    outgoing: usize,
    incoming: usize,
    direction: Direction,
}

/// Record of one accepted navigation
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub timestamp: DateTime<Utc>,
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
    pub cause: NavigationCause,
}

// ============================================================================
// Carousel
// ============================================================================

#[derive(Debug)]
pub struct Carousel {
    slides: Vec<Slide>,
    current: Option<usize>,
    schedule: RotationSchedule,
    stagger: Duration,
    manual_grace: Duration,
    visibility_threshold: f32,

    hovered: bool,
    visible: bool,
    transitioning: bool,

    rotation_timer: Option<RotationTimer>,
    pending_enter: Option<PendingEnter>,
    timers_scheduled: u64,

    /// Bumped on every visual change so presenters know when to redraw
    revision: u64,
    history: VecDeque<Transition>,
    history_limit: usize,
}

impl Carousel {
    /// Build an engine over a deck. Starts not visible, so nothing is
    /// scheduled until the first visibility signal arrives.
    pub fn new(deck: SlideDeck, config: &CarouselConfig) -> Self {
        let SlideDeck { slides, overrides } = deck;
        let current = initial_index(&slides);

        if slides.is_empty() {
            info!("[CAROUSEL] No slides, carousel disabled");
        } else {
            info!("[CAROUSEL] Ready with {} slides", slides.len());
        }

        Self {
            slides,
            current,
            schedule: RotationSchedule::new(config.rotation_period(), overrides),
            stagger: config.stagger(),
            manual_grace: config.manual_grace(),
            visibility_threshold: config.visibility_threshold,
            hovered: false,
            visible: false,
            transitioning: false,
            rotation_timer: None,
            pending_enter: None,
            timers_scheduled: 0,
            revision: 0,
            history: VecDeque::new(),
            history_limit: config.history_limit.max(1),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_enabled(&self) -> bool {
        !self.slides.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn state_of(&self, index: usize) -> Option<SlideState> {
        self.slides.get(index).map(|s| s.state)
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn schedule(&self) -> &RotationSchedule {
        &self.schedule
    }

    pub fn rotation_timer(&self) -> Option<RotationTimer> {
        self.rotation_timer
    }

    /// Total rotation timers ever scheduled
    pub fn timers_scheduled(&self) -> u64 {
        self.timers_scheduled
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> impl Iterator<Item = &Transition> {
        self.history.iter()
    }

    /// Earliest instant at which `poll` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        let stagger = self.pending_enter.map(|p| p.due);
        let rotation = self.rotation_timer.map(|t| t.due);
        match (stagger, rotation) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn can_rotate(&self) -> bool {
        self.is_enabled() && self.visible && !self.hovered
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn navigate_next(&mut self, now: Instant, cause: NavigationCause) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let target = (current + 1) % self.slides.len();
        self.transition_to(target, Direction::Forward, now, cause)
    }

    pub fn navigate_prev(&mut self, now: Instant, cause: NavigationCause) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let len = self.slides.len();
        let target = (current + len - 1) % len;
        self.transition_to(target, Direction::Backward, now, cause)
    }

    /// Jump to a slide; direction follows the index order
    pub fn go_to(&mut self, target: usize, now: Instant, cause: NavigationCause) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        if target == current || target >= self.slides.len() {
            return false;
        }
        let direction = if target > current {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.transition_to(target, direction, now, cause)
    }

    fn transition_to(
        &mut self,
        target: usize,
        direction: Direction,
        now: Instant,
        cause: NavigationCause,
    ) -> bool {
        let Some(outgoing) = self.current else {
            return false;
        };
        if self.transitioning {
            debug!(
                "[CAROUSEL] Dropped {:?} navigation to {}: transition in flight",
                cause, target
            );
            return false;
        }
        // A single slide wraps onto itself; nothing to animate.
        if target == outgoing {
            self.cancel_rotation("single slide");
            self.reschedule_after_navigation(now, cause);
            return false;
        }

        self.cancel_rotation("navigation");

        let exiting = &mut self.slides[outgoing];
        exiting.state = direction.exit_state();
        exiting.suppress_transition = false;

        let incoming = &mut self.slides[target];
        incoming.state = direction.entry_state();
        incoming.suppress_transition = true;

        self.current = Some(target);
        self.transitioning = true;
        self.pending_enter = Some(PendingEnter {
            due: now + self.stagger,
            outgoing,
            incoming: target,
            direction,
        });
        self.revision += 1;

        info!(
            "[CAROUSEL] {} → {} | {:?} | {:?}",
            outgoing, target, direction, cause
        );
        self.record(Transition {
            timestamp: Utc::now(),
            from: outgoing,
            to: target,
            direction,
            cause,
        });

        self.reschedule_after_navigation(now, cause);
        true
    }

    fn reschedule_after_navigation(&mut self, now: Instant, cause: NavigationCause) {
        if !self.can_rotate() {
            return;
        }
        let delay = if cause.is_manual() {
            self.manual_grace
        } else {
            self.current_period()
        };
        self.schedule_rotation(now, delay);
    }

    fn record(&mut self, transition: Transition) {
        self.history.push_back(transition);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    // ========================================================================
    // Pause / visibility
    // ========================================================================

    /// Pointer entered (true) or left (false) the carousel region
    pub fn set_hovered(&mut self, hovered: bool, now: Instant) {
        self.update_gate(now, |c| c.hovered = hovered);
    }

    /// Viewport intersection ratio from the visibility observer
    pub fn set_intersection_ratio(&mut self, ratio: f32, now: Instant) {
        let visible = ratio >= self.visibility_threshold;
        self.set_visible(visible, now);
    }

    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        self.update_gate(now, |c| c.visible = visible);
    }

    // Cancel on the transition to blocked, fresh full period on the
    // transition to unblocked, nothing otherwise.
    fn update_gate(&mut self, now: Instant, apply: impl FnOnce(&mut Self)) {
        let before = self.can_rotate();
        apply(self);
        let after = self.can_rotate();

        match (before, after) {
            (true, false) => self.cancel_rotation("paused"),
            (false, true) => {
                let period = self.current_period();
                self.schedule_rotation(now, period);
            }
            _ => {}
        }
    }

    // ========================================================================
    // Timers
    // ========================================================================

    fn current_period(&self) -> Duration {
        self.current
            .map(|i| self.schedule.period_for(i))
            .unwrap_or(self.schedule.default_period())
    }

    fn schedule_rotation(&mut self, now: Instant, delay: Duration) {
        if !self.can_rotate() {
            return;
        }
        // Replacing always goes through cancel so only one timer is live
        self.cancel_rotation("rescheduled");
        self.timers_scheduled += 1;
        self.rotation_timer = Some(RotationTimer {
            due: now + delay,
            id: self.timers_scheduled,
        });
        debug!(
            "[CAROUSEL] Rotation timer #{} in {:?}",
            self.timers_scheduled, delay
        );
    }

    fn cancel_rotation(&mut self, reason: &str) {
        if let Some(timer) = self.rotation_timer.take() {
            debug!("[CAROUSEL] Rotation timer #{} cancelled ({})", timer.id, reason);
        }
    }

    /// Run every timer due at or before `now`, earliest first.
    /// Returns the number of timer callbacks processed.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut fired = 0;

        loop {
            let stagger_due = self.pending_enter.map(|p| p.due).filter(|d| *d <= now);
            let rotation_due = self.rotation_timer.map(|t| t.due).filter(|d| *d <= now);

            match (stagger_due, rotation_due) {
                (Some(s), Some(r)) if s <= r => self.settle_transition(),
                (Some(_), None) => self.settle_transition(),
                (_, Some(_)) => self.fire_rotation(),
                (None, None) => break,
            }
            fired += 1;
        }

        fired
    }

    fn settle_transition(&mut self) {
        let Some(pending) = self.pending_enter.take() else {
            return;
        };

        if let Some(outgoing) = self.slides.get_mut(pending.outgoing) {
            outgoing.state = pending.direction.settled_state();
            outgoing.suppress_transition = false;
        }
        if let Some(incoming) = self.slides.get_mut(pending.incoming) {
            incoming.state = SlideState::Active;
            incoming.suppress_transition = false;
        }

        self.transitioning = false;
        self.revision += 1;
        debug!("[CAROUSEL] Slide {} settled active", pending.incoming);
    }

    fn fire_rotation(&mut self) {
        let Some(timer) = self.rotation_timer.take() else {
            return;
        };
        debug!("[CAROUSEL] Rotation timer #{} fired", timer.id);

        if self.transitioning {
            let period = self.current_period();
            self.schedule_rotation(timer.due, period);
            return;
        }
        self.navigate_next(timer.due, NavigationCause::Auto);
    }

    // ========================================================================
    // Reload
    // ========================================================================

    /// Replace the whole slide sequence, keeping hover/visibility flags
    pub fn replace_deck(&mut self, deck: SlideDeck, now: Instant) {
        self.cancel_rotation("reload");
        self.pending_enter = None;
        self.transitioning = false;

        let SlideDeck { slides, overrides } = deck;
        self.current = initial_index(&slides);
        self.slides = slides;
        self.schedule = RotationSchedule::new(self.schedule.default_period(), overrides);
        self.revision += 1;

        info!("[CAROUSEL] Reloaded with {} slides", self.slides.len());
        let period = self.current_period();
        self.schedule_rotation(now, period);
    }
}

/// The pre-set active slide, else the first; `None` for an empty deck
fn initial_index(slides: &[Slide]) -> Option<usize> {
    if slides.is_empty() {
        return None;
    }
    Some(slides.iter().position(|s| s.state.is_active()).unwrap_or(0))
}
