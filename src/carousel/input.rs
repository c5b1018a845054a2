// src/carousel/input.rs
//! Pointer, touch, keyboard and visibility input.
//!
//! Raw events go through `InputMapper`, which keeps the little state input
//! needs (touch origin, focus) and yields engine `Command`s.

use tokio::time::Instant;
use tracing::debug;

use super::engine::{Carousel, NavigationCause};

/// Keys the carousel cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Self {
        match key {
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Raw input arriving from the host page
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerEnter,
    PointerLeave,
    TouchStart { x: f32, y: f32 },
    TouchEnd { x: f32, y: f32 },
    FocusIn,
    FocusOut,
    Key(Key),
    PrevButton,
    NextButton,
    Indicator(usize),
    /// Viewport intersection ratio of the container
    Intersection(f32),
}

/// Engine operation derived from input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Next(NavigationCause),
    Prev(NavigationCause),
    GoTo(usize),
    Hover(bool),
    Intersection(f32),
}

impl Command {
    /// Apply to the engine. Returns true when the engine accepted a navigation.
    pub fn apply(self, carousel: &mut Carousel, now: Instant) -> bool {
        match self {
            Self::Next(cause) => carousel.navigate_next(now, cause),
            Self::Prev(cause) => carousel.navigate_prev(now, cause),
            Self::GoTo(index) => carousel.go_to(index, now, NavigationCause::Indicator),
            Self::Hover(hovered) => {
                carousel.set_hovered(hovered, now);
                false
            }
            Self::Intersection(ratio) => {
                carousel.set_intersection_ratio(ratio, now);
                false
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputMapper {
    swipe_threshold: f32,
    touch_origin: Option<(f32, f32)>,
    focused: bool,
}

impl InputMapper {
    pub fn new(swipe_threshold: f32) -> Self {
        Self {
            swipe_threshold,
            touch_origin: None,
            focused: false,
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn map(&mut self, event: InputEvent) -> Option<Command> {
        match event {
            InputEvent::PointerEnter => Some(Command::Hover(true)),
            InputEvent::PointerLeave => Some(Command::Hover(false)),
            InputEvent::TouchStart { x, y } => {
                self.touch_origin = Some((x, y));
                None
            }
            InputEvent::TouchEnd { x, y } => {
                let (x0, y0) = self.touch_origin.take()?;
                self.swipe(x - x0, y - y0)
            }
            InputEvent::FocusIn => {
                self.focused = true;
                None
            }
            InputEvent::FocusOut => {
                self.focused = false;
                None
            }
            InputEvent::Key(key) => {
                if !self.focused {
                    return None;
                }
                match key {
                    Key::ArrowLeft => Some(Command::Prev(NavigationCause::Keyboard)),
                    Key::ArrowRight => Some(Command::Next(NavigationCause::Keyboard)),
                    Key::Other(_) => None,
                }
            }
            InputEvent::PrevButton => Some(Command::Prev(NavigationCause::Button)),
            InputEvent::NextButton => Some(Command::Next(NavigationCause::Button)),
            InputEvent::Indicator(index) => Some(Command::GoTo(index)),
            InputEvent::Intersection(ratio) => Some(Command::Intersection(ratio)),
        }
    }

    // Finger moving left reveals the next slide.
    fn swipe(&self, dx: f32, dy: f32) -> Option<Command> {
        if dx.abs() < self.swipe_threshold || dy.abs() > dx.abs() {
            debug!("[CAROUSEL] Ignored touch (dx={:.0}, dy={:.0})", dx, dy);
            return None;
        }
        if dx < 0.0 {
            Some(Command::Next(NavigationCause::Swipe))
        } else {
            Some(Command::Prev(NavigationCause::Swipe))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swipe(mapper: &mut InputMapper, from: (f32, f32), to: (f32, f32)) -> Option<Command> {
        assert!(mapper.map(InputEvent::TouchStart { x: from.0, y: from.1 }).is_none());
        mapper.map(InputEvent::TouchEnd { x: to.0, y: to.1 })
    }

    #[test]
    fn test_swipe_directions() {
        let mut mapper = InputMapper::new(50.0);
        assert_eq!(swipe(&mut mapper, (200.0, 10.0), (120.0, 12.0)), Some(Command::Next(NavigationCause::Swipe)));
        assert_eq!(swipe(&mut mapper, (100.0, 10.0), (160.0, 10.0)), Some(Command::Prev(NavigationCause::Swipe)));
    }

    #[test]
    fn test_short_or_vertical_swipe_ignored() {
        let mut mapper = InputMapper::new(50.0);
        assert_eq!(swipe(&mut mapper, (100.0, 0.0), (60.0, 0.0)), None);
        assert_eq!(swipe(&mut mapper, (100.0, 0.0), (40.0, 200.0)), None);
    }

    #[test]
    fn test_touch_end_without_start() {
        let mut mapper = InputMapper::new(50.0);
        assert_eq!(mapper.map(InputEvent::TouchEnd { x: 0.0, y: 0.0 }), None);
    }

    #[test]
    fn test_keys_need_focus() {
        let mut mapper = InputMapper::new(50.0);
        assert_eq!(mapper.map(InputEvent::Key(Key::ArrowRight)), None);

        mapper.map(InputEvent::FocusIn);
        assert!(mapper.is_focused());
        assert_eq!(mapper.map(InputEvent::Key(Key::from_dom("ArrowRight"))), Some(Command::Next(NavigationCause::Keyboard)));
        assert_eq!(mapper.map(InputEvent::Key(Key::from_dom("ArrowLeft"))), Some(Command::Prev(NavigationCause::Keyboard)));
        assert_eq!(mapper.map(InputEvent::Key(Key::from_dom("Enter"))), None);

        mapper.map(InputEvent::FocusOut);
        assert_eq!(mapper.map(InputEvent::Key(Key::ArrowLeft)), None);
    }

    #[test]
    fn test_buttons_hover_and_visibility() {
        let mut mapper = InputMapper::new(50.0);
        assert_eq!(mapper.map(InputEvent::NextButton), Some(Command::Next(NavigationCause::Button)));
        assert_eq!(mapper.map(InputEvent::PrevButton), Some(Command::Prev(NavigationCause::Button)));
        assert_eq!(mapper.map(InputEvent::Indicator(2)), Some(Command::GoTo(2)));
        assert_eq!(mapper.map(InputEvent::PointerEnter), Some(Command::Hover(true)));
        assert_eq!(mapper.map(InputEvent::PointerLeave), Some(Command::Hover(false)));
        assert_eq!(mapper.map(InputEvent::Intersection(0.7)), Some(Command::Intersection(0.7)));
    }
}
