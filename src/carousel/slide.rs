// src/carousel/slide.rs
//! Slide records and their visual states.

use serde::{Deserialize, Serialize};

use crate::content::Review;

/// Visual state of one slide.
///
/// At any settled instant exactly one slide is `Active`; every other slide
/// is off-screen. The entering/exiting variants only exist while a
/// transition is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideState {
    Active,
    OffscreenLeft,
    OffscreenRight,
    EnteringLeft,
    EnteringRight,
    ExitingLeft,
    ExitingRight,
}

impl SlideState {
    /// Class name the presentation layer applies for this state
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OffscreenLeft => "offscreen-left",
            Self::OffscreenRight => "offscreen-right",
            Self::EnteringLeft => "entering-left",
            Self::EnteringRight => "entering-right",
            Self::ExitingLeft => "exiting-left",
            Self::ExitingRight => "exiting-right",
        }
    }

    /// Parse a wrapper class back into a state (markup adoption)
    pub fn from_class(class: &str) -> Option<Self> {
        match class.trim() {
            "active" => Some(Self::Active),
            "offscreen-left" => Some(Self::OffscreenLeft),
            "offscreen-right" => Some(Self::OffscreenRight),
            "entering-left" => Some(Self::EnteringLeft),
            "entering-right" => Some(Self::EnteringRight),
            "exiting-left" => Some(Self::ExitingLeft),
            "exiting-right" => Some(Self::ExitingRight),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_offscreen(&self) -> bool {
        matches!(self, Self::OffscreenLeft | Self::OffscreenRight)
    }

    pub fn is_transitional(&self) -> bool {
        !self.is_active() && !self.is_offscreen()
    }
}

/// Direction of travel through the rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// State the outgoing slide takes when it leaves
    pub fn exit_state(&self) -> SlideState {
        match self {
            Self::Forward => SlideState::ExitingLeft,
            Self::Backward => SlideState::ExitingRight,
        }
    }

    /// Off-screen state the outgoing slide settles into
    pub fn settled_state(&self) -> SlideState {
        match self {
            Self::Forward => SlideState::OffscreenLeft,
            Self::Backward => SlideState::OffscreenRight,
        }
    }

    /// Pre-position of the incoming slide before it animates in.
    /// Forward enters from the left, backward from the right.
    pub fn entry_state(&self) -> SlideState {
        match self {
            Self::Forward => SlideState::EnteringLeft,
            Self::Backward => SlideState::EnteringRight,
        }
    }
}

/// Opaque slide payload
#[derive(Debug, Clone, PartialEq)]
pub struct SlideContent {
    pub html: String,
    /// Source record when the slide was built from the review feed
    pub review: Option<Review>,
}

impl SlideContent {
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            review: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub index: usize,
    pub content: SlideContent,
    pub state: SlideState,
    /// Set while the slide is being re-positioned without animation
    pub suppress_transition: bool,
}

impl Slide {
    pub fn new(index: usize, content: SlideContent, state: SlideState) -> Self {
        Self {
            index,
            content,
            state,
            suppress_transition: false,
        }
    }
}
