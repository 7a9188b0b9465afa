use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Digital buttons on the pad that the radio reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Select,
    Start,
    ActionA,
    ActionB,
}

/// Analog stick axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Every physical control, used as the debounce key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Select,
    Start,
    ActionA,
    ActionB,
    AxisX,
    AxisY,
}

impl From<Button> for Control {
    fn from(button: Button) -> Self {
        match button {
            Button::Select => Control::Select,
            Button::Start => Control::Start,
            Button::ActionA => Control::ActionA,
            Button::ActionB => Control::ActionB,
        }
    }
}

impl From<Axis> for Control {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => Control::AxisX,
            Axis::Y => Control::AxisY,
        }
    }
}

/// A single discrete occurrence read from the input device, stamped with the
/// moment it was read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Button {
        button: Button,
        state: ButtonState,
        at: Instant,
    },
    Axis {
        axis: Axis,
        value: i32,
        at: Instant,
    },
}

impl InputEvent {
    pub fn press(button: Button, at: Instant) -> Self {
        Self::Button {
            button,
            state: ButtonState::Pressed,
            at,
        }
    }

    pub fn release(button: Button, at: Instant) -> Self {
        Self::Button {
            button,
            state: ButtonState::Released,
            at,
        }
    }

    pub fn axis(axis: Axis, value: i32, at: Instant) -> Self {
        Self::Axis { axis, value, at }
    }

    pub fn at(&self) -> Instant {
        match *self {
            Self::Button { at, .. } | Self::Axis { at, .. } => at,
        }
    }

    pub fn control(&self) -> Control {
        match *self {
            Self::Button { button, .. } => button.into(),
            Self::Axis { axis, .. } => axis.into(),
        }
    }
}

/// Where an axis reading falls relative to the stick's dead zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisZone {
    Low,
    Neutral,
    High,
}

impl AxisZone {
    /// Values strictly below `low` are Low, strictly above `high` are High,
    /// everything in between (bounds included) is Neutral.
    pub fn classify(value: i32, low: i32, high: i32) -> Self {
        if value < low {
            AxisZone::Low
        } else if value > high {
            AxisZone::High
        } else {
            AxisZone::Neutral
        }
    }
}

/// The two bookmark slots, bound to the A and B buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookmarkSlot {
    A,
    B,
}

impl BookmarkSlot {
    pub fn label(&self) -> &'static str {
        match self {
            BookmarkSlot::A => "A",
            BookmarkSlot::B => "B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Station {
    pub name: String,
    pub url: String,
}
