/// Gamepad input interpretation.
///
/// `InputDispatcher` turns the raw, ordered stream of pad events into at most
/// one `Action` per event.  It owns the two pieces of input state:
///
/// - `DebounceState`: last accepted instant per control.  Every control except
///   Select is debounced on its own clock.
/// - `ModifierState`: whether Select is held and when it was pressed.
///
/// ```text
///   Select press/release ──► ModifierState (never an action)
///   A/B press ──┬─ Select pressed < save window ago ─► SaveBookmark (one-shot)
///               └─ otherwise ─────────────────────────► RecallBookmark
///   Start press ─────────────────────────────────────► TogglePlayback
///   X/Y axis ───┬─ Select held + admin enabled ───────► admin column
///               └─ otherwise ─────────────────────────► normal column
/// ```
///
/// Executing the action is the caller's job (see `core::RadioCore`), which
/// keeps this module free of I/O and trivially testable.
use std::collections::HashMap;
use std::time::{Duration, Instant};

use padradio_proto::config::InputConfig;
use padradio_proto::protocol::{
    Axis, AxisZone, BookmarkSlot, Button, ButtonState, Control, InputEvent,
};
use tracing::debug;

/// Everything a pad event can ask the radio to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    TogglePlayback,
    PreviousStation,
    NextStation,
    VolumeUp,
    VolumeDown,

    // ── Bookmarks ────────────────────────────────────────────────────────────
    SaveBookmark(BookmarkSlot),
    RecallBookmark(BookmarkSlot),

    // ── Admin (Select held) ──────────────────────────────────────────────────
    RestartApp,
    AnnounceNetwork,
    RunUpdate,
    Reboot,
}

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub debounce_window: Duration,
    pub bookmark_save_window: Duration,
    pub axis_low: i32,
    pub axis_high: i32,
    pub admin_enabled: bool,
}

impl DispatchSettings {
    pub fn from_config(input: &InputConfig, admin_enabled: bool) -> Self {
        Self {
            debounce_window: input.debounce_window(),
            bookmark_save_window: input.bookmark_save_window(),
            axis_low: input.axis_low_threshold,
            axis_high: input.axis_high_threshold,
            admin_enabled,
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&InputConfig::default(), false)
    }
}

#[derive(Debug, Default)]
pub struct DebounceState {
    last_accepted: HashMap<Control, Instant>,
}

impl DebounceState {
    /// Accept `control` at `now` if it has been idle for at least `window`,
    /// recording `now` as its new reference point.  A control that was never
    /// accepted before always passes.
    pub fn accept(&mut self, control: Control, now: Instant, window: Duration) -> bool {
        if let Some(last) = self.last_accepted.get(&control) {
            if now.saturating_duration_since(*last) < window {
                return false;
            }
        }
        self.last_accepted.insert(control, now);
        true
    }

    #[cfg(test)]
    pub fn last_accepted(&self, control: Control) -> Option<Instant> {
        self.last_accepted.get(&control).copied()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ModifierState {
    pub held: bool,
    /// Set on press; cleared on release and when a save chord consumes it.
    pub pressed_at: Option<Instant>,
}

impl ModifierState {
    fn press(&mut self, at: Instant) {
        self.held = true;
        self.pressed_at = Some(at);
    }

    fn release(&mut self) {
        self.held = false;
        self.pressed_at = None;
    }

    fn save_chord_open(&self, now: Instant, window: Duration) -> bool {
        match self.pressed_at {
            Some(pressed_at) => self.held && now.saturating_duration_since(pressed_at) < window,
            None => false,
        }
    }
}

pub struct InputDispatcher {
    settings: DispatchSettings,
    debounce: DebounceState,
    modifier: ModifierState,
}

impl InputDispatcher {
    pub fn new(settings: DispatchSettings) -> Self {
        Self {
            settings,
            debounce: DebounceState::default(),
            modifier: ModifierState::default(),
        }
    }

    #[cfg(test)]
    pub fn modifier(&self) -> ModifierState {
        self.modifier
    }

    #[cfg(test)]
    pub fn debounce(&self) -> &DebounceState {
        &self.debounce
    }

    /// Fold one event into the input state and return the action it maps to,
    /// if any.  Events must be fed in arrival order.
    pub fn interpret(&mut self, event: &InputEvent) -> Option<Action> {
        match *event {
            InputEvent::Button { button, state, at } => match (button, state) {
                (Button::Select, ButtonState::Pressed) => {
                    self.modifier.press(at);
                    debug!("Select held, waiting for A/B or stick");
                    None
                }
                (Button::Select, ButtonState::Released) => {
                    self.modifier.release();
                    debug!("Select released");
                    None
                }
                (_, ButtonState::Released) => None,
                (Button::Start, ButtonState::Pressed) => self
                    .accept(Control::Start, at)
                    .then_some(Action::TogglePlayback),
                (Button::ActionA, ButtonState::Pressed) => self
                    .accept(Control::ActionA, at)
                    .then(|| self.bookmark_action(BookmarkSlot::A, at)),
                (Button::ActionB, ButtonState::Pressed) => self
                    .accept(Control::ActionB, at)
                    .then(|| self.bookmark_action(BookmarkSlot::B, at)),
            },

            InputEvent::Axis { axis, value, at } => {
                if !self.accept(axis.into(), at) {
                    return None;
                }
                let zone =
                    AxisZone::classify(value, self.settings.axis_low, self.settings.axis_high);
                let admin = self.settings.admin_enabled && self.modifier.held;
                let action = axis_action(axis, zone, admin);
                if admin && action.is_some() {
                    debug!("Admin stick {:?} {:?}", axis, zone);
                }
                action
            }
        }
    }

    fn accept(&mut self, control: Control, at: Instant) -> bool {
        let accepted = self
            .debounce
            .accept(control, at, self.settings.debounce_window);
        if !accepted {
            debug!("Debounced {:?}", control);
        }
        accepted
    }

    fn bookmark_action(&mut self, slot: BookmarkSlot, now: Instant) -> Action {
        if self
            .modifier
            .save_chord_open(now, self.settings.bookmark_save_window)
        {
            // One save per Select press; a second A/B in the same hold recalls.
            self.modifier.pressed_at = None;
            Action::SaveBookmark(slot)
        } else {
            Action::RecallBookmark(slot)
        }
    }
}

fn axis_action(axis: Axis, zone: AxisZone, admin: bool) -> Option<Action> {
    let action = match (axis, zone, admin) {
        (_, AxisZone::Neutral, _) => return None,
        (Axis::X, AxisZone::Low, false) => Action::PreviousStation,
        (Axis::X, AxisZone::High, false) => Action::NextStation,
        (Axis::Y, AxisZone::Low, false) => Action::VolumeUp,
        (Axis::Y, AxisZone::High, false) => Action::VolumeDown,
        (Axis::X, AxisZone::Low, true) => Action::RestartApp,
        (Axis::X, AxisZone::High, true) => Action::AnnounceNetwork,
        (Axis::Y, AxisZone::Low, true) => Action::RunUpdate,
        (Axis::Y, AxisZone::High, true) => Action::Reboot,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn dispatcher(admin_enabled: bool) -> InputDispatcher {
        InputDispatcher::new(DispatchSettings {
            admin_enabled,
            ..DispatchSettings::default()
        })
    }

    fn press(b: Button, at: Instant) -> InputEvent {
        InputEvent::press(b, at)
    }

    fn release(b: Button, at: Instant) -> InputEvent {
        InputEvent::release(b, at)
    }

    #[test]
    fn test_debounce_rejects_presses_inside_window() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        assert_eq!(d.interpret(&press(Button::Start, t0)), Some(Action::TogglePlayback));
        assert_eq!(d.interpret(&press(Button::Start, t0 + ms(100))), None);
        assert_eq!(d.interpret(&press(Button::Start, t0 + ms(299))), None);
        // Rejected presses do not move the reference point.
        assert_eq!(d.debounce().last_accepted(Control::Start), Some(t0));
    }

    #[test]
    fn test_debounce_accepts_at_window_boundary() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        assert!(d.interpret(&press(Button::Start, t0)).is_some());
        assert!(d.interpret(&press(Button::Start, t0 + ms(300))).is_some());
        assert!(d.interpret(&press(Button::Start, t0 + ms(700))).is_some());
    }

    #[test]
    fn test_debounce_is_per_control() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        assert!(d.interpret(&press(Button::Start, t0)).is_some());
        assert_eq!(
            d.interpret(&press(Button::ActionA, t0 + ms(10))),
            Some(Action::RecallBookmark(BookmarkSlot::A))
        );
        assert_eq!(
            d.interpret(&InputEvent::axis(Axis::X, 200, t0 + ms(20))),
            Some(Action::NextStation)
        );
        assert_eq!(
            d.interpret(&InputEvent::axis(Axis::Y, 0, t0 + ms(30))),
            Some(Action::VolumeUp)
        );
        assert_eq!(d.interpret(&InputEvent::axis(Axis::X, 200, t0 + ms(40))), None);
    }

    #[test]
    fn test_release_is_ignored_and_not_debounced() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        assert_eq!(d.interpret(&release(Button::Start, t0)), None);
        assert_eq!(d.debounce().last_accepted(Control::Start), None);
        assert!(d.interpret(&press(Button::Start, t0 + ms(1))).is_some());
    }

    #[test]
    fn test_select_press_release_clears_modifier() {
        let t0 = Instant::now();
        let mut d = dispatcher(true);
        assert_eq!(d.interpret(&press(Button::Select, t0)), None);
        assert_eq!(
            d.modifier(),
            ModifierState {
                held: true,
                pressed_at: Some(t0)
            }
        );
        assert_eq!(d.interpret(&release(Button::Select, t0 + ms(5))), None);
        assert_eq!(d.modifier(), ModifierState::default());
    }

    #[test]
    fn test_select_bypasses_debounce() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        d.interpret(&press(Button::Select, t0));
        d.interpret(&release(Button::Select, t0 + ms(10)));
        d.interpret(&press(Button::Select, t0 + ms(20)));
        assert_eq!(d.modifier().pressed_at, Some(t0 + ms(20)));
        assert!(d.modifier().held);
        assert_eq!(d.debounce().last_accepted(Control::Select), None);
    }

    #[test]
    fn test_save_chord_is_one_shot() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        d.interpret(&press(Button::Select, t0));
        assert_eq!(
            d.interpret(&press(Button::ActionA, t0 + ms(500))),
            Some(Action::SaveBookmark(BookmarkSlot::A))
        );
        assert!(d.modifier().held);
        assert_eq!(d.modifier().pressed_at, None);

        // Still holding Select: the next A press is a recall.
        assert_eq!(
            d.interpret(&press(Button::ActionA, t0 + ms(1500))),
            Some(Action::RecallBookmark(BookmarkSlot::A))
        );
    }

    #[test]
    fn test_save_chord_consumed_across_slots() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        d.interpret(&press(Button::Select, t0));
        assert_eq!(
            d.interpret(&press(Button::ActionB, t0 + ms(100))),
            Some(Action::SaveBookmark(BookmarkSlot::B))
        );
        assert_eq!(
            d.interpret(&press(Button::ActionA, t0 + ms(200))),
            Some(Action::RecallBookmark(BookmarkSlot::A))
        );
    }

    #[test]
    fn test_save_chord_rearms_on_new_select_press() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        d.interpret(&press(Button::Select, t0));
        d.interpret(&press(Button::ActionA, t0 + ms(100)));
        d.interpret(&release(Button::Select, t0 + ms(200)));
        d.interpret(&press(Button::Select, t0 + ms(300)));
        assert_eq!(
            d.interpret(&press(Button::ActionA, t0 + ms(800))),
            Some(Action::SaveBookmark(BookmarkSlot::A))
        );
    }

    #[test]
    fn test_save_window_expires() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        d.interpret(&press(Button::Select, t0));
        assert_eq!(
            d.interpret(&press(Button::ActionB, t0 + Duration::from_secs(10))),
            Some(Action::RecallBookmark(BookmarkSlot::B))
        );
    }

    #[test]
    fn test_bookmark_after_select_released_is_recall() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        d.interpret(&press(Button::Select, t0));
        d.interpret(&release(Button::Select, t0 + ms(50)));
        assert_eq!(
            d.interpret(&press(Button::ActionA, t0 + ms(100))),
            Some(Action::RecallBookmark(BookmarkSlot::A))
        );
    }

    #[test]
    fn test_debounced_bookmark_press_keeps_chord_armed() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        d.interpret(&press(Button::ActionA, t0));
        d.interpret(&press(Button::Select, t0 + ms(50)));
        // Inside A's debounce window: dropped before the chord is looked at.
        assert_eq!(d.interpret(&press(Button::ActionA, t0 + ms(100))), None);
        assert_eq!(d.modifier().pressed_at, Some(t0 + ms(50)));
        assert_eq!(
            d.interpret(&press(Button::ActionA, t0 + ms(400))),
            Some(Action::SaveBookmark(BookmarkSlot::A))
        );
    }

    #[test]
    fn test_normal_axis_column() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        assert_eq!(d.interpret(&InputEvent::axis(Axis::X, 50, t0)), Some(Action::PreviousStation));
        assert_eq!(
            d.interpret(&InputEvent::axis(Axis::X, 200, t0 + ms(300))),
            Some(Action::NextStation)
        );
        assert_eq!(d.interpret(&InputEvent::axis(Axis::X, 125, t0 + ms(600))), None);
        assert_eq!(d.interpret(&InputEvent::axis(Axis::Y, 0, t0)), Some(Action::VolumeUp));
        assert_eq!(
            d.interpret(&InputEvent::axis(Axis::Y, 255, t0 + ms(300))),
            Some(Action::VolumeDown)
        );
    }

    #[test]
    fn test_neutral_axis_still_consumes_debounce() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        assert_eq!(d.interpret(&InputEvent::axis(Axis::X, 128, t0)), None);
        assert_eq!(d.interpret(&InputEvent::axis(Axis::X, 255, t0 + ms(100))), None);
        assert_eq!(
            d.interpret(&InputEvent::axis(Axis::X, 255, t0 + ms(300))),
            Some(Action::NextStation)
        );
    }

    #[test]
    fn test_admin_column_while_select_held() {
        let t0 = Instant::now();
        let mut d = dispatcher(true);
        d.interpret(&press(Button::Select, t0));
        assert_eq!(d.interpret(&InputEvent::axis(Axis::X, 0, t0)), Some(Action::RestartApp));
        assert_eq!(
            d.interpret(&InputEvent::axis(Axis::X, 255, t0 + ms(300))),
            Some(Action::AnnounceNetwork)
        );
        assert_eq!(d.interpret(&InputEvent::axis(Axis::Y, 0, t0)), Some(Action::RunUpdate));
        assert_eq!(
            d.interpret(&InputEvent::axis(Axis::Y, 255, t0 + ms(300))),
            Some(Action::Reboot)
        );
    }

    #[test]
    fn test_admin_column_repeats_while_held() {
        let t0 = Instant::now();
        let mut d = dispatcher(true);
        d.interpret(&press(Button::Select, t0));
        for i in 0..3 {
            assert_eq!(
                d.interpret(&InputEvent::axis(Axis::X, 255, t0 + ms(300 * i))),
                Some(Action::AnnounceNetwork)
            );
        }
        // A save chord in between does not leave admin mode.
        assert_eq!(
            d.interpret(&press(Button::ActionA, t0 + ms(950))),
            Some(Action::SaveBookmark(BookmarkSlot::A))
        );
        assert_eq!(
            d.interpret(&InputEvent::axis(Axis::X, 255, t0 + ms(1000))),
            Some(Action::AnnounceNetwork)
        );
        d.interpret(&release(Button::Select, t0 + ms(1100)));
        assert_eq!(
            d.interpret(&InputEvent::axis(Axis::X, 255, t0 + ms(1300))),
            Some(Action::NextStation)
        );
    }

    #[test]
    fn test_admin_disabled_ignores_select() {
        let t0 = Instant::now();
        let mut d = dispatcher(false);
        d.interpret(&press(Button::Select, t0));
        assert_eq!(d.interpret(&InputEvent::axis(Axis::Y, 255, t0)), Some(Action::VolumeDown));
        assert_eq!(d.interpret(&InputEvent::axis(Axis::X, 0, t0)), Some(Action::PreviousStation));
    }
}
