//! evdev gamepad reader.
//!
//! The device is read on a dedicated OS thread (evdev reads block) and every
//! recognised event is forwarded to the core loop, which stays the only
//! owner of input and playback state.
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use evdev::{AbsoluteAxisType, Device, InputEventKind, Key};
use padradio_proto::protocol::{Axis, Button, ButtonState, InputEvent};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::core::RadioEvent;

const SELECT: Key = Key::BTN_BASE3;
const START: Key = Key::BTN_BASE4;
const ACTION_A: Key = Key::BTN_TRIGGER;
const ACTION_B: Key = Key::BTN_THUMB;

/// Open the configured device, or the first one that looks like our pad.
pub fn open_device(configured: Option<&Path>) -> anyhow::Result<Device> {
    if let Some(path) = configured {
        let device =
            Device::open(path).with_context(|| format!("failed to open gamepad {:?}", path))?;
        info!("Gamepad: {} ({:?})", device.name().unwrap_or("unnamed"), path);
        return Ok(device);
    }

    let (path, device) = evdev::enumerate()
        .find(|(_, d)| looks_like_pad(d))
        .context("no gamepad found")?;
    info!("Gamepad: {} ({:?})", device.name().unwrap_or("unnamed"), path);
    Ok(device)
}

fn looks_like_pad(device: &Device) -> bool {
    let has_select = device
        .supported_keys()
        .map_or(false, |keys| keys.contains(SELECT));
    let has_stick = device
        .supported_absolute_axes()
        .map_or(false, |axes| axes.contains(AbsoluteAxisType::ABS_X));
    has_select && has_stick
}

/// Map one raw evdev event onto the pad model.  Unknown codes, sync frames
/// and key auto-repeat yield `None`.
pub fn translate(ev: &evdev::InputEvent, at: Instant) -> Option<InputEvent> {
    match ev.kind() {
        InputEventKind::Key(key) => {
            let button = match key {
                SELECT => Button::Select,
                START => Button::Start,
                ACTION_A => Button::ActionA,
                ACTION_B => Button::ActionB,
                _ => return None,
            };
            let state = match ev.value() {
                1 => ButtonState::Pressed,
                0 => ButtonState::Released,
                _ => return None,
            };
            Some(InputEvent::Button { button, state, at })
        }
        InputEventKind::AbsAxis(axis) => {
            let axis = match axis {
                AbsoluteAxisType::ABS_X => Axis::X,
                AbsoluteAxisType::ABS_Y => Axis::Y,
                _ => return None,
            };
            Some(InputEvent::Axis {
                axis,
                value: ev.value(),
                at,
            })
        }
        _ => None,
    }
}

/// Consecutive read failures tolerated before the device is given up on.
const MAX_READ_ERRORS: u32 = 10;

/// Tracks back-to-back read failures.  A successful read resets the count.
#[derive(Debug, Default)]
struct ReadFailures {
    consecutive: u32,
}

impl ReadFailures {
    fn reset(&mut self) {
        self.consecutive = 0;
    }

    /// Record one failed read.  Returns true when the device should be
    /// treated as gone: it vanished outright, or it kept failing.
    fn record(&mut self, err: &std::io::Error) -> bool {
        if err.raw_os_error() == Some(libc::ENODEV) {
            return true;
        }
        self.consecutive += 1;
        self.consecutive >= MAX_READ_ERRORS
    }
}

/// Read `device` forever on its own thread.  The thread ends when the device
/// goes away (after sending `InputClosed`) or the core loop is gone.
pub fn spawn_reader(
    mut device: Device,
    event_tx: mpsc::Sender<RadioEvent>,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("gamepad".into())
        .spawn(move || {
            let mut failures = ReadFailures::default();
            loop {
                let events = match device.fetch_events() {
                    Ok(events) => events,
                    Err(e) => {
                        if failures.record(&e) {
                            error!("Gamepad disconnected: {}", e);
                            let _ = event_tx.blocking_send(RadioEvent::InputClosed);
                            return;
                        }
                        warn!("Gamepad read error: {}", e);
                        std::thread::sleep(Duration::from_millis(200));
                        continue;
                    }
                };
                failures.reset();
                for ev in events {
                    let Some(input) = translate(&ev, Instant::now()) else {
                        continue;
                    };
                    if event_tx.blocking_send(RadioEvent::Input(input)).is_err() {
                        return;
                    }
                }
            }
        })
}
