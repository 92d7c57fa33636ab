//! Button polling.
//!
//! The EV3 brick buttons show up as an evdev key device. Instead of reading
//! the event stream, the poller samples the pressed-key bitmap on a fixed
//! interval and reports released-to-pressed edges, so presses that happen
//! while a capture is running never queue up.

pub mod evdev;

use std::thread::sleep;
use std::time::Duration;

use log::{debug, trace};

use crate::error::Result;

pub const KEY_BACKSPACE: u16 = 14;
pub const KEY_ENTER: u16 = 28;
pub const KEY_CAMERA: u16 = 212;

const KEY_MAX: usize = 0x2ff;
pub const KEY_BYTES: usize = KEY_MAX / 8 + 1;

const TRIGGER_KEYS: [u16; 2] = [KEY_ENTER, KEY_CAMERA];
const EXIT_KEYS: [u16; 1] = [KEY_BACKSPACE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Trigger,
    Exit,
}

/// Bitmap of pressed keys, in the layout `EVIOCGKEY` fills in
#[derive(Clone, PartialEq, Eq)]
pub struct KeySet([u8; KEY_BYTES]);

impl KeySet {
    pub fn empty() -> Self {
        KeySet([0; KEY_BYTES])
    }

    pub fn from_codes(codes: &[u16]) -> Self {
        let mut set = Self::empty();
        for &code in codes {
            set.insert(code);
        }
        set
    }

    pub fn from_bytes(bytes: [u8; KEY_BYTES]) -> Self {
        KeySet(bytes)
    }

    pub fn insert(&mut self, code: u16) {
        let code = code as usize;
        if code <= KEY_MAX {
            self.0[code / 8] |= 1 << (code % 8);
        }
    }

    pub fn contains(&self, code: u16) -> bool {
        let code = code as usize;
        code <= KEY_MAX && self.0[code / 8] & (1 << (code % 8)) != 0
    }

    pub fn merge(&mut self, other: &KeySet) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a |= b;
        }
    }

    fn any_of(&self, codes: &[u16]) -> bool {
        codes.iter().any(|&c| self.contains(c))
    }
}

impl std::fmt::Debug for KeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let codes: Vec<usize> = (0..=KEY_MAX)
            .filter(|&c| self.0[c / 8] & (1 << (c % 8)) != 0)
            .collect();
        write!(f, "KeySet{:?}", codes)
    }
}

/// Anything that can report which keys are held down right now
pub trait KeySource {
    fn pressed(&mut self) -> Result<KeySet>;
}

/// Something the booth loop can ask for button presses
pub trait Buttons {
    /// Returns a press if one started since the last call
    fn poll(&mut self) -> Result<Option<Press>>;

    fn wait_for_press(&mut self, interval: Duration) -> Result<Press> {
        loop {
            if let Some(press) = self.poll()? {
                return Ok(press);
            }
            sleep(interval);
        }
    }
}

pub struct ButtonPoller<S: KeySource> {
    source: S,
    last: KeySet,
}

impl<S: KeySource> ButtonPoller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            last: KeySet::empty(),
        }
    }
}

impl<S: KeySource> Buttons for ButtonPoller<S> {
    fn poll(&mut self) -> Result<Option<Press>> {
        let now = self.source.pressed()?;
        if now != self.last {
            trace!("Keys changed: {:?} -> {:?}", self.last, now);
        }

        let edge = |codes: &[u16]| now.any_of(codes) && !self.last.any_of(codes);
        let press = if edge(&EXIT_KEYS) {
            Some(Press::Exit)
        } else if edge(&TRIGGER_KEYS) {
            Some(Press::Trigger)
        } else {
            None
        };

        if let Some(p) = press {
            debug!("Button press: {:?}", p);
        }
        self.last = now;
        Ok(press)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    struct Scripted(VecDeque<KeySet>);

    impl KeySource for Scripted {
        fn pressed(&mut self) -> Result<KeySet> {
            Ok(self.0.pop_front().unwrap_or_else(KeySet::empty))
        }
    }

    fn poller(states: &[&[u16]]) -> ButtonPoller<Scripted> {
        ButtonPoller::new(Scripted(
            states.iter().map(|codes| KeySet::from_codes(codes)).collect(),
        ))
    }

    #[test]
    fn test_key_set() {
        let mut set = KeySet::from_codes(&[KEY_ENTER]);
        assert!(set.contains(KEY_ENTER));
        assert!(!set.contains(KEY_BACKSPACE));
        set.merge(&KeySet::from_codes(&[KEY_CAMERA]));
        assert!(set.contains(KEY_CAMERA));
        assert!(!set.contains(0x300));
        assert_eq!(format!("{:?}", set), "KeySet[28, 212]");
    }

    #[test]
    fn test_hold_is_one_press() {
        let mut p = poller(&[&[], &[KEY_ENTER], &[KEY_ENTER], &[KEY_ENTER], &[]]);
        let presses: Vec<_> = (0..5).map(|_| p.poll().unwrap()).collect();
        assert_eq!(
            presses,
            vec![None, Some(Press::Trigger), None, None, None]
        );
    }

    #[test]
    fn test_release_and_press_again() {
        let mut p = poller(&[&[KEY_CAMERA], &[], &[KEY_ENTER]]);
        assert_eq!(p.poll().unwrap(), Some(Press::Trigger));
        assert_eq!(p.poll().unwrap(), None);
        assert_eq!(p.poll().unwrap(), Some(Press::Trigger));
    }

    #[test]
    fn test_exit_wins() {
        let mut p = poller(&[&[KEY_ENTER, KEY_BACKSPACE]]);
        assert_eq!(p.poll().unwrap(), Some(Press::Exit));
    }

    #[test]
    fn test_exit_while_trigger_held() {
        let mut p = poller(&[&[KEY_ENTER], &[KEY_ENTER, KEY_BACKSPACE]]);
        assert_eq!(p.poll().unwrap(), Some(Press::Trigger));
        assert_eq!(p.poll().unwrap(), Some(Press::Exit));
    }

    #[test]
    fn test_wait_for_press() {
        let mut p = poller(&[&[], &[], &[KEY_BACKSPACE]]);
        assert_eq!(p.wait_for_press(Duration::ZERO).unwrap(), Press::Exit);
    }
}
