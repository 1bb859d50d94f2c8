//! Sound and haptic feedback as an injected capability
//!
//! Services announce what happened; the embedding shell decides how it
//! sounds or feels. The server build only logs the cues.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Scan,
    Wheel,
    Success,
    Button,
    Swipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticStyle {
    Light,
    Medium,
    Heavy,
    Success,
    Warning,
    Error,
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for HapticStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub trait Feedback: Send + Sync {
    fn play(&self, cue: SoundCue);

    fn haptic(&self, style: HapticStyle);
}

/// Default for headless builds
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFeedback;

impl Feedback for TracingFeedback {
    fn play(&self, cue: SoundCue) {
        tracing::debug!("feedback: sound {}", cue);
    }

    fn haptic(&self, style: HapticStyle) {
        tracing::debug!("feedback: haptic {}", style);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Cue {
        Sound(SoundCue),
        Haptic(HapticStyle),
    }

    /// Records every cue so tests can assert on them
    #[derive(Default)]
    pub struct RecordingFeedback {
        cues: Mutex<Vec<Cue>>,
    }

    impl RecordingFeedback {
        pub fn cues(&self) -> Vec<Cue> {
            self.cues.lock().unwrap().clone()
        }
    }

    impl Feedback for RecordingFeedback {
        fn play(&self, cue: SoundCue) {
            self.cues.lock().unwrap().push(Cue::Sound(cue));
        }

        fn haptic(&self, style: HapticStyle) {
            self.cues.lock().unwrap().push(Cue::Haptic(style));
        }
    }
}
