use std::io::Write;

/// Completion cue playback. Acquired when the timer screen is entered and
/// released when it is left; ringing never fails loudly.
pub trait Chime {
    fn ring(&self);
}

/// Rings the terminal bell. Write failures are swallowed.
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn ring(&self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

/// No-op playback for when the bell is disabled.
pub struct SilentChime;

impl Chime for SilentChime {
    fn ring(&self) {}
}
