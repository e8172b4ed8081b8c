#![forbid(unsafe_code)]

//! On-screen keyboard control.
//!
//! Hosts implement [`SoftInput`] over their input-method service.
//! [`soft_input_height`] derives keyboard visibility from window geometry
//! when the platform offers no direct query.

/// Threshold above which an obscured screen bottom counts as a keyboard,
/// as a fraction of the screen height.
pub const VISIBLE_FRACTION: f64 = 0.15;

/// The on-screen keyboard of one window.
pub trait SoftInput {
    /// Element that can take keyboard focus.
    type Focus: ?Sized;

    fn is_visible(&self) -> bool;

    /// Focus `focus` and open the keyboard for it.
    fn show(&mut self, focus: &Self::Focus);

    fn hide(&mut self);

    /// Drop keyboard focus without closing the keyboard.
    fn clear_focus(&mut self);

    /// Hide if visible. Returns whether a hide was requested.
    fn hide_if_visible(&mut self) -> bool {
        if self.is_visible() {
            self.hide();
            true
        } else {
            false
        }
    }
}

/// Keyboard height for a window whose visible frame ends at
/// `visible_bottom`, or `None` when the obscured strip is too small to be
/// a keyboard (navigation bars, cutouts).
#[must_use]
pub fn soft_input_height(screen_height: u32, visible_bottom: u32) -> Option<u32> {
    let obscured = screen_height.saturating_sub(visible_bottom);
    (f64::from(obscured) > f64::from(screen_height) * VISIBLE_FRACTION).then_some(obscured)
}
