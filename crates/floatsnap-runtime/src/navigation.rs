#![forbid(unsafe_code)]

//! Screen back stack for a single container.
//!
//! [`NavigationStack`] keeps a *base* screen (the container content that is
//! not on the back stack) and a back stack of screens pushed with
//! [`replace_to_stack`](NavigationStack::replace_to_stack). The current
//! screen is the top of the back stack, or the base when it is empty.
//!
//! # Invariants
//!
//! 1. `back_stack_count()` equals the number of stacked screens; popping
//!    never touches the base.
//! 2. Every navigation hides the soft keyboard, unless
//!    [`skip_next_auto_hide`](NavigationStack::skip_next_auto_hide) was
//!    called since the last navigation. The flag is consumed by exactly one
//!    navigation.
//! 3. [`replace`](NavigationStack::replace) keeps the stack depth: with a
//!    non-empty stack it swaps the top entry.
//!
//! # Failure Modes
//!
//! - Positions, amounts and tags that match nothing leave the stack
//!   unchanged (amounts larger than the stack clear it).

use tracing::debug;
use web_time::{Duration, Instant};

use crate::soft_input::SoftInput;

/// Second back press within this window exits.
pub const EXIT_WINDOW: Duration = Duration::from_secs(3);

/// A screen shown in the container.
pub trait Screen {
    /// Identifier used by the tag-based lookups and pops.
    fn tag(&self) -> &str;

    /// Handle a back press. Return `true` to consume it.
    fn on_back_pressed(&mut self) -> bool {
        false
    }
}

/// Enter/exit animation pair of a navigation. Pops play it in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transition {
    #[default]
    None,
    Fade,
    TransitFade,
    TransitOpen,
    RightInLeftOut,
    LeftInRightOut,
    /// Like `RightInLeftOut`, the outgoing screen moves 70% of the width.
    RightInLeftOut70,
    /// Like `LeftInRightOut`, the outgoing screen moves 70% of the width.
    LeftInRightOut70,
}

impl Transition {
    /// Animation used when the navigation is popped.
    #[must_use]
    pub const fn reversed(self) -> Transition {
        match self {
            Transition::RightInLeftOut => Transition::LeftInRightOut,
            Transition::LeftInRightOut => Transition::RightInLeftOut,
            Transition::RightInLeftOut70 => Transition::LeftInRightOut70,
            Transition::LeftInRightOut70 => Transition::RightInLeftOut70,
            other => other,
        }
    }
}

/// A screen and the transition that brought it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<S> {
    pub screen: S,
    pub transition: Transition,
}

/// Result of [`NavigationStack::on_back_pressed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackPressOutcome {
    /// The current screen handled it.
    Consumed,
    /// The top of the back stack was popped.
    Popped,
    /// Nothing to pop; the host should hint that another press exits.
    ExitHint,
    /// Second press within [`EXIT_WINDOW`]; the host should exit.
    Exit,
}

/// Back stack plus soft-keyboard auto-hide.
#[derive(Debug)]
pub struct NavigationStack<S, I> {
    base: Option<Entry<S>>,
    stack: Vec<Entry<S>>,
    soft_input: I,
    skip_auto_hide: bool,
    exit_armed_at: Option<Instant>,
}

impl<S: Screen, I: SoftInput> NavigationStack<S, I> {
    #[must_use]
    pub fn new(soft_input: I) -> Self {
        Self {
            base: None,
            stack: Vec::new(),
            soft_input,
            skip_auto_hide: false,
            exit_armed_at: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn back_stack_count(&self) -> usize {
        self.stack.len()
    }

    /// The visible screen.
    #[must_use]
    pub fn current(&self) -> Option<&S> {
        self.current_entry().map(|e| &e.screen)
    }

    pub fn current_mut(&mut self) -> Option<&mut S> {
        match self.stack.last_mut() {
            Some(entry) => Some(&mut entry.screen),
            None => self.base.as_mut().map(|e| &mut e.screen),
        }
    }

    /// The visible screen with its transition.
    #[must_use]
    pub fn current_entry(&self) -> Option<&Entry<S>> {
        self.stack.last().or(self.base.as_ref())
    }

    /// Most recently added screen with `tag`.
    #[must_use]
    pub fn find_by_tag(&self, tag: &str) -> Option<&S> {
        self.stack
            .iter()
            .rev()
            .chain(self.base.iter())
            .map(|e| &e.screen)
            .find(|s| s.tag() == tag)
    }

    #[must_use]
    pub fn soft_input(&self) -> &I {
        &self.soft_input
    }

    pub fn soft_input_mut(&mut self) -> &mut I {
        &mut self.soft_input
    }

    /// Keep the keyboard open across the next navigation only.
    pub fn skip_next_auto_hide(&mut self) {
        self.skip_auto_hide = true;
    }

    /// Show `screen` without growing the back stack. Returns the screen it
    /// replaced.
    pub fn replace(&mut self, screen: S, transition: Transition) -> Option<S> {
        self.auto_hide();
        self.replace_quiet(Entry { screen, transition })
    }

    /// Show `screen` on top of the back stack.
    pub fn replace_to_stack(&mut self, screen: S, transition: Transition) {
        self.auto_hide();
        debug!(tag = screen.tag(), depth = self.stack.len() + 1, "push screen");
        self.stack.push(Entry { screen, transition });
    }

    /// Clear the back stack, then replace the base with `screen`.
    pub fn replace_and_clear_back_stack(&mut self, screen: S, transition: Transition) -> Vec<S> {
        let mut removed = self.clear_back_stack();
        if let Some(old) = self.replace(screen, transition) {
            removed.push(old);
        }
        removed
    }

    /// Pop every stacked screen, topmost last in the returned list.
    pub fn clear_back_stack(&mut self) -> Vec<S> {
        self.truncate(0)
    }

    /// Pop the top screen.
    pub fn pop_last(&mut self) -> Option<S> {
        self.auto_hide();
        let entry = self.stack.pop()?;
        debug!(tag = entry.screen.tag(), depth = self.stack.len(), "pop screen");
        Some(entry.screen)
    }

    /// Pop the entry at `position` (0 = bottom of the back stack) and
    /// everything above it.
    pub fn pop_to_position(&mut self, position: usize) -> Vec<S> {
        self.auto_hide();
        if position >= self.stack.len() {
            return Vec::new();
        }
        self.truncate(position)
    }

    /// Pop the top `amount` screens.
    pub fn pop_by_amount(&mut self, amount: usize) -> Vec<S> {
        self.auto_hide();
        if amount == 0 {
            return Vec::new();
        }
        self.truncate(self.stack.len().saturating_sub(amount))
    }

    /// Pop until the most recent screen with `tag` is on top. Nothing is
    /// popped when no stacked screen has `tag`.
    pub fn pop_to(&mut self, tag: &str) -> Vec<S> {
        self.auto_hide();
        match self.position_of(tag) {
            Some(position) => self.truncate(position + 1),
            None => Vec::new(),
        }
    }

    /// Like [`pop_to`](Self::pop_to), then pop the tagged screen as well.
    pub fn pop_to_and_remove(&mut self, tag: &str) -> Vec<S> {
        self.auto_hide();
        match self.position_of(tag) {
            Some(position) => self.truncate(position),
            None => Vec::new(),
        }
    }

    /// Route a back press.
    ///
    /// The current screen gets the first chance to consume it. With an
    /// empty back stack the first press arms an [`EXIT_WINDOW`] and returns
    /// [`BackPressOutcome::ExitHint`]; a second press inside the window
    /// returns [`BackPressOutcome::Exit`].
    pub fn on_back_pressed(&mut self, now: Instant) -> BackPressOutcome {
        if self.current_mut().is_some_and(|s| s.on_back_pressed()) {
            return BackPressOutcome::Consumed;
        }
        if !self.stack.is_empty() {
            self.pop_last();
            self.exit_armed_at = None;
            return BackPressOutcome::Popped;
        }
        match self.exit_armed_at.take() {
            Some(armed) if now.saturating_duration_since(armed) < EXIT_WINDOW => {
                debug!("second back press, exit");
                BackPressOutcome::Exit
            }
            _ => {
                self.exit_armed_at = Some(now);
                BackPressOutcome::ExitHint
            }
        }
    }

    // -----------------------------------------------------------------------

    fn auto_hide(&mut self) {
        if self.skip_auto_hide {
            self.skip_auto_hide = false;
            debug!("auto-hide skipped once");
            return;
        }
        self.soft_input.hide_if_visible();
    }

    fn replace_quiet(&mut self, entry: Entry<S>) -> Option<S> {
        debug!(tag = entry.screen.tag(), depth = self.stack.len(), "replace screen");
        let slot = match self.stack.last_mut() {
            Some(top) => top,
            None => match self.base.as_mut() {
                Some(base) => base,
                None => {
                    self.base = Some(entry);
                    return None;
                }
            },
        };
        Some(std::mem::replace(slot, entry).screen)
    }

    fn position_of(&self, tag: &str) -> Option<usize> {
        self.stack.iter().rposition(|e| e.screen.tag() == tag)
    }

    fn truncate(&mut self, len: usize) -> Vec<S> {
        if len >= self.stack.len() {
            return Vec::new();
        }
        let removed: Vec<S> = self.stack.drain(len..).map(|e| e.screen).collect();
        debug!(popped = removed.len(), depth = self.stack.len(), "pop screens");
        removed
    }
}
