//! Queues for input events and state commands.
//!
//! Hosts push raw [`InputEvent`]s and [`Command`]s at any time; the frame
//! loop drains both once per frame in FIFO order.

use std::collections::VecDeque;

use charter_core::Timeframe;

use crate::input::InputEvent;

/// Overlays the shell can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    Ema,
    Trend,
    Fibonacci,
    Levels,
    Signals,
    Volume,
    Oscillator,
}

/// State mutations requested by the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ToggleOverlay(Overlay),
    ToggleFullscreen,
    /// Load another symbol or timeframe.
    SwitchFeed { symbol: String, timeframe: Timeframe },
    ResetViewport,
    RequestRedraw,
}

#[derive(Debug, Default)]
pub struct EventBus {
    inputs: VecDeque<InputEvent>,
    commands: VecDeque<Command>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an event bus with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(input_capacity: usize, command_capacity: usize) -> Self {
        Self {
            inputs: VecDeque::with_capacity(input_capacity),
            commands: VecDeque::with_capacity(command_capacity),
        }
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.inputs.push_back(event);
    }

    pub fn push_inputs(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.inputs.extend(events);
    }

    pub fn dispatch(&mut self, cmd: Command) {
        self.commands.push_back(cmd);
    }

    /// Take all pending input events, leaving the queue empty.
    #[must_use]
    pub fn take_inputs(&mut self) -> Vec<InputEvent> {
        self.inputs.drain(..).collect()
    }

    /// Take all pending commands, leaving the queue empty.
    #[must_use]
    pub fn take_commands(&mut self) -> Vec<Command> {
        self.commands.drain(..).collect()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.inputs.is_empty() || !self.commands.is_empty()
    }

    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
        self.commands.clear();
    }
}
