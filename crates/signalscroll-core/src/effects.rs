//! Self-timed decorative effects
//!
//! These run off the frame clock rather than the scroll position: a
//! typewriter that reveals text one character per tick and loops after a
//! pause, and a shuffler that rotates a deck of labels on a fixed interval.

use std::time::Duration;

use serde::Serialize;

/// Reveals text one character per tick, then pauses and starts over
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    /// Number of characters in `text`
    len: usize,
    pause_ticks: usize,
    tick: Duration,
    step: usize,
    pending: Duration,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, tick: Duration, pause_ticks: usize) -> Self {
        let text = text.into();
        Self {
            len: text.chars().count(),
            text,
            pause_ticks,
            tick,
            step: 0,
            pending: Duration::ZERO,
        }
    }

    /// Ticks in one full reveal-and-pause cycle
    pub fn cycle_len(&self) -> usize {
        self.len + self.pause_ticks + 1
    }

    /// Move forward by one tick
    pub fn tick(&mut self) {
        self.step = (self.step + 1) % self.cycle_len();
    }

    /// Feed elapsed frame time; returns how many ticks were taken
    pub fn advance(&mut self, dt: Duration) -> usize {
        if self.tick.is_zero() {
            return 0;
        }
        self.pending += dt;
        let mut ticks = 0;
        while self.pending >= self.tick {
            self.pending -= self.tick;
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// Back to an empty line at the start of a tick
    pub fn reset(&mut self) {
        self.step = 0;
        self.pending = Duration::ZERO;
    }

    /// Currently revealed prefix
    pub fn visible(&self) -> &str {
        let count = self.step.min(self.len);
        match self.text.char_indices().nth(count) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }

    pub fn is_pausing(&self) -> bool {
        self.step > self.len
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A label in the shuffled deck as it should be drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckCard<'a> {
    pub label: &'a str,
    pub scale: f64,
    pub opacity: f64,
}

/// Rotates a deck of labels: the last card moves to the front every interval
#[derive(Debug, Clone)]
pub struct Shuffler {
    items: Vec<String>,
    interval: Duration,
    elapsed: Duration,
    rotations: u64,
}

impl Shuffler {
    pub fn new(items: Vec<String>, interval: Duration) -> Self {
        Self {
            items,
            interval,
            elapsed: Duration::ZERO,
            rotations: 0,
        }
    }

    pub fn rotate(&mut self) {
        if let Some(last) = self.items.pop() {
            self.items.insert(0, last);
        }
        self.rotations += 1;
    }

    /// Feed elapsed frame time; returns true if the deck rotated
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.interval.is_zero() || self.items.len() < 2 {
            return false;
        }
        self.elapsed += dt;
        let mut rotated = false;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.rotate();
            rotated = true;
        }
        rotated
    }

    /// Restart the interval; the deck keeps its order
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Cards front to back; each one further back is smaller and fainter
    pub fn cards(&self) -> impl Iterator<Item = DeckCard<'_>> {
        self.items.iter().enumerate().map(|(i, label)| DeckCard {
            label,
            scale: 1.0 - 0.05 * i as f64,
            opacity: (1.0 - 0.2 * i as f64).max(0.0),
        })
    }
}
