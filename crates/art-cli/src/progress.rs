//! Textual progress bar on stderr. Purely observational: it only receives a
//! tick per completed call.

use std::io::{IsTerminal, Write};
use std::time::{Duration, Instant};

const FILL: char = '█';
const EMPTY: char = '░';
const REDRAW_EVERY: Duration = Duration::from_secs(1);

pub struct Progress {
    total: usize,
    current: usize,
    width: usize,
    start: Instant,
    last_draw: Option<Instant>,
    enabled: bool,
}

impl Progress {
    /// Draws only when `enabled` and stderr is a terminal.
    pub fn new(total: usize, width: usize, enabled: bool) -> Self {
        Self {
            total,
            current: 0,
            width,
            start: Instant::now(),
            last_draw: None,
            enabled: enabled && std::io::stderr().is_terminal(),
        }
    }

    /// Record one completed call.
    pub fn tick(&mut self) {
        self.current = (self.current + 1).min(self.total);
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        let due = self
            .last_draw
            .is_none_or(|t| now.duration_since(t) >= REDRAW_EVERY);
        if due || self.current == self.total {
            self.draw(now);
        }
    }

    /// Draw the final state and end the line.
    pub fn finish(&mut self) {
        if self.enabled {
            self.draw(Instant::now());
            eprintln!();
            self.enabled = false;
        }
    }

    #[cfg(test)]
    fn current(&self) -> usize {
        self.current
    }

    fn draw(&mut self, now: Instant) {
        self.last_draw = Some(now);
        let line = render(self.current, self.total, self.width, now - self.start);
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{line}");
        let _ = err.flush();
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.finish();
    }
}

/// ` 42% [████░░░░] (42/100, 21 it/s) | 2s | ETA: 3s`
pub fn render(current: usize, total: usize, width: usize, elapsed: Duration) -> String {
    let ratio = if total == 0 {
        1.0
    } else {
        current as f64 / total as f64
    };
    let filled = ((width as f64 * ratio) as usize).min(width);
    let bar: String = std::iter::repeat_n(FILL, filled)
        .chain(std::iter::repeat_n(EMPTY, width - filled))
        .collect();

    let secs = elapsed.as_secs_f64();
    let (rate, eta) = if current > 0 && secs > 0.0 {
        let rate = current as f64 / secs;
        let remaining = total.saturating_sub(current) as f64 / rate;
        (rate, Duration::from_secs_f64(remaining))
    } else {
        (0.0, Duration::ZERO)
    };

    format!(
        " {}% [{bar}] ({current}/{total}, {rate:.0} it/s) | {} | ETA: {}   ",
        (ratio * 100.0) as u32,
        format_duration(elapsed),
        format_duration(eta)
    )
}

/// Whole-second duration as `1h2m3s`, `4m5s` or `6s`.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs_f64().round() as u64;
    let (h, m, s) = (total / 3600, total / 60 % 60, total % 60);
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}
