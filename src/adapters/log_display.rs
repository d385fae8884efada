//! Log-based display adapter.
//!
//! Implements [`DisplayPort`] for hosts without a character panel: every
//! write is mirrored to the log and kept in a two-row buffer.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::info;

use crate::app::notify::escape;
use crate::app::ports::DisplayPort;
use crate::error::DisplayError;

pub const ROWS: usize = 2;
pub const COLS: usize = 16;

#[derive(Default)]
pub struct LogDisplay {
    rows: Mutex<[String; ROWS]>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, [String; ROWS]> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current panel contents, one string per row.
    pub fn rows(&self) -> [String; ROWS] {
        self.lock().clone()
    }
}

impl DisplayPort for LogDisplay {
    fn clear(&self) -> Result<(), DisplayError> {
        *self.lock() = Default::default();
        Ok(())
    }

    fn write(&self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        let (row, col) = (usize::from(row), usize::from(col));
        if row >= ROWS || col >= COLS {
            return Err(DisplayError::OutOfBounds);
        }
        let mut rows = self.lock();
        let line = &mut rows[row];
        let mut chars: Vec<char> = line.chars().collect();
        chars.resize(col.max(chars.len()), ' ');
        chars.truncate(col);
        chars.extend(text.chars().take(COLS - col));
        *line = chars.into_iter().collect();
        info!("LCD | {}:{} {}", row, col, escape(text));
        Ok(())
    }

    fn write_text(&self, text: &str) -> Result<(), DisplayError> {
        self.clear()?;
        for (row, line) in text.lines().take(ROWS).enumerate() {
            self.write(row as u8, 0, line)?;
        }
        Ok(())
    }
}
