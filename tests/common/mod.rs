//! # Shared fixtures
//!
//! The message buffer used by the method-harness scenarios, a quiet host
//! configuration, and an event log for asserting hook order.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use mesa::{BenchTime, HostConfig};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Msg {
    pub name: String,
    pub value: i64,
}

impl Msg {
    pub fn new(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BufferError {
    #[error("buffer is full")]
    Full,
}

#[derive(Debug, Default)]
pub struct Buffer {
    pub limit: usize,
    pub msgs: Vec<Msg>,
}

impl Buffer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            msgs: Vec::new(),
        }
    }

    pub fn add(&mut self, msg: Msg) -> Result<(), BufferError> {
        if self.msgs.len() >= self.limit {
            return Err(BufferError::Full);
        }
        self.msgs.push(msg);
        Ok(())
    }
}

/// No colours, no filter, benchmarks fixed at 100 iterations.
pub fn quiet_config() -> HostConfig {
    HostConfig::default()
        .with_colors(false)
        .with_bench_time(BenchTime::Iterations(100))
}

/// Ordered record of which hooks ran.
#[derive(Clone, Default)]
pub struct Events(Rc<RefCell<Vec<String>>>);

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == event).count()
    }
}
