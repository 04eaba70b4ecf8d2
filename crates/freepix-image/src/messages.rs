/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Out of band diagnostics
//!
//! Every failed load or save produces exactly one message tagged with
//! the id of the format that produced it. Messages are fire and forget,
//! a sink can drop them but cannot turn them into errors.
use std::sync::Mutex;

use freepix_core::log::error;

use crate::plugin::FormatId;

/// Receiver of plugin diagnostics
pub trait MessageSink: Send + Sync {
    fn message(&self, format: FormatId, text: &str);
}

/// Forwards messages to the `log` crate at error level
///
/// Without the `log` feature messages are dropped.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn message(&self, format: FormatId, text: &str) {
        error!("format {}: {}", format.index(), text);
    }
}

/// Keeps every message it receives, in order
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<(FormatId, String)>>
}

impl CollectingSink {
    pub fn new() -> CollectingSink {
        CollectingSink::default()
    }

    /// A copy of the messages received so far
    pub fn messages(&self) -> Vec<(FormatId, String)> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone()
        }
    }

    pub fn len(&self) -> usize {
        self.messages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessageSink for CollectingSink {
    fn message(&self, format: FormatId, text: &str) {
        let mut guard = match self.messages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner()
        };
        guard.push((format, text.to_string()));
    }
}
