/*!
 * Mock REPL client for testing.
 *
 * - `MockReplClient::working()` - connects and records every form
 * - `MockReplClient::unreachable()` - every connect attempt fails
 * - `MockReplClient::dropping_after(n)` - the connection dies after n forms
 */

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::ReplError;
use crate::repl::ReplClient;

/// Behavior mode for the mock client
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockReplBehavior {
    /// Connects and accepts every form
    Working,
    /// Never connects
    Unreachable,
    /// Accepts this many forms, then drops the connection
    DroppingAfter { forms: usize },
}

/// Scripted REPL client
#[derive(Debug, Clone)]
pub struct MockReplClient {
    behavior: MockReplBehavior,
    connected: bool,
    /// Forms received so far, shared with clones
    forms: Arc<Mutex<Vec<String>>>,
}

impl MockReplClient {
    pub fn new(behavior: MockReplBehavior) -> Self {
        Self {
            behavior,
            connected: false,
            forms: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working() -> Self {
        Self::new(MockReplBehavior::Working)
    }

    /// A working client that starts out connected
    pub fn connected() -> Self {
        let mut client = Self::working();
        client.connected = true;
        client
    }

    pub fn unreachable() -> Self {
        Self::new(MockReplBehavior::Unreachable)
    }

    pub fn dropping_after(forms: usize) -> Self {
        let mut client = Self::new(MockReplBehavior::DroppingAfter { forms });
        client.connected = true;
        client
    }

    /// Every form evaluated by this client or its clones
    pub fn received(&self) -> Vec<String> {
        self.forms.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ReplClient for MockReplClient {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<(), ReplError> {
        match self.behavior {
            MockReplBehavior::Unreachable => Err(ReplError::ConnectionFailed {
                address: "mock".to_string(),
                message: "Simulated unreachable REPL".to_string(),
            }),
            _ => {
                self.connected = true;
                Ok(())
            }
        }
    }

    async fn eval(&mut self, form: &str) -> Result<(), ReplError> {
        if !self.connected {
            return Err(ReplError::NotConnected);
        }
        let mut forms = self.forms.lock().unwrap_or_else(PoisonError::into_inner);
        if let MockReplBehavior::DroppingAfter { forms: limit } = self.behavior {
            if forms.len() >= limit {
                self.connected = false;
                return Err(ReplError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "Simulated dropped connection",
                )));
            }
        }
        forms.push(form.to_string());
        Ok(())
    }
}
