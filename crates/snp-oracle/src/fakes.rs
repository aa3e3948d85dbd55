//! In-memory oracle fakes (testing only)
//!
//! `ScriptedOracle` replays a fixed list of outcomes and records every
//! prompt it receives, so classifier tests never touch the network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::OracleError;
use crate::{Oracle, Result};

/// What a `ScriptedOracle` does once its script is used up.
#[derive(Debug, Clone, Default)]
pub enum Fallback {
    /// Return `OracleError::EmptyResponse`
    #[default]
    Empty,
    /// Answer with this text
    Reply(String),
    /// Fail with `OracleError::Http` carrying this reason
    Fail(String),
}

/// Oracle that answers from a script, then from its [`Fallback`].
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Result<String>>>,
    fallback: Fallback,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(script: Vec<Result<String>>) -> Self {
        ScriptedOracle {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Oracle that gives the same answer to every prompt.
    pub fn always(reply: &str) -> Self {
        Self::default().with_fallback(Fallback::Reply(reply.to_string()))
    }

    /// Oracle whose every call fails with a transport error.
    pub fn unreachable() -> Self {
        Self::default().with_fallback(Fallback::Fail("connection refused".to_string()))
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn predict(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        match &self.fallback {
            Fallback::Empty => Err(OracleError::EmptyResponse),
            Fallback::Reply(reply) => Ok(reply.clone()),
            Fallback::Fail(reason) => Err(OracleError::Http(reason.clone())),
        }
    }
}
