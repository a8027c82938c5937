//! In-process model client for tests.
//!
//! Responses are scripted per model name. Unknown models fail as unavailable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::client::{ModelClient, ModelReply, Prompt};
use crate::error::ModelError;

type Responder = Arc<dyn Fn(&Prompt) -> String + Send + Sync>;

#[derive(Default)]
struct Script {
    responder: Option<Responder>,
    reasoning: Option<String>,
    /// Fails this many calls before answering.
    failures_left: usize,
    /// Fails every call.
    always_fail: bool,
    failure: Option<ModelError>,
    delay: Option<Duration>,
}

/// Scripted [`ModelClient`]. Records every prompt it receives.
#[derive(Default)]
pub struct ScriptedModelClient {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<(String, Prompt)>>,
}

impl ScriptedModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn edit(self, model: &str, f: impl FnOnce(&mut Script)) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            f(scripts.entry(model.to_string()).or_default());
        }
        self
    }

    /// Always answer `model` with `text`.
    pub fn reply(self, model: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        self.respond_with(model, move |_| text.clone())
    }

    /// Answer `model` with a function of the prompt.
    pub fn respond_with<F>(self, model: &str, f: F) -> Self
    where
        F: Fn(&Prompt) -> String + Send + Sync + 'static,
    {
        self.edit(model, |s| s.responder = Some(Arc::new(f)))
    }

    /// Attach a separate reasoning channel to `model`'s replies.
    pub fn reasoning(self, model: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        self.edit(model, |s| s.reasoning = Some(text))
    }

    /// Fail every call to `model`.
    pub fn fail(self, model: &str, err: ModelError) -> Self {
        self.edit(model, |s| {
            s.always_fail = true;
            s.failure = Some(err);
        })
    }

    /// Fail the next `times` calls to `model`, then answer normally.
    pub fn fail_times(self, model: &str, times: usize, err: ModelError) -> Self {
        self.edit(model, |s| {
            s.failures_left = times;
            s.failure = Some(err);
        })
    }

    /// Sleep before every reply (or failure) from `model`.
    pub fn delay(self, model: &str, delay: Duration) -> Self {
        self.edit(model, |s| s.delay = Some(delay))
    }

    /// Number of invocations addressed to `model`.
    pub fn calls_for(&self, model: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.iter().filter(|(m, _)| m == model).count())
            .unwrap_or(0)
    }

    /// Prompts sent to `model`, in call order.
    pub fn prompts_for(&self, model: &str) -> Vec<Prompt> {
        self.calls
            .lock()
            .map(|calls| {
                calls
                    .iter()
                    .filter(|(m, _)| m == model)
                    .map(|(_, p)| p.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

enum Outcome {
    Reply(ModelReply),
    Fail(ModelError),
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn invoke(
        &self,
        model: &str,
        prompt: &Prompt,
        _timeout: Duration,
    ) -> Result<ModelReply, ModelError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((model.to_string(), prompt.clone()));
        }

        // Decide under the lock, sleep outside it.
        let (delay, outcome) = {
            let mut scripts = self
                .scripts
                .lock()
                .map_err(|_| ModelError::unavailable(model, "script lock poisoned"))?;
            match scripts.get_mut(model) {
                None => (
                    None,
                    Outcome::Fail(ModelError::unavailable(model, "no script for model")),
                ),
                Some(script) => {
                    let failure = script
                        .failure
                        .clone()
                        .unwrap_or_else(|| ModelError::unavailable(model, "scripted failure"));
                    let outcome = if script.always_fail {
                        Outcome::Fail(failure)
                    } else if script.failures_left > 0 {
                        script.failures_left -= 1;
                        Outcome::Fail(failure)
                    } else {
                        match &script.responder {
                            Some(responder) => Outcome::Reply(ModelReply {
                                text: responder(prompt),
                                reasoning: script.reasoning.clone(),
                            }),
                            None => Outcome::Fail(ModelError::unavailable(
                                model,
                                "no reply scripted",
                            )),
                        }
                    };
                    (script.delay, outcome)
                }
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match outcome {
            Outcome::Reply(reply) => Ok(reply),
            Outcome::Fail(err) => Err(err),
        }
    }
}
