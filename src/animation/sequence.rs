//! Ordered tween steps
//!
//! Each step is a group of tweens started together. The next step is started
//! from the completion of the longest tween in the current one, so a step
//! begins on the frame after its predecessor finished.

use std::collections::VecDeque;
use std::fmt;

use super::tween::{Commands, OnComplete, TweenSpec};

#[derive(Default)]
pub struct Sequence {
    steps: VecDeque<Vec<TweenSpec>>,
    finish: Option<OnComplete>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step holding a single tween
    pub fn then(mut self, spec: TweenSpec) -> Self {
        self.steps.push_back(vec![spec]);
        self
    }

    /// Run `spec` alongside the last step
    pub fn with(mut self, spec: TweenSpec) -> Self {
        match self.steps.back_mut() {
            Some(step) => step.push(spec),
            None => self.steps.push_back(vec![spec]),
        }
        self
    }

    /// Append a step of tweens that run in parallel
    pub fn then_all<I>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = TweenSpec>,
    {
        let step: Vec<TweenSpec> = specs.into_iter().collect();
        if !step.is_empty() {
            self.steps.push_back(step);
        }
        self
    }

    /// Run once the last step is done
    pub fn finally<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut Commands) + 'static,
    {
        self.finish = Some(Box::new(callback));
        self
    }

    /// Number of steps left
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Queue the first step; the rest follow on their own.
    ///
    /// An empty sequence runs its final callback immediately.
    pub fn start(mut self, commands: &mut Commands) {
        let Some(mut step) = self.steps.pop_front() else {
            if let Some(finish) = self.finish.take() {
                finish(commands);
            }
            return;
        };

        let carrier = longest(&step);
        let spec = step.remove(carrier);
        step.insert(carrier, spec.then(move |cmds| self.start(cmds)));

        for spec in step {
            commands.tween(spec);
        }
    }
}

/// Index of the tween that ends last; ties go to the later one
fn longest(step: &[TweenSpec]) -> usize {
    let mut best = 0;
    for (i, spec) in step.iter().enumerate() {
        if spec.duration_ms.max(0.0) >= step[best].duration_ms.max(0.0) {
            best = i;
        }
    }
    best
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("steps", &self.steps)
            .field("finish", &self.finish.is_some())
            .finish()
    }
}
