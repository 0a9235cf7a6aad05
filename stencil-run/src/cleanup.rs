//! Ordered release actions for a run.

/// Release actions accumulated during setup and run in reverse registration
/// order. [`run`](Self::run) runs them explicitly; dropping the stack runs
/// whatever has not run yet, so early returns are covered too.
#[derive(Default)]
pub struct CleanupStack {
    hooks: Vec<Box<dyn FnOnce()>>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hook: impl FnOnce() + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every pending hook, last registered first.
    pub fn run(&mut self) {
        while let Some(hook) = self.hooks.pop() {
            hook();
        }
    }
}

impl Drop for CleanupStack {
    fn drop(&mut self) {
        self.run();
    }
}
