/// Prompt shown before ending a test early.
pub const CANCEL_PROMPT: &str = "Are you sure you want to end the test early?";

/// Synchronous yes/no capability used to gate cancellation.
///
/// The session is not re-entered until `confirm` returns.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}
