use core::fmt::Display;

/// Unwrap `result`, or log a warning naming `what` failed and fall back to `T::default()`.
pub fn or_logged_default<T, E>(result: Result<T, E>, target: &str, what: impl FnOnce() -> String) -> T
where
    T: Default,
    E: Display,
{
    result.unwrap_or_else(|e| {
        log::warn!(target: target, "{} failed: {e:#}", what());
        T::default()
    })
}
