//! Incremental approach of a value toward a target

/// Move `current` toward `target` by `increment`
///
/// The result never passes `target`, so repeated calls settle on it
/// instead of oscillating around it. An increment of 0 leaves `current`
/// unchanged.
pub fn step_toward(current: u8, target: u8, increment: u8) -> u8 {
    if current < target {
        current.saturating_add(increment).min(target)
    } else {
        current.saturating_sub(increment).max(target)
    }
}
