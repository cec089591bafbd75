//! Presentation options shared between the engine and the renderer.

/// UI options derived from config and environment.
///
/// `reduced_motion` keeps every interaction functional while skipping
/// decorative animation: card commits land instantly and the breathing
/// circle steps between phases instead of easing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}
