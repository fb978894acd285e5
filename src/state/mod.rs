/// State management module
///
/// This module owns the observable state the UI reacts to:
/// - Upload tracking with stale-event protection (upload.rs)
///
/// The image reference itself is a plain `Option<PathBuf>` on the screen
/// state; it needs no machinery of its own.

pub mod upload;
