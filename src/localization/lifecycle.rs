/// Progress of a controller. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    /// Bundles are resolved and the primary context exists: formatting works.
    Interactive,
    /// The first full translation of the document has been applied.
    Ready,
}
