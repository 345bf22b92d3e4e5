/// Analysis layer: on-demand derivations over cleaned numeric frames.
/// Everything here is synchronous, stateless, and recomputed from the
/// session's `Table` whenever a selection parameter changes.

pub mod contour;
pub mod correlation;
pub mod interpolate;
pub mod summary;
pub mod transform;
