use super::OutRecKind;

/// Observer of output-region events raised while the sweep builds contours.
///
/// Regions are identified by their index in the output store. Every method
/// has an empty default so implementors only pick the events they need.
pub(crate) trait SweepHooks {
    /// Called once at the start of every sweep.
    fn reset(&mut self) {}

    /// A new output region was allocated.
    fn out_rec_created(&mut self, _out_rec: usize) {}

    /// A region was opened at a local minimum. `owner` is the region of the
    /// nearest contributing edge to the left, if any.
    fn local_min_poly(&mut self, _out_rec: usize, _kind: OutRecKind, _owner: Option<usize>) {}

    /// A local maximum either sealed `kept` as a complete ring
    /// (`absorbed == None`) or merged `absorbed` into `kept`.
    fn local_max_poly(&mut self, _kept: usize, _absorbed: Option<usize>) {}
}

/// Hooks that ignore every event.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NoHooks;

impl SweepHooks for NoHooks {}
