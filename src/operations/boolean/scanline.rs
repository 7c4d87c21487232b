/// Pending sweep Y values without duplicates.
///
/// Values are kept in ascending order so the largest, which the sweep
/// visits first, pops from the back.
#[derive(Debug, Default)]
pub(crate) struct ScanlineQueue {
    ys: Vec<f64>,
}

impl ScanlineQueue {
    pub(crate) fn insert(&mut self, y: f64) {
        // -0.0 and 0.0 must collapse to one scanline
        let y = if y == 0.0 { 0.0 } else { y };
        if let Err(pos) = self.ys.binary_search_by(|probe| probe.total_cmp(&y)) {
            self.ys.insert(pos, y);
        }
    }

    /// Removes and returns the largest pending Y.
    pub(crate) fn pop(&mut self) -> Option<f64> {
        self.ys.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.ys.len()
    }
}
