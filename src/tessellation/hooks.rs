use crate::operations::boolean::{OutRecKind, SweepHooks};

/// What the sweep reported about one output region.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RegionRecord {
    pub(crate) kind: Option<OutRecKind>,
    pub(crate) owner_hint: Option<usize>,
    pub(crate) absorbed_into: Option<usize>,
}

/// Records region roles and ownership as the sweep opens, merges and seals
/// output rings, so holes can be matched to their outers afterwards without
/// a containment search over every region.
#[derive(Debug, Default)]
pub(crate) struct TriangulationHooks {
    regions: Vec<RegionRecord>,
    sealed: Vec<usize>,
}

impl TriangulationHooks {
    /// Regions in the order their rings were completed.
    pub(crate) fn sealed(&self) -> &[usize] {
        &self.sealed
    }

    pub(crate) fn region(&self, idx: usize) -> Option<&RegionRecord> {
        self.regions.get(idx)
    }

    /// The region that finally holds the points `idx` was merged into.
    pub(crate) fn surviving(&self, mut idx: usize) -> usize {
        for _ in 0..self.regions.len() {
            match self.regions.get(idx).and_then(|r| r.absorbed_into) {
                Some(next) if next != idx => idx = next,
                _ => break,
            }
        }
        idx
    }

    /// Surviving regions along the owner chain of `idx`, nearest first.
    pub(crate) fn owner_chain(&self, idx: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut cursor = self.region(idx).and_then(|r| r.owner_hint);
        while let Some(owner) = cursor {
            let owner = self.surviving(owner);
            let is_open = self.region(owner).and_then(|r| r.kind) == Some(OutRecKind::Open);
            if owner == idx || is_open || chain.contains(&owner) {
                break;
            }
            chain.push(owner);
            cursor = self.region(owner).and_then(|r| r.owner_hint);
        }
        chain
    }

    fn record(&mut self, idx: usize) -> &mut RegionRecord {
        if self.regions.len() <= idx {
            self.regions.resize(idx + 1, RegionRecord::default());
        }
        &mut self.regions[idx]
    }
}

impl SweepHooks for TriangulationHooks {
    fn reset(&mut self) {
        self.regions.clear();
        self.sealed.clear();
    }

    fn out_rec_created(&mut self, out_rec: usize) {
        self.record(out_rec);
    }

    fn local_min_poly(&mut self, out_rec: usize, kind: OutRecKind, owner: Option<usize>) {
        let rec = self.record(out_rec);
        rec.kind = Some(kind);
        rec.owner_hint = owner;
    }

    fn local_max_poly(&mut self, kept: usize, absorbed: Option<usize>) {
        match absorbed {
            None => {
                if !self.sealed.contains(&kept) {
                    self.sealed.push(kept);
                }
            }
            Some(other) => {
                self.record(other).absorbed_into = Some(kept);
                self.record(kept);
            }
        }
    }
}
