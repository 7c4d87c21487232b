use super::active::ActiveId;
use super::engine::Sweep;
use super::hooks::SweepHooks;
use super::{ClipType, FillRule, PathType};

impl<H: SweepHooks> Sweep<'_, H> {
    /// Derives the winding counts of a newly inserted closed edge from its
    /// nearest left neighbour of the same path type.
    ///
    /// `wind_cnt` counts boundaries of the edge's own path set; `wind_cnt2`
    /// counts boundaries of the other set.
    pub(super) fn set_wind_count_for_closed_path_edge(&mut self, e: ActiveId) {
        let pt = self.path_type(e);
        let mut e2 = self.actives[e].prev_in_ael;
        while let Some(p) = e2 {
            if self.path_type(p) == pt && !self.is_open(p) {
                break;
            }
            e2 = self.actives[p].prev_in_ael;
        }

        let wind_dx = self.actives[e].wind_dx;
        let mut wind_cnt2 = 0;
        let wind_cnt;
        let mut cursor = match e2 {
            None => {
                wind_cnt = wind_dx;
                self.ael
            }
            Some(p) if self.fill_rule == FillRule::EvenOdd => {
                wind_cnt = wind_dx;
                wind_cnt2 = self.actives[p].wind_cnt2;
                self.actives[p].next_in_ael
            }
            Some(p) => {
                let a2 = &self.actives[p];
                wind_cnt = if a2.wind_cnt * a2.wind_dx < 0 {
                    // e is outside the region bounded by a2
                    if a2.wind_cnt.abs() > 1 {
                        if a2.wind_dx * wind_dx < 0 {
                            a2.wind_cnt
                        } else {
                            a2.wind_cnt + wind_dx
                        }
                    } else if self.is_open(e) {
                        1
                    } else {
                        wind_dx
                    }
                } else if a2.wind_dx * wind_dx < 0 {
                    a2.wind_cnt
                } else {
                    a2.wind_cnt + wind_dx
                };
                wind_cnt2 = a2.wind_cnt2;
                a2.next_in_ael
            }
        };

        while let Some(c) = cursor {
            if c == e {
                break;
            }
            if self.path_type(c) != pt && !self.is_open(c) {
                if self.fill_rule == FillRule::EvenOdd {
                    wind_cnt2 = i32::from(wind_cnt2 == 0);
                } else {
                    wind_cnt2 += self.actives[c].wind_dx;
                }
            }
            cursor = self.actives[c].next_in_ael;
        }

        let a = &mut self.actives[e];
        a.wind_cnt = wind_cnt;
        a.wind_cnt2 = wind_cnt2;
    }

    /// Open edges carry no winding of their own; they record how many
    /// subject and clip boundaries lie to their left.
    pub(super) fn set_wind_count_for_open_path_edge(&mut self, e: ActiveId) {
        let mut cursor = self.ael;
        let mut wind_cnt = 0;
        let mut wind_cnt2 = 0;
        while let Some(c) = cursor {
            if c == e {
                break;
            }
            let dx = if self.fill_rule == FillRule::EvenOdd {
                1
            } else {
                self.actives[c].wind_dx
            };
            if self.path_type(c) == PathType::Clip {
                wind_cnt2 += dx;
            } else if !self.is_open(c) {
                wind_cnt += dx;
            }
            cursor = self.actives[c].next_in_ael;
        }
        if self.fill_rule == FillRule::EvenOdd {
            wind_cnt = wind_cnt.rem_euclid(2);
            wind_cnt2 = wind_cnt2.rem_euclid(2);
        }
        let a = &mut self.actives[e];
        a.wind_cnt = wind_cnt;
        a.wind_cnt2 = wind_cnt2;
    }

    /// Whether a closed edge borders the result region.
    ///
    /// The edge must first bound its own path set under the fill rule
    /// (`wind_cnt`), then the other set's winding (`wind_cnt2`) decides:
    ///
    /// | Clip type    | Positive        | Negative        | EvenOdd / NonZero |
    /// |--------------|-----------------|-----------------|-------------------|
    /// | Intersection | `wc2 > 0`       | `wc2 < 0`       | `wc2 != 0`        |
    /// | Union        | `wc2 <= 0`      | `wc2 >= 0`      | `wc2 == 0`        |
    /// | Difference   | union rule for subjects, negated for clips | | |
    /// | Xor          | always          | always          | always            |
    #[allow(clippy::match_same_arms)]
    pub(super) fn is_contributing_closed(&self, e: ActiveId) -> bool {
        let a = &self.actives[e];
        let bounds_own_set = match self.fill_rule {
            FillRule::EvenOdd => true,
            FillRule::NonZero => a.wind_cnt.abs() == 1,
            FillRule::Positive => a.wind_cnt == 1,
            FillRule::Negative => a.wind_cnt == -1,
        };
        if !bounds_own_set {
            return false;
        }
        let wc2 = a.wind_cnt2;
        let outside_other = match self.fill_rule {
            FillRule::Positive => wc2 <= 0,
            FillRule::Negative => wc2 >= 0,
            FillRule::EvenOdd | FillRule::NonZero => wc2 == 0,
        };
        match (self.clip_type, self.fill_rule) {
            (ClipType::Intersection, FillRule::Positive) => wc2 > 0,
            (ClipType::Intersection, FillRule::Negative) => wc2 < 0,
            (ClipType::Intersection, FillRule::EvenOdd | FillRule::NonZero) => wc2 != 0,
            (ClipType::Union, _) => outside_other,
            (ClipType::Difference, _) => {
                if self.path_type(e) == PathType::Subject {
                    outside_other
                } else {
                    !outside_other
                }
            }
            (ClipType::Xor, _) => true,
        }
    }

    /// Whether an open edge lies in the part of the plane its clip type keeps.
    pub(super) fn is_contributing_open(&self, e: ActiveId) -> bool {
        let a = &self.actives[e];
        let (in_clip, in_subj) = match self.fill_rule {
            FillRule::Positive => (a.wind_cnt2 > 0, a.wind_cnt > 0),
            FillRule::Negative => (a.wind_cnt2 < 0, a.wind_cnt < 0),
            FillRule::EvenOdd | FillRule::NonZero => (a.wind_cnt2 != 0, a.wind_cnt != 0),
        };
        match self.clip_type {
            ClipType::Intersection => in_clip,
            ClipType::Union => !in_subj && !in_clip,
            ClipType::Difference | ClipType::Xor => !in_clip,
        }
    }
}
