//! Design-to-box unit allocation
//!
//! An [`Allocation`] maps each design to the number of its units placed in
//! every variety box. Every operation takes the whole map and returns a new
//! one, and every returned map satisfies:
//!
//! - `total_per_box() <= pack_size`
//! - `units_for(d) * box_quantity <= d.quantity` for every design `d`
//!
//! Requests that would break either rule are clamped or rebalanced, never
//! rejected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{BoxConfig, DesignConfig};

/// Most units of one design that can go in each box
///
/// `min(pack_size, floor(design_quantity / box_quantity))`; zero when the
/// design has fewer units than there are boxes.
pub fn max_units_per_box(design_quantity: u32, box_config: &BoxConfig) -> u32 {
    if box_config.quantity == 0 {
        return 0;
    }
    (design_quantity / box_config.quantity).min(box_config.pack_size)
}

/// Per-box unit count for each design, keyed by design number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation {
    units: BTreeMap<u32, u32>,
}

impl Allocation {
    /// Zero units for every design
    pub fn empty_for(designs: &[DesignConfig]) -> Self {
        Self {
            units: designs.iter().map(|d| (d.design_number, 0)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units_for(&self, design_number: u32) -> u32 {
        self.units.get(&design_number).copied().unwrap_or(0)
    }

    pub fn total_per_box(&self) -> u32 {
        self.units.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.units.iter().map(|(design, units)| (*design, *units))
    }

    /// Whether every box can be filled: `sum(allocation) >= pack_size`
    ///
    /// Always false with no designs.
    pub fn can_fulfill(&self, box_config: &BoxConfig) -> bool {
        !self.units.is_empty() && self.total_per_box() >= box_config.pack_size
    }

    /// Assign `units` per box to one design
    ///
    /// The request is first clipped to the design's inventory. If the new
    /// per-box total would exceed the pack size, every other design is shrunk
    /// by the same ratio `min(1, excess / others)` (reductions floored), and
    /// the requested value is then clipped to the remaining headroom.
    /// Unknown designs leave the allocation unchanged.
    pub fn set_units(
        &self,
        designs: &[DesignConfig],
        box_config: &BoxConfig,
        design_number: u32,
        units: u32,
    ) -> Self {
        let Some(design) = designs.iter().find(|d| d.design_number == design_number) else {
            tracing::debug!(design_number, "Allocation change for unknown design ignored");
            return self.clone();
        };

        let pack_size = box_config.pack_size;
        let requested = units.min(max_units_per_box(design.quantity, box_config));

        let mut next = self.units.clone();
        let others: u32 = next
            .iter()
            .filter(|(d, _)| **d != design_number)
            .map(|(_, u)| *u)
            .sum();

        if others + requested <= pack_size {
            next.insert(design_number, requested);
            return Self { units: next };
        }

        let excess = others + requested - pack_size;
        if others > 0 {
            let shrink = u64::from(excess.min(others));
            for (d, current) in next.iter_mut() {
                if *d == design_number {
                    continue;
                }
                let reduction = u64::from(*current) * shrink / u64::from(others);
                // reduction <= current, so this never goes negative
                *current -= reduction as u32;
            }
        }

        let final_others: u32 = next
            .iter()
            .filter(|(d, _)| **d != design_number)
            .map(|(_, u)| *u)
            .sum();
        next.insert(design_number, requested.min(pack_size.saturating_sub(final_others)));

        Self { units: next }
    }

    /// Spread the pack as evenly as possible over all designs
    ///
    /// Each design gets `pack_size / n`; the first `pack_size % n` designs get
    /// one extra. Each share is then clipped to the design's inventory.
    pub fn even_split(designs: &[DesignConfig], box_config: &BoxConfig) -> Self {
        if designs.is_empty() {
            return Self::default();
        }

        let count = designs.len() as u32;
        let base = box_config.pack_size / count;
        let remainder = (box_config.pack_size % count) as usize;

        let units = designs
            .iter()
            .enumerate()
            .map(|(index, design)| {
                let share = base + u32::from(index < remainder);
                let cap = max_units_per_box(design.quantity, box_config);
                (design.design_number, share.min(cap))
            })
            .collect();

        Self { units }
    }

    /// Bring the allocation back in line after designs or the box order changed
    ///
    /// Known designs keep their value (clipped to inventory), removed designs
    /// drop out, new designs start at zero. If the total still exceeds the
    /// pack, units are taken from the last design backwards.
    pub fn reconcile(&self, designs: &[DesignConfig], box_config: &BoxConfig) -> Self {
        let mut values: Vec<(u32, u32)> = designs
            .iter()
            .map(|d| {
                let cap = max_units_per_box(d.quantity, box_config);
                (d.design_number, self.units_for(d.design_number).min(cap))
            })
            .collect();

        let total: u32 = values.iter().map(|(_, u)| *u).sum();
        let mut excess = total.saturating_sub(box_config.pack_size);
        for (_, units) in values.iter_mut().rev() {
            if excess == 0 {
                break;
            }
            let take = (*units).min(excess);
            *units -= take;
            excess -= take;
        }

        Self {
            units: values.into_iter().collect(),
        }
    }

    /// Per-design breakdown plus totals for display
    pub fn summary(&self, designs: &[DesignConfig], box_config: &BoxConfig) -> AllocationSummary {
        let box_quantity = u64::from(box_config.quantity);

        let rows: Vec<DesignAllocation> = designs
            .iter()
            .map(|design| {
                let units_per_box = self.units_for(design.design_number);
                let allocated_to_boxes = u64::from(units_per_box) * box_quantity;
                DesignAllocation {
                    design_number: design.design_number,
                    display_name: design.display_name(),
                    coffee_label: design.coffee.label(),
                    units_per_box,
                    max_units_per_box: max_units_per_box(design.quantity, box_config),
                    allocated_to_boxes,
                    remaining_loose: u64::from(design.quantity).saturating_sub(allocated_to_boxes),
                }
            })
            .collect();

        let units_per_box = self.total_per_box();
        let total_allocated = u64::from(units_per_box) * box_quantity;
        let total_coffee_units: u64 = designs.iter().map(|d| u64::from(d.quantity)).sum();

        AllocationSummary {
            pack_size: box_config.pack_size,
            box_quantity: box_config.quantity,
            units_needed: box_config.units_needed(),
            units_per_box,
            total_allocated,
            total_coffee_units,
            remaining_loose_units: total_coffee_units.saturating_sub(total_allocated),
            missing_units_per_box: box_config.pack_size.saturating_sub(units_per_box),
            can_fulfill: self.can_fulfill(box_config),
            designs: rows,
        }
    }
}

/// One design's share of the box order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignAllocation {
    pub design_number: u32,
    pub display_name: String,
    pub coffee_label: String,
    pub units_per_box: u32,
    pub max_units_per_box: u32,
    /// Units of this design packed into boxes
    pub allocated_to_boxes: u64,
    /// Units of this design shipped loose
    pub remaining_loose: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub pack_size: u32,
    pub box_quantity: u32,
    pub units_needed: u64,
    pub units_per_box: u32,
    pub total_allocated: u64,
    pub total_coffee_units: u64,
    pub remaining_loose_units: u64,
    pub missing_units_per_box: u32,
    pub can_fulfill: bool,
    pub designs: Vec<DesignAllocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn designs(quantities: &[u32]) -> Vec<DesignConfig> {
        quantities
            .iter()
            .enumerate()
            .map(|(i, q)| DesignConfig::new(i as u32 + 1).with_quantity(*q))
            .collect()
    }

    fn boxes(pack_size: u32, quantity: u32) -> BoxConfig {
        BoxConfig {
            pack_size,
            quantity,
            ..BoxConfig::default()
        }
    }

    fn assert_invariants(alloc: &Allocation, designs: &[DesignConfig], config: &BoxConfig) {
        assert!(alloc.total_per_box() <= config.pack_size, "{alloc:?} over pack");
        for d in designs {
            assert!(
                u64::from(alloc.units_for(d.design_number)) * u64::from(config.quantity)
                    <= u64::from(d.quantity),
                "design {} over inventory",
                d.design_number
            );
        }
    }

    #[test]
    fn test_max_units_per_box() {
        let config = boxes(4, 100);
        assert_eq!(max_units_per_box(2000, &config), 4);
        assert_eq!(max_units_per_box(250, &config), 2);
        assert_eq!(max_units_per_box(99, &config), 0);
    }

    #[test]
    fn test_even_split_example() {
        let d = designs(&[2000, 2000]);
        let config = boxes(4, 100);
        let alloc = Allocation::even_split(&d, &config);

        assert_eq!(alloc.units_for(1), 2);
        assert_eq!(alloc.units_for(2), 2);
        assert!(alloc.can_fulfill(&config));
    }

    #[test]
    fn test_even_split_remainder_goes_first() {
        let d = designs(&[5000, 5000, 5000]);
        let config = boxes(8, 100);
        let alloc = Allocation::even_split(&d, &config);

        // 8 = 3 * 2 + 2: designs 1 and 2 get the extra unit
        assert_eq!(alloc.units_for(1), 3);
        assert_eq!(alloc.units_for(2), 3);
        assert_eq!(alloc.units_for(3), 2);
        assert_eq!(alloc.total_per_box(), 8);
    }

    #[test]
    fn test_even_split_more_designs_than_units() {
        let d = designs(&[1000, 1000, 1000, 1000, 1000]);
        let config = boxes(3, 100);
        let alloc = Allocation::even_split(&d, &config);

        assert_eq!(
            alloc.iter().map(|(_, u)| u).collect::<Vec<_>>(),
            vec![1, 1, 1, 0, 0]
        );
    }

    #[test]
    fn test_even_split_clipped_by_inventory() {
        let d = designs(&[500, 5000]);
        let config = boxes(8, 500);
        let alloc = Allocation::even_split(&d, &config);

        // Design 1 only has enough for one unit per box
        assert_eq!(alloc.units_for(1), 1);
        assert_eq!(alloc.units_for(2), 4);
        assert!(!alloc.can_fulfill(&config));
        assert_invariants(&alloc, &d, &config);
    }

    #[test]
    fn test_even_split_no_designs() {
        let config = boxes(4, 100);
        let alloc = Allocation::even_split(&[], &config);
        assert!(alloc.is_empty());
        assert!(!alloc.can_fulfill(&config));
    }

    #[test]
    fn test_design_below_box_quantity_excluded() {
        let mut d = designs(&[500, 2000]);
        let config = boxes(4, 600);
        let alloc = Allocation::even_split(&d, &config);
        assert_eq!(alloc.units_for(1), 0);

        let alloc = alloc.set_units(&d, &config, 1, 3);
        assert_eq!(alloc.units_for(1), 0);

        // Raising the design's quantity makes it allocatable again
        d[0].quantity = 1200;
        let alloc = alloc.set_units(&d, &config, 1, 3);
        assert_eq!(alloc.units_for(1), 2);
    }

    #[test]
    fn test_set_units_within_headroom() {
        let d = designs(&[2000, 2000]);
        let config = boxes(4, 100);
        let alloc = Allocation::empty_for(&d).set_units(&d, &config, 1, 3);

        assert_eq!(alloc.units_for(1), 3);
        assert_eq!(alloc.units_for(2), 0);
    }

    #[test]
    fn test_set_units_rebalances_others() {
        let d = designs(&[2000, 2000]);
        let config = boxes(4, 100);
        let alloc = Allocation::even_split(&d, &config).set_units(&d, &config, 1, 3);

        // others = 2, excess = 1, ratio = 1/2, reduction = floor(2 * 0.5) = 1
        assert_eq!(alloc.units_for(1), 3);
        assert_eq!(alloc.units_for(2), 1);
        assert_eq!(alloc.total_per_box(), 4);
    }

    #[test]
    fn test_set_units_takes_whole_pack() {
        let d = designs(&[2000, 2000]);
        let config = boxes(4, 100);
        let alloc = Allocation::even_split(&d, &config).set_units(&d, &config, 2, 4);

        assert_eq!(alloc.units_for(1), 0);
        assert_eq!(alloc.units_for(2), 4);
    }

    #[test]
    fn test_set_units_floored_reduction_clips_request() {
        let d = designs(&[5000, 5000, 5000]);
        let config = boxes(4, 100);
        let start = Allocation::empty_for(&d)
            .set_units(&d, &config, 2, 1)
            .set_units(&d, &config, 3, 2);
        let alloc = start.set_units(&d, &config, 1, 3);

        // others = 3, excess = 2: design 2 loses floor(1 * 2/3) = 0,
        // design 3 loses floor(2 * 2/3) = 1, leaving headroom of 2
        assert_eq!(alloc.units_for(2), 1);
        assert_eq!(alloc.units_for(3), 1);
        assert_eq!(alloc.units_for(1), 2);
        assert_invariants(&alloc, &d, &config);
    }

    #[test]
    fn test_set_units_clipped_to_inventory() {
        let d = designs(&[300, 5000]);
        let config = boxes(6, 100);
        let alloc = Allocation::empty_for(&d).set_units(&d, &config, 1, 6);
        assert_eq!(alloc.units_for(1), 3);
    }

    #[test]
    fn test_set_units_unknown_design_is_noop() {
        let d = designs(&[2000]);
        let config = boxes(4, 100);
        let alloc = Allocation::even_split(&d, &config);
        assert_eq!(alloc.set_units(&d, &config, 9, 2), alloc);
    }

    #[test]
    fn test_invariants_hold_over_many_edits() {
        let d = designs(&[500, 1300, 2000, 4100, 800]);
        for pack_size in 3..=8 {
            for box_quantity in [100, 250, 400] {
                let config = boxes(pack_size, box_quantity);
                let mut alloc = Allocation::even_split(&d, &config);
                assert_invariants(&alloc, &d, &config);

                for step in 0..40u32 {
                    let design = step % 5 + 1;
                    let units = (step * 7 + 3) % 10;
                    alloc = alloc.set_units(&d, &config, design, units);
                    assert_invariants(&alloc, &d, &config);
                }
            }
        }
    }

    #[test]
    fn test_reconcile_tracks_designs_and_pack() {
        let d = designs(&[2000, 2000, 2000]);
        let config = boxes(6, 100);
        let alloc = Allocation::even_split(&d, &config);
        assert_eq!(alloc.total_per_box(), 6);

        // Shrink the pack: trimmed from the last design backwards
        let smaller = boxes(4, 100);
        let alloc = alloc.reconcile(&d, &smaller);
        assert_eq!(
            alloc.iter().map(|(_, u)| u).collect::<Vec<_>>(),
            vec![2, 2, 0]
        );

        // Drop design 3, add design 4
        let mut d2 = designs(&[2000, 2000]);
        d2.push(DesignConfig::new(4).with_quantity(2000));
        let alloc = alloc.reconcile(&d2, &smaller);
        assert_eq!(alloc.units_for(3), 0);
        assert_eq!(alloc.units_for(4), 0);
        assert_eq!(alloc.iter().count(), 3);
        assert_invariants(&alloc, &d2, &smaller);
    }

    #[test]
    fn test_reconcile_clips_to_inventory_after_box_increase() {
        let d = designs(&[1000, 1000]);
        let config = boxes(4, 100);
        let alloc = Allocation::even_split(&d, &config);

        let more_boxes = boxes(4, 800);
        let alloc = alloc.reconcile(&d, &more_boxes);
        assert_eq!(alloc.units_for(1), 1);
        assert_eq!(alloc.units_for(2), 1);
        assert!(!alloc.can_fulfill(&more_boxes));
    }

    #[test]
    fn test_summary() {
        let d = designs(&[2000, 600]);
        let config = boxes(4, 100);
        let alloc = Allocation::empty_for(&d)
            .set_units(&d, &config, 1, 2)
            .set_units(&d, &config, 2, 1);
        let summary = alloc.summary(&d, &config);

        assert_eq!(summary.units_needed, 400);
        assert_eq!(summary.units_per_box, 3);
        assert_eq!(summary.total_allocated, 300);
        assert_eq!(summary.total_coffee_units, 2600);
        assert_eq!(summary.remaining_loose_units, 2300);
        assert_eq!(summary.missing_units_per_box, 1);
        assert!(!summary.can_fulfill);

        assert_eq!(summary.designs[0].allocated_to_boxes, 200);
        assert_eq!(summary.designs[0].remaining_loose, 1800);
        assert_eq!(summary.designs[1].max_units_per_box, 4);
        assert_eq!(summary.designs[1].remaining_loose, 500);
        assert_eq!(summary.designs[1].coffee_label, "Not selected");
    }

    #[test]
    fn test_serializes_as_map() {
        let d = designs(&[2000, 2000]);
        let alloc = Allocation::even_split(&d, &boxes(4, 100));
        let json = serde_json::to_string(&alloc).unwrap();
        assert_eq!(json, r#"{"1":2,"2":2}"#);
    }
}
