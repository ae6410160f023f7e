//! Planning (component F): pure functions over
//! `ShipmentSkuFootprint` rows — no I/O, fully unit-testable.

use crate::models::{Pallet, ShipmentSkuFootprint, VIRTUAL_LPN_PREFIX};

/// Aggregate pallet-count estimate across every footprint row of a shipment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanResult {
    pub total_units: i64,
    pub full_pallets: i64,
    pub partial_pallets: i64,
    pub estimated_pallets: i64,
    pub skus_missing_footprint: Vec<String>,
}

/// Per-SKU planning math, computed identically to [`plan`] but retained per
/// SKU on `PreparedJob` as a diagnostic breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuPlan {
    pub sku: String,
    pub units: i64,
    pub units_per_pallet: Option<i64>,
    pub full_pallets: i64,
    pub partial_units: i64,
    pub estimated_pallets: i64,
}

/// Totals full/partial pallets across every SKU and flags SKUs with no
/// usable units-per-pallet footprint.
pub fn plan(footprints: &[ShipmentSkuFootprint]) -> PlanResult {
    let mut result = PlanResult::default();
    for f in footprints {
        result.total_units += f.total_units;
        if f.total_units <= 0 {
            continue;
        }
        match f.usable_units_per_pallet() {
            Some(upp) => {
                let full = f.total_units / upp;
                let remainder = f.total_units % upp;
                result.full_pallets += full;
                if remainder > 0 {
                    result.partial_pallets += 1;
                }
            }
            None => {
                result.partial_pallets += 1;
                result.skus_missing_footprint.push(f.sku.clone());
            }
        }
    }
    result.estimated_pallets = result.full_pallets + result.partial_pallets;
    result
}

/// Per-SKU breakdown mirroring [`plan`]'s math, used by `PreparedJob`.
pub fn sku_plans(footprints: &[ShipmentSkuFootprint]) -> Vec<SkuPlan> {
    footprints
        .iter()
        .map(|f| {
            let units_per_pallet = f.usable_units_per_pallet();
            let (full_pallets, partial_units, estimated_pallets) = match units_per_pallet {
                Some(upp) if f.total_units > 0 => {
                    let full = f.total_units / upp;
                    let remainder = f.total_units % upp;
                    (full, remainder, full + if remainder > 0 { 1 } else { 0 })
                }
                _ if f.total_units > 0 => (0, f.total_units, 1),
                _ => (0, 0, 0),
            };
            SkuPlan {
                sku: f.sku.clone(),
                units: f.total_units,
                units_per_pallet,
                full_pallets,
                partial_units,
                estimated_pallets,
            }
        })
        .collect()
}

/// Synthesizes virtual pallets, used when the shipment graph has
/// zero physical pallets. `seq_start` is the first value drawn from the
/// global virtual-LPN sequence; callers advance their own counter by the
/// returned pallet count.
pub fn synthesize_virtual_pallets(footprints: &[ShipmentSkuFootprint], seq_start: u64) -> Vec<Pallet> {
    let mut seq = seq_start;
    let mut pallets = Vec::new();

    for f in footprints {
        if f.total_units <= 0 || f.sku.trim().is_empty() {
            continue;
        }
        let per_pallet_units: Vec<i64> = match f.usable_units_per_pallet() {
            None => vec![f.total_units],
            Some(upp) => {
                let count = f.total_units.div_ceil(upp);
                (0..count)
                    .map(|i| {
                        if i < count - 1 {
                            upp
                        } else {
                            let remainder = f.total_units % upp;
                            if remainder == 0 {
                                upp
                            } else {
                                remainder
                            }
                        }
                    })
                    .collect()
            }
        };

        for units in per_pallet_units {
            let lpn_id = format!("{VIRTUAL_LPN_PREFIX}{seq:06}");
            let sscc = format!("{seq:0>18}");
            let mut pallet = Pallet::new(lpn_id, sscc).expect("synthetic ids are non-blank");
            pallet.unit_count = Some(units);
            pallets.push(pallet);
            seq += 1;
        }
    }
    pallets
}
