//! Demo catalog for development and tests.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use sparekeep_core::{MovementId, PartId};
use sparekeep_inventory::{Category, Movement, MovementKind, Part};

/// Stable id of the n-th demo part (1-based).
pub fn demo_part_id(n: u128) -> PartId {
    PartId::from_uuid(Uuid::from_u128(0x5eed_0000 + n))
}

#[allow(clippy::too_many_arguments)]
fn part(
    n: u128,
    sku: &str,
    name: &str,
    category: Category,
    (quantity, min_quantity): (u32, u32),
    location: &str,
    unit: &str,
    unit_cost_cents: i64,
    (supplier, lead_time_days): (&str, u32),
    (manufacturer, model): (&str, &str),
    specs: &[(&str, &str)],
) -> Part {
    Part {
        location: location.to_string(),
        unit: unit.to_string(),
        supplier: supplier.to_string(),
        lead_time_days,
        manufacturer: manufacturer.to_string(),
        model: model.to_string(),
        specs: specs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        ..Part::new(demo_part_id(n), sku, name, category)
            .with_stock(quantity, min_quantity)
            .with_unit_cost(unit_cost_cents)
    }
}

pub fn demo_parts() -> Vec<Part> {
    vec![
        part(
            1,
            "BR-045-22",
            "SKF 6204 bearing",
            Category::Mechanical,
            (12, 5),
            "Shelf A-04",
            "UN",
            4_500,
            ("Mecanica Express", 3),
            ("SKF", "6204-2Z"),
            &[("Diameter", "20mm"), ("Width", "14mm"), ("Shield", "ZZ")],
        ),
        part(
            2,
            "TR-102-99",
            "V-belt B-45",
            Category::Transmission,
            (2, 4),
            "Shelf B-01",
            "UN",
            8_550,
            ("Correias Sul", 5),
            ("Gates", "Hi-Power II"),
            &[("Profile", "B"), ("Length", "45 in")],
        ),
        part(
            3,
            "EL-882-10",
            "Inductive sensor M12",
            Category::Electrical,
            (0, 2),
            "Central store",
            "UN",
            12_000,
            ("Eletro Pecas", 2),
            ("Pepperl+Fuchs", "NBB4-12GM50-E2"),
            &[("Output", "PNP NO"), ("Range", "4mm")],
        ),
        part(
            4,
            "MTR-552-X",
            "WEG 5HP three-phase motor",
            Category::Mechanical,
            (4, 2),
            "B-04",
            "UN",
            125_000,
            ("EletroIndustrial Ltda", 5),
            ("WEG", "W22 Premium"),
            &[("Power", "5 HP / 3.7 kW"), ("Voltage", "220/380/440V"), ("Weight", "32 kg")],
        ),
        part(
            5,
            "LU-101-20L",
            "Hydraulic oil ISO 68",
            Category::Lubricants,
            (40, 50),
            "External depot",
            "L",
            1_850,
            ("Petro Lub", 7),
            ("Ipiranga", "Ipitur AW 68"),
            &[("Viscosity", "68 cSt"), ("Volume", "20L")],
        ),
    ]
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn demo_movements() -> Vec<Movement> {
    let motor = demo_part_id(4);
    let movement = |kind: MovementKind,
                    quantity: u32,
                    occurred_at: DateTime<Utc>,
                    responsible: &str,
                    reference: &str| Movement {
        id: MovementId::new(),
        part_id: motor,
        occurred_at,
        kind,
        quantity,
        responsible: responsible.to_string(),
        reference: reference.to_string(),
    };

    vec![
        movement(MovementKind::Exit, 1, day(2023, 10, 12), "A. Silva", "WO #402"),
        movement(MovementKind::Entry, 5, day(2023, 9, 5), "Storeroom", "PO #992"),
        movement(MovementKind::Exit, 1, day(2023, 8, 14), "R. Costa", "WO #388"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparekeep_inventory::{AlertBoard, StockStatus};

    #[test]
    fn demo_catalog_has_one_stockout_and_two_low_stock_parts() {
        let board = AlertBoard::from_parts(demo_parts());
        assert_eq!(board.critical_count(), 1);
        assert_eq!(board.low_stock_count(), 2);
        assert_eq!(board.entries()[0].part.id, demo_part_id(3));
        assert_eq!(board.entries()[0].badge.status, StockStatus::Critical);
    }

    #[test]
    fn demo_movements_belong_to_the_motor() {
        assert!(demo_movements().iter().all(|m| m.part_id == demo_part_id(4)));
    }
}
