//! Stock movement history (entries and exits recorded against a part).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sparekeep_core::{MovementId, PartId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Entry,
    Exit,
}

/// A recorded stock movement. Owned by the hosted store; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub part_id: PartId,
    pub occurred_at: DateTime<Utc>,
    pub kind: MovementKind,
    pub quantity: u32,
    /// Person or department that moved the stock.
    pub responsible: String,
    /// Work order or purchase order reference (e.g. "WO #402").
    pub reference: String,
}

impl Movement {
    /// Signed effect on the on-hand quantity.
    pub fn signed_quantity(&self) -> i64 {
        match self.kind {
            MovementKind::Entry => i64::from(self.quantity),
            MovementKind::Exit => -i64::from(self.quantity),
        }
    }
}

/// Movements of one part, newest first.
pub fn history_for<'a, I>(part_id: PartId, movements: I) -> Vec<Movement>
where
    I: IntoIterator<Item = &'a Movement>,
{
    let mut out: Vec<Movement> = movements
        .into_iter()
        .filter(|m| m.part_id == part_id)
        .cloned()
        .collect();
    out.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn movement(part_id: PartId, day: u32, kind: MovementKind, quantity: u32) -> Movement {
        Movement {
            id: MovementId::new(),
            part_id,
            occurred_at: Utc.with_ymd_and_hms(2023, 9, day, 8, 0, 0).unwrap(),
            kind,
            quantity,
            responsible: "Stores".to_string(),
            reference: format!("REF-{day}"),
        }
    }

    #[test]
    fn history_is_filtered_and_newest_first() {
        let motor = PartId::new();
        let other = PartId::new();
        let all = vec![
            movement(motor, 5, MovementKind::Entry, 5),
            movement(other, 6, MovementKind::Exit, 1),
            movement(motor, 12, MovementKind::Exit, 1),
            movement(motor, 1, MovementKind::Exit, 1),
        ];

        let history = history_for(motor, &all);
        let days: Vec<_> = history.iter().map(|m| m.reference.as_str()).collect();
        assert_eq!(days, vec!["REF-12", "REF-5", "REF-1"]);

        let net: i64 = history.iter().map(Movement::signed_quantity).sum();
        assert_eq!(net, 3);
    }
}
