use crate::types::{Position, ResourceType};
use serde::{Deserialize, Serialize};

/// A mineral deposit (asteroid) sitting at a fixed cell.
///
/// Deposits are never destroyed: once mined out they stay on the grid as a
/// depleted marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub position: Position,
    pub resource_type: ResourceType,
    pub remaining_value: u32,
    pub original_value: u32,
    pub is_depleted: bool,
}

impl Deposit {
    pub fn new(position: Position, resource_type: ResourceType, value: u32) -> Self {
        let value = value.max(1);
        Self {
            position,
            resource_type,
            remaining_value: value,
            original_value: value,
            is_depleted: false,
        }
    }

    /// Mirrors a claim's remaining value back onto the deposit. The value
    /// only ever goes down. Returns true on the tick the deposit becomes
    /// depleted.
    pub fn mirror_value(&mut self, value: u32) -> bool {
        self.remaining_value = self.remaining_value.min(value);
        self.check_depleted()
    }

    /// Flags the deposit as depleted once its value reaches zero. Returns
    /// true only for the transition itself.
    pub fn check_depleted(&mut self) -> bool {
        if self.remaining_value == 0 && !self.is_depleted {
            self.is_depleted = true;
            return true;
        }
        false
    }

    /// Forces depletion, used when the claim over the deposit is exhausted.
    pub fn deplete(&mut self) -> bool {
        self.remaining_value = 0;
        self.check_depleted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_never_increases() {
        let mut deposit = Deposit::new(Position::new(0, 0), ResourceType::Gold, 20);
        deposit.mirror_value(12);
        deposit.mirror_value(15);
        assert_eq!(deposit.remaining_value, 12);
        assert_eq!(deposit.original_value, 20);
    }

    #[test]
    fn test_depletes_exactly_once() {
        let mut deposit = Deposit::new(Position::new(0, 0), ResourceType::Iron, 5);
        assert!(!deposit.mirror_value(1));
        assert!(deposit.mirror_value(0));
        assert!(deposit.is_depleted);
        assert!(!deposit.mirror_value(0));
        assert!(!deposit.deplete());
    }

    #[test]
    fn test_zero_value_is_lifted() {
        let deposit = Deposit::new(Position::new(0, 0), ResourceType::Helium, 0);
        assert_eq!(deposit.original_value, 1);
    }
}
