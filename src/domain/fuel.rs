use serde::{Deserialize, Serialize};

/// Tank size of the demo car. The gauge sprite set has five levels (0..=4).
pub const TANK_CAPACITY: u8 = 4;

/// Bounded fuel counter, the entitlement granted in exchange for a purchase.
///
/// The level is always in `[0, TANK_CAPACITY]`. `grant` saturates at the
/// ceiling and `spend` floors at zero; neither is an error, the operation is
/// simply a no-op at the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelTank {
    level: u8,
}

impl FuelTank {
    /// A full tank, the state a fresh session starts in.
    pub fn full() -> Self {
        Self {
            level: TANK_CAPACITY,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    pub fn is_full(&self) -> bool {
        self.level == TANK_CAPACITY
    }

    /// Add one unit of fuel, saturating at capacity. Returns the new level.
    ///
    /// Only the coordinator calls this, and only after a successful consume.
    pub fn grant(&mut self) -> u8 {
        if self.level < TANK_CAPACITY {
            self.level += 1;
        }
        self.level
    }

    /// Burn one unit of fuel, flooring at empty. Returns the new level.
    pub fn spend(&mut self) -> u8 {
        if self.level > 0 {
            self.level -= 1;
        }
        self.level
    }
}

impl Default for FuelTank {
    fn default() -> Self {
        Self::full()
    }
}
