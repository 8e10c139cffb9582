use refuel::domain::{FuelTank, TANK_CAPACITY};

#[test]
fn starts_full() {
    let tank = FuelTank::full();
    assert_eq!(tank.level(), TANK_CAPACITY);
    assert!(tank.is_full());
    assert!(!tank.is_empty());
}

#[test]
fn spend_to_empty_then_floors() {
    let mut tank = FuelTank::full();

    for expected in (0..TANK_CAPACITY).rev() {
        assert_eq!(tank.spend(), expected);
    }
    assert!(tank.is_empty());

    // A fifth spend is a no-op, not an error.
    assert_eq!(tank.spend(), 0);
    assert_eq!(tank.level(), 0);
}

#[test]
fn grant_saturates_at_capacity() {
    let mut tank = FuelTank::full();
    for _ in 0..TANK_CAPACITY {
        tank.spend();
    }

    for expected in 1..=TANK_CAPACITY {
        assert_eq!(tank.grant(), expected);
    }
    assert!(tank.is_full());

    assert_eq!(tank.grant(), TANK_CAPACITY);
    assert_eq!(tank.level(), TANK_CAPACITY);
}

#[test]
fn level_never_leaves_bounds() {
    let mut tank = FuelTank::full();
    for i in 0..50 {
        if i % 3 == 0 {
            tank.grant();
        } else {
            tank.spend();
        }
        assert!(tank.level() <= TANK_CAPACITY);
    }
}
