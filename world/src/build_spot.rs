//! Fixed map locations that host at most one tower.

use waypoint_defence_core::{BuildSpotId, GridCoord, Position};
use waypoint_defence_system_tower_combat::Tower;

/// A buildable tile and the tower occupying it, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildSpot {
    id: BuildSpotId,
    coord: GridCoord,
    tower: Option<Tower>,
}

impl BuildSpot {
    /// Creates a vacant build spot.
    #[must_use]
    pub(crate) const fn new(id: BuildSpotId, coord: GridCoord) -> Self {
        Self {
            id,
            coord,
            tower: None,
        }
    }

    /// Identifier of the spot.
    #[must_use]
    pub const fn id(&self) -> BuildSpotId {
        self.id
    }

    /// Logical position towers on this spot fire from.
    #[must_use]
    pub fn position(&self) -> Position {
        Position::from(self.coord)
    }

    /// Tower occupying the spot.
    #[must_use]
    pub const fn tower(&self) -> Option<&Tower> {
        self.tower.as_ref()
    }

    /// Reports whether a tower occupies the spot.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.tower.is_some()
    }

    pub(crate) fn tower_mut(&mut self) -> Option<&mut Tower> {
        self.tower.as_mut()
    }

    /// Installs `tower` unless the spot is already occupied.
    ///
    /// Hands the tower back when the spot is taken.
    pub(crate) fn place(&mut self, tower: Tower) -> Result<(), Tower> {
        if self.tower.is_some() {
            return Err(tower);
        }
        self.tower = Some(tower);
        Ok(())
    }

    pub(crate) fn take(&mut self) -> Option<Tower> {
        self.tower.take()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use waypoint_defence_core::TowerKind;
    use waypoint_defence_system_tower_combat::TowerStats;

    fn archer() -> Tower {
        Tower::new(
            TowerKind::Archer,
            TowerStats {
                range: 3.0,
                damage: 4,
                cooldown: Duration::from_millis(500),
                cost: 20,
            },
        )
    }

    #[test]
    fn spot_holds_at_most_one_tower() {
        let mut spot = BuildSpot::new(BuildSpotId::new(0), GridCoord::new(2, 3));
        assert!(spot.place(archer()).is_ok());
        assert!(spot.place(archer()).is_err());
        assert!(spot.is_occupied());
    }

    #[test]
    fn take_vacates_the_spot() {
        let mut spot = BuildSpot::new(BuildSpotId::new(4), GridCoord::new(1, 1));
        assert!(spot.place(archer()).is_ok());

        let tower = spot.take().expect("tower was placed");
        assert_eq!(tower.kind(), TowerKind::Archer);
        assert!(!spot.is_occupied());
        assert_eq!(spot.position(), Position::new(1.0, 1.0));
    }
}
