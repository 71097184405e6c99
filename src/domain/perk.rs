/// Perks: special grid items with a gameplay effect.
/// Kind semantics live here as methods, so the decoder and the
/// renderer never match on raw kind bytes themselves.

use super::coord::Coord;
use super::player::PlayerId;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PerkKind {
    Food,
    ReservedFood,
    Reverser,
    Teleporter,
    SpeedBoost,
    FoodFrenzy,
    MinesTrail,
    Mine,
    MultiSnakeGrant,
    /// Kind byte this client does not know. Stored, never drawn.
    Unknown(u8),
}

impl PerkKind {
    pub fn from_wire(value: u8) -> Self {
        match value {
            0 => PerkKind::Food,
            1 => PerkKind::ReservedFood,
            2 => PerkKind::Reverser,
            3 => PerkKind::Teleporter,
            4 => PerkKind::SpeedBoost,
            5 => PerkKind::FoodFrenzy,
            6 => PerkKind::MinesTrail,
            7 => PerkKind::Mine,
            8 => PerkKind::MultiSnakeGrant,
            other => PerkKind::Unknown(other),
        }
    }

    pub fn wire_value(self) -> u8 {
        match self {
            PerkKind::Food => 0,
            PerkKind::ReservedFood => 1,
            PerkKind::Reverser => 2,
            PerkKind::Teleporter => 3,
            PerkKind::SpeedBoost => 4,
            PerkKind::FoodFrenzy => 5,
            PerkKind::MinesTrail => 6,
            PerkKind::Mine => 7,
            PerkKind::MultiSnakeGrant => 8,
            PerkKind::Unknown(v) => v,
        }
    }

    /// Does the wire record carry a `u16` owner after the kind byte?
    pub fn has_owner(self) -> bool {
        matches!(self, PerkKind::ReservedFood | PerkKind::Mine)
    }

    /// Fill colour of the perk disc. `owned` = owned by the local player.
    /// `None` means the kind has no visual.
    pub fn color(self, owned: bool) -> Option<(u8, u8, u8)> {
        let rgb = match self {
            PerkKind::Food => 0x2fbf71,
            PerkKind::ReservedFood if owned => 0x1e90ff,
            PerkKind::ReservedFood => 0x0c3b66,
            PerkKind::Reverser => 0xf0c808,
            PerkKind::Teleporter => 0xe7820e,
            PerkKind::SpeedBoost => 0xe70ed9,
            PerkKind::FoodFrenzy => 0x9e59ff,
            PerkKind::MinesTrail => 0xe06565,
            PerkKind::Mine if owned => 0x6b0000,
            PerkKind::Mine => 0xf00000,
            PerkKind::MultiSnakeGrant => 0x00ff4c,
            PerkKind::Unknown(_) => return None,
        };
        Some(((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Perk {
    pub coord: Coord,
    pub kind: PerkKind,
    pub owner: Option<PlayerId>,
}

impl Perk {
    pub fn new(coord: Coord, kind: PerkKind) -> Self {
        Perk { coord, kind, owner: None }
    }

    pub fn owned(coord: Coord, kind: PerkKind, owner: PlayerId) -> Self {
        Perk { coord, kind, owner: Some(owner) }
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_reserved_food_and_mine_carry_owner() {
        for byte in 0..=8u8 {
            let kind = PerkKind::from_wire(byte);
            assert_eq!(kind.has_owner(), byte == 1 || byte == 7, "kind {byte}");
            assert_eq!(kind.wire_value(), byte);
        }
        assert!(!PerkKind::Unknown(200).has_owner());
    }

    #[test]
    fn unknown_kind_is_kept_but_invisible() {
        let kind = PerkKind::from_wire(42);
        assert_eq!(kind, PerkKind::Unknown(42));
        assert_eq!(kind.wire_value(), 42);
        assert_eq!(kind.color(false), None);
    }

    #[test]
    fn ownership_changes_colour() {
        assert_ne!(PerkKind::Mine.color(true), PerkKind::Mine.color(false));
        assert_eq!(PerkKind::Food.color(true), PerkKind::Food.color(false));
        assert_eq!(PerkKind::Food.color(false), Some((0x2f, 0xbf, 0x71)));
    }
}
