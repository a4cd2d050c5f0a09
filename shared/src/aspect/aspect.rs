use std::ops::BitOr;

pub const NUM_ASPECTS: usize = 32;

/// Profile an aspect has until one is set
pub const DEFAULT_ASPECT_PROFILE: u8 = 255;

/// One bit-indexed bucket of an entity's networked state
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Aspect(u8);

impl Aspect {
    pub const SCRIPT: Aspect = Aspect(1);
    pub const PHYSICS: Aspect = Aspect(3);
    pub const GAME_CLIENT_STATIC: Aspect = Aspect(4);
    pub const GAME_SERVER_STATIC: Aspect = Aspect(5);
    pub const GAME_CLIENT_DYNAMIC: Aspect = Aspect(6);
    pub const GAME_SERVER_DYNAMIC: Aspect = Aspect(7);
    pub const GAME_CLIENT_A: Aspect = Aspect(8);
    pub const GAME_SERVER_A: Aspect = Aspect(9);
    pub const GAME_CLIENT_B: Aspect = Aspect(10);
    pub const GAME_SERVER_B: Aspect = Aspect(11);
    pub const GAME_CLIENT_C: Aspect = Aspect(12);
    pub const GAME_SERVER_C: Aspect = Aspect(13);
    pub const GAME_CLIENT_D: Aspect = Aspect(14);
    pub const GAME_CLIENT_E: Aspect = Aspect(15);
    pub const GAME_CLIENT_F: Aspect = Aspect(16);
    pub const GAME_CLIENT_G: Aspect = Aspect(17);
    pub const GAME_CLIENT_H: Aspect = Aspect(18);
    pub const GAME_CLIENT_I: Aspect = Aspect(19);
    pub const GAME_CLIENT_J: Aspect = Aspect(20);
    pub const GAME_SERVER_D: Aspect = Aspect(21);
    pub const GAME_CLIENT_K: Aspect = Aspect(22);
    pub const GAME_CLIENT_L: Aspect = Aspect(23);
    pub const GAME_CLIENT_M: Aspect = Aspect(24);
    pub const GAME_CLIENT_N: Aspect = Aspect(25);
    pub const GAME_CLIENT_O: Aspect = Aspect(26);
    pub const GAME_CLIENT_P: Aspect = Aspect(27);
    pub const GAME_SERVER_E: Aspect = Aspect(28);
    pub const PLAYER_UPDATE: Aspect = Aspect(31);

    pub fn new(index: u8) -> Option<Aspect> {
        if (index as usize) < NUM_ASPECTS {
            Some(Aspect(index))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn bit(self) -> u32 {
        1u32 << self.0
    }
}

/// A set of aspects
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AspectMask(u32);

impl AspectMask {
    pub const EMPTY: AspectMask = AspectMask(0);
    pub const ALL: AspectMask = AspectMask(u32::MAX);

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, aspect: Aspect) -> bool {
        self.0 & aspect.bit() != 0
    }

    pub fn insert(&mut self, aspect: Aspect) {
        self.0 |= aspect.bit();
    }

    pub fn remove(&mut self, aspect: Aspect) {
        self.0 &= !aspect.bit();
    }

    pub fn iter(self) -> impl Iterator<Item = Aspect> {
        (0..NUM_ASPECTS as u8)
            .map(Aspect)
            .filter(move |aspect| self.contains(*aspect))
    }
}

impl From<Aspect> for AspectMask {
    fn from(aspect: Aspect) -> Self {
        AspectMask(aspect.bit())
    }
}

impl BitOr<Aspect> for AspectMask {
    type Output = AspectMask;

    fn bitor(self, aspect: Aspect) -> AspectMask {
        AspectMask(self.0 | aspect.bit())
    }
}

/// Per-aspect behavior flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AspectFlags(u8);

impl AspectFlags {
    pub const NONE: AspectFlags = AspectFlags(0);
    /// Only the server's controller may write this aspect
    pub const SERVER_CONTROLLER_ONLY: AspectFlags = AspectFlags(0x04);
    pub const NO_COMPRESSION: AspectFlags = AspectFlags(0x08);
    /// May be delegated to a client's authority
    pub const DELEGATABLE: AspectFlags = AspectFlags(0x10);
    /// The profile is owned by the server
    pub const SERVER_MANAGED_PROFILE: AspectFlags = AspectFlags(0x20);
    /// Carries a timestamp for drift compensation
    pub const TIMESTAMP_STATE: AspectFlags = AspectFlags(0x80);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: AspectFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AspectFlags {
    type Output = AspectFlags;

    fn bitor(self, other: AspectFlags) -> AspectFlags {
        AspectFlags(self.0 | other.0)
    }
}
