use serde::{Deserialize, Serialize};

/// One of the six flat sides of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Front,
    Lid,
    Back,
    Left,
    Right,
    Bottom,
}

impl Face {
    /// Canonical order used for UI iteration.
    pub const ALL: [Self; 6] = [
        Self::Front,
        Self::Lid,
        Self::Back,
        Self::Left,
        Self::Right,
        Self::Bottom,
    ];

    /// Geometry material slots: +X, -X, +Y, -Y, +Z, -Z.
    pub const SLOTS: [Self; 6] = [
        Self::Right,
        Self::Left,
        Self::Lid,
        Self::Bottom,
        Self::Front,
        Self::Back,
    ];

    pub const fn slot(self) -> usize {
        match self {
            Self::Right => 0,
            Self::Left => 1,
            Self::Lid => 2,
            Self::Bottom => 3,
            Self::Front => 4,
            Self::Back => 5,
        }
    }

    pub const fn from_slot(slot: usize) -> Option<Self> {
        match slot {
            0 => Some(Self::Right),
            1 => Some(Self::Left),
            2 => Some(Self::Lid),
            3 => Some(Self::Bottom),
            4 => Some(Self::Front),
            5 => Some(Self::Back),
            _ => None,
        }
    }

    /// Position in [`Face::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Front => 0,
            Self::Lid => 1,
            Self::Back => 2,
            Self::Left => 3,
            Self::Right => 4,
            Self::Bottom => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Front => "Front",
            Self::Lid => "Lid",
            Self::Back => "Back",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Bottom => "Bottom",
        }
    }

    /// Moves `delta` places through the canonical order, wrapping at both ends.
    pub fn step(self, delta: isize) -> Self {
        let count = Self::ALL.len() as isize;
        let idx = (self.index() as isize + delta).rem_euclid(count);
        Self::ALL[idx as usize]
    }

    pub fn next(self) -> Self {
        self.step(1)
    }

    pub fn prev(self) -> Self {
        self.step(-1)
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
