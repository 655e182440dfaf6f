use crate::consts::{PLACEMENT_COUNT, TECHNIQUE_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Stroke technique (ST). Variant order is the column order of every matrix
/// and matches the alphabetical order used by the analysis files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
pub enum Technique {
    Attack,
    Block,
    Chopping,
    Flick,
    Lob,
    Others,
    PimpleTech,
    Push,
    Short,
    Slide,
    Smash,
    Topspin,
    Twist,
}

/// Ball placement (BP): lateral side (Backhand / Forehand / Middle) followed
/// by depth (Half-long / Long / Short). Variant order is the row order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Placement {
    Bh,
    Bl,
    Bs,
    Fh,
    Fl,
    Fs,
    Mh,
    Ml,
    Ms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Side {
    Backhand,
    Forehand,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Depth {
    #[strum(serialize = "Half-long")]
    HalfLong,
    Long,
    Short,
}

impl Technique {
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::iter().nth(idx)
    }

    pub fn all() -> [Self; TECHNIQUE_COUNT] {
        let mut out = [Self::Attack; TECHNIQUE_COUNT];
        for (slot, t) in out.iter_mut().zip(Self::iter()) {
            *slot = t;
        }
        out
    }
}

impl Placement {
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::iter().nth(idx)
    }

    pub fn all() -> [Self; PLACEMENT_COUNT] {
        let mut out = [Self::Bh; PLACEMENT_COUNT];
        for (slot, p) in out.iter_mut().zip(Self::iter()) {
            *slot = p;
        }
        out
    }

    pub fn side(self) -> Side {
        match self {
            Self::Bh | Self::Bl | Self::Bs => Side::Backhand,
            Self::Fh | Self::Fl | Self::Fs => Side::Forehand,
            Self::Mh | Self::Ml | Self::Ms => Side::Middle,
        }
    }

    pub fn depth(self) -> Depth {
        match self {
            Self::Bh | Self::Fh | Self::Mh => Depth::HalfLong,
            Self::Bl | Self::Fl | Self::Ml => Depth::Long,
            Self::Bs | Self::Fs | Self::Ms => Depth::Short,
        }
    }
}

/// One concrete shot choice: a technique played to a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub technique: Technique,
    pub placement: Placement,
}

impl Action {
    pub fn new(technique: Technique, placement: Placement) -> Self {
        Self {
            technique,
            placement,
        }
    }
}

/// Formats as `(ST->BP)`, the node notation used in transition-map keys.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}->{})", self.technique, self.placement)
    }
}

/// Key under which a precomputed transition map stores the weight of
/// `from -> to`, e.g. `(Push->BH) -> (Topspin->FL)`.
pub fn transition_key(from: &Action, to: &Action) -> String {
    format!("{} -> {}", from, to)
}
