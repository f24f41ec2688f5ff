//! Closed tag catalogs consumed by the annotation model.
//!
//! Every catalog resolves a canonical uppercase name to a singleton value. The
//! catalogs are externally defined (Sejong-style part-of-speech set and the
//! phrase/dependency/role/entity inventories of the wrapped analyzers); nothing
//! here invents new tags.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use bitflags::bitflags;
use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    Unknown { catalog: &'static str, name: String },
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::Unknown { catalog, name } => {
                write!(f, "'{}' is not a known {} tag", name, catalog)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TagError {}

macro_rules! define_tags {
    ($(#[$doc:meta])* $name:ident, $catalog:expr, [$($variant:ident),+ $(,)?]) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
        #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
        #[archive(check_bytes)]
        #[archive_attr(allow(non_camel_case_types, clippy::upper_case_acronyms))]
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        #[repr(u8)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every tag of the catalog, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Human readable catalog name, used in lookup errors.
            pub const CATALOG: &'static str = $catalog;

            /// Canonical (uppercase) name of the tag.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = TagError;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                match name {
                    $(stringify!($variant) => Ok($name::$variant),)+
                    _ => Err(TagError::Unknown {
                        catalog: $catalog,
                        name: String::from(name),
                    }),
                }
            }
        }
    };
}

define_tags!(
    /// Part-of-speech tags of a morpheme.
    PosTag,
    "part-of-speech",
    [
        // Nominals
        NNG, NNP, NNB, NNM, NR, NP,
        // Predicates
        VV, VA, VX, VCP, VCN,
        // Modifiers and interjection
        MM, MAG, MAJ, IC,
        // Josa (postpositions)
        JKS, JKC, JKG, JKO, JKB, JKV, JKQ, JC, JX,
        // Endings
        EP, EF, EC, ETN, ETM,
        // Affixes and root
        XPN, XPV, XSN, XSV, XSA, XSM, XSO, XR,
        // Symbols and foreign script
        SF, SP, SS, SE, SO, SW, SL, SH, SN,
        // Unknowns
        NF, NV, NA,
    ]
);

define_tags!(
    /// Labels of phrase-structure (constituency) nodes.
    PhraseTag,
    "phrase",
    [S, Q, NP, VP, VNP, AP, DP, IP, X, L, R, PRN]
);

define_tags!(
    /// Grammatical function of a dependency edge.
    DependencyTag,
    "dependency",
    [SBJ, OBJ, CMP, MOD, AJT, CNJ, INT, PRN, UNDEF]
);

define_tags!(
    /// Semantic role of a predicate-argument edge.
    RoleType,
    "role",
    [
        ARG0, ARG1, ARG2, ARG3,
        ARGM_COM, ARGM_LOC, ARGM_DIR, ARGM_GOL, ARGM_CAU, ARGM_TMP, ARGM_EXT,
        ARGM_PRP, ARGM_MNR, ARGM_DIS, ARGM_CND, ARGM_ADV, ARGM_INS, ARGM_NEG,
        ARGM_PRD,
        UNDEF,
    ]
);

define_tags!(
    /// Coarse named-entity categories.
    CoarseEntityType,
    "entity",
    [PS, LC, OG, AF, DT, TI, CV, AM, PT, QT, FD, TR, EV, MT, TM, X]
);

bitflags! {
    /// Category membership of a part-of-speech tag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct TagClass: u16 {
        const NOUN = 1;
        const PREDICATE = 2;
        const MODIFIER = 4;
        const JOSA = 8;
        const ENDING = 16;
        const AFFIX = 32;
        const SUFFIX = 64;
        const SYMBOL = 128;
        const UNKNOWN = 256;
    }
}

impl PosTag {
    pub fn class(&self) -> TagClass {
        use PosTag::*;

        match self {
            NNG | NNP | NNB | NNM | NR | NP => TagClass::NOUN,
            VV | VA | VX | VCP | VCN => TagClass::PREDICATE,
            MM | MAG | MAJ => TagClass::MODIFIER,
            JKS | JKC | JKG | JKO | JKB | JKV | JKQ | JC | JX => TagClass::JOSA,
            EP | EF | EC | ETN | ETM => TagClass::ENDING,
            XPN | XPV => TagClass::AFFIX,
            XSN | XSV | XSA | XSM | XSO => TagClass::AFFIX | TagClass::SUFFIX,
            SF | SP | SS | SE | SO | SW | SL | SH | SN => TagClass::SYMBOL,
            NF | NV | NA => TagClass::UNKNOWN,
            IC | XR => TagClass::empty(),
        }
    }

    pub fn is_noun(&self) -> bool {
        self.class().contains(TagClass::NOUN)
    }

    pub fn is_predicate(&self) -> bool {
        self.class().contains(TagClass::PREDICATE)
    }

    pub fn is_modifier(&self) -> bool {
        self.class().contains(TagClass::MODIFIER)
    }

    pub fn is_josa(&self) -> bool {
        self.class().contains(TagClass::JOSA)
    }

    pub fn is_ending(&self) -> bool {
        self.class().contains(TagClass::ENDING)
    }

    pub fn is_affix(&self) -> bool {
        self.class().contains(TagClass::AFFIX)
    }

    pub fn is_suffix(&self) -> bool {
        self.class().contains(TagClass::SUFFIX)
    }

    pub fn is_symbol(&self) -> bool {
        self.class().contains(TagClass::SYMBOL)
    }

    pub fn is_unknown(&self) -> bool {
        self.class().contains(TagClass::UNKNOWN)
    }
}
