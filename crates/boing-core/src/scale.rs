//! Named scale degree patterns and the pitch ranges built from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Semitones in one octave; each repetition of a pattern is shifted by this much.
pub const OCTAVE: i32 = 12;

/// Root used when a population plays without a configured scale.
pub const DEFAULT_BASE_PITCH: i32 = 60;

/// Errors raised when building or querying a [`Scale`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScaleError {
    /// Lattice dimension cannot produce a non-negative range length.
    #[error("lattice size must be at least 1, got {0}")]
    InvalidLatticeSize(usize),
    /// Pitch lookup outside the range.
    #[error("note index {index} out of range for scale of length {length}")]
    IndexOutOfRange { index: usize, length: usize },
}

macro_rules! scale_table {
    ($($variant:ident => $label:literal : [$($degree:literal),+ $(,)?]),+ $(,)?) => {
        /// Closed set of known scale degree patterns.
        ///
        /// Lookups by label are case-sensitive; labels keep the exact spelling
        /// of the table they were collected from.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ScaleName {
            $($variant),+
        }

        impl ScaleName {
            /// Every known scale, in table order.
            pub const ALL: &'static [ScaleName] = &[$(ScaleName::$variant),+];

            /// Label used to select this scale from configuration.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(ScaleName::$variant => $label),+
                }
            }

            /// Semitone offsets of the pattern within one repetition.
            #[must_use]
            pub const fn degrees(self) -> &'static [i32] {
                match self {
                    $(ScaleName::$variant => &[$($degree),+]),+
                }
            }

            /// Exact label lookup; `None` when the label is unknown.
            #[must_use]
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some(ScaleName::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

scale_table! {
    Aeolian => "AEOLIAN": [0, 2, 3, 5, 7, 8, 10],
    AhirBhairav => "AHIRBHAIRAV": [0, 1, 4, 5, 7, 9, 10],
    Ajam => "AJAM": [0, 4, 8, 10, 14, 18, 22],
    AtharKurd => "ATHAR KURD": [0, 2, 6, 12, 14, 16, 22],
    Augmented => "AUGMENTED": [0, 3, 4, 7, 8, 11],
    Augmented2 => "AUGMENTED 2": [0, 1, 4, 5, 8, 9],
    Bartok => "BARTOK": [0, 2, 4, 5, 7, 8, 10],
    Bastanikar => "BASTANIKAR": [0, 3, 7, 10, 13, 15, 21],
    Bayati => "BAYATI": [0, 3, 6, 10, 14, 16, 20],
    Bhairav => "BHAIRAV": [0, 1, 4, 5, 7, 8, 11],
    Chinese => "CHINESE": [0, 4, 6, 7, 11],
    Chromatic => "CHROMATIC": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    Diminished => "DIMINISHED": [0, 1, 3, 4, 6, 7, 9, 10],
    Diminished2 => "DIMINISHED 2": [0, 2, 3, 5, 6, 8, 9, 11],
    Dorian => "DORIAN": [0, 2, 3, 5, 7, 9, 10],
    Egyptian => "EGYPTIAN": [0, 2, 5, 7, 10],
    Enigmatic => "ENIGMATIC": [0, 1, 4, 6, 8, 10, 11],
    Farahfaza => "FARAHFAZA": [0, 4, 6, 10, 14, 16, 20],
    Gong => "GONG": [0, 2, 4, 7, 9],
    HarmonicMajor => "HARMONIC MAJOR": [0, 2, 4, 5, 7, 8, 11],
    HarmonicMinor => "HARMONIC MINOR": [0, 2, 3, 5, 7, 8, 11],
    HexAeolian => "HEX AEOLIAN": [0, 3, 5, 7, 8, 10],
    HexDorian => "HEX DORIAN": [0, 2, 3, 5, 7, 10],
    HexMajor6 => "HEX MAJOR 6": [0, 2, 4, 5, 7, 9],
    HexMajor7 => "HEX MAJOR 7": [0, 2, 4, 7, 9, 11],
    HexPhrygian => "HEX PHRYGIAN": [0, 1, 3, 5, 8, 10],
    HexSus => "HEX SUS": [0, 2, 5, 7, 9, 10],
    Hijaz => "HIJAZ": [0, 2, 8, 10, 14, 17, 20],
    HijazDescending => "HIJAZ DESCENDING": [0, 2, 8, 10, 14, 16, 20],
    Hijazkar => "HIJAZKAR": [0, 2, 8, 10, 14, 16, 22],
    Hindu => "HINDU": [0, 2, 4, 5, 7, 8, 10],
    Hirajoshi => "HIRAJOSHI": [0, 2, 3, 7, 8],
    HungarianMinor => "HUNGARIAN MINOR": [0, 2, 3, 6, 7, 8, 11],
    Husseini => "HUSSEINI": [0, 3, 6, 10, 14, 17, 21],
    Huzam => "HUZAM": [0, 3, 7, 9, 15, 17, 21],
    Indian => "INDIAN": [0, 4, 5, 7, 10],
    Ionian => "IONIAN": [0, 2, 4, 5, 7, 9, 11],
    Iraq => "IRAQ": [0, 3, 7, 10, 13, 17, 21],
    Iwato => "IWATO": [0, 1, 5, 6, 10],
    Jiao => "JIAO": [0, 3, 5, 8, 10],
    Jiharkah => "JIHARKAH": [0, 4, 8, 10, 14, 18, 21],
    Karjighar => "KARJIGHAR": [0, 3, 6, 10, 12, 18, 20],
    KijazKarKurd => "KIJAZ KAR KURD": [0, 2, 8, 10, 14, 16, 22],
    Kumai => "KUMAI": [0, 2, 3, 7, 9],
    Kurd => "Kurd": [0, 2, 6, 10, 14, 16, 20],
    LeadingWholeTone => "LEADING WHOLE TONE": [0, 2, 4, 6, 8, 10, 11],
    Locrian => "LOCRIAN": [0, 1, 3, 5, 6, 8, 10],
    LocrianMajor => "LOCRIAN MAJOR": [0, 2, 4, 5, 6, 8, 10],
    Lydian => "LYDIAN": [0, 2, 4, 6, 7, 9, 11],
    LydianMinor => "LYDIAN MINOR": [0, 2, 4, 6, 7, 8, 10],
    Mahur => "MAHUR": [0, 4, 7, 10, 14, 18, 22],
    Major => "MAJOR": [0, 2, 4, 5, 7, 9, 11],
    MajorPentatonic => "MAJOR PENTATONIC": [0, 2, 4, 7, 9],
    Marva => "MARVA": [0, 1, 4, 6, 7, 9, 11],
    MelodicMajor => "MELODIC MAJOR": [0, 2, 4, 5, 7, 8, 10],
    MelodicMinor => "MELODIC MINOR": [0, 2, 3, 5, 7, 9, 11],
    MelodicMinorDescending => "MELODIC MINOR DESCENDING": [0, 2, 3, 5, 7, 8, 10],
    NaturalMinor => "NATURAL MINOR": [0, 2, 3, 5, 7, 8, 10],
    MinorPentatonic => "MINOR PENTATONIC": [0, 3, 5, 7, 10],
    Mixolydian => "MIXOLYDIAN": [0, 2, 4, 5, 7, 9, 10],
    Murassah => "MURASSAH": [0, 4, 6, 10, 12, 18, 20],
    Mustar => "MUSTAR": [0, 5, 7, 11, 13, 17, 21],
    Nahawand => "NAHAWAND": [0, 4, 6, 10, 14, 16, 22],
    NahawandDescending => "NAHAWAND DESCENDING": [0, 4, 6, 10, 14, 16, 20],
    Nairuz => "NAIRUZ": [0, 4, 7, 10, 14, 17, 20],
    NawaAthar => "NAWA ATHAR": [0, 4, 6, 12, 14, 16, 22],
    NeapolitanMajor => "NEAPOLITAN MAJOR": [0, 1, 3, 5, 7, 9, 11],
    NeapolitanMinor => "NEAPOLITAN MINOR": [0, 1, 3, 5, 7, 8, 11],
    Nikriz => "NIKRIZ": [0, 4, 6, 12, 14, 18, 20],
    PartchOtonality1 => "PARTCH OTONALITY 1": [0, 8, 14, 20, 25, 34],
    PartchOtonality2 => "PARTCH OTONALITY 2": [0, 7, 13, 18, 27, 35],
    PartchOtonality3 => "PARTCH OTONALITY 3": [0, 6, 12, 21, 29, 36],
    PartchOtonality4 => "PARTCH OTONALITY 4": [0, 5, 15, 23, 30, 37],
    PartchOtonality5 => "PARTCH OTONALITY 5": [0, 10, 18, 25, 31, 38],
    PartchOtonality6 => "PARTCH OTONALITY 6": [0, 9, 16, 22, 28, 33],
    PartchUtonality1 => "PARTCH UTONALITY 1": [0, 9, 18, 23, 29, 35],
    PartchUtonality2 => "PARTCH UTONALITY 2": [0, 8, 16, 25, 30, 36],
    PartchUtonality3 => "PARTCH UTONALITY 3": [0, 7, 14, 22, 31, 37],
    PartchUtonality4 => "PARTCH UTONALITY 4": [0, 6, 13, 20, 28, 38],
    PartchUtonality5 => "PARTCH UTONALITY 5": [0, 5, 12, 18, 25, 33],
    PartchUtonality6 => "PARTCH UTONALITY 6": [0, 10, 15, 21, 27, 34],
    Pelog => "PELOG": [0, 1, 3, 7, 8],
    Phrygian => "PHRYGIAN": [0, 1, 3, 5, 7, 8, 10],
    Prometheus => "PROMETHEUs": [0, 2, 4, 6, 11],
    Purvi => "PURVI": [0, 1, 4, 6, 7, 8, 11],
    Rast => "RAST": [0, 4, 7, 10, 14, 18, 21],
    RastDescending => "RAST DESCENDING": [0, 4, 7, 10, 14, 18, 20],
    Ritusen => "RITUSEN": [0, 2, 5, 7, 9],
    RomanianMinor => "ROMANIAN MINOR": [0, 2, 3, 6, 7, 9, 10],
    Saba => "SABA": [0, 3, 6, 8, 12, 16, 20],
    Scriabin => "SCRIABIN": [0, 1, 4, 7, 9],
    Shang => "SHANG": [0, 2, 5, 7, 10],
    ShawqAfza => "Shawq afza": [0, 4, 8, 10, 14, 16, 22],
    Sikah => "SIKAH": [0, 3, 7, 11, 14, 17, 21],
    SikahDescending => "SIKAH DESCENDING": [0, 3, 7, 11, 13, 17, 21],
    Spanish => "SPANISH": [0, 1, 4, 5, 7, 8, 10],
    SuperLocrian => "SUPER LOCRIAN": [0, 1, 3, 4, 6, 8, 10],
    Suznak => "SUZNAK": [0, 4, 7, 10, 14, 16, 22],
    Todi => "TODI": [0, 1, 3, 6, 7, 8, 11],
    UshaqMashri => "USHAQ MASHRI": [0, 4, 6, 10, 14, 17, 21],
    WholeTone => "WHOLE TONE": [0, 2, 4, 6, 8, 10],
    Yakah => "YAKAH": [0, 4, 7, 10, 14, 18, 21],
    YakahDescending => "YAKAH DESCENDING": [0, 4, 7, 10, 14, 18, 20],
    Yu => "YU": [0, 3, 5, 7, 10],
    Zamzam => "ZAMZAM": [0, 2, 6, 8, 14, 16, 20],
    Zanjaran => "ZANJARAN": [0, 2, 8, 10, 14, 18, 20],
    Zhi => "ZHI": [0, 2, 5, 7, 9],
}

impl ScaleName {
    /// Resolve a configured label, falling back to [`ScaleName::Major`] when unknown.
    #[must_use]
    pub fn resolve(label: &str) -> Self {
        Self::from_label(label).unwrap_or(ScaleName::Major)
    }
}

impl Default for ScaleName {
    fn default() -> Self {
        ScaleName::Major
    }
}

impl fmt::Display for ScaleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of pitches a population on a `lattice_size` wide stage can address.
///
/// Notes are picked at `line + col`, so indices run from `0` to `2 * (size - 1) - 1`.
pub fn range_length(lattice_size: usize) -> Result<usize, ScaleError> {
    if lattice_size == 0 {
        return Err(ScaleError::InvalidLatticeSize(lattice_size));
    }
    Ok(2 * (lattice_size - 1))
}

/// Immutable pitch range derived from a degree pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    name: ScaleName,
    base_pitch: i32,
    pitches: Vec<i32>,
}

impl Scale {
    /// Build a range for a stage of `lattice_size` cells per side.
    ///
    /// Unknown labels silently use the `MAJOR` pattern.
    pub fn new(label: &str, base_pitch: i32, lattice_size: usize) -> Result<Self, ScaleError> {
        Self::from_name(ScaleName::resolve(label), base_pitch, lattice_size)
    }

    /// Build a range from an already resolved pattern.
    pub fn from_name(
        name: ScaleName,
        base_pitch: i32,
        lattice_size: usize,
    ) -> Result<Self, ScaleError> {
        let length = range_length(lattice_size)?;
        let degrees = name.degrees();
        let mut pitches = Vec::with_capacity(length + degrees.len());
        let mut shift = 0;
        while pitches.len() < length {
            pitches.extend(degrees.iter().map(|degree| base_pitch + degree + shift));
            shift += OCTAVE;
        }
        pitches.truncate(length);
        Ok(Self {
            name,
            base_pitch,
            pitches,
        })
    }

    /// `MAJOR` range rooted at middle C.
    pub fn default_for(lattice_size: usize) -> Result<Self, ScaleError> {
        Self::from_name(ScaleName::Major, DEFAULT_BASE_PITCH, lattice_size)
    }

    #[must_use]
    pub const fn name(&self) -> ScaleName {
        self.name
    }

    #[must_use]
    pub const fn base_pitch(&self) -> i32 {
        self.base_pitch
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    #[must_use]
    pub fn pitches(&self) -> &[i32] {
        &self.pitches
    }

    /// Pitch at `index`; indices past the range are an error, never clamped.
    pub fn get_note(&self, index: usize) -> Result<i32, ScaleError> {
        self.pitches
            .get(index)
            .copied()
            .ok_or(ScaleError::IndexOutOfRange {
                index,
                length: self.pitches.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_on_five_wide_stage_spills_into_next_octave() {
        let scale = Scale::new("MAJOR", 60, 5).expect("scale");
        assert_eq!(scale.len(), 8);
        assert_eq!(scale.pitches(), &[60, 62, 64, 65, 67, 69, 71, 72]);
    }

    #[test]
    fn unknown_label_falls_back_to_major() {
        let fallback = Scale::new("NONEXISTENT", 60, 5).expect("scale");
        let major = Scale::new("MAJOR", 60, 5).expect("scale");
        assert_eq!(fallback.pitches(), major.pitches());
        assert_eq!(fallback.name(), ScaleName::Major);
    }

    #[test]
    fn labels_are_case_sensitive() {
        assert_eq!(ScaleName::from_label("Kurd"), Some(ScaleName::Kurd));
        assert_eq!(ScaleName::from_label("KURD"), None);
        assert_eq!(ScaleName::resolve("ionian"), ScaleName::Major);
        assert_eq!(ScaleName::resolve("PROMETHEUs"), ScaleName::Prometheus);
    }

    #[test]
    fn every_label_round_trips() {
        assert!(ScaleName::ALL.len() >= 100);
        for name in ScaleName::ALL {
            assert_eq!(ScaleName::from_label(name.label()), Some(*name));
            assert_eq!(name.degrees()[0], 0, "{name} should start on the root");
        }
    }

    #[test]
    fn pentatonic_repeats_pattern_per_octave() {
        let scale = Scale::new("MAJOR PENTATONIC", 60, 8).expect("scale");
        assert_eq!(scale.len(), 14);
        assert_eq!(
            scale.pitches(),
            &[60, 62, 64, 67, 69, 72, 74, 76, 79, 81, 84, 86, 88, 91]
        );
    }

    #[test]
    fn get_note_rejects_out_of_range_index() {
        let scale = Scale::new("IONIAN", 43, 4).expect("scale");
        assert_eq!(scale.get_note(0), Ok(43));
        assert_eq!(scale.get_note(5), Ok(52));
        assert_eq!(
            scale.get_note(6),
            Err(ScaleError::IndexOutOfRange {
                index: 6,
                length: 6
            })
        );
    }

    #[test]
    fn single_cell_stage_yields_empty_range() {
        let scale = Scale::default_for(1).expect("scale");
        assert!(scale.is_empty());
        assert!(scale.get_note(0).is_err());
        assert_eq!(
            Scale::default_for(0),
            Err(ScaleError::InvalidLatticeSize(0))
        );
    }
}
