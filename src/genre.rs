//! The fixed genre table.
//!
//! Every accepted record belongs to exactly one of eight genres. Each genre
//! has a three-letter code (as it appears in the genre column of a record)
//! and a dataset name used to derive its intermediate text sink and its
//! binary sink.
//!
//! | Code | Dataset |
//! |------|---------|
//! | `CCB` | `Cartoons_Comics_Books.csv` |
//! | `HCB` | `Hobbies_Collectibles_Books.csv` |
//! | `MTV` | `Movies_TV.csv` |
//! | `MRB` | `Music_Radio_Books.csv` |
//! | `NEB` | `Nostalgia_Eclectic_Books.csv` |
//! | `OTR` | `Old_Time_Radio.csv` |
//! | `SSM` | `Sports_Sports_Memorabilia.csv` |
//! | `TPA` | `Trains_Planes_Automobiles.csv` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShelverError;

/// One of the eight fixed genre buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    /// `CCB` - Cartoons & comics
    CartoonsComics,
    /// `HCB` - Hobbies & collectibles
    HobbiesCollectibles,
    /// `MTV` - Movies & TV
    MoviesTv,
    /// `MRB` - Music & radio
    MusicRadio,
    /// `NEB` - Nostalgia & eclectic
    NostalgiaEclectic,
    /// `OTR` - Old-time radio
    OldTimeRadio,
    /// `SSM` - Sports & sports memorabilia
    SportsMemorabilia,
    /// `TPA` - Trains, planes & automobiles
    TrainsPlanesAutomobiles,
}

impl Genre {
    /// All genres in table order. This is also the order of the
    /// file-selection menu.
    pub const ALL: [Genre; 8] = [
        Genre::CartoonsComics,
        Genre::HobbiesCollectibles,
        Genre::MoviesTv,
        Genre::MusicRadio,
        Genre::NostalgiaEclectic,
        Genre::OldTimeRadio,
        Genre::SportsMemorabilia,
        Genre::TrainsPlanesAutomobiles,
    ];

    /// The three-letter code found in the genre column.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Genre::CartoonsComics => "CCB",
            Genre::HobbiesCollectibles => "HCB",
            Genre::MoviesTv => "MTV",
            Genre::MusicRadio => "MRB",
            Genre::NostalgiaEclectic => "NEB",
            Genre::OldTimeRadio => "OTR",
            Genre::SportsMemorabilia => "SSM",
            Genre::TrainsPlanesAutomobiles => "TPA",
        }
    }

    /// The dataset name the genre's sinks are derived from.
    #[must_use]
    pub const fn dataset(self) -> &'static str {
        match self {
            Genre::CartoonsComics => "Cartoons_Comics_Books.csv",
            Genre::HobbiesCollectibles => "Hobbies_Collectibles_Books.csv",
            Genre::MoviesTv => "Movies_TV.csv",
            Genre::MusicRadio => "Music_Radio_Books.csv",
            Genre::NostalgiaEclectic => "Nostalgia_Eclectic_Books.csv",
            Genre::OldTimeRadio => "Old_Time_Radio.csv",
            Genre::SportsMemorabilia => "Sports_Sports_Memorabilia.csv",
            Genre::TrainsPlanesAutomobiles => "Trains_Planes_Automobiles.csv",
        }
    }

    /// File name of the intermediate text sink (`<dataset>.txt`).
    #[must_use]
    pub fn text_file_name(self) -> String {
        format!("{}.txt", self.dataset())
    }

    /// File name of the binary sink (`<dataset>.ser`).
    #[must_use]
    pub fn binary_file_name(self) -> String {
        format!("{}.ser", self.dataset())
    }

    /// Look a genre up by its exact, case-sensitive code.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelver::Genre;
    ///
    /// assert_eq!(Genre::from_code("SSM"), Some(Genre::SportsMemorabilia));
    /// assert_eq!(Genre::from_code("ssm"), None);
    /// ```
    #[must_use]
    pub fn from_code(code: &str) -> Option<Genre> {
        Genre::ALL.into_iter().find(|genre| genre.code() == code)
    }

    /// Zero-based position in [`Genre::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Genre {
    type Err = ShelverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::from_code(s).ok_or_else(|| ShelverError::UnknownGenre(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_lookup() {
        for genre in Genre::ALL {
            assert_eq!(Genre::from_code(genre.code()), Some(genre));
            assert_eq!(genre.code().parse::<Genre>().unwrap(), genre);
        }
    }

    #[test]
    fn test_index_matches_table_order() {
        for (i, genre) in Genre::ALL.iter().enumerate() {
            assert_eq!(genre.index(), i);
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(Genre::from_code("XYZ"), None);
        assert_eq!(Genre::from_code(""), None);
        assert!(matches!(
            "ABC".parse::<Genre>(),
            Err(ShelverError::UnknownGenre(code)) if code == "ABC"
        ));
    }

    #[test]
    fn test_sink_file_names() {
        assert_eq!(
            Genre::MoviesTv.text_file_name(),
            "Movies_TV.csv.txt"
        );
        assert_eq!(
            Genre::OldTimeRadio.binary_file_name(),
            "Old_Time_Radio.csv.ser"
        );
    }
}
