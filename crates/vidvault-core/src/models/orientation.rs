//! Orientation classification for probed video streams.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Coarse orientation bucket used as the storage key prefix for videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Classify stream geometry into an orientation bucket.
    ///
    /// Deliberately narrow: `Landscape` only when `width == 16 * height / 9`
    /// under integer division, `Portrait` only for the transposed check.
    /// "Close to 16:9" is not landscape; there is no tolerance band.
    pub fn classify(width: u32, height: u32) -> Self {
        let (w, h) = (width as u64, height as u64);
        if w == 16 * h / 9 {
            Orientation::Landscape
        } else if h == 16 * w / 9 {
            Orientation::Portrait
        } else {
            Orientation::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_sixteen_nine_is_landscape() {
        assert_eq!(Orientation::classify(1920, 1080), Orientation::Landscape);
        assert_eq!(Orientation::classify(1280, 720), Orientation::Landscape);
        assert_eq!(Orientation::classify(640, 360), Orientation::Landscape);
    }

    #[test]
    fn test_exact_nine_sixteen_is_portrait() {
        assert_eq!(Orientation::classify(1080, 1920), Orientation::Portrait);
        assert_eq!(Orientation::classify(720, 1280), Orientation::Portrait);
    }

    #[test]
    fn test_everything_else_is_other() {
        assert_eq!(Orientation::classify(1000, 1000), Orientation::Other);
        assert_eq!(Orientation::classify(640, 480), Orientation::Other);
        // 1921x1080 is close to 16:9 but not an exact integer-division match
        assert_eq!(Orientation::classify(1921, 1080), Orientation::Other);
    }

    #[test]
    fn test_integer_division_edge() {
        // 854x480: 16*480/9 == 853 under integer division, so not landscape
        assert_eq!(Orientation::classify(854, 480), Orientation::Other);
        assert_eq!(Orientation::classify(853, 480), Orientation::Landscape);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(Orientation::Landscape.as_str(), "landscape");
        assert_eq!(Orientation::Portrait.as_str(), "portrait");
        assert_eq!(Orientation::Other.as_str(), "other");
    }
}
