use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// The closed set of image kinds the dashboard accepts for analysis.
///
/// The category selects the prompt sent to the vision model; only mammograms
/// get a BI-RADS assessment, every other kind carries the "N/A" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageCategory {
    Mammogram,
    Xray,
    CtScan,
    Mri,
    Ultrasound,
}

impl ImageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mammogram => "mammogram",
            Self::Xray => "xray",
            Self::CtScan => "ct_scan",
            Self::Mri => "mri",
            Self::Ultrasound => "ultrasound",
        }
    }

    pub fn all() -> &'static [ImageCategory] {
        &[
            Self::Mammogram,
            Self::Xray,
            Self::CtScan,
            Self::Mri,
            Self::Ultrasound,
        ]
    }
}

impl std::str::FromStr for ImageCategory {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mammogram" => Ok(Self::Mammogram),
            "xray" => Ok(Self::Xray),
            "ct_scan" => Ok(Self::CtScan),
            "mri" => Ok(Self::Mri),
            "ultrasound" => Ok(Self::Ultrasound),
            _ => Err(DatabaseError::InvalidEnum {
                field: "ImageCategory".into(),
                value: s.into(),
            }),
        }
    }
}

impl std::fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
