use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{CIRCLE_LAYER, HEATMAP_LAYER};

/// Which of the two visualizations is shown.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LayerMode {
    #[default]
    Heatmap,
    Circle,
}

impl LayerMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Heatmap => Self::Circle,
            Self::Circle => Self::Heatmap,
        }
    }

    /// Id of the layer this mode shows.
    #[must_use]
    pub const fn layer_id(self) -> &'static str {
        match self {
            Self::Heatmap => HEATMAP_LAYER,
            Self::Circle => CIRCLE_LAYER,
        }
    }

    /// `true` for circle mode, matching the boolean mode toggle.
    #[must_use]
    pub const fn is_circle(self) -> bool {
        matches!(self, Self::Circle)
    }
}

impl From<bool> for LayerMode {
    fn from(circle: bool) -> Self {
        if circle { Self::Circle } else { Self::Heatmap }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(LayerMode::from_str("circle").unwrap(), LayerMode::Circle);
        assert_eq!(LayerMode::from_str("Heatmap").unwrap(), LayerMode::Heatmap);
        assert!(LayerMode::from_str("hexbin").is_err());
        assert_eq!(LayerMode::Circle.to_string(), "circle");
    }

    #[test]
    fn toggles_between_the_two_modes() {
        assert_eq!(LayerMode::default(), LayerMode::Heatmap);
        assert_eq!(LayerMode::Heatmap.toggled(), LayerMode::Circle);
        assert_eq!(LayerMode::Circle.toggled().toggled(), LayerMode::Circle);
    }
}
