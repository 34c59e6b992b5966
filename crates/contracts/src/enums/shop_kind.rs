use serde::{Deserialize, Serialize};

/// Kind of tenant shop operating on a branch's premises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopKind {
    /// Convenience store
    Convenience,
    /// Quick-service auto shop (FIT Auto)
    QuickService,
    /// OTOP community-product kiosk
    Otop,
    /// Station forecourt (lubricants, accessories)
    Forecourt,
}

impl ShopKind {
    pub fn code(&self) -> &'static str {
        match self {
            ShopKind::Convenience => "convenience",
            ShopKind::QuickService => "quick_service",
            ShopKind::Otop => "otop",
            ShopKind::Forecourt => "forecourt",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ShopKind::Convenience => "Convenience store",
            ShopKind::QuickService => "Quick-service auto shop",
            ShopKind::Otop => "OTOP kiosk",
            ShopKind::Forecourt => "Forecourt",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "convenience" => Some(ShopKind::Convenience),
            "quick_service" => Some(ShopKind::QuickService),
            "otop" => Some(ShopKind::Otop),
            "forecourt" => Some(ShopKind::Forecourt),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShopKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_parse_back() {
        for kind in [
            ShopKind::Convenience,
            ShopKind::QuickService,
            ShopKind::Otop,
            ShopKind::Forecourt,
        ] {
            assert_eq!(ShopKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ShopKind::from_code("casino"), None);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&ShopKind::QuickService).unwrap();
        assert_eq!(json, "\"quick_service\"");
    }
}
