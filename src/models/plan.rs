use serde::Serialize;

/// A subscription tier on the pricing page. Prices are display strings, not amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub title: &'static str,
    pub price: &'static str,
    pub old_price: &'static str,
    pub modules: &'static str,
    pub videos: &'static str,
    pub popular: bool,
}

pub const PLANS: [Plan; 4] = [
    Plan {
        title: "Beginners",
        price: "€249",
        old_price: "€329",
        modules: "up to 3 Modules",
        videos: "44 Videos",
        popular: false,
    },
    Plan {
        title: "Intermediate",
        price: "€499",
        old_price: "€700",
        modules: "up to 6 Modules",
        videos: "72 Videos",
        popular: false,
    },
    Plan {
        title: "Advanced",
        price: "€999",
        old_price: "€1500",
        modules: "up to 9 Modules",
        videos: "123 Videos",
        popular: true,
    },
    Plan {
        title: "Premium",
        price: "€2499",
        old_price: "€4000",
        modules: "up to 15 Modules",
        videos: "123 Videos",
        popular: false,
    },
];

/// Shared feature list; `{modules}` and `{videos}` are filled in per plan.
pub const FEATURES: [&str; 20] = [
    "Trading Essentials Course",
    "Technical Trading Course",
    "Strategic Trading Course",
    "eBooks",
    "3 High-Probability Trading Setups",
    "Economic Calendar",
    "Digital Currency Calendar",
    "Glossary",
    "Daily Market News",
    "Daily Market Research",
    "Trading Signals",
    "Market Scanners",
    "Currency Strength Meter",
    "Market Highlights TV",
    "Trend Analysis",
    "Access to live session with a dedicated trainer - {modules}",
    "{videos}",
    "Knowledge Checks",
    "Assignments",
    "Lifetime Access",
];

impl Plan {
    pub fn features(&self) -> Vec<String> {
        FEATURES
            .iter()
            .map(|f| f.replace("{modules}", self.modules).replace("{videos}", self.videos))
            .collect()
    }
}

pub fn find_plan(title: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|p| p.title == title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        assert_eq!(PLANS.len(), 4);
        assert_eq!(PLANS.iter().filter(|p| p.popular).count(), 1);
        assert_eq!(find_plan("Advanced").map(|p| p.price), Some("€999"));
        assert!(find_plan("advanced").is_none());
        assert!(find_plan("Enterprise").is_none());
    }

    #[test]
    fn test_feature_tokens_are_substituted() {
        let plan = find_plan("Beginners").unwrap();
        let features = plan.features();

        assert_eq!(features.len(), FEATURES.len());
        assert!(features.contains(
            &"Access to live session with a dedicated trainer - up to 3 Modules".to_string()
        ));
        assert!(features.contains(&"44 Videos".to_string()));
        assert!(features.iter().all(|f| !f.contains('{')));
    }
}
