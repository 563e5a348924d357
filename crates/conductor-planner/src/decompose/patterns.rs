//! Feature pattern library for mapping requested features to task templates.
//!
//! Each project type knows a small set of feature patterns matched
//! case-insensitively by name or keyword. Features that match no pattern
//! are a validation error at decomposition time.

use conductor_core::ProjectType;

/// A known feature pattern for a project type.
#[derive(Debug, Clone, Copy)]
pub struct FeaturePattern {
    /// Canonical pattern name.
    pub name: &'static str,
    /// Keywords that map a requested feature to this pattern.
    pub keywords: &'static [&'static str],
}

const LANDING_PAGE_PATTERNS: &[FeaturePattern] = &[
    FeaturePattern {
        name: "hero_section",
        keywords: &["hero", "headline", "above the fold"],
    },
    FeaturePattern {
        name: "pricing_table",
        keywords: &["pricing", "plans", "tiers"],
    },
    FeaturePattern {
        name: "contact_form",
        keywords: &["contact", "form", "email signup", "waitlist"],
    },
    FeaturePattern {
        name: "testimonials",
        keywords: &["testimonial", "social proof", "reviews"],
    },
    FeaturePattern {
        name: "faq",
        keywords: &["faq", "questions"],
    },
    FeaturePattern {
        name: "call_to_action",
        keywords: &["cta", "call to action", "signup button"],
    },
];

const SAAS_APP_PATTERNS: &[FeaturePattern] = &[
    FeaturePattern {
        name: "authentication",
        keywords: &["auth", "login", "signup", "sso", "oauth"],
    },
    FeaturePattern {
        name: "dashboard",
        keywords: &["dashboard", "overview", "home screen"],
    },
    FeaturePattern {
        name: "billing",
        keywords: &["billing", "payment", "subscription", "invoice"],
    },
    FeaturePattern {
        name: "user_management",
        keywords: &["user management", "team", "roles", "permissions"],
    },
    FeaturePattern {
        name: "notifications",
        keywords: &["notification", "alerts", "email digest"],
    },
    FeaturePattern {
        name: "analytics",
        keywords: &["analytics", "reports", "metrics", "charts"],
    },
    FeaturePattern {
        name: "settings",
        keywords: &["settings", "preferences", "profile"],
    },
    FeaturePattern {
        name: "api_integration",
        keywords: &["api", "webhook", "integration"],
    },
];

/// Maps a requested feature to a known pattern for the project type.
///
/// Matching is case-insensitive: the feature text matches a pattern when
/// it contains the pattern name (with `_` treated as a space) or any of
/// its keywords.
pub fn match_pattern(project_type: ProjectType, feature: &str) -> Option<&'static FeaturePattern> {
    let patterns = match project_type {
        ProjectType::LandingPage => LANDING_PAGE_PATTERNS,
        ProjectType::SaasApp => SAAS_APP_PATTERNS,
    };
    let lowered = feature.to_lowercase();

    patterns.iter().find(|pattern| {
        lowered.contains(&pattern.name.replace('_', " "))
            || lowered.contains(pattern.name)
            || pattern
                .keywords
                .iter()
                .any(|keyword| lowered.contains(keyword))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_by_name_and_keyword() {
        let by_name = match_pattern(ProjectType::SaasApp, "Dashboard");
        assert_eq!(by_name.map(|pattern| pattern.name), Some("dashboard"));

        let by_keyword = match_pattern(ProjectType::SaasApp, "OAuth login flow");
        assert_eq!(by_keyword.map(|pattern| pattern.name), Some("authentication"));

        let with_underscore = match_pattern(ProjectType::LandingPage, "pricing table section");
        assert_eq!(
            with_underscore.map(|pattern| pattern.name),
            Some("pricing_table")
        );
    }

    #[test]
    fn unknown_features_do_not_match() {
        assert!(match_pattern(ProjectType::LandingPage, "blockchain wallet").is_none());
        assert!(match_pattern(ProjectType::SaasApp, "3d rendering").is_none());
    }

    #[test]
    fn pattern_sets_differ_by_project_type() {
        assert!(match_pattern(ProjectType::LandingPage, "hero section").is_some());
        assert!(match_pattern(ProjectType::SaasApp, "hero section").is_none());
    }
}
