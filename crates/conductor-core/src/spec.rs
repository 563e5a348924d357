//! Project specification and project-type detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{OrchestratorError, Result};

/// Unique identifier for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Creates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(formatter)
    }
}

/// Closed set of supported project templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    /// Marketing sites, lead generation, product launches.
    LandingPage,
    /// Multi-tenant applications, dashboards, user management.
    SaasApp,
}

/// Keywords that indicate landing page projects.
const LANDING_PAGE_KEYWORDS: &[&str] = &[
    "landing page",
    "marketing",
    "lead generation",
    "lead capture",
    "product launch",
    "campaign",
    "promotional",
    "conversion",
    "email signup",
    "waitlist",
    "coming soon",
    "sales page",
];

/// Keywords that indicate SaaS app projects.
const SAAS_APP_KEYWORDS: &[&str] = &[
    "saas",
    "application",
    "dashboard",
    "user management",
    "authentication",
    "auth",
    "login",
    "signup",
    "multi-tenant",
    "subscription",
    "billing",
    "admin panel",
    "api",
    "database",
    "crud",
    "backend",
];

/// Score contributed by each matched keyword.
const KEYWORD_WEIGHT: f64 = 0.15;

/// Minimum score required to accept a detected type.
const CONFIDENCE_THRESHOLD: f64 = 0.6;

impl ProjectType {
    /// Parses a project-type tag from the closed set.
    ///
    /// # Errors
    /// Returns a validation error for tags outside the closed set.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "landing_page" => Ok(Self::LandingPage),
            "saas_app" => Ok(Self::SaasApp),
            other => Err(OrchestratorError::Validation(format!(
                "Unknown project type: {other}"
            ))),
        }
    }

    /// Detects the project type from a requirements description using
    /// keyword scoring, returning the type and a confidence in `0.0..=1.0`.
    ///
    /// Falls back to `SaasApp` at confidence 0.5 when neither score clears
    /// the threshold, since that is the more common case.
    pub fn detect(description: &str) -> (Self, f64) {
        let lowered = description.to_lowercase();
        let landing = Self::score(&lowered, LANDING_PAGE_KEYWORDS);
        let saas = Self::score(&lowered, SAAS_APP_KEYWORDS);

        if landing > saas && landing >= CONFIDENCE_THRESHOLD {
            (Self::LandingPage, landing)
        } else if saas > landing && saas >= CONFIDENCE_THRESHOLD {
            (Self::SaasApp, saas)
        } else {
            (Self::SaasApp, 0.5)
        }
    }

    fn score(description: &str, keywords: &[&str]) -> f64 {
        let hits = keywords
            .iter()
            .filter(|keyword| description.contains(**keyword))
            .count();
        (hits as f64 * KEYWORD_WEIGHT).min(1.0)
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LandingPage => "landing_page",
            Self::SaasApp => "saas_app",
        };
        formatter.write_str(name)
    }
}

/// Overall project priority carried in the spec constraints.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecPriority {
    /// Low priority, can be deferred.
    Low,
    /// Normal priority.
    #[default]
    Medium,
    /// High priority, should be expedited.
    High,
    /// Critical priority.
    Critical,
}

/// Deadline and priority constraints for a project.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Constraints {
    /// Optional deadline in abstract time units.
    pub deadline: Option<u64>,
    /// Overall priority of the project.
    pub priority: SpecPriority,
}

/// Declarative project description; immutable once decomposition begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Unique identifier.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Project template tag from the closed set.
    pub project_type: ProjectType,
    /// Free-form requirements payload.
    pub requirements: String,
    /// Named patterns to apply, one feature task each.
    pub patterns: Vec<String>,
    /// Deadline and priority constraints.
    pub constraints: Constraints,
}

impl ProjectSpec {
    /// Creates a spec with the given name and project type.
    pub fn new(name: impl Into<String>, project_type: ProjectType) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            project_type,
            requirements: String::new(),
            patterns: Vec::new(),
            constraints: Constraints::default(),
        }
    }

    /// Sets the requirements payload.
    #[must_use]
    pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.requirements = requirements.into();
        self
    }

    /// Sets the patterns to apply.
    #[must_use]
    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Sets the constraints record.
    #[must_use]
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_unknown_tags() {
        assert!(ProjectType::parse("landing_page").is_ok());
        assert!(ProjectType::parse("saas_app").is_ok());
        assert!(ProjectType::parse("mobile_game").is_err());
    }

    #[test]
    fn detect_landing_page() {
        let (detected, confidence) = ProjectType::detect(
            "Marketing landing page for a product launch with lead capture and email signup",
        );
        assert_eq!(detected, ProjectType::LandingPage);
        assert!(confidence >= CONFIDENCE_THRESHOLD);
    }

    #[test]
    fn detect_saas_app() {
        let (detected, confidence) = ProjectType::detect(
            "SaaS dashboard application with authentication, billing, and an admin panel backend",
        );
        assert_eq!(detected, ProjectType::SaasApp);
        assert!(confidence >= CONFIDENCE_THRESHOLD);
    }

    #[test]
    fn detect_defaults_to_saas_when_unclear() {
        let (detected, confidence) = ProjectType::detect("a website");
        assert_eq!(detected, ProjectType::SaasApp);
        assert!((confidence - 0.5).abs() < f64::EPSILON);
    }
}
