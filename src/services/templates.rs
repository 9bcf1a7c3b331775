use std::collections::HashMap;

use crate::error::EngineError;
use crate::services::constraint_filter::{RoleMatcher, normalize_tag};

/// Minutes charged for a role that has no entry in the duration table.
pub const DEFAULT_ROLE_MINUTES: u32 = 8;
/// Minutes charged per block of a generic (role-less) plan.
pub const GENERIC_BLOCK_MINUTES: u32 = 10;

const ROLE_MINUTES: &[(&str, u32)] = &[
    ("warmup", 5),
    ("powercompound", 12),
    ("compound", 10),
    ("accessory", 8),
    ("isolation", 6),
    ("conditioning", 8),
    ("core", 5),
];

pub fn role_minutes(role: &str) -> u32 {
    let role = normalize_tag(role);
    ROLE_MINUTES
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(_, minutes)| *minutes)
        .unwrap_or(DEFAULT_ROLE_MINUTES)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSlot {
    pub role: String,
    pub sets: u32,
    pub reps: String,
}

impl TemplateSlot {
    pub fn new(role: &str, sets: u32, reps: &str) -> Self {
        Self {
            role: role.to_string(),
            sets,
            reps: reps.to_string(),
        }
    }

    pub fn minutes(&self) -> u32 {
        role_minutes(&self.role)
    }
}

/// How the allocator spends the time budget over a templated plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationPolicy {
    /// Every slot is tried in order; one that does not fit is skipped.
    LinearSkip,
    /// First and last slots are attempted on their own; middle slots stop as
    /// soon as they would eat into the last slot's minutes.
    GuaranteedBookends,
}

/// Which catalog neighbours qualify as substitutes for a chosen exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativeMatch {
    MuscleGroup,
    MuscleAndMovement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanShape {
    Templated {
        slots: Vec<TemplateSlot>,
        policy: ReservationPolicy,
    },
    /// `max(1, minutes / GENERIC_BLOCK_MINUTES)` role-less blocks.
    Generic { sets: u32, reps: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchetypePlan {
    pub shape: PlanShape,
    pub role_matcher: RoleMatcher,
    pub alternatives: AlternativeMatch,
    pub rest_seconds: Option<u32>,
}

impl ArchetypePlan {
    pub fn templated(slots: Vec<TemplateSlot>, policy: ReservationPolicy) -> Self {
        Self {
            shape: PlanShape::Templated { slots, policy },
            role_matcher: RoleMatcher::Tolerant,
            alternatives: AlternativeMatch::MuscleGroup,
            rest_seconds: None,
        }
    }

    pub fn generic(sets: u32, reps: &str) -> Self {
        Self {
            shape: PlanShape::Generic {
                sets,
                reps: reps.to_string(),
            },
            role_matcher: RoleMatcher::Tolerant,
            alternatives: AlternativeMatch::MuscleAndMovement,
            rest_seconds: None,
        }
    }

    pub fn with_role_matcher(mut self, matcher: RoleMatcher) -> Self {
        self.role_matcher = matcher;
        self
    }

    pub fn with_alternatives(mut self, alternatives: AlternativeMatch) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn with_rest_seconds(mut self, seconds: u32) -> Self {
        self.rest_seconds = Some(seconds);
        self
    }

    fn validate(&self, archetype: &str) -> Result<(), EngineError> {
        match &self.shape {
            PlanShape::Templated { slots, .. } => {
                if slots.is_empty() {
                    return Err(EngineError::EmptyPlan(archetype.to_string()));
                }
                if let Some(slot) = slots.iter().find(|slot| slot.sets == 0) {
                    return Err(EngineError::InvalidSlot {
                        archetype: archetype.to_string(),
                        role: slot.role.clone(),
                    });
                }
                Ok(())
            }
            PlanShape::Generic { sets: 0, .. } => Err(EngineError::InvalidSlot {
                archetype: archetype.to_string(),
                role: "generic".to_string(),
            }),
            PlanShape::Generic { .. } => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    plans: HashMap<String, ArchetypePlan>,
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self {
            plans: HashMap::new(),
        }
    }

    pub fn register(&mut self, archetype: &str, plan: ArchetypePlan) -> Result<(), EngineError> {
        plan.validate(archetype)?;
        self.plans.insert(archetype.to_string(), plan);
        Ok(())
    }

    pub fn resolve(&self, archetype: &str) -> Result<&ArchetypePlan, EngineError> {
        self.plans
            .get(archetype)
            .ok_or_else(|| EngineError::UnknownArchetype(archetype.to_string()))
    }

    pub fn archetypes(&self) -> impl Iterator<Item = &str> {
        self.plans.keys().map(String::as_str)
    }

    /// The archetypes shipped with the service, validated like any other registration.
    pub fn builtin() -> Result<Self, EngineError> {
        let mut registry = Self::empty();
        for (archetype, plan) in builtin_plans() {
            registry.register(archetype, plan)?;
        }
        Ok(registry)
    }
}

fn builtin_plans() -> Vec<(&'static str, ArchetypePlan)> {
    vec![
        (
            "Titan",
            ArchetypePlan::templated(
                vec![
                    TemplateSlot::new("powercompound", 4, "3-5"),
                    TemplateSlot::new("compound", 3, "6-8"),
                    TemplateSlot::new("compound", 3, "6-8"),
                    TemplateSlot::new("accessory", 3, "8-12"),
                    TemplateSlot::new("core", 3, "30-45s"),
                ],
                ReservationPolicy::GuaranteedBookends,
            )
            .with_rest_seconds(120),
        ),
        (
            "Prime",
            ArchetypePlan::templated(
                vec![
                    TemplateSlot::new("warm-up", 1, "5 min"),
                    TemplateSlot::new("powercompound", 4, "5"),
                    TemplateSlot::new("compound", 3, "8-10"),
                    TemplateSlot::new("isolation", 3, "10-12"),
                    TemplateSlot::new("conditioning", 2, "45s"),
                    TemplateSlot::new("core", 3, "12-15"),
                ],
                ReservationPolicy::LinearSkip,
            )
            .with_rest_seconds(75),
        ),
        (
            "Sentinel",
            ArchetypePlan::templated(
                vec![
                    TemplateSlot::new("compound", 3, "8-10"),
                    TemplateSlot::new("compound", 3, "8-10"),
                    TemplateSlot::new("isolation", 3, "12-15"),
                    TemplateSlot::new("core", 2, "30s"),
                ],
                ReservationPolicy::LinearSkip,
            )
            .with_role_matcher(RoleMatcher::PrimaryOnly)
            .with_alternatives(AlternativeMatch::MuscleAndMovement),
        ),
        ("Forge", ArchetypePlan::generic(4, "8-12")),
    ]
}
