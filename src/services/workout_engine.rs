use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use crate::catalog::CatalogProvider;
use crate::error::EngineError;
use crate::history::HistoryStore;
use crate::models::exercise::ExerciseRecord;
use crate::models::output::ExerciseOutput;
use crate::models::request::{RequestContext, ReshuffleConstraints};
use crate::services::allocator::{Allocator, Relaxation};
use crate::services::constraint_filter::{self, Constraints};
use crate::services::templates::{AlternativeMatch, TemplateRegistry};
use crate::services::{output_formatter, progressive_overload, rest, selection};

const RESHUFFLE_SETS: u32 = 4;
const RESHUFFLE_REPS: &str = "8-12";

#[derive(Clone)]
pub struct WorkoutEngine {
    catalog: Arc<dyn CatalogProvider>,
    templates: Arc<TemplateRegistry>,
    history: Arc<dyn HistoryStore>,
    rng: Arc<Mutex<StdRng>>,
    default_rest_seconds: u32,
}

impl WorkoutEngine {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        templates: TemplateRegistry,
        history: Arc<dyn HistoryStore>,
        rng: StdRng,
        default_rest_seconds: u32,
    ) -> Self {
        Self {
            catalog,
            templates: Arc::new(templates),
            history,
            rng: Arc::new(Mutex::new(rng)),
            default_rest_seconds,
        }
    }

    pub fn generate_workout(
        &self,
        context: &RequestContext,
    ) -> Result<Vec<ExerciseOutput>, EngineError> {
        let archetype = context
            .archetype
            .as_deref()
            .map(str::trim)
            .filter(|archetype| !archetype.is_empty())
            .ok_or(EngineError::MissingArchetype)?;
        let plan = self.templates.resolve(archetype)?;

        debug!(
            %archetype,
            available_time = context.available_time,
            focus = %context.focus,
            equipment_count = context.equipment.len(),
            exclusion_count = context.exclusions.len(),
            last_worked_count = context.last_worked.len(),
            weekly_volume_count = context.weekly_volume.len(),
            "workout.requested"
        );

        let mut rng = self.request_rng();
        let allocation =
            Allocator::new(self.catalog.exercises(), plan, context, archetype).allocate(&mut rng);

        let suggestions = match &context.history {
            Some(history) => progressive_overload::compute_suggestions(history),
            None => self.compute_suggestions(),
        };
        let rest_seconds = rest::rest_seconds(
            context.goal.as_deref(),
            plan.rest_seconds,
            self.default_rest_seconds,
        );

        let output = output_formatter::format_workout(&allocation.fills, rest_seconds, &suggestions);

        let relaxed_count = allocation
            .fills
            .iter()
            .filter(|fill| fill.relaxation != Relaxation::Strict)
            .count();

        tracing::info!(
            %archetype,
            exercise_count = output.len(),
            relaxed_count,
            consumed_minutes = allocation.consumed_minutes,
            available_time = context.available_time,
            "workout.generated"
        );

        Ok(output)
    }

    pub fn reshuffle_exercise(
        &self,
        constraints: &ReshuffleConstraints,
    ) -> Result<ExerciseOutput, EngineError> {
        let mut query = Constraints::new(&constraints.equipment, &constraints.exclusions);
        if let Some(archetype) = constraints.archetype.as_deref() {
            query = query.archetype(archetype);
        }

        let pool: Vec<&ExerciseRecord> =
            constraint_filter::filter(self.catalog.exercises(), &query)
                .into_iter()
                .filter(|exercise| exercise.name != constraints.current_name)
                .filter(|exercise| match (&constraints.muscle_group, constraints.same_muscle) {
                    (Some(muscle), true) => exercise.muscle_group == *muscle,
                    _ => true,
                })
                .collect();

        let mut rng = self.request_rng();
        let Some(picked) = selection::select_with_alternatives(
            &pool,
            &Default::default(),
            AlternativeMatch::MuscleAndMovement,
            &mut rng,
        ) else {
            tracing::info!(
                current_name = %constraints.current_name,
                "reshuffle.no_alternatives"
            );
            return Err(EngineError::NoAlternativesFound(
                constraints.current_name.clone(),
            ));
        };

        tracing::info!(
            current_name = %constraints.current_name,
            replacement = %picked.exercise.name,
            pool_size = pool.len(),
            "reshuffle.completed"
        );

        Ok(output_formatter::format_exercise(
            picked.exercise,
            RESHUFFLE_SETS,
            RESHUFFLE_REPS,
            self.default_rest_seconds,
            picked.alternatives,
            &self.compute_suggestions(),
        ))
    }

    pub fn record_session(&self, exercise_id: &str, date: NaiveDate, weights: Vec<f64>) {
        self.history.record_session(exercise_id, date, weights);
    }

    pub fn compute_suggestions(&self) -> HashMap<String, String> {
        progressive_overload::compute_suggestions(&self.history.snapshot())
    }

    /// Each request gets its own generator so the shared lock is held only for one draw.
    fn request_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.rng.lock().next_u64())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{BTreeSet, HashSet};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::Catalog;
    use crate::catalog::test_support::record;
    use crate::error::ErrorKind;
    use crate::history::{HistorySnapshot, InMemoryHistoryStore, SessionEntry};
    use crate::models::exercise::exercise_id;
    use crate::models::request::BodyFocus;
    use crate::services::progressive_overload::PLATEAU_SUGGESTION;

    pub(crate) fn engine_with(catalog: Catalog, seed: u64) -> WorkoutEngine {
        WorkoutEngine::new(
            Arc::new(catalog),
            TemplateRegistry::builtin().unwrap(),
            Arc::new(InMemoryHistoryStore::new()),
            StdRng::seed_from_u64(seed),
            60,
        )
    }

    fn bundled_engine(seed: u64) -> WorkoutEngine {
        let catalog = Catalog::from_json_str(include_str!("../../data/exercises.json")).unwrap();
        engine_with(catalog, seed)
    }

    fn titan_context(minutes: u32, equipment: &[&str], focus: BodyFocus) -> RequestContext {
        RequestContext {
            available_time: minutes,
            archetype: Some("Titan".into()),
            equipment: equipment.iter().map(|e| e.to_string()).collect(),
            focus,
            ..RequestContext::default()
        }
    }

    fn catalog_lookup<'c>(engine: &'c WorkoutEngine, name: &str) -> &'c ExerciseRecord {
        engine
            .catalog
            .exercises()
            .iter()
            .find(|e| e.name == name)
            .unwrap()
    }

    #[test]
    fn test_titan_scenario() {
        let engine = bundled_engine(42);
        let context = titan_context(40, &["Barbell"], BodyFocus::FullBody);

        for _ in 0..25 {
            let workout = engine.generate_workout(&context).unwrap();

            assert_eq!(workout.len(), 4);
            let last = catalog_lookup(&engine, &workout[3].name);
            assert_eq!(last.role, "core");
            assert_eq!(workout[3].reps, "30-45s");
            assert!(workout.iter().all(|e| e.rest_seconds == 120));
        }
    }

    #[test]
    fn test_generated_workouts_hold_invariants() {
        let engine = bundled_engine(7);
        let archetypes = ["Titan", "Prime", "Sentinel", "Forge"];
        let foci = [BodyFocus::Upper, BodyFocus::Lower, BodyFocus::FullBody];
        let equipment = BTreeSet::from(["Barbell".to_string(), "Dumbbell".to_string()]);

        for archetype in archetypes {
            for focus in foci {
                for minutes in [0, 15, 30, 45, 60, 90] {
                    let context = RequestContext {
                        available_time: minutes,
                        archetype: Some(archetype.into()),
                        equipment: equipment.clone(),
                        focus,
                        ..RequestContext::default()
                    };

                    let workout = engine.generate_workout(&context).unwrap();

                    let names: HashSet<_> = workout.iter().map(|e| e.name.as_str()).collect();
                    assert_eq!(names.len(), workout.len(), "{archetype} repeated an exercise");

                    for exercise in &workout {
                        let record = catalog_lookup(&engine, &exercise.name);
                        assert!(record.requires_any(&equipment));
                        assert!(exercise.alternatives.len() <= 3);
                        assert!(!exercise.alternatives.contains(&exercise.name));
                        for alternative in &exercise.alternatives {
                            assert_eq!(
                                catalog_lookup(&engine, alternative).muscle_group,
                                record.muscle_group
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_missing_archetype() {
        let engine = bundled_engine(1);
        let mut context = titan_context(30, &["Barbell"], BodyFocus::FullBody);

        context.archetype = None;
        assert_eq!(
            engine.generate_workout(&context),
            Err(EngineError::MissingArchetype)
        );

        context.archetype = Some("  ".into());
        assert_eq!(
            engine.generate_workout(&context).unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_unknown_archetype() {
        let engine = bundled_engine(1);
        let mut context = titan_context(30, &["Barbell"], BodyFocus::FullBody);
        context.archetype = Some("Ghost".into());

        let error = engine.generate_workout(&context).unwrap_err();

        assert_eq!(error, EngineError::UnknownArchetype("Ghost".into()));
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_narrow_constraints_return_empty_list() {
        let engine = bundled_engine(1);
        let context = titan_context(60, &["Trampoline"], BodyFocus::FullBody);

        assert_eq!(engine.generate_workout(&context), Ok(vec![]));
    }

    #[test]
    fn test_suggestions_from_recorded_sessions() {
        let engine = bundled_engine(3);
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let id = exercise_id("Barbell Rollout");
        for _ in 0..3 {
            engine.record_session(&id, date, vec![20.0, 20.0]);
        }

        let context = titan_context(40, &["Barbell"], BodyFocus::FullBody);
        let workout = engine.generate_workout(&context).unwrap();

        // Rollout is the only barbell core exercise, so the closing slot always picks it.
        let rollout = workout.iter().find(|e| e.name == "Barbell Rollout").unwrap();
        assert_eq!(rollout.suggestion.as_deref(), Some(PLATEAU_SUGGESTION));
        assert!(
            workout
                .iter()
                .filter(|e| e.name != "Barbell Rollout")
                .all(|e| e.suggestion.is_none())
        );
        assert_eq!(engine.compute_suggestions().len(), 1);
    }

    #[test]
    fn test_injected_history_overrides_store() {
        let engine = bundled_engine(3);
        let primaries = [
            "back-squat",
            "deadlift",
            "bench-press",
            "overhead-press",
            "power-clean",
        ];
        let history: HistorySnapshot = primaries
            .into_iter()
            .map(|id| {
                let session = SessionEntry {
                    date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                    weights: vec![100.0],
                };
                (id.to_string(), vec![session.clone(), session.clone(), session])
            })
            .collect();
        let context = RequestContext {
            history: Some(history),
            ..titan_context(40, &["Barbell"], BodyFocus::FullBody)
        };

        let workout = engine.generate_workout(&context).unwrap();

        assert_eq!(workout[0].suggestion.as_deref(), Some(PLATEAU_SUGGESTION));
    }

    #[test]
    fn test_goal_overrides_archetype_rest() {
        let engine = bundled_engine(5);
        let context = RequestContext {
            goal: Some("Endurance".into()),
            ..titan_context(40, &["Barbell"], BodyFocus::FullBody)
        };

        let workout = engine.generate_workout(&context).unwrap();

        assert!(workout.iter().all(|e| e.rest_seconds == 45));
    }

    #[test]
    fn test_reshuffle_same_muscle() {
        let engine = bundled_engine(9);
        let constraints = ReshuffleConstraints {
            current_name: "Back Squat".into(),
            muscle_group: Some("Quads".into()),
            equipment: BTreeSet::from(["Barbell".to_string(), "Dumbbell".to_string()]),
            same_muscle: true,
            ..ReshuffleConstraints::default()
        };

        for _ in 0..20 {
            let replacement = engine.reshuffle_exercise(&constraints).unwrap();

            assert_ne!(replacement.name, "Back Squat");
            assert_eq!(replacement.muscle_group, "Quads");
            assert_eq!((replacement.sets, replacement.reps.as_str()), (4, "8-12"));
            assert!(!replacement.alternatives.contains(&replacement.name));
            assert!(!replacement.alternatives.contains(&"Back Squat".to_string()));
        }
    }

    #[test]
    fn test_reshuffle_any_muscle_when_same_muscle_is_off() {
        let records = vec![
            record("Back Squat").muscle("Quads").build(),
            record("Front Squat").muscle("Quads").build(),
            record("Bench Press").build(),
            record("Floor Press").build(),
            record("Barbell Fly").movement("Isolation").build(),
            record("Pendlay Row").muscle("Back").build(),
        ];
        let engine = engine_with(Catalog::new(records), 17);
        let constraints = ReshuffleConstraints {
            current_name: "Back Squat".into(),
            muscle_group: Some("Quads".into()),
            equipment: BTreeSet::from(["Barbell".to_string()]),
            same_muscle: false,
            ..ReshuffleConstraints::default()
        };

        let mut muscles = HashSet::new();
        for _ in 0..40 {
            let replacement = engine.reshuffle_exercise(&constraints).unwrap();
            assert_ne!(replacement.name, "Back Squat");
            muscles.insert(replacement.muscle_group.clone());

            for alternative in &replacement.alternatives {
                let alternative = catalog_lookup(&engine, alternative);
                assert_ne!(alternative.name, replacement.name);
                assert_eq!(alternative.muscle_group, replacement.muscle_group);
                assert_eq!(alternative.movement_type, replacement.movement_type);
            }
        }

        assert!(muscles.iter().any(|muscle| muscle != "Quads"), "{muscles:?}");
    }

    #[test]
    fn test_reshuffle_empty_equipment() {
        let engine = bundled_engine(9);
        let constraints = ReshuffleConstraints {
            current_name: "Squat".into(),
            same_muscle: true,
            ..ReshuffleConstraints::default()
        };

        let error = engine.reshuffle_exercise(&constraints).unwrap_err();

        assert_eq!(error, EngineError::NoAlternativesFound("Squat".into()));
        assert_eq!(error.kind(), ErrorKind::EmptyResult);
    }

    #[test]
    fn test_reshuffle_respects_archetype_and_exclusions() {
        let engine = bundled_engine(4);
        let constraints = ReshuffleConstraints {
            current_name: "Bench Press".into(),
            muscle_group: Some("Chest".into()),
            equipment: ["Barbell", "Dumbbell", "Bench"]
                .into_iter()
                .map(String::from)
                .collect(),
            exclusions: vec!["incline".into()],
            archetype: Some("Titan".into()),
            same_muscle: true,
        };

        assert_eq!(
            engine.reshuffle_exercise(&constraints),
            Err(EngineError::NoAlternativesFound("Bench Press".into()))
        );
    }

    #[test]
    fn test_seeded_engines_are_reproducible() {
        let context = titan_context(60, &["Barbell", "Dumbbell"], BodyFocus::FullBody);

        let first = bundled_engine(99).generate_workout(&context).unwrap();
        let second = bundled_engine(99).generate_workout(&context).unwrap();

        assert_eq!(first, second);
    }
}
