use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::exercise::ExerciseRecord;
use crate::services::templates::AlternativeMatch;

pub const MAX_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone)]
pub struct Selection<'c> {
    pub exercise: &'c ExerciseRecord,
    pub alternatives: Vec<String>,
}

/// Uniform draw from `pool` minus `already_chosen`; `None` when nothing is left.
pub fn select<'c, R>(
    pool: &[&'c ExerciseRecord],
    already_chosen: &HashSet<String>,
    rng: &mut R,
) -> Option<&'c ExerciseRecord>
where
    R: Rng + ?Sized,
{
    let remaining: Vec<&'c ExerciseRecord> = pool
        .iter()
        .copied()
        .filter(|exercise| !already_chosen.contains(&exercise.name))
        .collect();

    remaining.choose(rng).copied()
}

/// Up to `MAX_ALTERNATIVES` random names from `pool` that can stand in for `chosen`.
pub fn alternatives<R>(
    pool: &[&ExerciseRecord],
    chosen: &ExerciseRecord,
    matching: AlternativeMatch,
    rng: &mut R,
) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<&ExerciseRecord> = pool
        .iter()
        .copied()
        .filter(|alt| alt.name != chosen.name && alt.muscle_group == chosen.muscle_group)
        .filter(|alt| match matching {
            AlternativeMatch::MuscleGroup => true,
            AlternativeMatch::MuscleAndMovement => alt.movement_type == chosen.movement_type,
        })
        .collect();

    candidates
        .choose_multiple(rng, MAX_ALTERNATIVES)
        .map(|alt| alt.name.clone())
        .collect()
}

pub fn select_with_alternatives<'c, R>(
    pool: &[&'c ExerciseRecord],
    already_chosen: &HashSet<String>,
    matching: AlternativeMatch,
    rng: &mut R,
) -> Option<Selection<'c>>
where
    R: Rng + ?Sized,
{
    let exercise = select(pool, already_chosen, rng)?;
    let alternatives = alternatives(pool, exercise, matching, rng);

    Some(Selection {
        exercise,
        alternatives,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::catalog::test_support::record;

    #[test]
    fn test_select_skips_already_chosen() {
        let pool = vec![record("Bench Press").build(), record("Floor Press").build()];
        let refs: Vec<_> = pool.iter().collect();
        let chosen = HashSet::from(["Bench Press".to_string()]);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            assert_eq!(
                select(&refs, &chosen, &mut rng).map(|e| e.name.as_str()),
                Some("Floor Press")
            );
        }
    }

    #[test]
    fn test_select_empty_pool() {
        let pool = vec![record("Bench Press").build()];
        let refs: Vec<_> = pool.iter().collect();
        let chosen = HashSet::from(["Bench Press".to_string()]);
        let mut rng = StdRng::seed_from_u64(7);

        assert!(select(&refs, &chosen, &mut rng).is_none());
        assert!(select(&[], &HashSet::new(), &mut rng).is_none());
    }

    #[test]
    fn test_alternatives_share_muscle_and_are_capped() {
        let pool = vec![
            record("Bench Press").build(),
            record("Floor Press").build(),
            record("Pin Press").build(),
            record("Board Press").build(),
            record("Spoto Press").build(),
            record("Pendlay Row").muscle("Back").build(),
        ];
        let refs: Vec<_> = pool.iter().collect();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            let alts = alternatives(&refs, &pool[0], AlternativeMatch::MuscleGroup, &mut rng);

            assert_eq!(alts.len(), MAX_ALTERNATIVES);
            assert!(!alts.contains(&"Bench Press".to_string()));
            assert!(!alts.contains(&"Pendlay Row".to_string()));
            let unique: HashSet<_> = alts.iter().collect();
            assert_eq!(unique.len(), alts.len());
        }
    }

    #[test]
    fn test_alternatives_by_movement() {
        let pool = vec![
            record("Bench Press").build(),
            record("Cable Fly").movement("Isolation").build(),
            record("Dips").build(),
        ];
        let refs: Vec<_> = pool.iter().collect();
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(
            alternatives(&refs, &pool[0], AlternativeMatch::MuscleAndMovement, &mut rng),
            vec!["Dips".to_string()]
        );
        assert_eq!(
            alternatives(&refs, &pool[0], AlternativeMatch::MuscleGroup, &mut rng).len(),
            2
        );
    }

    #[test]
    fn test_select_with_alternatives() {
        let pool = vec![record("Bench Press").build(), record("Dips").build()];
        let refs: Vec<_> = pool.iter().collect();
        let mut rng = StdRng::seed_from_u64(5);

        let selection =
            select_with_alternatives(&refs, &HashSet::new(), AlternativeMatch::MuscleGroup, &mut rng)
                .unwrap();

        assert_eq!(selection.alternatives.len(), 1);
        assert_ne!(selection.alternatives[0], selection.exercise.name);
    }
}
