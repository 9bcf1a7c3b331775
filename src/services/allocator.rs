use std::collections::HashSet;

use rand::Rng;

use crate::models::exercise::ExerciseRecord;
use crate::models::request::RequestContext;
use crate::services::constraint_filter::{self, Constraints};
use crate::services::selection::{self, Selection};
use crate::services::templates::{
    ArchetypePlan, GENERIC_BLOCK_MINUTES, PlanShape, ReservationPolicy, TemplateSlot,
};

/// Which step of the relaxation cascade produced a slot's candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relaxation {
    Strict,
    FocusRelaxed,
    RoleDropped,
}

#[derive(Debug, Clone)]
pub struct SlotFill<'c> {
    pub exercise: &'c ExerciseRecord,
    pub alternatives: Vec<String>,
    pub sets: u32,
    pub reps: String,
    pub relaxation: Relaxation,
}

#[derive(Debug, Clone, Default)]
pub struct Allocation<'c> {
    pub fills: Vec<SlotFill<'c>>,
    pub consumed_minutes: u32,
}

struct SelectionState<'c> {
    budget: u32,
    consumed: u32,
    chosen: HashSet<String>,
    fills: Vec<SlotFill<'c>>,
    /// Last remaining candidate of the closing slot; role-dropped fills may not take it.
    held_for_closing: Option<&'c str>,
}

impl SelectionState<'_> {
    fn fits(&self, minutes: u32) -> bool {
        self.consumed.saturating_add(minutes) <= self.budget
    }
}

/// Walks an archetype plan against a time budget, filling one slot at a time.
pub struct Allocator<'a, 'c> {
    catalog: &'c [ExerciseRecord],
    plan: &'a ArchetypePlan,
    context: &'a RequestContext,
    archetype: &'a str,
}

impl<'a, 'c> Allocator<'a, 'c> {
    pub fn new(
        catalog: &'c [ExerciseRecord],
        plan: &'a ArchetypePlan,
        context: &'a RequestContext,
        archetype: &'a str,
    ) -> Self {
        Self {
            catalog,
            plan,
            context,
            archetype,
        }
    }

    pub fn allocate<R: Rng + ?Sized>(&self, rng: &mut R) -> Allocation<'c> {
        let mut state = SelectionState {
            budget: self.context.available_time,
            consumed: 0,
            chosen: HashSet::new(),
            fills: Vec::new(),
            held_for_closing: None,
        };

        match &self.plan.shape {
            PlanShape::Templated {
                slots,
                policy: ReservationPolicy::LinearSkip,
            } => self.linear_skip(slots, &mut state, rng),
            PlanShape::Templated {
                slots,
                policy: ReservationPolicy::GuaranteedBookends,
            } => self.guaranteed_bookends(slots, &mut state, rng),
            PlanShape::Generic { sets, reps } => self.generic_blocks(*sets, reps, &mut state, rng),
        }

        Allocation {
            fills: state.fills,
            consumed_minutes: state.consumed,
        }
    }

    fn linear_skip<R: Rng + ?Sized>(
        &self,
        slots: &[TemplateSlot],
        state: &mut SelectionState<'c>,
        rng: &mut R,
    ) {
        for (index, slot) in slots.iter().enumerate() {
            if !state.fits(slot.minutes()) {
                self.warn_over_budget(index, slot, state);
                continue;
            }
            self.fill_slot(index, slot, state, rng);
        }
    }

    fn guaranteed_bookends<R: Rng + ?Sized>(
        &self,
        slots: &[TemplateSlot],
        state: &mut SelectionState<'c>,
        rng: &mut R,
    ) {
        let Some((primary, rest)) = slots.split_first() else {
            return;
        };
        let (middle, closing) = match rest.split_last() {
            Some((closing, middle)) => (middle, Some(closing)),
            None => (rest, None),
        };
        let reserved = closing.map_or(0, TemplateSlot::minutes);

        if state.fits(primary.minutes()) {
            self.fill_slot(0, primary, state, rng);
        } else {
            self.warn_over_budget(0, primary, state);
        }

        for (offset, slot) in middle.iter().enumerate() {
            if !state.fits(slot.minutes().saturating_add(reserved)) {
                tracing::debug!(
                    archetype = %self.archetype,
                    slot_index = offset + 1,
                    consumed = state.consumed,
                    reserved,
                    "allocator.middle_stopped"
                );
                break;
            }
            state.held_for_closing =
                closing.and_then(|closing| self.last_candidate_for(closing, &state.chosen));
            self.fill_slot(offset + 1, slot, state, rng);
        }
        state.held_for_closing = None;

        if let Some(closing) = closing {
            let index = slots.len() - 1;
            if state.fits(closing.minutes()) {
                self.fill_slot(index, closing, state, rng);
            } else {
                self.warn_over_budget(index, closing, state);
            }
        }
    }

    fn generic_blocks<R: Rng + ?Sized>(
        &self,
        sets: u32,
        reps: &str,
        state: &mut SelectionState<'c>,
        rng: &mut R,
    ) {
        let blocks = (state.budget / GENERIC_BLOCK_MINUTES).max(1);
        let block = TemplateSlot {
            role: String::new(),
            sets,
            reps: reps.to_string(),
        };

        for index in 0..blocks as usize {
            // Short requests still get one block; it is charged only what is left.
            let minutes = GENERIC_BLOCK_MINUTES.min(state.budget.saturating_sub(state.consumed));
            if !self.fill(index, &block, None, minutes, state, rng) {
                break;
            }
        }
    }

    fn fill_slot<R: Rng + ?Sized>(
        &self,
        index: usize,
        slot: &TemplateSlot,
        state: &mut SelectionState<'c>,
        rng: &mut R,
    ) -> bool {
        self.fill(index, slot, Some(&slot.role), slot.minutes(), state, rng)
    }

    fn fill<R: Rng + ?Sized>(
        &self,
        index: usize,
        slot: &TemplateSlot,
        role: Option<&str>,
        minutes: u32,
        state: &mut SelectionState<'c>,
        rng: &mut R,
    ) -> bool {
        let Some((relaxation, pool)) =
            self.candidate_pool(role, &state.chosen, state.held_for_closing)
        else {
            tracing::warn!(
                archetype = %self.archetype,
                slot_index = index,
                role = role.unwrap_or("generic"),
                "slot.unfilled"
            );
            return false;
        };

        let Some(Selection {
            exercise,
            alternatives,
        }) = selection::select_with_alternatives(
            &pool,
            &state.chosen,
            self.plan.alternatives,
            rng,
        )
        else {
            return false;
        };

        tracing::debug!(
            archetype = %self.archetype,
            slot_index = index,
            exercise = %exercise.name,
            ?relaxation,
            minutes,
            "slot.filled"
        );

        state.chosen.insert(exercise.name.clone());
        state.consumed = state.consumed.saturating_add(minutes);
        state.fills.push(SlotFill {
            exercise,
            alternatives,
            sets: slot.sets,
            reps: slot.reps.clone(),
            relaxation,
        });
        true
    }

    /// Strict, then without focus, then without role. Already-chosen names never qualify,
    /// and `held` never qualifies once the role is dropped.
    fn candidate_pool(
        &self,
        role: Option<&str>,
        chosen: &HashSet<String>,
        held: Option<&str>,
    ) -> Option<(Relaxation, Vec<&'c ExerciseRecord>)> {
        let mut strict = Constraints::new(&self.context.equipment, &self.context.exclusions)
            .archetype(self.archetype)
            .focus(self.context.focus);
        if let Some(role) = role {
            strict = strict.role(role, self.plan.role_matcher);
        }

        let mut cascade = vec![
            (Relaxation::Strict, strict.clone()),
            (Relaxation::FocusRelaxed, strict.without_focus()),
        ];
        if role.is_some() {
            cascade.push((Relaxation::RoleDropped, strict.without_focus().without_role()));
        }

        cascade.into_iter().find_map(|(relaxation, constraints)| {
            let pool: Vec<&'c ExerciseRecord> = constraint_filter::filter(self.catalog, &constraints)
                .into_iter()
                .filter(|exercise| !chosen.contains(&exercise.name))
                .filter(|exercise| {
                    relaxation != Relaxation::RoleDropped || held != Some(exercise.name.as_str())
                })
                .collect();
            (!pool.is_empty()).then_some((relaxation, pool))
        })
    }

    /// The closing slot's only unchosen candidate under its focus-relaxed query, if it has
    /// exactly one.
    fn last_candidate_for(
        &self,
        closing: &TemplateSlot,
        chosen: &HashSet<String>,
    ) -> Option<&'c str> {
        let constraints = Constraints::new(&self.context.equipment, &self.context.exclusions)
            .archetype(self.archetype)
            .role(&closing.role, self.plan.role_matcher);
        let mut remaining = constraint_filter::filter(self.catalog, &constraints)
            .into_iter()
            .filter(|exercise| !chosen.contains(&exercise.name));

        match (remaining.next(), remaining.next()) {
            (Some(only), None) => Some(only.name.as_str()),
            _ => None,
        }
    }

    fn warn_over_budget(&self, index: usize, slot: &TemplateSlot, state: &SelectionState<'_>) {
        tracing::warn!(
            archetype = %self.archetype,
            slot_index = index,
            role = %slot.role,
            minutes = slot.minutes(),
            consumed = state.consumed,
            budget = state.budget,
            "slot.skipped"
        );
    }
}
