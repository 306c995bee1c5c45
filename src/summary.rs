use crate::program::Program;
use crate::queue::{RestPlan, Step};

/// Aggregate view of one exercise within a running program.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub name: String,
    pub set_count: u32,
    pub rep_count: u32,
    pub total_seconds: u32,
    pub remaining_sets: u32,
    pub completed: bool,
    pub current: bool,
}

/// Derived figures the timer sidebar shows, recomputed on every tick and
/// position change. Pure projection of (program, queue, index).
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSummary {
    pub total_seconds: u32,
    pub remaining_seconds: u32,
    pub exercises: Vec<ExerciseSummary>,
}

/// Project the summary for the engine position `index` over `queue`.
///
/// Total time is recomputed from the program itself (same expansion
/// arithmetic as the queue builder) plus all inter-exercise rests, so it is
/// stable even while the queue is being consumed. Remaining time sums the
/// original step durations from the active step onward; it deliberately
/// ignores partial countdown progress within the active step.
pub fn project(
    program: &Program,
    rests: &RestPlan,
    queue: &[Step],
    index: usize,
) -> ProgramSummary {
    let active = queue.get(index);
    let active_exercise = active.map(|s| s.exercise_index);
    let active_set = active.and_then(|s| s.set).unwrap_or(1);

    let exercises = program
        .exercises
        .iter()
        .enumerate()
        .map(|(i, exercise)| {
            let ex = exercise.normalized(i);
            let remaining_sets = match active_exercise {
                None => ex.set_count,
                Some(a) if a < i => ex.set_count,
                Some(a) if a > i => 0,
                Some(_) => (ex.set_count + 1).saturating_sub(active_set),
            };
            ExerciseSummary {
                name: ex.name.clone(),
                set_count: ex.set_count,
                rep_count: ex.rep_count,
                total_seconds: ex.total_seconds(),
                remaining_sets,
                completed: active_exercise.is_some_and(|a| i < a),
                current: active_exercise == Some(i),
            }
        })
        .collect::<Vec<_>>();

    let mut total_seconds: u32 = exercises.iter().map(|e| e.total_seconds).sum();
    for i in 0..program.exercises.len().saturating_sub(1) {
        total_seconds += rests.duration_after(i);
    }

    let remaining_seconds = queue.iter().skip(index).map(|s| s.duration).sum();

    ProgramSummary {
        total_seconds,
        remaining_seconds,
        exercises,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ColorToken, Exercise, Move};
    use crate::queue::build_program_queue;

    fn exercise(sets: u32, reps: u32, durations: &[u32]) -> Exercise {
        let mut ex = Exercise::new("ex");
        ex.set_count = sets;
        ex.rep_count = reps;
        ex.rest_between_sets = 0;
        ex.moves = durations
            .iter()
            .map(|&d| Move {
                name: "m".into(),
                duration: d,
                color: ColorToken::Blue,
            })
            .collect();
        ex
    }

    fn program() -> (Program, RestPlan) {
        let mut program = Program::new(1, "p");
        program.exercises.push(exercise(2, 1, &[10])); // 20s of work
        program.exercises.push(exercise(3, 1, &[5])); // 15s of work
        let rests = RestPlan::for_program(&program, "30 sec", ColorToken::Blue);
        (program, rests)
    }

    #[test]
    fn total_includes_inter_exercise_rests() {
        let (program, rests) = program();
        let queue = build_program_queue(&program, &rests).unwrap();
        let summary = project(&program, &rests, &queue, 0);
        // 20 + 15 work + one 30s program rest
        assert_eq!(summary.total_seconds, 65);
        assert_eq!(summary.remaining_seconds, 65);
    }

    #[test]
    fn remaining_uses_original_durations_from_index() {
        let (program, rests) = program();
        let queue = build_program_queue(&program, &rests).unwrap();
        // queue: M10 M10 PR30 M5 M5 M5
        let summary = project(&program, &rests, &queue, 2);
        assert_eq!(summary.remaining_seconds, 30 + 15);
    }

    #[test]
    fn completion_flags_follow_active_exercise() {
        let (program, rests) = program();
        let queue = build_program_queue(&program, &rests).unwrap();
        let summary = project(&program, &rests, &queue, 3); // first move of exercise 1
        assert!(summary.exercises[0].completed);
        assert!(!summary.exercises[0].current);
        assert!(summary.exercises[1].current);
        assert!(!summary.exercises[1].completed);
    }

    #[test]
    fn remaining_sets_counts_current_set() {
        let (program, rests) = program();
        let queue = build_program_queue(&program, &rests).unwrap();

        // active: exercise 0, set 2 of 2
        let summary = project(&program, &rests, &queue, 1);
        assert_eq!(summary.exercises[0].remaining_sets, 1);
        // untouched later exercise keeps all sets
        assert_eq!(summary.exercises[1].remaining_sets, 3);

        // after moving into exercise 1, exercise 0 has none left
        let summary = project(&program, &rests, &queue, 3);
        assert_eq!(summary.exercises[0].remaining_sets, 0);
        assert_eq!(summary.exercises[1].remaining_sets, 3);
    }

    #[test]
    fn past_end_projection_is_stable() {
        let (program, rests) = program();
        let queue = build_program_queue(&program, &rests).unwrap();
        let summary = project(&program, &rests, &queue, queue.len());
        assert_eq!(summary.remaining_seconds, 0);
        // terminal position reports nothing active and nothing completed-by-
        // comparison; the caller renders the completion screen instead
        assert!(summary.exercises.iter().all(|e| !e.current));
    }
}
