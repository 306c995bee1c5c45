use std::collections::BTreeMap;
use std::fmt;

use crate::duration::parse_loose;
use crate::program::{ColorToken, Exercise, Program};

/// Discriminant of a queue step. Exhaustively matched by the renderer and
/// the engine's sound dispatch so a new variant cannot be silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum StepKind {
    #[strum(serialize = "Move")]
    ExerciseMove,
    #[strum(serialize = "Move Rest")]
    ExerciseRest,
    #[strum(serialize = "Rep Rest")]
    RepRest,
    #[strum(serialize = "Set Rest")]
    SetRest,
    #[strum(serialize = "Program Rest")]
    ProgramRest,
}

impl StepKind {
    pub fn is_rest(self) -> bool {
        !matches!(self, StepKind::ExerciseMove)
    }
}

/// One flattened, ordered, timed unit in the execution queue.
///
/// Steps are generated fresh on every start/restart and never mutated while
/// a run is active; only the engine's index and live countdown change.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub kind: StepKind,
    pub exercise_index: usize,
    pub exercise_name: String,
    pub move_name: Option<String>,
    pub duration: u32,
    /// Unset on `ProgramRest` steps, which sit between exercises and belong
    /// to no set. Readers treat unset as 1.
    pub set: Option<u32>,
    pub rep: Option<u32>,
    pub mv: Option<u32>,
    pub color: ColorToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    Empty,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Empty => write!(f, "no runnable steps; check the exercise settings"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Resolves the rest inserted between consecutive exercises of a program.
///
/// A sparse per-exercise override wins; otherwise the free-text default
/// field is interpreted with the loose duration form (fallback 60 s).
#[derive(Debug, Clone)]
pub struct RestPlan {
    pub default_text: String,
    pub custom: BTreeMap<usize, u32>,
    pub color: ColorToken,
}

impl RestPlan {
    pub fn new(default_text: impl Into<String>, color: ColorToken) -> Self {
        Self {
            default_text: default_text.into(),
            custom: BTreeMap::new(),
            color,
        }
    }

    pub fn for_program(program: &Program, default_text: impl Into<String>, color: ColorToken) -> Self {
        Self {
            default_text: default_text.into(),
            custom: program.custom_rest_durations.clone(),
            color,
        }
    }

    /// Rest duration after exercise `index`, in seconds.
    pub fn duration_after(&self, index: usize) -> u32 {
        match self.custom.get(&index) {
            Some(&seconds) => seconds,
            None => parse_loose(&self.default_text),
        }
    }
}

/// Expand a single exercise into its ordered step queue.
pub fn build_exercise_queue(exercise: &Exercise) -> Result<Vec<Step>, QueueError> {
    let mut queue = Vec::new();
    push_exercise_steps(&mut queue, exercise, 0);
    if queue.is_empty() {
        return Err(QueueError::Empty);
    }
    Ok(queue)
}

/// Expand a whole program, interleaving inter-exercise rests from `rests`.
///
/// A rest is emitted only between two runnable stretches: an exercise that
/// contributes no steps neither earns a rest nor interrupts the one pending
/// from the previous contributing exercise, and a rest is never the last
/// step of the queue.
pub fn build_program_queue(program: &Program, rests: &RestPlan) -> Result<Vec<Step>, QueueError> {
    let mut queue = Vec::new();
    let mut pending_rest: Option<Step> = None;

    for (index, exercise) in program.exercises.iter().enumerate() {
        let mut steps = Vec::new();
        push_exercise_steps(&mut steps, exercise, index);
        if steps.is_empty() {
            continue;
        }

        if let Some(rest) = pending_rest.take() {
            queue.push(rest);
        }
        queue.append(&mut steps);

        let is_last = index + 1 == program.exercises.len();
        if !is_last {
            let rest = rests.duration_after(index);
            if rest > 0 {
                pending_rest = Some(Step {
                    kind: StepKind::ProgramRest,
                    exercise_index: index,
                    exercise_name: exercise.normalized(index).name,
                    move_name: None,
                    duration: rest,
                    set: None,
                    rep: None,
                    mv: None,
                    color: rests.color,
                });
            }
        }
    }

    if queue.is_empty() {
        return Err(QueueError::Empty);
    }
    Ok(queue)
}

fn push_exercise_steps(queue: &mut Vec<Step>, exercise: &Exercise, exercise_index: usize) {
    let ex = exercise.normalized(exercise_index);
    // an exercise without moves contributes nothing, rests included
    if ex.moves.is_empty() {
        return;
    }
    let move_rest_enabled = ex.rest_between_moves_enabled && ex.rest_between_moves > 0;

    for set in 1..=ex.set_count {
        for rep in 1..=ex.rep_count {
            for (move_index, mv) in ex.moves.iter().enumerate() {
                queue.push(Step {
                    kind: StepKind::ExerciseMove,
                    exercise_index,
                    exercise_name: ex.name.clone(),
                    move_name: Some(mv.name.clone()),
                    duration: mv.duration,
                    set: Some(set),
                    rep: Some(rep),
                    mv: Some(move_index as u32 + 1),
                    color: mv.color,
                });

                if move_rest_enabled && move_index + 1 < ex.moves.len() {
                    queue.push(Step {
                        kind: StepKind::ExerciseRest,
                        exercise_index,
                        exercise_name: ex.name.clone(),
                        move_name: None,
                        duration: ex.rest_between_moves,
                        set: Some(set),
                        rep: Some(rep),
                        mv: Some(move_index as u32 + 1),
                        color: ex.rest_color,
                    });
                }
            }

            if move_rest_enabled && rep < ex.rep_count {
                queue.push(Step {
                    kind: StepKind::RepRest,
                    exercise_index,
                    exercise_name: ex.name.clone(),
                    move_name: None,
                    duration: ex.rest_between_moves,
                    set: Some(set),
                    rep: Some(rep),
                    mv: None,
                    color: ex.rest_color,
                });
            }
        }

        if ex.rest_between_sets > 0 && set < ex.set_count {
            queue.push(Step {
                kind: StepKind::SetRest,
                exercise_index,
                exercise_name: ex.name.clone(),
                move_name: None,
                duration: ex.rest_between_sets,
                set: Some(set),
                rep: None,
                mv: None,
                color: ex.set_rest_color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Move;
    use assert_matches::assert_matches;

    fn exercise(sets: u32, reps: u32, durations: &[u32]) -> Exercise {
        let mut ex = Exercise::new("test");
        ex.set_count = sets;
        ex.rep_count = reps;
        ex.rest_between_sets = 0;
        ex.moves = durations
            .iter()
            .enumerate()
            .map(|(i, &d)| Move {
                name: format!("{}. Move", i + 1),
                duration: d,
                color: ColorToken::Blue,
            })
            .collect();
        ex
    }

    #[test]
    fn rests_disabled_yields_only_moves() {
        let ex = exercise(3, 4, &[5, 7]);
        let queue = build_exercise_queue(&ex).unwrap();
        assert_eq!(queue.len(), 3 * 4 * 2);
        assert!(queue.iter().all(|s| s.kind == StepKind::ExerciseMove));
    }

    #[test]
    fn move_and_rep_rest_counts() {
        let mut ex = exercise(2, 3, &[5, 7, 9]);
        ex.rest_between_moves_enabled = true;
        ex.rest_between_moves = 4;
        let queue = build_exercise_queue(&ex).unwrap();

        let move_rests = queue.iter().filter(|s| s.kind == StepKind::ExerciseRest).count();
        let rep_rests = queue.iter().filter(|s| s.kind == StepKind::RepRest).count();
        // S*R*(|M|-1) move rests, S*(R-1) rep rests
        assert_eq!(move_rests, 2 * 3 * 2);
        assert_eq!(rep_rests, 2 * 2);
    }

    #[test]
    fn no_rep_rest_for_single_rep() {
        let mut ex = exercise(3, 1, &[5, 7]);
        ex.rest_between_moves_enabled = true;
        ex.rest_between_moves = 4;
        let queue = build_exercise_queue(&ex).unwrap();
        assert_eq!(queue.iter().filter(|s| s.kind == StepKind::RepRest).count(), 0);
    }

    #[test]
    fn set_rest_count_is_sets_minus_one() {
        let mut ex = exercise(4, 2, &[5]);
        ex.rest_between_sets = 15;
        let queue = build_exercise_queue(&ex).unwrap();
        let set_rests: Vec<_> = queue.iter().filter(|s| s.kind == StepKind::SetRest).collect();
        assert_eq!(set_rests.len(), 3);
        assert!(set_rests.iter().all(|s| s.duration == 15));
    }

    #[test]
    fn disabled_flag_suppresses_move_rests_even_with_duration() {
        let mut ex = exercise(1, 2, &[5, 5]);
        ex.rest_between_moves_enabled = false;
        ex.rest_between_moves = 10;
        let queue = build_exercise_queue(&ex).unwrap();
        assert!(queue.iter().all(|s| s.kind == StepKind::ExerciseMove));
    }

    #[test]
    fn concrete_two_set_scenario() {
        let mut ex = exercise(2, 1, &[3, 5]);
        ex.rest_between_sets = 10;
        let queue = build_exercise_queue(&ex).unwrap();

        let kinds: Vec<StepKind> = queue.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::ExerciseMove,
                StepKind::ExerciseMove,
                StepKind::SetRest,
                StepKind::ExerciseMove,
                StepKind::ExerciseMove,
            ]
        );
        let total: u32 = queue.iter().map(|s| s.duration).sum();
        assert_eq!(total, 26);
    }

    #[test]
    fn program_rest_placement() {
        let mut program = Program::new(1, "full body");
        program.exercises.push(exercise(1, 1, &[5]));
        program.exercises.push(exercise(1, 1, &[5]));
        program.exercises.push(exercise(1, 1, &[5]));

        let rests = RestPlan::new("30 sec", ColorToken::Blue);
        let queue = build_program_queue(&program, &rests).unwrap();

        let kinds: Vec<StepKind> = queue.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::ExerciseMove,
                StepKind::ProgramRest,
                StepKind::ExerciseMove,
                StepKind::ProgramRest,
                StepKind::ExerciseMove,
            ]
        );
        // never after the last exercise
        assert_eq!(queue.last().unwrap().kind, StepKind::ExerciseMove);
    }

    #[test]
    fn custom_rest_overrides_default() {
        let mut program = Program::new(1, "mix");
        program.exercises.push(exercise(1, 1, &[5]));
        program.exercises.push(exercise(1, 1, &[5]));
        program.custom_rest_durations.insert(0, 90);

        let rests = RestPlan::for_program(&program, "30 sec", ColorToken::Pink);
        let queue = build_program_queue(&program, &rests).unwrap();
        let program_rest = queue.iter().find(|s| s.kind == StepKind::ProgramRest).unwrap();
        assert_eq!(program_rest.duration, 90);
        assert_eq!(program_rest.color, ColorToken::Pink);
    }

    #[test]
    fn zero_custom_rest_is_omitted() {
        let mut program = Program::new(1, "fast");
        program.exercises.push(exercise(1, 1, &[5]));
        program.exercises.push(exercise(1, 1, &[5]));
        program.custom_rest_durations.insert(0, 0);

        let rests = RestPlan::for_program(&program, "1 minute", ColorToken::Blue);
        let queue = build_program_queue(&program, &rests).unwrap();
        assert!(queue.iter().all(|s| s.kind != StepKind::ProgramRest));
    }

    #[test]
    fn program_rest_belongs_to_no_set() {
        let mut program = Program::new(1, "pair");
        program.exercises.push(exercise(2, 1, &[5]));
        program.exercises.push(exercise(1, 1, &[5]));

        let rests = RestPlan::new("30 sec", ColorToken::Blue);
        let queue = build_program_queue(&program, &rests).unwrap();
        let rest = queue.iter().find(|s| s.kind == StepKind::ProgramRest).unwrap();
        assert_eq!(rest.set, None);
        assert_eq!(rest.rep, None);
        assert_eq!(rest.mv, None);
    }

    #[test]
    fn no_dangling_rest_before_trailing_empty_exercise() {
        let mut ghost = Exercise::new("ghost");
        ghost.moves.clear();
        ghost.move_count = 0;

        let mut program = Program::new(1, "tail");
        program.exercises.push(exercise(1, 1, &[5]));
        program.exercises.push(ghost);

        let rests = RestPlan::new("30 sec", ColorToken::Blue);
        let queue = build_program_queue(&program, &rests).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.last().unwrap().kind, StepKind::ExerciseMove);
    }

    #[test]
    fn empty_exercise_in_the_middle_keeps_one_rest() {
        let mut ghost = Exercise::new("ghost");
        ghost.moves.clear();
        ghost.move_count = 0;

        let mut program = Program::new(1, "gap");
        program.exercises.push(exercise(1, 1, &[5]));
        program.exercises.push(ghost);
        program.exercises.push(exercise(1, 1, &[5]));

        let rests = RestPlan::new("30 sec", ColorToken::Blue);
        let queue = build_program_queue(&program, &rests).unwrap();
        let kinds: Vec<StepKind> = queue.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StepKind::ExerciseMove, StepKind::ProgramRest, StepKind::ExerciseMove]
        );
    }

    #[test]
    fn empty_program_is_rejected() {
        let program = Program::new(1, "empty");
        let rests = RestPlan::new("", ColorToken::Blue);
        assert_matches!(build_program_queue(&program, &rests), Err(QueueError::Empty));
    }

    #[test]
    fn exercise_without_move_details_runs_via_defaults() {
        let mut ex = Exercise::new("bare");
        ex.moves.clear();
        ex.set_count = 1;
        ex.rep_count = 1;
        ex.rest_between_sets = 0;
        let queue = build_exercise_queue(&ex).unwrap();
        // a single synthetic 3-second move is substituted
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].duration, 3);
    }

    #[test]
    fn zero_move_count_without_moves_is_rejected() {
        let mut ex = Exercise::new("ghost");
        ex.moves.clear();
        ex.move_count = 0;
        ex.rest_between_sets = 20;
        assert_matches!(build_exercise_queue(&ex), Err(QueueError::Empty));

        // a program made only of such exercises cannot start either
        let mut program = Program::new(1, "ghosts");
        program.exercises.push(ex.clone());
        program.exercises.push(ex);
        let rests = RestPlan::new("30 sec", ColorToken::Blue);
        assert_matches!(build_program_queue(&program, &rests), Err(QueueError::Empty));
    }
}
