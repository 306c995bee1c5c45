use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed color palette for moves and rests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColorToken {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
}

/// A single named timed action within an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub name: String,
    pub duration: u32,
    #[serde(default)]
    pub color: ColorToken,
}

/// A configured unit of repeated timed moves across sets and reps.
///
/// Field names follow the exported JSON document format, so programs
/// written by earlier builds load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    pub set_count: u32,
    pub rep_count: u32,
    #[serde(default = "one")]
    pub move_count: u32,
    #[serde(default)]
    pub moves: Vec<Move>,
    #[serde(default)]
    pub rest_between_moves: u32,
    #[serde(default)]
    pub rest_between_sets: u32,
    #[serde(default)]
    pub rest_between_moves_enabled: bool,
    #[serde(default = "default_rest_color")]
    pub rest_color: ColorToken,
    #[serde(default = "default_set_rest_color")]
    pub set_rest_color: ColorToken,
}

fn one() -> u32 {
    1
}

fn default_rest_color() -> ColorToken {
    ColorToken::Green
}

fn default_set_rest_color() -> ColorToken {
    ColorToken::Orange
}

impl Exercise {
    /// New exercise with the stock configuration offered by the editor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            set_count: 2,
            rep_count: 10,
            move_count: 1,
            moves: vec![Move {
                name: "1. Move".to_string(),
                duration: 3,
                color: ColorToken::Blue,
            }],
            rest_between_moves: 0,
            rest_between_sets: 30,
            rest_between_moves_enabled: false,
            rest_color: ColorToken::Green,
            set_rest_color: ColorToken::Orange,
        }
    }

    /// Coerce a possibly hand-edited exercise into a runnable one.
    ///
    /// Set and rep counts are clamped to at least one, zero-duration moves
    /// are dropped, and an exercise left without any usable move gets
    /// `move_count` synthetic 3-second moves so the queue is never silently
    /// shorter than the configured structure. A `move_count` of zero keeps
    /// the exercise empty; it contributes no steps at all.
    pub fn normalized(&self, fallback_index: usize) -> Exercise {
        let mut moves: Vec<Move> = self
            .moves
            .iter()
            .filter(|m| m.duration > 0)
            .cloned()
            .collect();

        if moves.is_empty() {
            moves = (1..=self.move_count)
                .map(|i| Move {
                    name: format!("{i}. Move"),
                    duration: 3,
                    color: ColorToken::Blue,
                })
                .collect();
        }

        Exercise {
            name: if self.name.trim().is_empty() {
                format!("Exercise {}", fallback_index + 1)
            } else {
                self.name.clone()
            },
            set_count: self.set_count.max(1),
            rep_count: self.rep_count.max(1),
            move_count: moves.len() as u32,
            moves,
            ..self.clone()
        }
    }

    /// Fully-expanded duration of one run of this exercise, in seconds.
    ///
    /// Uses the same arithmetic as the queue builder: moves for every
    /// set × rep, optional rests between moves and reps, rests between sets.
    pub fn total_seconds(&self) -> u32 {
        let ex = self.normalized(0);
        if ex.moves.is_empty() {
            return 0;
        }
        let move_seconds: u32 = ex.moves.iter().map(|m| m.duration).sum();
        let mut seconds = ex.set_count * ex.rep_count * move_seconds;

        if ex.rest_between_moves_enabled && ex.rest_between_moves > 0 {
            let rests_per_rep = (ex.moves.len() as u32).saturating_sub(1);
            seconds += ex.set_count * ex.rep_count * rests_per_rep * ex.rest_between_moves;
            seconds += ex.set_count * (ex.rep_count - 1) * ex.rest_between_moves;
        }

        seconds += (ex.set_count - 1) * ex.rest_between_sets;
        seconds
    }
}

/// A named ordered collection of exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    /// Per-exercise inter-exercise rest overrides, keyed by the raw
    /// exercise index at edit time. Keys are NOT re-mapped when exercises
    /// are reordered or removed; see DESIGN.md.
    #[serde(default)]
    pub custom_rest_durations: BTreeMap<usize, u32>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Local>>,
}

impl Program {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            exercises: Vec::new(),
            custom_rest_durations: BTreeMap::new(),
            created_at: Some(chrono::Local::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed_move(duration: u32) -> Move {
        Move {
            name: "move".into(),
            duration,
            color: ColorToken::Blue,
        }
    }

    #[test]
    fn normalized_clamps_counts() {
        let mut ex = Exercise::new("squat");
        ex.set_count = 0;
        ex.rep_count = 0;
        let norm = ex.normalized(0);
        assert_eq!(norm.set_count, 1);
        assert_eq!(norm.rep_count, 1);
    }

    #[test]
    fn normalized_drops_zero_duration_moves() {
        let mut ex = Exercise::new("plank");
        ex.moves = vec![timed_move(0), timed_move(20), timed_move(0)];
        let norm = ex.normalized(0);
        assert_eq!(norm.moves.len(), 1);
        assert_eq!(norm.moves[0].duration, 20);
    }

    #[test]
    fn normalized_synthesizes_default_moves() {
        let mut ex = Exercise::new("mystery");
        ex.moves.clear();
        ex.move_count = 3;
        let norm = ex.normalized(0);
        assert_eq!(norm.moves.len(), 3);
        assert!(norm.moves.iter().all(|m| m.duration == 3));
        assert_eq!(norm.moves[1].name, "2. Move");
    }

    #[test]
    fn zero_move_count_yields_no_moves() {
        let mut ex = Exercise::new("ghost");
        ex.moves.clear();
        ex.move_count = 0;
        assert!(ex.normalized(0).moves.is_empty());
        assert_eq!(ex.total_seconds(), 0);
    }

    #[test]
    fn normalized_names_unnamed_exercises() {
        let mut ex = Exercise::new("  ");
        ex.name = String::new();
        assert_eq!(ex.normalized(2).name, "Exercise 3");
    }

    #[test]
    fn total_seconds_moves_only() {
        let mut ex = Exercise::new("jumps");
        ex.set_count = 2;
        ex.rep_count = 3;
        ex.moves = vec![timed_move(4), timed_move(6)];
        ex.rest_between_sets = 0;
        // 2 sets * 3 reps * 10s of moves
        assert_eq!(ex.total_seconds(), 60);
    }

    #[test]
    fn total_seconds_with_all_rests() {
        let mut ex = Exercise::new("circuit");
        ex.set_count = 2;
        ex.rep_count = 2;
        ex.moves = vec![timed_move(5), timed_move(5)];
        ex.rest_between_moves_enabled = true;
        ex.rest_between_moves = 3;
        ex.rest_between_sets = 10;
        // moves: 2*2*10 = 40
        // move rests: 2*2*1*3 = 12, rep rests: 2*1*3 = 6
        // set rests: 1*10 = 10
        assert_eq!(ex.total_seconds(), 68);
    }

    #[test]
    fn program_json_round_trip_uses_camel_case() {
        let mut program = Program::new(7, "morning");
        program.exercises.push(Exercise::new("squat"));
        program.custom_rest_durations.insert(0, 90);

        let json = serde_json::to_string(&program).unwrap();
        assert!(json.contains("customRestDurations"));
        assert!(json.contains("setCount"));

        let back: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(back, program);
    }

    #[test]
    fn legacy_document_with_missing_fields_loads() {
        let json = r#"{
            "id": 1,
            "name": "old",
            "exercises": [{
                "name": "pushup",
                "setCount": 3,
                "repCount": 5
            }]
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();
        assert_eq!(program.exercises[0].move_count, 1);
        assert!(program.exercises[0].moves.is_empty());
        assert_eq!(program.exercises[0].rest_color, ColorToken::Green);
    }
}
