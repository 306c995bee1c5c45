use crate::queue::{QueueError, Step, StepKind};
use crate::settings::{AudioSettings, SoundToken};

/// Which of the two timer surfaces is driving this engine.
///
/// Both share the same queue/state machine; they differ only in how a run
/// begins. The program timer starts paused so the first countdown is shown
/// before ticking, while the single-exercise timer starts ticking
/// immediately. The asymmetry is deliberate (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    Exercise,
    Program,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Paused,
    Complete,
}

/// Signals for the presentation layer, produced by engine operations.
///
/// The engine never renders or plays anything itself; the host loop drains
/// these after every operation/tick and reacts (redraw, bell, speech text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Sound(SoundToken),
    Speak(&'static str),
    StepChanged,
    Finished,
}

fn countdown_word(seconds: u32) -> Option<&'static str> {
    match seconds {
        5 => Some("five"),
        4 => Some("four"),
        3 => Some("three"),
        2 => Some("two"),
        1 => Some("one"),
        _ => None,
    }
}

/// Interval state machine over a prebuilt step queue.
///
/// One engine instance is constructed per run and owns the whole position
/// state: queue, index, running/paused flags and the live countdown for the
/// active step. All operations are synchronous; the host event loop calls
/// `on_tick` once per second while running, which keeps the single-driver
/// invariant without any timer handle to cancel.
#[derive(Debug)]
pub struct TimerEngine {
    mode: TimerMode,
    audio: AudioSettings,
    queue: Vec<Step>,
    index: usize,
    running: bool,
    paused: bool,
    remaining: Option<u32>,
    last_announced: Option<u32>,
}

impl TimerEngine {
    pub fn new(mode: TimerMode, audio: AudioSettings) -> Self {
        Self {
            mode,
            audio,
            queue: Vec::new(),
            index: 0,
            running: false,
            paused: false,
            remaining: None,
            last_announced: None,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn state(&self) -> EngineState {
        if self.is_complete() {
            EngineState::Complete
        } else if !self.running {
            EngineState::Idle
        } else if self.paused {
            EngineState::Paused
        } else {
            EngineState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.running && self.paused
    }

    pub fn is_complete(&self) -> bool {
        !self.queue.is_empty() && self.index >= self.queue.len()
    }

    pub fn queue(&self) -> &[Step] {
        &self.queue
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.queue.get(self.index)
    }

    /// Live countdown for the active step. `None` when idle or complete.
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining
    }

    /// Begin a fresh run over `queue`.
    ///
    /// The program timer enters paused (countdown visible, not ticking);
    /// the exercise timer starts ticking straight away. An empty queue is
    /// refused and the engine stays idle.
    pub fn start(&mut self, queue: Vec<Step>) -> Result<Vec<Cue>, QueueError> {
        if queue.is_empty() {
            return Err(QueueError::Empty);
        }
        self.queue = queue;
        self.index = 0;
        self.running = true;
        self.paused = matches!(self.mode, TimerMode::Program);
        Ok(self.enter_step())
    }

    /// Freeze the countdown. Valid only while running and unpaused.
    pub fn pause(&mut self) {
        if self.running && !self.paused {
            self.paused = true;
        }
    }

    /// Continue from the frozen countdown; never resets to full duration.
    pub fn resume(&mut self) {
        if self.running && self.paused {
            self.paused = false;
        }
    }

    /// Back to idle at position zero. The queue's source program is
    /// untouched; a subsequent start rebuilds from current data.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.paused = false;
            self.index = 0;
            self.remaining = None;
            self.last_announced = None;
        }
    }

    /// One second of wall time while running; drives the whole state
    /// machine forward. No-op when idle, paused or complete.
    pub fn on_tick(&mut self) -> Vec<Cue> {
        if !self.running || self.paused {
            return Vec::new();
        }
        let Some(remaining) = self.remaining else {
            return Vec::new();
        };

        let mut cues = Vec::new();
        let remaining = remaining.saturating_sub(1);
        self.remaining = Some(remaining);

        if remaining == 0 {
            cues.push(Cue::Sound(self.end_sound()));
            self.index += 1;
            if self.index >= self.queue.len() {
                self.running = false;
                self.paused = false;
                self.remaining = None;
                cues.push(Cue::Sound(self.audio.exercise_end));
                cues.push(Cue::Finished);
            } else {
                cues.extend(self.enter_step());
            }
            return cues;
        }

        // Spoken countdown over the last five seconds of any rest step,
        // announced once per distinct value so re-renders cannot double-fire.
        let is_rest = self
            .current_step()
            .map(|s| s.kind.is_rest())
            .unwrap_or(false);
        if is_rest && remaining <= 5 && self.last_announced != Some(remaining) {
            if let Some(word) = countdown_word(remaining) {
                cues.push(Cue::Speak(word));
                self.last_announced = Some(remaining);
            }
        }
        cues
    }

    /// A move is exactly one queue entry; skipping it is one step forward.
    pub fn skip_move(&mut self) -> Vec<Cue> {
        if !self.running {
            return Vec::new();
        }
        match self.current_step() {
            Some(step) if step.kind == StepKind::ExerciseMove => {
                let target = (self.index + 1).min(self.queue.len() - 1);
                self.jump_to(target)
            }
            _ => Vec::new(),
        }
    }

    /// First step with a strictly greater rep number; falls back to a set
    /// skip when the current rep is the last of its set.
    pub fn skip_to_next_rep(&mut self) -> Vec<Cue> {
        if !self.running {
            return Vec::new();
        }
        let Some(current) = self.current_step() else {
            return Vec::new();
        };
        let current_rep = current.rep.unwrap_or(1);

        let target = self.queue[self.index + 1..]
            .iter()
            .position(|s| s.rep.is_some_and(|r| r > current_rep))
            .map(|offset| self.index + 1 + offset);

        match target {
            Some(i) => self.jump_to(i),
            None => self.skip_to_next_set(),
        }
    }

    /// First move of a strictly greater set within the same exercise; the
    /// first move of the next exercise when the current set is the last;
    /// the final step of the queue when neither exists. Set numbers restart
    /// per exercise, so the scan never crosses into a later exercise's
    /// middle set.
    pub fn skip_to_next_set(&mut self) -> Vec<Cue> {
        if !self.running {
            return Vec::new();
        }
        let Some(current) = self.current_step() else {
            return Vec::new();
        };
        let current_exercise = current.exercise_index;
        let current_set = current.set.unwrap_or(1);

        let target = self.queue[self.index + 1..]
            .iter()
            .position(|s| {
                let next_set_here = s.exercise_index == current_exercise
                    && s.set.is_some_and(|v| v > current_set);
                let next_exercise = s.exercise_index > current_exercise;
                s.kind == StepKind::ExerciseMove && (next_set_here || next_exercise)
            })
            .map(|offset| self.index + 1 + offset)
            .unwrap_or(self.queue.len() - 1);
        self.jump_to(target)
    }

    /// Jump past the active set-rest to the next non-set-rest step.
    pub fn skip_set_rest(&mut self) -> Vec<Cue> {
        self.skip_past_rest(StepKind::SetRest)
    }

    /// Jump past the active inter-exercise rest.
    pub fn skip_program_rest(&mut self) -> Vec<Cue> {
        self.skip_past_rest(StepKind::ProgramRest)
    }

    fn skip_past_rest(&mut self, kind: StepKind) -> Vec<Cue> {
        if !self.running {
            return Vec::new();
        }
        match self.current_step() {
            Some(step) if step.kind == kind => {
                let target = self.queue[self.index + 1..]
                    .iter()
                    .position(|s| s.kind != kind)
                    .map(|offset| self.index + 1 + offset)
                    .unwrap_or(self.queue.len() - 1);
                self.jump_to(target)
            }
            _ => Vec::new(),
        }
    }

    /// First step of the next exercise, or the last step of the queue when
    /// the current exercise is the final one.
    pub fn skip_exercise(&mut self) -> Vec<Cue> {
        if !self.running {
            return Vec::new();
        }
        let Some(current) = self.current_step() else {
            return Vec::new();
        };
        let current_exercise = current.exercise_index;

        let target = self.queue[self.index + 1..]
            .iter()
            .position(|s| s.exercise_index > current_exercise)
            .map(|offset| self.index + 1 + offset)
            .unwrap_or(self.queue.len() - 1);
        self.jump_to(target)
    }

    /// Manual scrub one step forward, clamped at the last step. Always
    /// resets the countdown to the target's full duration.
    pub fn step_forward(&mut self) -> Vec<Cue> {
        if self.queue.is_empty() {
            return Vec::new();
        }
        let target = (self.index + 1).min(self.queue.len() - 1);
        self.jump_to(target)
    }

    /// Manual scrub one step backward, clamped at the first step.
    pub fn step_backward(&mut self) -> Vec<Cue> {
        if self.queue.is_empty() {
            return Vec::new();
        }
        let target = self.index.saturating_sub(1);
        self.jump_to(target)
    }

    /// Jump to the first move of the given exercise and force the run
    /// active, even when previously paused. Unknown targets are no-ops.
    pub fn jump_to_exercise(&mut self, exercise_index: usize) -> Vec<Cue> {
        let target = self.queue.iter().position(|s| {
            s.exercise_index == exercise_index && s.kind == StepKind::ExerciseMove
        });
        match target {
            Some(i) => self.force_running_at(i),
            None => Vec::new(),
        }
    }

    /// Jump to the first move of the given exercise and set.
    pub fn jump_to_exercise_set(&mut self, exercise_index: usize, set: u32) -> Vec<Cue> {
        let target = self.queue.iter().position(|s| {
            s.exercise_index == exercise_index
                && s.set == Some(set)
                && s.kind == StepKind::ExerciseMove
        });
        match target {
            Some(i) => self.force_running_at(i),
            None => Vec::new(),
        }
    }

    fn force_running_at(&mut self, index: usize) -> Vec<Cue> {
        self.running = true;
        self.paused = false;
        self.jump_to(index)
    }

    fn jump_to(&mut self, index: usize) -> Vec<Cue> {
        self.index = index;
        self.enter_step()
    }

    /// Activate `queue[index]`: reset the countdown and announce the step.
    fn enter_step(&mut self) -> Vec<Cue> {
        self.last_announced = None;
        let Some(step) = self.queue.get(self.index) else {
            self.remaining = None;
            return Vec::new();
        };
        self.remaining = Some(step.duration);

        let mut cues = vec![Cue::StepChanged];
        if step.kind.is_rest() {
            cues.push(Cue::Sound(self.audio.rest_start));
        }
        cues
    }

    fn end_sound(&self) -> SoundToken {
        match self.current_step().map(|s| s.kind) {
            Some(StepKind::ExerciseMove) => self.audio.move_end,
            Some(StepKind::SetRest) => self.audio.set_end,
            Some(StepKind::ExerciseRest) | Some(StepKind::RepRest) | Some(StepKind::ProgramRest) => {
                self.audio.rest_end
            }
            None => self.audio.exercise_end,
        }
    }
}
