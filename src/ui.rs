use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

use kondi::engine::EngineState;
use kondi::program::ColorToken;
use kondi::queue::{Step, StepKind};
use kondi::summary::ProgramSummary;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 4;

pub fn palette_color(token: ColorToken) -> Color {
    match token {
        ColorToken::Blue => Color::Blue,
        ColorToken::Green => Color::Green,
        ColorToken::Purple => Color::Magenta,
        ColorToken::Orange => Color::Rgb(255, 165, 0),
        ColorToken::Pink => Color::Rgb(255, 105, 180),
    }
}

pub fn format_minutes_seconds(total_seconds: u32) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Home => render_home(self, area, buf),
            AppState::NewProgram => render_new_program(self, area, buf),
            AppState::ProgramView => render_program_view(self, area, buf),
            AppState::ExerciseTimer | AppState::ProgramTimer => render_timer(self, area, buf),
        }
    }
}

fn help_line(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(
        text,
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
}

fn render_home(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(2),
            Constraint::Length(2),
        ])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "kondi — workout programs",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    title.render(chunks[0], buf);

    if app.programs.is_empty() {
        help_line("no programs yet — press n to create one").render(chunks[1], buf);
    } else {
        let items: Vec<ListItem> = app
            .programs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let total: u32 = p.exercises.iter().map(|e| e.total_seconds()).sum();
                let marker = if i == app.selected_program { "> " } else { "  " };
                let line = format!(
                    "{marker}{}  —  {} exercise(s), ~{}",
                    p.name,
                    p.exercises.len(),
                    format_minutes_seconds(total),
                );
                let style = if i == app.selected_program {
                    Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
                } else {
                    Style::default()
                };
                ListItem::new(Span::styled(line, style))
            })
            .collect();
        List::new(items)
            .block(Block::default().borders(Borders::ALL).title("programs"))
            .render(chunks[1], buf);
    }

    // streak footer from the workout history
    let streak = app
        .workout_log
        .current_streak(chrono::Local::now().date_naive());
    let footer = format!(
        "{} workout(s) logged, current streak {streak} day(s)",
        app.workout_log.total_workouts()
    );
    Paragraph::new(footer)
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::DIM))
        .render(chunks[2], buf);

    match &app.error {
        Some(message) => Paragraph::new(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf),
        None => {
            help_line("↑/↓ select · enter open · n new · esc quit").render(chunks[3], buf)
        }
    }
}

fn render_new_program(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(2),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "new program",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(format!("{}_", app.name_input))
        .block(Block::default().borders(Borders::ALL).title("name"))
        .render(chunks[1], buf);

    if let Some(message) = &app.error {
        Paragraph::new(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }

    help_line("enter create · esc cancel").render(chunks[3], buf);
}

fn render_program_view(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(program) = app.current_program() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(2),
            Constraint::Length(2),
        ])
        .split(area);

    let total: u32 = program.exercises.iter().map(|e| e.total_seconds()).sum();
    let title = Paragraph::new(Span::styled(
        format!("{} — ~{}", program.name, format_minutes_seconds(total)),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    title.render(chunks[0], buf);

    if program.exercises.is_empty() {
        help_line("this program has no exercises").render(chunks[1], buf);
    } else {
        let mut items: Vec<ListItem> = Vec::new();
        for (i, exercise) in program.exercises.iter().enumerate() {
            let selected = i == app.selected_exercise;
            let marker = if selected { "> " } else { "  " };
            let line = format!(
                "{marker}{}. {}  —  {} set · {} rep · ~{}",
                i + 1,
                exercise.name,
                exercise.set_count,
                exercise.rep_count,
                format_minutes_seconds(exercise.total_seconds()),
            );
            let style = if selected {
                Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
            } else {
                Style::default()
            };
            items.push(ListItem::new(Span::styled(line, style)));

            // rest card between exercises, mirroring the roadmap view
            if i + 1 < program.exercises.len() {
                if let Some(plan) = app.preview_rest_plan() {
                    let rest = plan.duration_after(i);
                    items.push(ListItem::new(Span::styled(
                        format!("     ⏸ exercise rest — {}", format_minutes_seconds(rest)),
                        Style::default().add_modifier(Modifier::DIM),
                    )));
                }
            }
        }
        List::new(items)
            .block(Block::default().borders(Borders::ALL).title("roadmap"))
            .render(chunks[1], buf);
    }

    match &app.error {
        Some(message) => Paragraph::new(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf),
        None => Paragraph::new("").render(chunks[2], buf),
    }

    help_line("↑/↓ select · enter exercise timer · p program timer · esc back")
        .render(chunks[3], buf);
}

fn render_timer(app: &App, area: Rect, buf: &mut Buffer) {
    let show_summary = app.state == AppState::ProgramTimer && app.summary.is_some();

    let columns = if show_summary {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(38)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40)])
            .split(area)
    };

    render_countdown(app, columns[0], buf);
    if show_summary {
        if let Some(summary) = &app.summary {
            render_summary_panel(summary, columns[1], buf);
        }
    }
}

fn render_countdown(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(2), // status banner
            Constraint::Length(2), // step name
            Constraint::Length(1), // step kind
            Constraint::Length(2), // step info
            Constraint::Min(3),    // countdown
            Constraint::Length(1), // cue flash
            Constraint::Length(2), // help
        ])
        .split(area);

    match app.engine.state() {
        EngineState::Complete => {
            let congrats = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Congratulations!",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(if app.state == AppState::ProgramTimer {
                    "Program completed."
                } else {
                    "Exercise completed."
                }),
            ])
            .alignment(Alignment::Center);
            congrats.render(chunks[4], buf);
            help_line("r restart · esc back").render(chunks[6], buf);
            return;
        }
        EngineState::Paused => {
            Paragraph::new(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);
        }
        _ => {}
    }

    let Some(step) = app.engine.current_step() else {
        return;
    };
    let color = palette_color(step.color);

    Paragraph::new(Span::styled(
        display_text(step).to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        step.kind.to_string(),
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(step_info(step))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::DIM))
        .render(chunks[3], buf);

    // the spoken countdown word doubles as a visual cue on rest steps
    let countdown = match app.countdown_word {
        Some(word) => format!(
            "{}s  ({word})",
            app.engine.remaining_seconds().unwrap_or(0)
        ),
        None => format!("{}s", app.engine.remaining_seconds().unwrap_or(0)),
    };
    Paragraph::new(Span::styled(
        countdown,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    if let Some(flash) = &app.flash {
        Paragraph::new(Span::styled(
            format!("♪ {flash}"),
            Style::default().fg(Color::Cyan),
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
    }

    let help = if app.state == AppState::ProgramTimer {
        "space pause · r restart · s stop · e skip exercise · b skip rest · t skip set · ←/→ scrub · 1-9 jump · esc back"
    } else {
        "space pause · r restart · s stop · m skip move · n next rep · t next set · b skip set rest · esc back"
    };
    help_line(help).render(chunks[6], buf);
}

fn render_summary_panel(summary: &ProgramSummary, area: Rect, buf: &mut Buffer) {
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Program Summary",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "Total: {}",
            format_minutes_seconds(summary.total_seconds)
        )),
        Line::from(format!(
            "Remaining: {}",
            format_minutes_seconds(summary.remaining_seconds)
        )),
        Line::from(""),
    ];

    for (i, exercise) in summary.exercises.iter().enumerate() {
        let mut style = Style::default();
        if exercise.current {
            style = style.add_modifier(Modifier::BOLD).fg(Color::Cyan);
        }
        if exercise.completed {
            style = style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
        }
        lines.push(Line::from(Span::styled(
            format!(
                "{}. {} ({} set · {} rep)",
                i + 1,
                exercise.name,
                exercise.set_count,
                exercise.rep_count
            ),
            style,
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "   ~{} · sets left {}/{}",
                format_minutes_seconds(exercise.total_seconds),
                exercise.remaining_sets,
                exercise.set_count
            ),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("summary"))
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn display_text(step: &Step) -> &str {
    match step.kind {
        StepKind::ExerciseMove => step.move_name.as_deref().unwrap_or(&step.exercise_name),
        StepKind::ExerciseRest => "Move Rest",
        StepKind::RepRest => "Rep Rest",
        StepKind::SetRest => "Set Rest",
        StepKind::ProgramRest => "Program Rest",
    }
}

fn step_info(step: &Step) -> String {
    match step.kind {
        StepKind::ExerciseMove => format!(
            "{} — Set {} · Rep {} · {}",
            step.exercise_name,
            step.set.unwrap_or(1),
            step.rep.unwrap_or(1),
            step.move_name.as_deref().unwrap_or("move"),
        ),
        StepKind::ExerciseRest => format!(
            "{} — Set {} · Rep {} · between moves",
            step.exercise_name,
            step.set.unwrap_or(1),
            step.rep.unwrap_or(1),
        ),
        StepKind::RepRest => {
            format!("{} — Set {} · between reps", step.exercise_name, step.set.unwrap_or(1))
        }
        StepKind::SetRest => {
            format!("{} — between sets (Set {})", step.exercise_name, step.set.unwrap_or(1))
        }
        StepKind::ProgramRest => {
            format!("{} finished — rest before next exercise", step.exercise_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formatting() {
        assert_eq!(format_minutes_seconds(0), "0s");
        assert_eq!(format_minutes_seconds(45), "45s");
        assert_eq!(format_minutes_seconds(60), "1m 00s");
        assert_eq!(format_minutes_seconds(150), "2m 30s");
    }

    #[test]
    fn step_info_covers_every_kind() {
        let mut step = Step {
            kind: StepKind::ExerciseMove,
            exercise_index: 0,
            exercise_name: "squat".into(),
            move_name: Some("down".into()),
            duration: 5,
            set: Some(1),
            rep: Some(2),
            mv: Some(1),
            color: ColorToken::Blue,
        };
        assert!(step_info(&step).contains("Rep 2"));

        step.kind = StepKind::SetRest;
        assert!(step_info(&step).contains("between sets"));

        step.kind = StepKind::ProgramRest;
        assert!(step_info(&step).contains("next exercise"));
    }
}
