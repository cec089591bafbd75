//! Quiz screen: one question at a time, with reveal and scoring.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use recall_engine::App;
use recall_types::{QuizDifficulty, QuizQuestion};

use crate::shared::{friendly_date, panel};
use crate::theme::{Glyphs, Palette, spinner_frame};

pub(crate) fn draw(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let block = panel("Memory Quiz", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.quiz().is_loading() {
        let spinner = spinner_frame(app.ticks() as usize, app.ui_options());
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("{spinner} Writing questions from your journal..."),
                Style::default().fg(palette.text_muted),
            ))),
            inner,
        );
        return;
    }

    if app.quiz().is_finished() {
        draw_finished(frame, app, inner, palette);
        return;
    }

    match app.quiz().question() {
        Some(question) => draw_question(frame, app, question, inner, palette, glyphs),
        None => {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    "Press g and I'll make a quiz from your journal.",
                    Style::default().fg(palette.text_secondary),
                ))),
                inner,
            );
        }
    }
}

fn draw_question(
    frame: &mut Frame,
    app: &App,
    question: &QuizQuestion,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let (answered, total) = app.quiz().progress();
    let revealed = app.quiz().is_revealed();
    let choice = app.quiz().choice();

    let mut lines = Vec::new();

    let mut header = vec![Span::styled(
        format!("Question {} of {total}", answered + 1),
        Style::default().fg(palette.calm),
    )];
    if question.difficulty() == QuizDifficulty::Hard {
        header.push(Span::styled(
            "  (a tricky one)",
            Style::default().fg(palette.warning),
        ));
    }
    lines.push(Line::from(header));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        question.prompt().to_string(),
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    for (index, option) in question.options().iter().enumerate() {
        let chosen = choice == Some(index);
        let correct = index == question.answer_index();

        let (marker, style) = if revealed && correct {
            (
                glyphs.check,
                Style::default()
                    .fg(palette.success)
                    .add_modifier(Modifier::BOLD),
            )
        } else if revealed && chosen {
            (glyphs.cross, Style::default().fg(palette.error))
        } else if chosen {
            (glyphs.selected, Style::default().fg(palette.text_primary))
        } else {
            (
                " ",
                if revealed {
                    Style::default().fg(palette.text_muted)
                } else {
                    Style::default().fg(palette.text_primary)
                },
            )
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} "), style),
            Span::styled(format!("{}. ", index + 1), style),
            Span::styled(option.clone(), style),
        ]));
    }

    if revealed {
        lines.push(Line::from(""));
        let verdict = if choice.is_some_and(|c| question.is_correct(c)) {
            Span::styled(
                "That's right!",
                Style::default()
                    .fg(palette.success)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                "Not quite.",
                Style::default()
                    .fg(palette.warning)
                    .add_modifier(Modifier::BOLD),
            )
        };
        lines.push(Line::from(verdict));

        if !question.explanation().is_empty() {
            lines.push(Line::from(Span::styled(
                question.explanation().to_string(),
                Style::default().fg(palette.text_secondary),
            )));
        }
        if !question.answer_matched() {
            lines.push(Line::from(Span::styled(
                "(I wasn't fully sure of this answer myself.)",
                Style::default().fg(palette.text_muted),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Enter for the next question.",
            Style::default().fg(palette.text_muted),
        )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_finished(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let correct = app.quiz().correct_count();
    let (_, total) = app.quiz().progress();

    let mut lines = vec![
        Line::from(Span::styled(
            format!("You got {correct} out of {total}."),
            Style::default()
                .fg(palette.success)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Every one you remember is a little win.",
            Style::default().fg(palette.text_secondary),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press g for a fresh quiz.",
            Style::default().fg(palette.text_muted),
        )),
    ];

    let scores = app.quiz().past_scores();
    if !scores.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Earlier rounds:",
            Style::default().fg(palette.calm),
        )));
        for score in scores.iter().rev().take(5) {
            lines.push(Line::from(Span::styled(
                format!(
                    "  {} of {}  {}",
                    score.score,
                    score.total,
                    friendly_date(score.created_at)
                ),
                Style::default().fg(palette.text_muted),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}
