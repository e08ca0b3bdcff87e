//! Line-oriented terminal front-end: renders `SessionView`s and turns typed
//! lines into session commands.

use std::io::{self, BufRead, Write};

use chrono::Duration;
use quiz_core::model::{QuestionBank, SessionOutcome};
use services::{
    AnswerMark, AnswerOutcome, CommandOutcome, IgnoredCommand, NavState, QuestionView,
    QuizSession, SessionHost, SessionLoopService, SessionParams, SessionView, SummaryView,
};

use crate::error::AppError;

/// A command typed at the test prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// 0-based answer index (typed 1-based).
    Answer(usize),
    Next,
    /// 0-based question index (typed 1-based).
    Jump(usize),
    Topic(String),
    Cancel,
    Restart,
    Quit,
    Help,
}

impl Input {
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        match (head, rest) {
            ("n" | "next", "") => Some(Self::Next),
            ("g" | "go", n) => one_based(n).map(Self::Jump),
            ("t" | "topic", name) if !name.is_empty() => Some(Self::Topic(name.to_owned())),
            ("c" | "cancel", "") => Some(Self::Cancel),
            ("r" | "restart", "") => Some(Self::Restart),
            ("q" | "quit", "") => Some(Self::Quit),
            ("h" | "help" | "?", "") => Some(Self::Help),
            (n, "") => one_based(n).map(Self::Answer),
            _ => None,
        }
    }
}

fn one_based(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok()?.checked_sub(1)
}

/// "66.67%", or an em dash when nothing was answered.
#[must_use]
pub fn format_percentage(percentage: Option<f64>) -> String {
    percentage.map_or_else(|| "—".to_owned(), |p| format!("{p:.2}%"))
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    format!("{}m {:02}s", secs / 60, secs % 60)
}

//
// ─── SCREENS ───────────────────────────────────────────────────────────────────
//

/// Home screen: every subject in the bank.
///
/// # Errors
///
/// Returns `io::Error` if writing fails.
pub fn render_subjects<W: Write>(out: &mut W, bank: &QuestionBank) -> io::Result<()> {
    writeln!(out, "Choose a subject:")?;
    if bank.is_empty() {
        writeln!(out, "  (the bank is empty)")?;
    }
    for (key, subject) in bank.subjects() {
        writeln!(
            out,
            "  {key:<16} {} ({} questions)",
            subject.name(),
            subject.question_count()
        )?;
    }
    Ok(())
}

/// Topic screen for one subject, ending with the general test.
///
/// # Errors
///
/// Returns `AppError::SubjectNotFound` for an unknown key.
pub fn render_topics<W: Write>(
    out: &mut W,
    bank: &QuestionBank,
    subject_key: &str,
) -> Result<(), AppError> {
    let subject = bank
        .subject(subject_key)
        .ok_or_else(|| AppError::SubjectNotFound(subject_key.to_owned()))?;
    writeln!(out, "Choose a topic for {}:", subject.name())?;
    for topic in subject.topics() {
        writeln!(out, "  {} ({} questions)", topic.name(), topic.questions().len())?;
    }
    writeln!(
        out,
        "  all (general test, {} questions)",
        subject.question_count()
    )?;
    Ok(())
}

/// Render one session snapshot.
///
/// # Errors
///
/// Returns `io::Error` if writing fails.
pub fn render_view<W: Write>(out: &mut W, view: &SessionView) -> io::Result<()> {
    match view {
        SessionView::Loading(_) => writeln!(out, "Loading..."),
        SessionView::Empty(params) => writeln!(
            out,
            "No questions found for {} / {}.",
            params.subject, params.topic
        ),
        SessionView::Question(question) => render_question(out, question),
        SessionView::Summary(summary) => render_summary(out, summary),
    }
}

fn render_question<W: Write>(out: &mut W, view: &QuestionView) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Test: {} - {}", view.params.subject, view.params.topic)?;
    writeln!(out, "Question {} of {}", view.position(), view.total)?;
    writeln!(
        out,
        "Answered {}/{}, correct {}",
        view.progress.answered, view.progress.total, view.progress.correct
    )?;

    let strip: Vec<String> = view
        .nav
        .iter()
        .map(|cell| {
            let mark = match cell.state {
                NavState::Unanswered => ' ',
                NavState::Correct => '+',
                NavState::Incorrect => 'x',
            };
            if cell.is_current {
                format!("<{}{mark}>", cell.index + 1)
            } else {
                format!("[{}{mark}]", cell.index + 1)
            }
        })
        .collect();
    writeln!(out, "{}", strip.join(" "))?;

    writeln!(out)?;
    writeln!(out, "{}", view.text)?;
    for answer in &view.answers {
        let mark = match answer.mark {
            AnswerMark::Plain => "  ",
            AnswerMark::Correct => " ✓",
            AnswerMark::Incorrect => " ✗",
        };
        writeln!(out, "  {}) {}{mark}", answer.index + 1, answer.text)?;
    }

    if let Some(explanation) = &view.explanation {
        writeln!(out, "Explanation: {explanation}")?;
    }
    if let Some(selected) = &view.selected_answer {
        writeln!(out, "Your answer: {selected}")?;
    }
    Ok(())
}

fn render_summary<W: Write>(out: &mut W, view: &SummaryView) -> io::Result<()> {
    writeln!(out)?;
    match view.outcome {
        SessionOutcome::Completed => writeln!(out, "You finished the test!")?,
        SessionOutcome::Cancelled => writeln!(out, "You ended the test early.")?,
    }
    writeln!(
        out,
        "Correct: {} of {} answered ({} questions in the test)",
        view.correct, view.answered, view.total_questions
    )?;
    writeln!(out, "Score: {}", format_percentage(view.percentage))?;
    writeln!(
        out,
        "Time: {} (attempt {})",
        format_duration(view.duration),
        view.attempt
    )?;

    if !view.review.is_empty() {
        writeln!(out)?;
        writeln!(out, "Answered questions:")?;
    }
    for item in &view.review {
        writeln!(out, "  Question {}: {}", item.question_index + 1, item.question)?;
        writeln!(out, "    Correct answer: {}", item.correct_answer)?;
        writeln!(out, "    Your answer: {}", item.selected_answer)?;
        writeln!(
            out,
            "    {}",
            if item.is_correct { "Correct" } else { "Incorrect" }
        )?;
    }
    Ok(())
}

fn render_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  <n>        answer with option n")?;
    writeln!(out, "  n          next question")?;
    writeln!(out, "  g <n>      go to question n")?;
    writeln!(out, "  t <topic>  switch topic (\"all\" for every topic)")?;
    writeln!(out, "  c          end the test early")?;
    writeln!(out, "  r          take the test again (after it ends)")?;
    writeln!(out, "  q          quit")
}

fn describe_ignored(reason: IgnoredCommand) -> &'static str {
    match reason {
        IgnoredCommand::NotInProgress => "The test is not running.",
        IgnoredCommand::NotFinished => "Finish or end the test first.",
        IgnoredCommand::AlreadyAnswered => "This question is already answered.",
        IgnoredCommand::AnswerOutOfRange => "No such answer.",
        IgnoredCommand::IndexOutOfRange => "No such question.",
        IgnoredCommand::Declined => "Continuing the test.",
    }
}

//
// ─── TEST LOOP ─────────────────────────────────────────────────────────────────
//

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn ask_yes_no<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> io::Result<bool> {
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;
    let answer = read_line(input)?.unwrap_or_default();
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Drive the hosted session from `input` until quit or EOF.
///
/// # Errors
///
/// Returns `AppError` on terminal i/o failure or if a summary cannot be built.
pub fn run_test<R: BufRead, W: Write>(
    host: &mut SessionHost,
    loop_svc: &SessionLoopService,
    input: &mut R,
    out: &mut W,
) -> Result<(), AppError> {
    let mut show = true;
    loop {
        let Some(view) = host.view()? else {
            return Ok(());
        };
        if show {
            render_view(out, &view)?;
        }
        show = true;
        match view {
            SessionView::Loading(_) | SessionView::Empty(_) => return Ok(()),
            SessionView::Summary(_) => writeln!(out, "[r] take again, [q] quit")?,
            SessionView::Question(_) => {}
        }

        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(());
        };
        let Some(command) = Input::parse(&line) else {
            writeln!(out, "Unknown command, type h for help.")?;
            show = false;
            continue;
        };

        let ignored = match command {
            Input::Quit => return Ok(()),
            Input::Help => {
                render_help(out)?;
                show = false;
                None
            }
            Input::Topic(topic) => {
                switch_topic(host, loop_svc, &topic);
                None
            }
            Input::Answer(index) => {
                let Some(session) = host.session_mut() else {
                    return Ok(());
                };
                match session.answer(index) {
                    AnswerOutcome::Ignored(reason) => Some(reason),
                    AnswerOutcome::Correct | AnswerOutcome::Incorrect => None,
                }
            }
            Input::Next => ignored_reason(host.session_mut().map(QuizSession::next)),
            Input::Jump(index) => ignored_reason(host.session_mut().map(|s| s.jump(index))),
            Input::Restart => ignored_reason(host.session_mut().map(QuizSession::restart)),
            Input::Cancel => {
                let mut prompt_error = None;
                let mut confirm = |prompt: &str| match ask_yes_no(input, out, prompt) {
                    Ok(yes) => yes,
                    Err(e) => {
                        prompt_error = Some(e);
                        false
                    }
                };
                let outcome = host.session_mut().map(|s| s.cancel(&mut confirm));
                if let Some(e) = prompt_error {
                    return Err(AppError::Io(e));
                }
                ignored_reason(outcome)
            }
        };

        if let Some(reason) = ignored {
            writeln!(out, "{}", describe_ignored(reason))?;
            show = reason == IgnoredCommand::Declined;
        }
    }
}

fn ignored_reason(outcome: Option<CommandOutcome>) -> Option<IgnoredCommand> {
    match outcome? {
        CommandOutcome::Applied => None,
        CommandOutcome::Ignored(reason) => Some(reason),
    }
}

/// Re-route to another topic of the current subject, starting a fresh session.
fn switch_topic(host: &mut SessionHost, loop_svc: &SessionLoopService, topic: &str) {
    let (Some(bank), Some(session)) = (host.bank().cloned(), host.session()) else {
        return;
    };
    let params = SessionParams::new(session.params().subject.clone(), topic);
    host.sync(loop_svc, bank, params);
}
