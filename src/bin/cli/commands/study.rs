//! Interactive study session
//!
//! Drives the session state machine over stdin. Quitting mid-session
//! just drops the in-memory state; cards graded so far keep their
//! persisted review state.

use std::io::{self, BufRead, Write};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use wortkarte::vocab::models::{Article, Card};
use wortkarte::vocab::scheduler::{format_interval, preview_intervals};
use wortkarte::vocab::{Grade, GradeOutcome, StudyMode, StudySession};

use crate::app::App;

pub fn run(
    app: &mut App,
    deck_ref: &str,
    mode: StudyMode,
    goal: usize,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    anyhow::ensure!(goal >= 1, "goal must be at least 1");
    let deck = app.resolve_deck(deck_ref)?;

    let mut session = StudySession::new();
    let now = Utc::now();
    match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            session.start(&app.store, deck.id, mode, goal, now, &mut rng)
        }
        None => {
            let mut rng = rand::thread_rng();
            session.start(&app.store, deck.id, mode, goal, now, &mut rng)
        }
    }?;

    let (_, effective_goal) = session.progress().expect("session just started");
    println!("studying {} ({} cards)", deck.name, effective_goal);

    let stdin = io::stdin();
    'session: while session.is_active() {
        let card = session.current().expect("session is active").clone();
        let (done, goal) = session.progress().expect("session is active");

        println!();
        match mode {
            StudyMode::Flashcard => {
                println!("[{}/{}] {}", done + 1, goal, card.english);
                println!("  enter = flip, {}, q = quit", grade_help(&card));
            }
            StudyMode::GenderQuiz => {
                println!("[{}/{}] ___ {}", done + 1, goal, card.german);
                println!("  1 = der, 2 = die, 3 = das, r = reveal, q = quit");
            }
        }

        loop {
            let Some(line) = prompt(&stdin)? else {
                break 'session;
            };
            let input = line.trim();

            if input == "q" {
                break 'session;
            }

            match mode {
                StudyMode::Flashcard => {
                    if input.is_empty() {
                        session.flip();
                        if session.flipped() {
                            print_back(&card);
                        } else {
                            println!("  {}", card.english);
                        }
                        continue;
                    }
                    if let Some(grade) = parse_grade(input) {
                        session.grade(&mut app.store, grade, Utc::now())?;
                        continue 'session;
                    }
                    println!("  unrecognized input {:?}", input);
                }
                StudyMode::GenderQuiz => {
                    if let Some(choice) = parse_article(input) {
                        session.answer_gender(choice);
                        report_answer(&card, session.correct());
                        println!("  {}, q = quit", grade_help(&card));
                        continue;
                    }
                    if input == "r" {
                        session.reveal();
                        print_back(&card);
                        println!("  {}, q = quit", grade_help(&card));
                        continue;
                    }
                    if let Some(grade) = parse_grade(input) {
                        match session.grade(&mut app.store, grade, Utc::now())? {
                            GradeOutcome::NotAnswered => {
                                println!("  answer (1/2/3) or reveal (r) first");
                                continue;
                            }
                            _ => continue 'session,
                        }
                    }
                    println!("  unrecognized input {:?}", input);
                }
            }
        }
    }

    match session.summary() {
        Some(summary) => println!("\nsession complete: {} cards graded", summary.done),
        None => println!("\nsession abandoned"),
    }
    Ok(())
}

fn prompt(stdin: &io::Stdin) -> anyhow::Result<Option<String>> {
    print!("> ");
    io::stdout().flush()?;
    let mut buf = String::new();
    if stdin.lock().read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf))
}

fn parse_grade(input: &str) -> Option<Grade> {
    match input {
        "a" => Some(Grade::Again),
        "g" => Some(Grade::Good),
        "e" => Some(Grade::Easy),
        _ => None,
    }
}

fn parse_article(input: &str) -> Option<Article> {
    match input {
        "1" => Some(Article::Der),
        "2" => Some(Article::Die),
        "3" => Some(Article::Das),
        _ => None,
    }
}

fn grade_help(card: &Card) -> String {
    let [again, good, easy] = preview_intervals(&card.srs, Utc::now());
    format!(
        "a = again ({}), g = good ({}), e = easy ({})",
        format_interval(again),
        format_interval(good),
        format_interval(easy)
    )
}

fn print_back(card: &Card) {
    println!("  {}", card.spoken_form());
    if let Some(plural) = &card.plural {
        println!("  plural: die {}", plural);
    }
    if let Some(example) = &card.example {
        println!("  e.g. {}", example);
    }
    if let Some(notes) = &card.notes {
        println!("  note: {}", notes);
    }
}

fn report_answer(card: &Card, correct: bool) {
    if correct {
        println!("  correct: {}", card.spoken_form());
    } else {
        match card.article {
            Some(article) => println!("  wrong: {} {}", article, card.german),
            None => println!("  {} has no article", card.german),
        }
    }
}
