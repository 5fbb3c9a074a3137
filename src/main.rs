mod quiz;

use std::{fs::File, sync::Arc};

use dotenv::dotenv;
use quiz::{
    capitals::Atlas,
    responses::Response,
    Question, QuizError, QuizSession,
};
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveFullName,
    ReceiveQuizChoice,
    ReceiveAmountOfQuestions,
    AnswerQuestion {
        session: QuizSession,
        index: usize,
    },
    ReviewAnswers {
        session: QuizSession,
    },
    ReceiveReviseIndex {
        session: QuizSession,
    },
    ReviseAnswer {
        session: QuizSession,
        index: usize,
    },
}

type QuizStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting Geografi bot...");

    let bot = Bot::from_env();

    log::info!("Establishing connection to the database...");
    let storage: QuizStorage = SqliteStorage::open("db.sqlite", Json)
        .await
        .expect("Failed to open dialogue storage 'db.sqlite'")
        .erase();

    // Load the atlas of states and cities
    let atlas = Arc::new(Atlas::new(
        File::open("states.txt").expect("Failed to open file 'states.txt'"),
    ));
    log::info!("Loaded the atlas: {} states", atlas.states.len());

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveFullName].endpoint(receive_full_name))
            .branch(dptree::case![State::ReceiveQuizChoice].endpoint(receive_quiz_choice))
            .branch(
                dptree::case![State::ReceiveAmountOfQuestions].endpoint(
                    move |bot: Bot, dialogue: QuizDialogue, msg: Message| {
                        receive_amount_of_questions(atlas.clone(), bot, dialogue, msg)
                    },
                ),
            )
            .branch(
                dptree::case![State::AnswerQuestion { session, index }]
                    .endpoint(answer_question),
            )
            .branch(dptree::case![State::ReviewAnswers { session }].endpoint(review_answers))
            .branch(
                dptree::case![State::ReceiveReviseIndex { session }]
                    .endpoint(receive_revise_index),
            )
            .branch(
                dptree::case![State::ReviseAnswer { session, index }].endpoint(revise_answer),
            ),
    )
    .dependencies(dptree::deps![storage])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const GREETING_TEXT: &str =
    "Hi! I'm Geografi, the geography quiz for nerds. Let's get acquainted! What's your name?";
async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;

    dialogue.update(State::ReceiveFullName).await?;
    Ok(())
}

const CAPITALS_GAME: &str = "Start the capitals quiz";
async fn receive_full_name(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    match msg.text() {
        Some(full_name) => {
            bot.send_message(msg.chat.id, format!("Nice to meet you, {}!", full_name))
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please send me your name (as text)")
                .await?;
            return Ok(());
        }
    }

    let keyboard = KeyboardMarkup::new(vec![vec![KeyboardButton::new(CAPITALS_GAME)]]);
    bot.send_message(msg.chat.id, "What would you like to do?")
        .reply_markup(keyboard)
        .await?;

    dialogue.update(State::ReceiveQuizChoice).await?;
    Ok(())
}

async fn receive_quiz_choice(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    match msg.text() {
        Some(CAPITALS_GAME) => {
            let keyboard = KeyboardMarkup::new(vec![
                vec![KeyboardButton::new("5")],
                vec![KeyboardButton::new(
                    QuizSession::DEFAULT_QUESTION_COUNT.to_string(),
                )],
                vec![KeyboardButton::new("15")],
            ]);
            bot.send_message(msg.chat.id, "How many questions?")
                .reply_markup(keyboard)
                .await?;
            dialogue.update(State::ReceiveAmountOfQuestions).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please pick one of the options")
                .await?;
        }
    }
    Ok(())
}

async fn receive_amount_of_questions(
    atlas: Arc<Atlas>,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
) -> HandlerResult {
    let amount: usize = match msg.text().map(str::parse) {
        Some(Ok(amount)) => amount,
        _ => {
            bot.send_message(msg.chat.id, "Please send me a number")
                .await?;
            return Ok(());
        }
    };
    if amount == 0 {
        bot.send_message(msg.chat.id, "The quiz needs at least one question")
            .await?;
        return Ok(());
    }

    let started = {
        let mut rng = rand::thread_rng();
        QuizSession::start(&atlas, amount, &mut rng)
    };
    let session = match started {
        Ok(session) => session,
        Err(err @ QuizError::InsufficientData { .. }) => {
            log::debug!("rejected quiz request: {err}");
            bot.send_message(msg.chat.id, format!("Sorry, {err}. Try a smaller number!"))
                .await?;
            return Ok(());
        }
        // A state without a capital means states.txt itself is broken
        Err(err) => return Err(err.into()),
    };

    bot.send_message(msg.chat.id, "Great! Let's start!").await?;
    send_question(&bot, msg.chat.id, 0, &session.questions()[0]).await?;

    dialogue
        .update(State::AnswerQuestion { session, index: 0 })
        .await?;
    Ok(())
}

async fn answer_question(
    bot: Bot,
    dialogue: QuizDialogue,
    (mut session, index): (QuizSession, usize),
    msg: Message,
) -> HandlerResult {
    let correct = match pick_answer(&session.questions()[index], msg.text()) {
        Some(correct) => correct,
        None => {
            bot.send_message(msg.chat.id, "Please pick one of the answers below")
                .await?;
            send_question(&bot, msg.chat.id, index, &session.questions()[index]).await?;
            return Ok(());
        }
    };
    session.set_response(index, correct)?;

    let next = index + 1;
    if next < session.len() {
        send_question(&bot, msg.chat.id, next, &session.questions()[next]).await?;
        dialogue
            .update(State::AnswerQuestion {
                session,
                index: next,
            })
            .await?;
    } else {
        send_review_prompt(&bot, msg.chat.id).await?;
        dialogue.update(State::ReviewAnswers { session }).await?;
    }
    Ok(())
}

const SUBMIT_ANSWERS: &str = "Submit my answers";
const REVISE_ANSWER: &str = "Change an answer";
async fn review_answers(
    bot: Bot,
    dialogue: QuizDialogue,
    session: QuizSession,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(SUBMIT_ANSWERS) => {
            if !session.is_complete() {
                bot.send_message(msg.chat.id, "You still have unanswered questions!")
                    .await?;
                return Ok(());
            }

            let finished = session.submit();
            log::info!(
                "quiz finished: {}/{} correct",
                finished.score,
                finished.questions.len()
            );

            let recap = finished
                .questions
                .iter()
                .zip(finished.responses.slots())
                .enumerate()
                .map(|(i, (question, slot))| {
                    let mark = if *slot == Response::Correct {
                        "✅"
                    } else {
                        "🚫"
                    };
                    format!(
                        "{}. {}: {} {}",
                        i + 1,
                        question.state,
                        question.correct_answer().text,
                        mark
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");

            let keyboard =
                KeyboardMarkup::new(vec![vec![KeyboardButton::new(CAPITALS_GAME)]]);
            bot.send_message(
                msg.chat.id,
                format!(
                    "You got {} out of {} correct! That's {}!\n\n{}\n\nWhat would you like to do next?",
                    finished.score,
                    finished.questions.len(),
                    score_description(finished.score, finished.questions.len()),
                    recap
                ),
            )
            .reply_markup(keyboard)
            .await?;

            dialogue.update(State::ReceiveQuizChoice).await?;
        }
        Some(REVISE_ANSWER) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "Which question would you like to change? (1-{})",
                    session.len()
                ),
            )
            .await?;
            dialogue
                .update(State::ReceiveReviseIndex { session })
                .await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please pick one of the options")
                .await?;
        }
    }
    Ok(())
}

async fn receive_revise_index(
    bot: Bot,
    dialogue: QuizDialogue,
    session: QuizSession,
    msg: Message,
) -> HandlerResult {
    let number: usize = match msg.text().map(str::parse) {
        Some(Ok(number)) => number,
        _ => {
            bot.send_message(
                msg.chat.id,
                format!("Please send me a number between 1 and {}", session.len()),
            )
            .await?;
            return Ok(());
        }
    };
    if number == 0 || number > session.len() {
        bot.send_message(
            msg.chat.id,
            format!("Please send me a number between 1 and {}", session.len()),
        )
        .await?;
        return Ok(());
    }

    let index = number - 1;
    send_question(&bot, msg.chat.id, index, &session.questions()[index]).await?;
    dialogue
        .update(State::ReviseAnswer { session, index })
        .await?;
    Ok(())
}

async fn revise_answer(
    bot: Bot,
    dialogue: QuizDialogue,
    (mut session, index): (QuizSession, usize),
    msg: Message,
) -> HandlerResult {
    let correct = match pick_answer(&session.questions()[index], msg.text()) {
        Some(correct) => correct,
        None => {
            bot.send_message(msg.chat.id, "Please pick one of the answers below")
                .await?;
            send_question(&bot, msg.chat.id, index, &session.questions()[index]).await?;
            return Ok(());
        }
    };
    // Last write wins, same as changing a radio selection
    session.set_response(index, correct)?;

    send_review_prompt(&bot, msg.chat.id).await?;
    dialogue.update(State::ReviewAnswers { session }).await?;
    Ok(())
}

/// Matches the user's message against the question's options.
fn pick_answer(question: &Question, text: Option<&str>) -> Option<bool> {
    let text = text?;
    question
        .answers
        .iter()
        .find(|answer| answer.text == text)
        .map(|answer| answer.is_correct)
}

async fn send_question(
    bot: &Bot,
    chat_id: ChatId,
    index: usize,
    question: &Question,
) -> HandlerResult {
    let keyboard = KeyboardMarkup::new(
        question
            .answers
            .iter()
            .map(|answer| vec![KeyboardButton::new(answer.text.clone())])
            .collect::<Vec<_>>(),
    );

    bot.send_message(
        chat_id,
        format!(
            "Question #{}: What is the capital of {}?",
            index + 1,
            question.state
        ),
    )
    .reply_markup(keyboard)
    .await?;
    Ok(())
}

async fn send_review_prompt(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    let keyboard = KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(SUBMIT_ANSWERS)],
        vec![KeyboardButton::new(REVISE_ANSWER)],
    ]);
    bot.send_message(
        chat_id,
        "That was the last one! Submit your answers, or change one first?",
    )
    .reply_markup(keyboard)
    .await?;
    Ok(())
}

const SCORE_DESCRIPTIONS: [&str; 11] = [
    "really bad",
    "pretty dang bad",
    "very not good",
    "bad",
    "kinda awful",
    "okay, i guess",
    "better than it could've been",
    "above average",
    "pretty good",
    "really good",
    "great",
];

/// Flavor text for the final score, scaled to the quiz length.
fn score_description(score: usize, total: usize) -> &'static str {
    SCORE_DESCRIPTIONS[score * (SCORE_DESCRIPTIONS.len() - 1) / total]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Answer;

    #[test]
    fn test_score_description_buckets() {
        assert_eq!(score_description(0, 10), "really bad");
        assert_eq!(score_description(7, 10), "above average");
        assert_eq!(score_description(10, 10), "great");
        // scales when the quiz is not 10 questions long
        assert_eq!(score_description(5, 5), "great");
        assert_eq!(score_description(0, 15), "really bad");
    }

    #[test]
    fn test_pick_answer_matches_option_text() {
        let question = Question::new(
            "Texas".to_string(),
            vec![
                Answer::new("Houston".to_string(), false),
                Answer::new("Austin".to_string(), true),
            ],
        );
        assert_eq!(pick_answer(&question, Some("Austin")), Some(true));
        assert_eq!(pick_answer(&question, Some("Houston")), Some(false));
        assert_eq!(pick_answer(&question, Some("Paris")), None);
        assert_eq!(pick_answer(&question, None), None);
    }
}
