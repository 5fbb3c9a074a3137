use std::io::{BufRead, BufReader, Read};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::{Answer, Question, QuizError};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct City {
    pub name: String,
    pub is_capital: bool,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct UsState {
    pub name: String,
    pub cities: Vec<City>,
}

/// The full geography dataset, loaded once at startup.
///
/// The source file has one state per line, `Name: city, city, city`, with the
/// capital marked by a trailing `*`. City names are unique across the whole
/// file so they can double as answer identifiers.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Atlas {
    pub states: Vec<UsState>,
}

impl Atlas {
    pub fn new<R: Read>(input: R) -> Self {
        let reader = BufReader::new(input);
        let mut states = Vec::new();

        for line in reader.lines() {
            let line = line.expect("Failed to read line");
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (name, cities) = line
                .split_once(':')
                .expect("Expected a 'State: city, city*, city' line");
            let cities = cities
                .split(',')
                .map(|entry| {
                    let entry = entry.trim();
                    match entry.strip_suffix('*') {
                        Some(capital) => City {
                            name: capital.trim().to_string(),
                            is_capital: true,
                        },
                        None => City {
                            name: entry.to_string(),
                            is_capital: false,
                        },
                    }
                })
                .collect();

            states.push(UsState {
                name: name.trim().to_string(),
                cities,
            });
        }

        Self { states }
    }

    /// Every city name in the dataset, capitals included. This is the pool
    /// wrong answers are drawn from.
    pub fn city_names(&self) -> Vec<&str> {
        self.states
            .iter()
            .flat_map(|state| state.cities.iter())
            .map(|city| city.name.as_str())
            .collect()
    }
}

/// Builds `count` capital questions from distinct, randomly picked states.
pub fn generate_questions<R: Rng + ?Sized>(
    count: usize,
    atlas: &Atlas,
    rng: &mut R,
) -> Result<Vec<Question>, QuizError> {
    if count > atlas.states.len() {
        return Err(QuizError::InsufficientData {
            requested: count,
            available: atlas.states.len(),
        });
    }

    let pool = atlas.city_names();
    atlas
        .states
        .choose_multiple(rng, count)
        .map(|state| {
            let capital = state
                .cities
                .iter()
                .find(|city| city.is_capital)
                .ok_or_else(|| QuizError::MissingCapital {
                    state: state.name.clone(),
                })?;

            // Four random cities from the whole pool; when the capital itself
            // is drawn it is dropped rather than redrawn, so a question can
            // end up with three distractors instead of four.
            let mut answers: Vec<Answer> = pool
                .choose_multiple(rng, 4)
                .filter(|city| **city != capital.name)
                .map(|city| Answer::new(city.to_string(), false))
                .collect();
            answers.push(Answer::new(capital.name.clone(), true));
            answers.shuffle(rng);

            Ok(Question::new(state.name.clone(), answers))
        })
        .collect()
}
