//! Rule-based brewing recommendations
//!
//! A deterministic stand-in for an AI assistant. Two flows share one
//! endpoint: an interactive tasting questionnaire (fixed question order,
//! lookup-table summary) and a single-shot "my brew was X, fix it" goal
//! mapped through a keyword table. No randomness, no external calls — the
//! same input always produces the same output.

use serde::{Deserialize, Serialize};

/// One answered question: `{ "id": "aroma", "value": "floral" }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    pub id: String,
    pub value: String,
}

/// Optional context sent alongside tasting answers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TastingContext {
    #[serde(default)]
    pub brew_method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionOption {
    pub label: &'static str,
    pub value: &'static str,
}

/// A question for the client to ask next.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_id: &'static str,
    pub text: &'static str,
    pub options: Vec<QuestionOption>,
}

/// The adjustment half of a recommendation.
#[derive(Debug, Serialize)]
pub struct Change {
    pub variable: &'static str,
    pub delta: String,
}

/// Final recommendation: one concrete change plus the reasoning.
#[derive(Debug, Serialize)]
pub struct Recommendation {
    pub change: Change,
    pub explanation: String,
}

struct QuestionSpec {
    id: &'static str,
    text: &'static str,
    options: &'static [(&'static str, &'static str)],
}

/// The tasting flow, in the order questions are asked.
const QUESTIONS: &[QuestionSpec] = &[
    QuestionSpec {
        id: "aroma",
        text: "What aroma stands out most in the dry grounds?",
        options: &[
            ("Floral", "floral"),
            ("Fruity", "fruity"),
            ("Nutty", "nutty"),
            ("Chocolate", "chocolate"),
        ],
    },
    QuestionSpec {
        id: "acidity",
        text: "How would you describe the acidity in the cup?",
        options: &[
            ("Bright", "bright"),
            ("Balanced", "balanced"),
            ("Mellow", "mellow"),
        ],
    },
    QuestionSpec {
        id: "body",
        text: "How heavy does the coffee feel on your tongue?",
        options: &[("Light", "light"), ("Medium", "medium"), ("Full", "full")],
    },
    QuestionSpec {
        id: "finish",
        text: "What is the aftertaste like?",
        options: &[
            ("Clean", "clean"),
            ("Lingering", "lingering"),
            ("Sweet", "sweet"),
        ],
    },
];

/// Keyword rules for the goal flow; the first keyword found in the goal wins.
/// "stronger" is listed before "strong" so it is not shadowed.
const GOAL_RULES: &[(&str, &str, &str, &str)] = &[
    (
        "bitter",
        "grindSize",
        "one step coarser",
        "Bitterness usually means over-extraction; a coarser grind slows it down.",
    ),
    (
        "sour",
        "grindSize",
        "one step finer",
        "Sourness points to under-extraction; a finer grind pulls more out of the grounds.",
    ),
    (
        "acidic",
        "grindSize",
        "one step finer",
        "Sharp acidity fades as extraction increases; try a finer grind.",
    ),
    (
        "stronger",
        "coffeeWeight",
        "+2g",
        "More coffee at the same water weight raises strength without changing extraction much.",
    ),
    (
        "weak",
        "coffeeWeight",
        "+2g",
        "A weak cup wants a higher dose; add coffee before touching anything else.",
    ),
    (
        "watery",
        "coffeeWeight",
        "+2g",
        "A watery cup wants a higher dose; add coffee before touching anything else.",
    ),
    (
        "strong",
        "waterWeight",
        "+20g",
        "If the cup is too intense, stretch the same dose with more water.",
    ),
];

/// The next unanswered question in the flow, or `None` when the
/// questionnaire is complete. Unknown answer ids are ignored.
pub fn next_question(answers: &[Answer]) -> Option<Question> {
    QUESTIONS
        .iter()
        .find(|spec| !answers.iter().any(|a| a.id == spec.id))
        .map(|spec| Question {
            question_id: spec.id,
            text: spec.text,
            options: spec
                .options
                .iter()
                .map(|(label, value)| QuestionOption { label, value })
                .collect(),
        })
}

fn answer_value<'a>(answers: &'a [Answer], id: &str) -> Option<&'a str> {
    answers
        .iter()
        .find(|a| a.id == id)
        .map(|a| a.value.as_str())
}

/// Turn a completed questionnaire into a coffee suggestion.
pub fn tasting_recommendation(
    answers: &[Answer],
    context: Option<&TastingContext>,
) -> Recommendation {
    let aroma = answer_value(answers, "aroma").unwrap_or("chocolate");
    let acidity = answer_value(answers, "acidity").unwrap_or("balanced");
    let body = answer_value(answers, "body").unwrap_or("medium");
    let finish = answer_value(answers, "finish").unwrap_or("clean");

    let suggestion = match (aroma, acidity) {
        ("floral", "bright") => "a washed Ethiopian Yirgacheffe",
        ("floral", _) => "a light-roast Ethiopian heirloom",
        ("fruity", "bright") => "a Kenyan AA filter roast",
        ("fruity", _) => "a natural-process Costa Rican",
        ("nutty", _) if body == "full" => "a Brazilian cerrado espresso roast",
        ("nutty", _) => "a medium-roast Colombian",
        ("chocolate", _) if finish == "sweet" => "a honey-process Guatemalan",
        ("chocolate", _) => "a classic Sumatran dark roast",
        _ => "a balanced medium-roast blend",
    };

    let mut explanation = format!(
        "You picked {aroma} aroma, {acidity} acidity, {body} body and a {finish} finish, \
         which maps to {suggestion}."
    );
    if let Some(method) = context.and_then(|c| c.brew_method.as_deref()) {
        explanation.push_str(&format!(" It should suit your {method} well."));
    }

    Recommendation {
        change: Change {
            variable: "coffee",
            delta: format!("try {suggestion}"),
        },
        explanation,
    }
}

/// Map a free-text brewing goal onto one concrete adjustment.
pub fn brew_adjustment(goal: &str, brew_method: Option<&str>) -> Recommendation {
    let normalized = goal.to_lowercase();
    let (variable, delta, reason) = GOAL_RULES
        .iter()
        .find(|(keyword, _, _, _)| normalized.contains(keyword))
        .map(|(_, variable, delta, reason)| (*variable, *delta, *reason))
        .unwrap_or((
            "brewTime",
            "+15s",
            "Nothing in the goal matched a known fix, so extend the brew slightly and retaste.",
        ));

    let explanation = match brew_method {
        Some(method) => format!("For your {method}: {reason}"),
        None => reason.to_string(),
    };

    Recommendation {
        change: Change {
            variable,
            delta: delta.to_string(),
        },
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(id: &str, value: &str) -> Answer {
        Answer {
            id: id.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn first_question_is_aroma() {
        let question = next_question(&[]).unwrap();
        assert_eq!(question.question_id, "aroma");
        assert!(!question.options.is_empty());
    }

    #[test]
    fn acidity_follows_aroma() {
        let answers = vec![answer("aroma", "floral")];
        assert_eq!(next_question(&answers).unwrap().question_id, "acidity");
    }

    #[test]
    fn unknown_answer_ids_are_ignored() {
        let answers = vec![answer("mystery", "value")];
        assert_eq!(next_question(&answers).unwrap().question_id, "aroma");
    }

    #[test]
    fn complete_flow_yields_no_question() {
        let answers = vec![
            answer("aroma", "floral"),
            answer("acidity", "bright"),
            answer("body", "light"),
            answer("finish", "clean"),
        ];
        assert!(next_question(&answers).is_none());
    }

    #[test]
    fn tasting_summary_is_deterministic() {
        let answers = vec![
            answer("aroma", "floral"),
            answer("acidity", "bright"),
            answer("body", "light"),
            answer("finish", "clean"),
        ];
        let first = tasting_recommendation(&answers, None);
        let second = tasting_recommendation(&answers, None);
        assert_eq!(first.change.delta, second.change.delta);
        assert!(first.change.delta.contains("Yirgacheffe"));
    }

    #[test]
    fn tasting_summary_mentions_brew_method() {
        let answers = vec![answer("aroma", "nutty")];
        let context = TastingContext {
            brew_method: Some("french press".to_string()),
        };
        let rec = tasting_recommendation(&answers, Some(&context));
        assert!(rec.explanation.contains("french press"));
    }

    #[test]
    fn bitter_goal_coarsens_the_grind() {
        let rec = brew_adjustment("my cup is too bitter", None);
        assert_eq!(rec.change.variable, "grindSize");
        assert!(rec.change.delta.contains("coarser"));
    }

    #[test]
    fn sour_goal_tightens_the_grind() {
        let rec = brew_adjustment("it tastes sour and thin", None);
        assert_eq!(rec.change.variable, "grindSize");
        assert!(rec.change.delta.contains("finer"));
    }

    #[test]
    fn stronger_goal_increases_dose_not_water() {
        let rec = brew_adjustment("I want it stronger", None);
        assert_eq!(rec.change.variable, "coffeeWeight");
    }

    #[test]
    fn too_strong_goal_adds_water() {
        let rec = brew_adjustment("way too strong for me", None);
        assert_eq!(rec.change.variable, "waterWeight");
    }

    #[test]
    fn unmatched_goal_falls_back_to_brew_time() {
        let rec = brew_adjustment("make it taste purple", None);
        assert_eq!(rec.change.variable, "brewTime");
    }

    #[test]
    fn goal_explanation_includes_method() {
        let rec = brew_adjustment("too bitter", Some("V60"));
        assert!(rec.explanation.starts_with("For your V60"));
    }
}
