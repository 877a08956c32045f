use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::{OPTION_COUNT, Operation, Question, QuestionError, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A generation failure is a programming defect, never a runtime condition:
/// the whole batch is aborted rather than emitting an incorrect question.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GenerateError {
    #[error(
        "digit-complement mismatch for {base} - {subtrahend}: rule yields {computed}, expected {expected}"
    )]
    ComplementMismatch {
        base: u64,
        subtrahend: u64,
        computed: u64,
        expected: u64,
    },

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── POINT VALUES ──────────────────────────────────────────────────────────────
//

/// Points per correct answer for addition and subtraction questions.
pub const BASIC_QUESTION_POINTS: u32 = 20;
/// Points per correct answer for multiplication and division questions.
pub const ADVANCED_QUESTION_POINTS: u32 = 25;

/// Bases the subtraction shortcut works against.
const SUBTRACTION_BASES: [u64; 3] = [100, 1_000, 10_000];

//
// ─── QUESTION GENERATION ───────────────────────────────────────────────────────
//

/// Generates `count` questions for the given operation family.
///
/// Deterministic given a fixed random source; every answer is reproducible
/// by re-running the stated arithmetic rule on the displayed operands.
///
/// # Errors
///
/// Returns `GenerateError` if a generated question fails its exactness
/// check; the batch is aborted in that case.
pub fn generate_questions(
    operation: Operation,
    count: u32,
    rng: &mut impl Rng,
) -> Result<Vec<Question>, GenerateError> {
    match operation {
        Operation::Subtraction => subtraction_questions(count, rng),
        Operation::Addition => addition_questions(count, rng),
        Operation::Multiplication => multiplication_questions(count, rng),
        Operation::Division => division_questions(count, rng),
    }
}

/// Subtraction via "all from 9 and the last from 10": complement every digit
/// of the subtrahend to 9 and the final digit to 10, against bases 100,
/// 1000 and 10000 in rotation.
fn subtraction_questions(count: u32, rng: &mut impl Rng) -> Result<Vec<Question>, GenerateError> {
    let mut questions = Vec::with_capacity(count as usize);
    for i in 1..=count as usize {
        let base = SUBTRACTION_BASES[i % SUBTRACTION_BASES.len()];
        // Bounded away from trivial single-digit cases. A trailing zero digit
        // has no 10-complement, so nudge off multiples of ten.
        let mut subtrahend = rng.random_range(11..base - 10);
        if subtrahend % 10 == 0 {
            subtrahend += 1;
        }

        let correct = complement_from_base(base, subtrahend)?;
        log::debug!("subtraction question: {base} - {subtrahend} = {correct}");

        let prompt = format!("{base} - {subtrahend} = ?");
        let explanation = format!(
            "Using \"All from 9 and the last from 10\": compute complements digit-wise to {base}."
        );
        questions.push(build_question(
            QuestionId::sequenced("sub", i),
            prompt,
            correct,
            explanation,
            BASIC_QUESTION_POINTS,
            rng,
        )?);
    }
    Ok(questions)
}

fn addition_questions(count: u32, rng: &mut impl Rng) -> Result<Vec<Question>, GenerateError> {
    let mut questions = Vec::with_capacity(count as usize);
    for i in 1..=count as usize {
        let a: u64 = rng.random_range(100..1_000);
        let b: u64 = rng.random_range(100..1_000);
        questions.push(build_question(
            QuestionId::sequenced("add", i),
            format!("{a} + {b} = ?"),
            a + b,
            "Add vertically and carry over when sum exceeds 9.",
            BASIC_QUESTION_POINTS,
            rng,
        )?);
    }
    Ok(questions)
}

fn multiplication_questions(
    count: u32,
    rng: &mut impl Rng,
) -> Result<Vec<Question>, GenerateError> {
    let mut questions = Vec::with_capacity(count as usize);
    for i in 1..=count as usize {
        let a: u64 = rng.random_range(10..100);
        let b: u64 = rng.random_range(10..100);
        questions.push(build_question(
            QuestionId::sequenced("mul", i),
            format!("{a} × {b} = ?"),
            a * b,
            "Use Urdhva-Tiryagbhyam (vertical and crosswise) to compute partials and sum.",
            ADVANCED_QUESTION_POINTS,
            rng,
        )?);
    }
    Ok(questions)
}

/// The quotient is chosen first and the dividend constructed from it, so
/// division is always exact.
fn division_questions(count: u32, rng: &mut impl Rng) -> Result<Vec<Question>, GenerateError> {
    let mut questions = Vec::with_capacity(count as usize);
    for i in 1..=count as usize {
        let divisor: u64 = rng.random_range(2..10);
        let quotient: u64 = rng.random_range(10..100);
        let dividend = divisor * quotient;
        questions.push(build_question(
            QuestionId::sequenced("div", i),
            format!("{dividend} ÷ {divisor} = ?"),
            quotient,
            "Apply Paravartya Yojayet or standard exact division since it divides evenly here.",
            ADVANCED_QUESTION_POINTS,
            rng,
        )?);
    }
    Ok(questions)
}

fn build_question(
    id: QuestionId,
    prompt: String,
    correct: u64,
    explanation: impl Into<String>,
    points: u32,
    rng: &mut impl Rng,
) -> Result<Question, GenerateError> {
    let options = answer_choices(correct, rng);
    Ok(Question::new(
        id,
        prompt,
        options,
        correct.to_string(),
        explanation,
        points,
    )?)
}

//
// ─── DIGIT COMPLEMENT ──────────────────────────────────────────────────────────
//

/// Computes `base - subtrahend` purely via the digit-complement rule: the
/// subtrahend is zero-padded to one digit less than the base, every digit
/// but the last is complemented to 9, the last to 10.
///
/// # Errors
///
/// Returns `GenerateError::ComplementMismatch` if the rule does not
/// reproduce the direct arithmetic result — the exactness check that makes
/// the question pedagogically sound.
pub fn complement_from_base(base: u64, subtrahend: u64) -> Result<u64, GenerateError> {
    let width = (base.ilog10()) as usize;
    let padded = format!("{subtrahend:0width$}");

    let mut computed: u64 = 0;
    let last = padded.len() - 1;
    for (idx, ch) in padded.chars().enumerate() {
        let digit = u64::from(ch.to_digit(10).unwrap_or(0));
        let comp = if idx == last { 10 - digit } else { 9 - digit };
        computed = computed * 10 + comp;
    }

    let expected = base - subtrahend;
    if computed != expected {
        return Err(GenerateError::ComplementMismatch {
            base,
            subtrahend,
            computed,
            expected,
        });
    }
    Ok(computed)
}

//
// ─── DISTRACTOR SYNTHESIS ──────────────────────────────────────────────────────
//

/// Nearby-value deltas tried in priority order when building distractors.
const DISTRACTOR_DELTAS: [i64; 10] = [1, -1, 10, -10, 2, -2, 5, -5, 20, -20];

/// Builds exactly four distinct non-negative answer choices around `correct`,
/// including `correct` itself, shuffled so the correct position carries no
/// bias.
#[must_use]
pub fn answer_choices(correct: u64, rng: &mut impl Rng) -> Vec<String> {
    let mut values: Vec<u64> = vec![correct];

    for delta in DISTRACTOR_DELTAS {
        if values.len() >= OPTION_COUNT {
            break;
        }
        if let Some(v) = correct.checked_add_signed(delta) {
            if !values.contains(&v) {
                values.push(v);
            }
        }
    }

    // Only reachable for very small correct values; extend deterministically
    // by alternating +k, -k for growing k.
    let mut k: i64 = 1;
    while values.len() < OPTION_COUNT {
        let delta = if k % 2 == 0 { -k } else { k };
        if let Some(v) = correct.checked_add_signed(delta) {
            if !values.contains(&v) {
                values.push(v);
            }
        }
        k += 1;
    }

    values.truncate(OPTION_COUNT);
    let mut options: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
    options.shuffle(rng);
    options
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
