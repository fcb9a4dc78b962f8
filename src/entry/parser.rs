use thiserror::Error;

/// The message does not contain a recognizable puzzle result.
/// Callers treat this as unrelated chatter, never as a user-facing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("message does not contain a puzzle result")]
pub struct NotASubmission;

/// Extracts the normalized score from raw submission text.
///
/// A submission looks like a puzzle-identifier label followed by a result
/// token: a digit or the literal `X`, immediately followed by `/6`
/// ("Wordle 742 3/6", "Wordle 743 X/6"). `X` maps to 0.
///
/// The score is always the single character immediately preceding `/6`, so
/// multi-digit puzzle numbers ("Wordle 1234 ...") can never be mistaken for
/// it. Digits above 6 still parse here; range validation is the registry's
/// job so that out-of-range scores produce a user-facing rejection instead
/// of silence.
pub fn parse_score(text: &str) -> Result<i32, NotASubmission> {
    let mut search_from = 0;

    while let Some(relative) = text[search_from..].find("/6") {
        let index = search_from + relative;
        let head = &text[..index];

        if let Some(token) = head.chars().last() {
            let score = match token {
                'X' => Some(0),
                digit if digit.is_ascii_digit() => Some(i32::from(digit as u8 - b'0')),
                _ => None,
            };

            if let Some(score) = score {
                // A bare "3/6" with no label in front is chatter, not a result.
                if head[..index - token.len_utf8()].trim().is_empty() {
                    return Err(NotASubmission);
                }
                return Ok(score);
            }
        }

        search_from = index + 2;
    }

    Err(NotASubmission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Wordle 742 1/6", 1)]
    #[case("Wordle 742 2/6", 2)]
    #[case("Wordle 742 3/6", 3)]
    #[case("Wordle 742 4/6", 4)]
    #[case("Wordle 742 5/6", 5)]
    #[case("Wordle 742 6/6", 6)]
    fn parses_each_guess_count(#[case] text: &str, #[case] expected: i32) {
        assert_eq!(parse_score(text), Ok(expected));
    }

    #[test]
    fn failed_solve_maps_to_zero() {
        assert_eq!(parse_score("Wordle 743 X/6"), Ok(0));
    }

    #[test]
    fn multi_digit_puzzle_number_does_not_shadow_the_score() {
        assert_eq!(parse_score("Wordle 1234 5/6"), Ok(5));
    }

    #[test]
    fn out_of_range_digit_still_parses() {
        // The registry rejects it with INVALID_SCORE; the parser must not
        // swallow it as chatter.
        assert_eq!(parse_score("Wordle 742 9/6"), Ok(9));
    }

    #[test]
    fn trailing_grid_after_result_is_ignored() {
        assert_eq!(parse_score("Wordle 742 3/6\n⬛🟨⬛⬛⬛"), Ok(3));
    }

    #[rstest]
    #[case("hello there")]
    #[case("Wordle 742")]
    #[case("what does /6 even mean")]
    #[case("")]
    fn chatter_is_not_a_submission(#[case] text: &str) {
        assert_eq!(parse_score(text), Err(NotASubmission));
    }

    #[test]
    fn bare_result_without_label_is_not_a_submission() {
        assert_eq!(parse_score("3/6"), Err(NotASubmission));
    }
}
