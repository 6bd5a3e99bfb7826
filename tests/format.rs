mod common;

use common::classifier;
use dialplan::parser::Either;
use dialplan::{FormatType, PhoneNumber};
use rstest::rstest;

fn number(e164: &str) -> PhoneNumber {
    e164.parse().unwrap()
}

#[rstest]
#[case("+16502123456", FormatType::National, "(650) 212-3456")]
#[case("+16502123456", FormatType::International, "+1 650-212-3456")]
#[case("+442087438000", FormatType::National, "020 8743 8000")]
#[case("+442087438000", FormatType::International, "+44 20 8743 8000")]
#[case("+5491133295195", FormatType::National, "011 15-3329-5195")]
#[case("+5491133295195", FormatType::International, "+54 9 11 3329-5195")]
fn formats(#[case] e164: &str, #[case] format: FormatType, #[case] expected: &str) {
    assert_eq!(expected, classifier().format(&number(e164), format));
}

#[test]
fn numbers_without_an_assigned_format_render_as_bare_digits() {
    // Valid GB mobile, but only the 2xx specifier exists in the test data,
    // so the specifier is discarded in favour of the plain digits.
    assert_eq!(
        "7691123456",
        classifier().format(&number("+447691123456"), FormatType::National)
    );
    assert_eq!(
        "+44 7691123456",
        classifier().format(&number("+447691123456"), FormatType::International)
    );
}

#[test]
fn valid_short_numbers_do_not_borrow_longer_formats() {
    // Seven-digit NANPA numbers are valid but carry no format of their
    // own; the ten-digit specifier must not be applied to them.
    assert_eq!(
        "6502123",
        classifier().format(&number("+16502123"), FormatType::National)
    );
}

#[test]
fn missing_national_specifiers_fall_back_to_international() {
    // The world service has no specifiers at all, so both fallbacks end at
    // the decimal rendering.
    assert_eq!(
        "12345678",
        classifier().format(&number("+80012345678"), FormatType::National)
    );
    assert_eq!(
        "+800 12345678",
        classifier().format(&number("+80012345678"), FormatType::International)
    );
}

#[test]
fn invalid_numbers_still_render_deterministically() {
    // Not a valid NANPA number, but of a possible length: the validity
    // matcher is no better informed than the specifier's, so the specifier
    // is kept and applied best-effort.
    assert_eq!(
        "+1 050-212-3456",
        classifier().format(&number("+10502123456"), FormatType::International)
    );
}

#[test]
fn parse_then_format_round_trip() {
    let parsed = classifier()
        .parse_leniently("0 11 15-3329-5195", Some(Either::Left("AR")))
        .unwrap();

    assert_eq!(
        "+54 9 11 3329-5195",
        classifier().format(&parsed, FormatType::International)
    );

    let parsed = classifier()
        .parse_leniently("(020) 8743 8000", Some(Either::Left("GB")))
        .unwrap();

    assert_eq!(
        "020 8743 8000",
        classifier().format(&parsed, FormatType::National)
    );
}

#[test]
fn international_output_preserves_every_digit() {
    for e164 in ["+16502123456", "+442087438000", "+5491133295195", "+80012345678"] {
        let parsed = number(e164);
        let formatted = classifier().format(&parsed, FormatType::International);

        assert!(formatted.starts_with(&format!("+{} ", parsed.code())));

        let digits: String = formatted.chars().filter(char::is_ascii_digit).collect();

        assert_eq!(
            format!("{}{}", parsed.code(), parsed.national()),
            digits,
            "digits lost formatting {}",
            e164
        );
    }
}
