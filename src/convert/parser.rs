//! Parser for transcript-level HGVS descriptions
//!
//! Accepts `c.` and `n.` descriptions with an optional accession prefix,
//! e.g. `NM_000001.1:c.88+2T>G` or `n.12_13insAT`.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, opt, value},
    sequence::preceded,
    IResult, Parser,
};

use crate::coords::{Anchor, CoordinateSystem, TxPosition};
use crate::error::CsqError;

/// A nucleic-acid edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NaEdit {
    /// `A>G`
    Substitution { reference: char, alternate: char },
    /// `del`, `delAT` or `del2`
    Deletion {
        sequence: Option<String>,
        length: Option<u64>,
    },
    /// `dup` or `dupAT`
    Duplication { sequence: Option<String> },
    /// `insAT`
    Insertion { sequence: String },
    /// `delinsAT` or `delGCinsAT`
    Delins {
        deleted: Option<String>,
        inserted: String,
    },
}

/// A parsed description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HgvsDescription {
    pub accession: Option<String>,
    pub system: CoordinateSystem,
    pub start: TxPosition,
    pub end: Option<TxPosition>,
    pub edit: NaEdit,
}

/// Parse a description, reporting failures as [`CsqError::InvalidHgvs`]
pub fn parse_description(input: &str) -> Result<HgvsDescription, CsqError> {
    let trimmed = input.trim();
    let (accession, body) = match trimmed.split_once(':') {
        Some((accession, body)) => (Some(accession.to_string()), body),
        None => (None, trimmed),
    };

    match all_consuming(description).parse(body) {
        Ok((_, mut parsed)) => {
            parsed.accession = accession;
            Ok(parsed)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(CsqError::InvalidHgvs {
            input: input.to_string(),
            msg: if e.input.is_empty() {
                "unexpected end of input".to_string()
            } else {
                format!("cannot parse '{}'", e.input)
            },
        }),
        Err(nom::Err::Incomplete(_)) => Err(CsqError::InvalidHgvs {
            input: input.to_string(),
            msg: "incomplete description".to_string(),
        }),
    }
}

fn description(input: &str) -> IResult<&str, HgvsDescription> {
    let (input, system) = alt((
        value(CoordinateSystem::Coding, tag("c.")),
        value(CoordinateSystem::NonCoding, tag("n.")),
    ))
    .parse(input)?;
    let (input, start) = parse_position(input, system)?;
    let (input, end) = opt(preceded(char('_'), |i| parse_position(i, system))).parse(input)?;
    let (input, edit) = parse_edit(input)?;
    Ok((
        input,
        HgvsDescription {
            accession: None,
            system,
            start,
            end,
            edit,
        },
    ))
}

/// Parse a positive integer; HGVS has no position 0
fn parse_number(input: &str) -> IResult<&str, u64> {
    let (remaining, digits) = digit1.parse(input)?;
    let value: u64 = digits.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    if value == 0 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((remaining, value))
}

fn parse_offset(input: &str) -> IResult<&str, i64> {
    let (input, sign) = one_of("+-").parse(input)?;
    let (input, value) = parse_number(input)?;
    let value = value as i64;
    Ok((input, if sign == '-' { -value } else { value }))
}

fn parse_position(input: &str, system: CoordinateSystem) -> IResult<&str, TxPosition> {
    let (input, marker) = opt(one_of("-*")).parse(input)?;
    let (input, n) = parse_number(input)?;
    let (input, offset) = opt(parse_offset).parse(input)?;

    let signed = n as i64;
    let anchor = match (system, marker) {
        (CoordinateSystem::Coding, None) => Anchor::Cds(signed),
        (CoordinateSystem::Coding, Some('-')) => Anchor::Cds(-signed),
        (CoordinateSystem::Coding, Some(_)) => Anchor::Utr3(n),
        (CoordinateSystem::NonCoding, None) => Anchor::Tx(signed),
        (CoordinateSystem::NonCoding, Some('-')) => Anchor::Tx(-signed),
        (CoordinateSystem::NonCoding, Some(_)) => Anchor::TxDownstream(n),
    };
    Ok((input, TxPosition::with_offset(anchor, offset.unwrap_or(0))))
}

fn parse_sequence(input: &str) -> IResult<&str, String> {
    let (input, seq) =
        take_while1(|c: char| matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'N'))
            .parse(input)?;
    Ok((input, seq.to_ascii_uppercase()))
}

fn parse_base(input: &str) -> IResult<&str, char> {
    let (input, base) = one_of("ACGTNacgtn").parse(input)?;
    Ok((input, base.to_ascii_uppercase()))
}

fn parse_edit(input: &str) -> IResult<&str, NaEdit> {
    alt((
        parse_delins,
        parse_deletion,
        parse_duplication,
        parse_insertion,
        parse_substitution,
    ))
    .parse(input)
}

fn parse_substitution(input: &str) -> IResult<&str, NaEdit> {
    let (input, reference) = parse_base(input)?;
    let (input, _) = char('>').parse(input)?;
    let (input, alternate) = parse_base(input)?;
    Ok((
        input,
        NaEdit::Substitution {
            reference,
            alternate,
        },
    ))
}

fn parse_delins(input: &str) -> IResult<&str, NaEdit> {
    let (input, _) = tag("del").parse(input)?;
    let (input, deleted) = opt(parse_sequence).parse(input)?;
    let (input, _) = tag("ins").parse(input)?;
    let (input, inserted) = parse_sequence(input)?;
    Ok((input, NaEdit::Delins { deleted, inserted }))
}

fn parse_deletion(input: &str) -> IResult<&str, NaEdit> {
    let (input, _) = tag("del").parse(input)?;
    let (input, sequence) = opt(parse_sequence).parse(input)?;
    let (input, length) = match sequence {
        Some(_) => (input, None),
        None => opt(parse_number).parse(input)?,
    };
    Ok((input, NaEdit::Deletion { sequence, length }))
}

fn parse_duplication(input: &str) -> IResult<&str, NaEdit> {
    let (input, _) = tag("dup").parse(input)?;
    let (input, sequence) = opt(parse_sequence).parse(input)?;
    Ok((input, NaEdit::Duplication { sequence }))
}

fn parse_insertion(input: &str) -> IResult<&str, NaEdit> {
    let (input, _) = tag("ins").parse(input)?;
    let (input, sequence) = parse_sequence(input)?;
    Ok((input, NaEdit::Insertion { sequence }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cds(n: i64, offset: i64) -> TxPosition {
        TxPosition::with_offset(Anchor::Cds(n), offset)
    }

    #[test]
    fn test_parse_substitution_with_accession() {
        let parsed = parse_description("NM_000001.1:c.88+2T>G").unwrap();
        assert_eq!(parsed.accession.as_deref(), Some("NM_000001.1"));
        assert_eq!(parsed.system, CoordinateSystem::Coding);
        assert_eq!(parsed.start, cds(88, 2));
        assert_eq!(parsed.end, None);
        assert_eq!(
            parsed.edit,
            NaEdit::Substitution {
                reference: 'T',
                alternate: 'G'
            }
        );
    }

    #[rstest]
    #[case("c.-35+2", cds(-35, 2))]
    #[case("c.-1", cds(-1, 0))]
    #[case("c.123-10", cds(123, -10))]
    #[case("c.*22-37", TxPosition::with_offset(Anchor::Utr3(22), -37))]
    #[case("n.5", TxPosition::exonic(Anchor::Tx(5)))]
    #[case("n.*3", TxPosition::exonic(Anchor::TxDownstream(3)))]
    fn test_parse_positions(#[case] prefix: &str, #[case] expected: TxPosition) {
        let parsed = parse_description(&format!("{}del", prefix)).unwrap();
        assert_eq!(parsed.start, expected);
    }

    #[rstest]
    #[case("c.10del", NaEdit::Deletion { sequence: None, length: None })]
    #[case("c.10_11delAT", NaEdit::Deletion { sequence: Some("AT".into()), length: None })]
    #[case("c.10_11del2", NaEdit::Deletion { sequence: None, length: Some(2) })]
    #[case("c.10_11dup", NaEdit::Duplication { sequence: None })]
    #[case("c.10dupa", NaEdit::Duplication { sequence: Some("A".into()) })]
    #[case("c.10_11insGGT", NaEdit::Insertion { sequence: "GGT".into() })]
    #[case("c.10delinsTT", NaEdit::Delins { deleted: None, inserted: "TT".into() })]
    #[case("c.10_11delCAinsTT", NaEdit::Delins { deleted: Some("CA".into()), inserted: "TT".into() })]
    fn test_parse_edits(#[case] input: &str, #[case] expected: NaEdit) {
        assert_eq!(parse_description(input).unwrap().edit, expected);
    }

    #[test]
    fn test_parse_range() {
        let parsed = parse_description("c.-3_*2del").unwrap();
        assert_eq!(parsed.start, cds(-3, 0));
        assert_eq!(parsed.end, Some(TxPosition::exonic(Anchor::Utr3(2))));
    }

    #[rstest]
    #[case("g.12345A>G")]
    #[case("c.0A>G")]
    #[case("c.10A>")]
    #[case("c.10ins")]
    #[case("c.10_12delinsXYZ")]
    #[case("c.10A>Gfoo")]
    #[case("")]
    fn test_parse_errors(#[case] input: &str) {
        let err = parse_description(input).unwrap_err();
        assert!(matches!(err, CsqError::InvalidHgvs { .. }));
    }
}
