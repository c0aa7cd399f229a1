//! Filter rule parser. Rules are whitespace separated, so one rule per line
//! and several rules on one line both work
use super::*;

#[derive(PartialEq, PartialOrd, Debug)]
pub(super) enum ErrorKind<'s> {
    Command(&'s str),
    Expected(&'static str),
    Conversion,
}

fn take_while<'s, F: Fn(char) -> bool>(input: &'s str, pred: F) -> (&'s str, &'s str) {
    let end = input
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map(|(ix, _)| ix)
        .unwrap_or_else(|| input.len());
    (&input[..end], &input[end..])
}

#[inline]
fn take_whitespace(input: &str) -> &str {
    input.trim_start_matches(char::is_whitespace)
}

#[inline]
fn take_word(input: &str) -> (&str, &str) {
    take_while(input, |ch| !ch.is_whitespace())
}

fn expect<'s>(input: &'s str, m: &'static str) -> Option<&'s str> {
    input.strip_prefix(m)
}

/// Read `= value` and return the value and the remaining input
fn take_assignment(input: &str) -> Result<(&str, &str), ErrorKind> {
    let input = take_whitespace(
        expect(take_whitespace(input), "=").ok_or(ErrorKind::Expected("="))?,
    );
    let (value, rest) = take_word(input);
    if value.is_empty() {
        return Err(ErrorKind::Expected("value"));
    }
    Ok((value, rest))
}

fn parse_psm_filter(input: &str) -> Result<(PsmFilter, &str), ErrorKind> {
    let (cmd, input) = take_while(take_whitespace(input), |ch| ch.is_alphanumeric() || ch == '_');
    match cmd {
        "confidence" => {
            let input = take_whitespace(input);
            let (direction, input) = if let Some(rest) = expect(input, "<") {
                (ScoreDirection::Lower, rest)
            } else if let Some(rest) = expect(input, ">") {
                (ScoreDirection::Higher, rest)
            } else {
                return Err(ErrorKind::Expected("< or >"));
            };
            let (num, rest) = take_word(take_whitespace(input));
            Ok((
                PsmFilter::Confidence {
                    threshold: num.parse::<f64>().map_err(|_| ErrorKind::Conversion)?,
                    direction,
                },
                rest,
            ))
        }
        "exclude_protein" => {
            let (pat, rest) = take_assignment(input)?;
            Ok((PsmFilter::ExcludeProtein(pat.into()), rest))
        }
        "exclude_sequence" => {
            let (pat, rest) = take_assignment(input)?;
            Ok((PsmFilter::SequenceExclude(pat.into()), rest))
        }
        _ => Err(ErrorKind::Command(cmd)),
    }
}

pub(super) fn parse(mut input: &str) -> Result<Filter, ErrorKind> {
    let mut filter = Filter::default();
    loop {
        input = take_whitespace(input);
        if input.is_empty() {
            break;
        }
        let (filt, rest) = parse_psm_filter(input)?;
        filter = filter.add_psm_filter(filt);
        input = rest;
    }
    Ok(filter)
}
