use crate::data::types::{BookTop, Outcome, OutcomeKind, PriceSource, Quote, Side};
use crate::outcomes::{clamp_unit, DEFAULT_PRICE};

/// Bid is placed this fraction below ask when it has to be derived.
const BID_DISCOUNT: f64 = 0.98;
/// Smallest price step after rounding to 4 decimals.
const TICK: f64 = 0.0001;

/// What the caller asked to price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Token { token_id: String, side: Side },
    Index { index: usize, side: Side },
}

impl Selector {
    /// Build a selector from raw query values. An explicit token id wins;
    /// a missing or malformed index means 0.
    pub fn from_params(
        token_id: Option<&str>,
        outcome_index: Option<&str>,
        side: Option<&str>,
    ) -> Self {
        let side = parse_side(side);

        match token_id.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token_id) => Selector::Token {
                token_id: token_id.to_string(),
                side,
            },
            None => Selector::Index {
                index: parse_index(outcome_index),
                side,
            },
        }
    }
}

fn parse_side(raw: Option<&str>) -> Side {
    match raw {
        Some(s) if s.trim().eq_ignore_ascii_case("no") => Side::No,
        _ => Side::Yes,
    }
}

/// Digit-only values too large for `usize` saturate so they clamp to the
/// last outcome; negative or malformed values become 0.
fn parse_index(raw: Option<&str>) -> usize {
    let s = match raw.map(str::trim) {
        Some(s) => s.strip_prefix('+').unwrap_or(s),
        None => return 0,
    };

    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    s.parse::<usize>().unwrap_or(usize::MAX)
}

/// The outcome and token a selector points at.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub outcome: Option<&'a Outcome>,
    pub outcome_index: Option<usize>,
    pub token_id: Option<String>,
    pub side: Side,
}

pub fn select<'a>(outcomes: &'a [Outcome], selector: &Selector) -> Selection<'a> {
    match selector {
        Selector::Token { token_id, side } => {
            let found = outcomes
                .iter()
                .enumerate()
                .find(|(_, o)| o.holds_token(token_id));

            let side = match found {
                Some((_, o)) if o.no_token_id.as_deref() == Some(token_id.as_str()) => Side::No,
                _ => *side,
            };

            Selection {
                outcome: found.map(|(_, o)| o),
                outcome_index: found.map(|(i, _)| i),
                token_id: Some(token_id.clone()),
                side,
            }
        }
        Selector::Index { index, side } => {
            if outcomes.is_empty() {
                return Selection {
                    outcome: None,
                    outcome_index: None,
                    token_id: None,
                    side: *side,
                };
            }

            let index = (*index).min(outcomes.len() - 1);
            let outcome = &outcomes[index];

            let token_id = match side {
                Side::No if outcome.no_token_id.is_some() => outcome.no_token_id.clone(),
                _ => outcome.yes_token_id.clone().or_else(|| outcome.token_id.clone()),
            };

            Selection {
                outcome: Some(outcome),
                outcome_index: Some(index),
                token_id,
                side: *side,
            }
        }
    }
}

/// Price derived from event metadata, used when the book has nothing.
pub fn fallback_mid(outcome: Option<&Outcome>, side: Side) -> f64 {
    match (outcome, side) {
        (Some(o), Side::No) => o.no_price.unwrap_or(o.price),
        (Some(o), Side::Yes) => o.price,
        (None, _) => DEFAULT_PRICE,
    }
}

/// Turn a book top (if any) into a bid/ask pair with bid strictly below ask.
pub fn settle_prices(top: Option<BookTop>, mid: f64) -> (f64, f64, PriceSource) {
    let finite = |v: Option<f64>| v.filter(|p| p.is_finite());
    let (bid, ask) = top
        .map(|t| (finite(t.bid), finite(t.ask)))
        .unwrap_or((None, None));

    let (mut bid, mut ask, source) = match (bid, ask) {
        (None, None) => fallback_pair(mid),
        (Some(b), Some(a)) if b == 0.0 && a == 0.0 => fallback_pair(mid),
        (b, a) => {
            let ask = clamp_unit(a.unwrap_or(mid));
            let bid = clamp_unit(b.unwrap_or(ask * BID_DISCOUNT));
            (bid, ask, PriceSource::Orderbook)
        }
    };

    if bid >= ask {
        bid = clamp_unit(ask * BID_DISCOUNT);
    }

    ask = round_to(ask, 4).max(TICK);
    bid = round_to(bid, 4);
    if bid >= ask {
        bid = round_to((ask - TICK).max(0.0), 4);
    }

    (bid, ask, source)
}

fn fallback_pair(mid: f64) -> (f64, f64, PriceSource) {
    (
        clamp_unit(mid * BID_DISCOUNT),
        clamp_unit(mid),
        PriceSource::Fallback,
    )
}

/// Assemble the quote for a selection.
pub fn build_quote(
    slug: &str,
    outcomes: &[Outcome],
    selection: &Selection<'_>,
    top: Option<BookTop>,
) -> Quote {
    let mid = fallback_mid(selection.outcome, selection.side);
    let (bid, ask, source) = settle_prices(top, mid);

    let multi = outcomes
        .first()
        .map(|o| o.kind == OutcomeKind::MultiOutcome)
        .unwrap_or(false);
    let volume = if multi {
        outcomes[0].volume
    } else {
        selection.outcome.map(|o| o.volume).unwrap_or(0.0)
    };

    Quote {
        slug: slug.to_string(),
        token_id: selection.token_id.clone(),
        outcome_index: selection.outcome_index,
        side: selection.side,
        bid,
        ask,
        spread: round_to((ask - bid) * 100.0, 2),
        volume,
        source,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
