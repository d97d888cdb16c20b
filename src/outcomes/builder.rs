use tracing::debug;

use crate::data::types::{Event, Market, MarketSummary, Outcome, OutcomeKind, Shape};
use crate::error::ProxyError;
use crate::outcomes::shape::classify_shape;
use crate::outcomes::{clamp_unit, DEFAULT_PRICE};

/// Classify the event and build its outcome list.
///
/// Fails with `UnsupportedShape` when nothing in the event can be quoted.
pub fn build_outcomes(event: &Event) -> Result<(Shape, Vec<Outcome>), ProxyError> {
    let shape = classify_shape(&event.markets);

    let mut outcomes: Vec<Outcome> = match shape {
        Shape::SingleMarketMultiOutcome => multi_outcomes(&event.markets[0]),
        Shape::MarketPerOption => event
            .markets
            .iter()
            .enumerate()
            .filter_map(|(idx, market)| binary_outcome(idx, market))
            .collect(),
    };

    // Skipped markets leave gaps; the published index is the list position.
    for (position, outcome) in outcomes.iter_mut().enumerate() {
        outcome.index = position;
    }

    if outcomes.is_empty() {
        return Err(ProxyError::UnsupportedShape(format!(
            "Could not build outcomes from {} market(s)",
            event.markets.len()
        )));
    }

    debug!("Built {} outcomes as {:?}", outcomes.len(), shape);
    Ok((shape, outcomes))
}

fn multi_outcomes(market: &Market) -> Vec<Outcome> {
    let prices = market.prices();
    let tokens = market.token_ids();
    let volume = market.volume();

    market
        .labels()
        .into_iter()
        .enumerate()
        .map(|(i, name)| Outcome {
            index: i,
            name,
            price: price_at(&prices, Some(i)).map(clamp_unit).unwrap_or(DEFAULT_PRICE),
            no_price: None,
            token_id: token_at(&tokens, Some(i)),
            yes_token_id: None,
            no_token_id: None,
            volume,
            kind: OutcomeKind::MultiOutcome,
        })
        .collect()
}

/// Read one market as a yes/no option. Returns `None` when the market has
/// neither a readable price nor a token, since there is nothing to quote.
fn binary_outcome(idx: usize, market: &Market) -> Option<Outcome> {
    let labels = market.labels();
    let prices = market.prices();
    let tokens = market.token_ids();

    if prices.iter().all(Option::is_none) && tokens.iter().all(Option::is_none) {
        debug!("Market {} has no prices or tokens, skipping", idx);
        return None;
    }

    let (yes_pos, no_pos) = match (find_label(&labels, "yes"), find_label(&labels, "no")) {
        (Some(yes), Some(no)) => (Some(yes), Some(no)),
        // Unlabelled: assume [YES, NO] order
        _ => (Some(0), if prices.len() >= 2 { Some(1) } else { None }),
    };

    let yes_price = price_at(&prices, yes_pos).map(clamp_unit).unwrap_or(DEFAULT_PRICE);
    let no_price = price_at(&prices, no_pos)
        .map(clamp_unit)
        .unwrap_or_else(|| clamp_unit(1.0 - yes_price));

    let yes_token = token_at(&tokens, yes_pos);
    let no_token = token_at(&tokens, no_pos);

    let name = market
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Market {}", idx + 1));

    Some(Outcome {
        index: idx,
        name,
        price: yes_price,
        no_price: Some(no_price),
        token_id: yes_token.clone(),
        yes_token_id: yes_token,
        no_token_id: no_token,
        volume: market.volume(),
        kind: OutcomeKind::Binary,
    })
}

fn find_label(labels: &[String], wanted: &str) -> Option<usize> {
    labels
        .iter()
        .position(|l| l.trim().eq_ignore_ascii_case(wanted))
}

fn price_at(prices: &[Option<f64>], pos: Option<usize>) -> Option<f64> {
    pos.and_then(|i| prices.get(i).copied().flatten())
}

fn token_at(tokens: &[Option<String>], pos: Option<usize>) -> Option<String> {
    pos.and_then(|i| tokens.get(i).cloned().flatten())
}

/// Event-level summary: summed volume and the highest outcome price as the
/// representative mid. Ties keep the first outcome.
pub fn summarize(slug: &str, event: &Event, shape: Shape, outcomes: Vec<Outcome>) -> MarketSummary {
    let total_volume: f64 = event.markets.iter().map(Market::volume).sum();

    let mid_price = outcomes
        .iter()
        .fold(None::<f64>, |best, o| match best {
            Some(b) if b >= o.price => Some(b),
            _ => Some(o.price),
        })
        .unwrap_or(DEFAULT_PRICE);

    MarketSummary {
        slug: slug.to_string(),
        title: event.title.clone().unwrap_or_default(),
        total_volume,
        mid_price,
        shape,
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_yes_no_labels_are_matched_not_positional() {
        let ev = event(json!({
            "title": "Single",
            "markets": [{
                "question": "Will it rain?",
                "outcomes": "[\"Yes\", \"No\"]",
                "outcomePrices": "[\"0.4\", \"0.6\"]",
                "clobTokenIds": "[\"y\", \"n\"]"
            }]
        }));

        let (shape, outcomes) = build_outcomes(&ev).unwrap();
        assert_eq!(shape, Shape::MarketPerOption);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].price, 0.4);
        assert_eq!(outcomes[0].no_price, Some(0.6));
        assert_eq!(outcomes[0].kind, OutcomeKind::Binary);
    }

    #[test]
    fn test_reversed_labels_follow_the_labels() {
        let ev = event(json!({
            "markets": [{
                "question": "Reversed",
                "outcomes": [" no ", "YES"],
                "outcomePrices": ["0.7", "0.3"],
                "clobTokenIds": ["n", "y"]
            }]
        }));

        let (_, outcomes) = build_outcomes(&ev).unwrap();
        assert_eq!(outcomes[0].price, 0.3);
        assert_eq!(outcomes[0].no_price, Some(0.7));
        assert_eq!(outcomes[0].yes_token_id.as_deref(), Some("y"));
        assert_eq!(outcomes[0].token_id.as_deref(), Some("y"));
        assert_eq!(outcomes[0].no_token_id.as_deref(), Some("n"));
    }

    #[test]
    fn test_multi_outcome_market() {
        let ev = event(json!({
            "title": "Who wins?",
            "markets": [{
                "volume": 5000,
                "outcomes": "[\"A\", \"B\", \"C\", \"D\", \"E\"]",
                "outcomePrices": "[\"0.1\", \"0.2\", \"0.3\", \"0.15\", \"0.25\"]",
                "clobTokenIds": "[\"t1\", \"t2\", \"t3\", \"t4\", \"t5\"]"
            }]
        }));

        let (shape, outcomes) = build_outcomes(&ev).unwrap();
        assert_eq!(shape, Shape::SingleMarketMultiOutcome);
        assert_eq!(outcomes.len(), 5);

        let prices: Vec<f64> = outcomes.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![0.1, 0.2, 0.3, 0.15, 0.25]);
        assert_eq!(outcomes[2].name, "C");
        assert_eq!(outcomes[2].token_id.as_deref(), Some("t3"));
        assert!(outcomes.iter().all(|o| o.no_price.is_none()));
        assert!(outcomes.iter().all(|o| o.kind == OutcomeKind::MultiOutcome));
    }

    #[test]
    fn test_multi_outcome_defaults_and_clamps() {
        let ev = event(json!({
            "markets": [{
                "outcomes": ["A", "B", "C"],
                "outcomePrices": ["1.7", "bad"],
                "clobTokenIds": ["t1", "t2", "t3"]
            }]
        }));

        let (_, outcomes) = build_outcomes(&ev).unwrap();
        assert_eq!(outcomes[0].price, 1.0);
        assert_eq!(outcomes[1].price, 0.5);
        assert_eq!(outcomes[2].price, 0.5);
    }

    #[test]
    fn test_market_per_option_event() {
        let ev = event(json!({
            "title": "Election",
            "markets": [
                {
                    "question": "Candidate A",
                    "volume": "100",
                    "outcomes": "[\"Yes\", \"No\"]",
                    "outcomePrices": "[\"0.62\", \"0.38\"]",
                    "clobTokenIds": "[\"a-yes\", \"a-no\"]"
                },
                {
                    "volume": "50.5",
                    "outcomes": "[\"Yes\", \"No\"]",
                    "outcomePrices": "[\"0.30\", \"0.70\"]",
                    "clobTokenIds": "[\"b-yes\", \"b-no\"]"
                }
            ]
        }));

        let (shape, outcomes) = build_outcomes(&ev).unwrap();
        assert_eq!(shape, Shape::MarketPerOption);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].name, "Candidate A");
        assert_eq!(outcomes[1].name, "Market 2");
        assert_eq!(outcomes[1].volume, 50.5);
    }

    #[test]
    fn test_skipped_market_leaves_no_index_gap() {
        let ev = event(json!({
            "markets": [
                {"question": "Closed", "outcomes": ["Yes", "No"]},
                {"question": "A", "outcomePrices": ["0.7", "0.3"], "clobTokenIds": ["a-y", "a-n"]},
                {"question": "B", "outcomePrices": ["0.2", "0.8"], "clobTokenIds": ["b-y", "b-n"]}
            ]
        }));

        let (_, outcomes) = build_outcomes(&ev).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!((outcomes[0].index, outcomes[0].name.as_str()), (0, "A"));
        assert_eq!((outcomes[1].index, outcomes[1].name.as_str()), (1, "B"));
    }

    #[test]
    fn test_unlabelled_market_assumes_yes_then_no() {
        let ev = event(json!({
            "markets": [{
                "question": "Up or down",
                "outcomes": ["Up", "Down"],
                "outcomePrices": ["0.55", "0.45"],
                "clobTokenIds": ["up", "down"]
            }]
        }));

        let (_, outcomes) = build_outcomes(&ev).unwrap();
        assert_eq!(outcomes[0].price, 0.55);
        assert_eq!(outcomes[0].no_price, Some(0.45));
        assert_eq!(outcomes[0].no_token_id.as_deref(), Some("down"));
    }

    #[test]
    fn test_missing_no_price_is_complement() {
        let ev = event(json!({
            "markets": [{
                "question": "One price",
                "outcomePrices": ["0.8"],
                "clobTokenIds": ["only"]
            }]
        }));

        let (_, outcomes) = build_outcomes(&ev).unwrap();
        assert_eq!(outcomes[0].price, 0.8);
        assert!((outcomes[0].no_price.unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(outcomes[0].no_token_id, None);
    }

    #[test]
    fn test_uninterpretable_event_is_unsupported() {
        let ev = event(json!({
            "markets": [{"question": "???", "outcomes": ["Maybe"]}]
        }));

        let err = build_outcomes(&ev).unwrap_err();
        assert!(matches!(err, ProxyError::UnsupportedShape(_)));
    }

    #[test]
    fn test_build_is_deterministic() {
        let ev = event(json!({
            "markets": [{
                "outcomes": "[\"Yes\", \"No\"]",
                "outcomePrices": "[\"0.4\", \"0.6\"]",
                "clobTokenIds": "[\"y\", \"n\"]"
            }]
        }));

        assert_eq!(build_outcomes(&ev).unwrap(), build_outcomes(&ev).unwrap());
    }

    #[test]
    fn test_summary_volume_and_mid() {
        let ev = event(json!({
            "title": "Election",
            "markets": [
                {"question": "A", "volume": "100", "outcomePrices": ["0.6", "0.4"], "clobTokenIds": ["1", "2"]},
                {"question": "B", "volume": 25, "outcomePrices": ["0.6", "0.4"], "clobTokenIds": ["3", "4"]},
                {"question": "C", "volume": "x", "outcomePrices": ["0.2", "0.8"], "clobTokenIds": ["5", "6"]}
            ]
        }));

        let (shape, outcomes) = build_outcomes(&ev).unwrap();
        let summary = summarize("election", &ev, shape, outcomes);

        assert_eq!(summary.title, "Election");
        assert_eq!(summary.total_volume, 125.0);
        assert_eq!(summary.mid_price, 0.6);
        assert_eq!(summary.outcomes.len(), 3);
    }
}
