use crate::data::types::{Market, Shape};

/// Classify an event by its markets.
///
/// One market with more than two labelled outcomes and a token per outcome is
/// a multi-outcome market. Everything else, including a two-outcome named
/// market, is read as one yes/no market per option.
pub fn classify_shape(markets: &[Market]) -> Shape {
    if let [market] = markets {
        let labels = market.labels().len();
        if labels > 2 && market.token_ids().len() == labels {
            return Shape::SingleMarketMultiOutcome;
        }
    }

    Shape::MarketPerOption
}
