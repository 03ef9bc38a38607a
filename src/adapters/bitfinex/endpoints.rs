//! Bitfinex Endpoints
//!
//! Static operation → path table. Authenticated paths are echoed verbatim in
//! the signed payload's `request` field, so they never carry a query string.

use std::fmt;

use crate::adapters::bitfinex::types::PublicCall;
use crate::adapters::errors::{ExchangeError, ExchangeResult};

/// Authenticated (signed POST) operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Balances,
    NewOrder,
    NewMultipleOrders,
    OrderStatus,
    CancelOrder,
    CancelAllOrders,
    CancelMultipleOrders,
    CancelReplaceOrder,
    ActiveOrders,
    ActivePositions,
    History,
    MyTrades,
    NewOffer,
    CancelOffer,
    OfferStatus,
    ActiveOffers,
    ActiveCredits,
    MarginInformation,
    TakenSwaps,
    CloseSwap,
    ClaimPosition,
    Deposit,
    AccountInformation,
}

impl Endpoint {
    pub const fn path(&self) -> &'static str {
        match self {
            Endpoint::Balances => "/v1/balances",
            Endpoint::NewOrder => "/v1/order/new",
            Endpoint::NewMultipleOrders => "/v1/order/new/multi",
            Endpoint::OrderStatus => "/v1/order/status",
            Endpoint::CancelOrder => "/v1/order/cancel",
            Endpoint::CancelAllOrders => "/v1/order/cancel/all",
            Endpoint::CancelMultipleOrders => "/v1/order/cancel/multi",
            Endpoint::CancelReplaceOrder => "/v1/order/cancel/replace",
            Endpoint::ActiveOrders => "/v1/orders",
            Endpoint::ActivePositions => "/v1/positions",
            Endpoint::History => "/v1/history",
            Endpoint::MyTrades => "/v1/mytrades",
            Endpoint::NewOffer => "/v1/offer/new",
            Endpoint::CancelOffer => "/v1/offer/cancel",
            Endpoint::OfferStatus => "/v1/offer/status",
            Endpoint::ActiveOffers => "/v1/offers",
            Endpoint::ActiveCredits => "/v1/credits",
            Endpoint::MarginInformation => "/v1/margin_infos",
            Endpoint::TakenSwaps => "/v1/taken_swaps",
            Endpoint::CloseSwap => "/v1/swap/close",
            Endpoint::ClaimPosition => "/v1/position/claim",
            Endpoint::Deposit => "/v1/deposit/new",
            Endpoint::AccountInformation => "/v1/account_infos",
        }
    }

    pub const ALL: [Endpoint; 23] = [
        Endpoint::Balances,
        Endpoint::NewOrder,
        Endpoint::NewMultipleOrders,
        Endpoint::OrderStatus,
        Endpoint::CancelOrder,
        Endpoint::CancelAllOrders,
        Endpoint::CancelMultipleOrders,
        Endpoint::CancelReplaceOrder,
        Endpoint::ActiveOrders,
        Endpoint::ActivePositions,
        Endpoint::History,
        Endpoint::MyTrades,
        Endpoint::NewOffer,
        Endpoint::CancelOffer,
        Endpoint::OfferStatus,
        Endpoint::ActiveOffers,
        Endpoint::ActiveCredits,
        Endpoint::MarginInformation,
        Endpoint::TakenSwaps,
        Endpoint::CloseSwap,
        Endpoint::ClaimPosition,
        Endpoint::Deposit,
        Endpoint::AccountInformation,
    ];
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Unauthenticated GET resources
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PublicEndpoint {
    SymbolsDetails,
    Book(String),
    PubTicker(String),
    Stats(String),
    Trades(String),
    LendBook(String),
    Lends(String),
}

impl PublicEndpoint {
    pub fn book(pair: impl AsRef<str>) -> ExchangeResult<Self> {
        Ok(PublicEndpoint::Book(segment(pair)?))
    }

    /// One of the `/v1/{call}/{pair}` resources
    pub fn for_pair(call: PublicCall, pair: impl AsRef<str>) -> ExchangeResult<Self> {
        let pair = segment(pair)?;
        Ok(match call {
            PublicCall::PubTicker => PublicEndpoint::PubTicker(pair),
            PublicCall::Stats => PublicEndpoint::Stats(pair),
            PublicCall::Trades => PublicEndpoint::Trades(pair),
        })
    }

    pub fn ticker(pair: impl AsRef<str>) -> ExchangeResult<Self> {
        Self::for_pair(PublicCall::PubTicker, pair)
    }

    pub fn stats(pair: impl AsRef<str>) -> ExchangeResult<Self> {
        Self::for_pair(PublicCall::Stats, pair)
    }

    pub fn trades(pair: impl AsRef<str>) -> ExchangeResult<Self> {
        Self::for_pair(PublicCall::Trades, pair)
    }

    pub fn lendbook(currency: impl AsRef<str>) -> ExchangeResult<Self> {
        Ok(PublicEndpoint::LendBook(segment(currency)?))
    }

    pub fn lends(currency: impl AsRef<str>) -> ExchangeResult<Self> {
        Ok(PublicEndpoint::Lends(segment(currency)?))
    }

    pub fn path(&self) -> String {
        match self {
            PublicEndpoint::SymbolsDetails => "/v1/symbols_details".to_string(),
            PublicEndpoint::Book(pair) => format!("/v1/book/{}", pair),
            PublicEndpoint::PubTicker(pair) => {
                format!("/v1/{}/{}", PublicCall::PubTicker, pair)
            }
            PublicEndpoint::Stats(pair) => format!("/v1/{}/{}", PublicCall::Stats, pair),
            PublicEndpoint::Trades(pair) => format!("/v1/{}/{}", PublicCall::Trades, pair),
            PublicEndpoint::LendBook(currency) => format!("/v1/lendbook/{}", currency),
            PublicEndpoint::Lends(currency) => format!("/v1/lends/{}", currency),
        }
    }
}

impl fmt::Display for PublicEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Pair or currency path segment: trimmed, lowercased, ASCII alphanumeric only
fn segment(value: impl AsRef<str>) -> ExchangeResult<String> {
    let segment = value.as_ref().trim().to_ascii_lowercase();
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ExchangeError::InvalidRequest(format!(
            "invalid path segment {:?}",
            value.as_ref()
        )));
    }
    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::bitfinex::types::{Currency, Pair};
    use std::collections::HashSet;

    #[test]
    fn test_authenticated_paths() {
        assert_eq!(Endpoint::Balances.path(), "/v1/balances");
        assert_eq!(Endpoint::NewOrder.path(), "/v1/order/new");
        assert_eq!(Endpoint::CancelMultipleOrders.path(), "/v1/order/cancel/multi");
        assert_eq!(Endpoint::MarginInformation.path(), "/v1/margin_infos");
        assert_eq!(Endpoint::AccountInformation.to_string(), "/v1/account_infos");
    }

    #[test]
    fn test_paths_unique_and_versioned() {
        let paths: HashSet<_> = Endpoint::ALL.iter().map(|e| e.path()).collect();
        assert_eq!(paths.len(), Endpoint::ALL.len());
        assert!(paths.iter().all(|p| p.starts_with("/v1/") && !p.contains('?')));
    }

    #[test]
    fn test_public_paths_lowercase_segment() {
        let path = |e: ExchangeResult<PublicEndpoint>| e.unwrap().path();
        assert_eq!(path(PublicEndpoint::ticker("BTCUSD")), "/v1/pubticker/btcusd");
        assert_eq!(path(PublicEndpoint::book(Pair::EthBtc)), "/v1/book/ethbtc");
        assert_eq!(path(PublicEndpoint::stats(Pair::LtcUsd)), "/v1/stats/ltcusd");
        assert_eq!(path(PublicEndpoint::trades(" EthUsd ")), "/v1/trades/ethusd");
        assert_eq!(path(PublicEndpoint::lendbook(Currency::Usd)), "/v1/lendbook/usd");
        assert_eq!(path(PublicEndpoint::lends("BTC")), "/v1/lends/btc");
        assert_eq!(PublicEndpoint::SymbolsDetails.path(), "/v1/symbols_details");
    }

    #[test]
    fn test_for_pair_matches_named_constructors() {
        assert_eq!(
            PublicEndpoint::for_pair(PublicCall::Stats, Pair::BtcUsd).unwrap(),
            PublicEndpoint::stats("btcusd").unwrap()
        );
        assert_eq!(
            PublicEndpoint::for_pair(PublicCall::PubTicker, "ETHBTC")
                .unwrap()
                .path(),
            "/v1/pubticker/ethbtc"
        );
    }

    #[test]
    fn test_segment_rejects_non_alphanumeric() {
        for bad in ["btcusd?x=1", "../v1/balances", "btc/usd", "btcusd#frag", "", "   ", "btc usd"] {
            let err = PublicEndpoint::ticker(bad).unwrap_err();
            assert!(
                matches!(err, ExchangeError::InvalidRequest(_)),
                "{:?} should be rejected",
                bad
            );
        }
        assert!(PublicEndpoint::lendbook("usd/../x").is_err());
        assert!(PublicEndpoint::book("btcusd").is_ok());
    }
}
