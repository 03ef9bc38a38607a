//! Bitfinex Types
//!
//! Request payloads (serialized into the signed envelope) and v1 response
//! shapes. Numeric strings in responses decode into `Decimal`; unknown
//! response fields are ignored.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};

/// Exchange value for the `exchange` order field
pub const DEFAULT_ORDER_EXCHANGE: &str = "bitfinex";

// =============================================================================
// Enums
// =============================================================================

/// Trading pairs with a fixed name on the v1 API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pair {
    LtcBtc,
    BtcUsd,
    LtcUsd,
    EthUsd,
    EthBtc,
}

impl Pair {
    pub const ALL: [Pair; 5] = [
        Pair::LtcBtc,
        Pair::BtcUsd,
        Pair::LtcUsd,
        Pair::EthUsd,
        Pair::EthBtc,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Pair::LtcBtc => "ltcbtc",
            Pair::BtcUsd => "btcusd",
            Pair::LtcUsd => "ltcusd",
            Pair::EthUsd => "ethusd",
            Pair::EthBtc => "ethbtc",
        }
    }
}

/// Single currencies (lending, deposits, history)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Ltc,
    Btc,
    Usd,
    Eth,
}

impl Currency {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Currency::Ltc => "ltc",
            Currency::Btc => "btc",
            Currency::Usd => "usd",
            Currency::Eth => "eth",
        }
    }

    /// Upper-case code expected by offer/deposit/history payloads
    pub fn code(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Deposit method name for currencies that can be deposited on-chain
    pub const fn deposit_method(&self) -> Option<DepositMethod> {
        match self {
            Currency::Btc => Some(DepositMethod::Bitcoin),
            Currency::Ltc => Some(DepositMethod::Litecoin),
            Currency::Usd | Currency::Eth => None,
        }
    }
}

/// `method` field of `/v1/deposit/new`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositMethod {
    Bitcoin,
    Litecoin,
}

impl DepositMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DepositMethod::Bitcoin => "bitcoin",
            DepositMethod::Litecoin => "litecoin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wallet {
    Trading,
    Exchange,
    Deposit,
}

impl Wallet {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Wallet::Trading => "trading",
            Wallet::Exchange => "exchange",
            Wallet::Deposit => "deposit",
        }
    }
}

/// `lend` offers funds, `loan` asks to borrow them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferDirection {
    Lend,
    Loan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// v1 order types; `exchange *` variants trade the exchange wallet,
/// the others the margin wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "market")]
    Market,
    #[serde(rename = "limit")]
    Limit,
    #[serde(rename = "stop")]
    Stop,
    #[serde(rename = "trailing-stop")]
    TrailingStop,
    #[serde(rename = "fill-or-kill")]
    FillOrKill,
    #[serde(rename = "exchange market")]
    ExchangeMarket,
    #[serde(rename = "exchange limit")]
    ExchangeLimit,
    #[serde(rename = "exchange stop")]
    ExchangeStop,
    #[serde(rename = "exchange trailing-stop")]
    ExchangeTrailingStop,
    #[serde(rename = "exchange fill-or-kill")]
    ExchangeFillOrKill,
}

impl OrderType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
            OrderType::Stop => "stop",
            OrderType::TrailingStop => "trailing-stop",
            OrderType::FillOrKill => "fill-or-kill",
            OrderType::ExchangeMarket => "exchange market",
            OrderType::ExchangeLimit => "exchange limit",
            OrderType::ExchangeStop => "exchange stop",
            OrderType::ExchangeTrailingStop => "exchange trailing-stop",
            OrderType::ExchangeFillOrKill => "exchange fill-or-kill",
        }
    }

    /// Market orders ignore the price field
    pub const fn is_market(&self) -> bool {
        matches!(self, OrderType::Market | OrderType::ExchangeMarket)
    }
}

/// Public per-pair data calls sharing the `/v1/{call}/{pair}` shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicCall {
    PubTicker,
    Stats,
    Trades,
}

impl PublicCall {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PublicCall::PubTicker => "pubticker",
            PublicCall::Stats => "stats",
            PublicCall::Trades => "trades",
        }
    }
}

macro_rules! impl_str_enum {
    ($name:ident, [$($variant:ident),+ $(,)?]) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl FromStr for $name {
            type Err = ExchangeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.to_ascii_lowercase();
                $(
                    if lowered == $name::$variant.as_str() {
                        return Ok($name::$variant);
                    }
                )+
                Err(ExchangeError::InvalidRequest(format!(
                    "Unknown {}: {}",
                    stringify!($name),
                    s
                )))
            }
        }
    };
}

impl_str_enum!(Pair, [LtcBtc, BtcUsd, LtcUsd, EthUsd, EthBtc]);
impl_str_enum!(Currency, [Ltc, Btc, Usd, Eth]);
impl_str_enum!(DepositMethod, [Bitcoin, Litecoin]);
impl_str_enum!(Wallet, [Trading, Exchange, Deposit]);
impl_str_enum!(OrderSide, [Buy, Sell]);
impl_str_enum!(PublicCall, [PubTicker, Stats, Trades]);

impl OfferDirection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OfferDirection::Lend => "lend",
            OfferDirection::Loan => "loan",
        }
    }
}

impl_str_enum!(OfferDirection, [Lend, Loan]);

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Request Payloads
// =============================================================================

fn is_false(value: &bool) -> bool {
    !*value
}

fn parse_decimal(field: &str, value: &str) -> ExchangeResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| ExchangeError::InvalidRequest(format!("{} '{}' is not a decimal: {}", field, value, e)))
}

/// Fields of `/v1/order/new` (also an element of `/v1/order/new/multi`)
///
/// Amount and price are sent exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub symbol: String,
    pub amount: String,
    pub price: String,
    pub exchange: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "is_false")]
    pub is_hidden: bool,
}

impl NewOrder {
    pub fn new(
        symbol: impl AsRef<str>,
        amount: impl Into<String>,
        price: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
    ) -> Self {
        Self {
            symbol: symbol.as_ref().to_ascii_lowercase(),
            amount: amount.into(),
            price: price.into(),
            exchange: DEFAULT_ORDER_EXCHANGE.to_string(),
            side,
            order_type,
            is_hidden: false,
        }
    }

    /// `exchange limit` order on the default exchange
    pub fn limit(
        symbol: impl AsRef<str>,
        amount: impl Into<String>,
        price: impl Into<String>,
        side: OrderSide,
    ) -> Self {
        Self::new(symbol, amount, price, side, OrderType::ExchangeLimit)
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.is_hidden = hidden;
        self
    }

    pub fn on_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = exchange.into();
        self
    }

    /// Reject orders the exchange would bounce anyway
    pub fn validate(&self) -> ExchangeResult<()> {
        if self.symbol.trim().is_empty() {
            return Err(ExchangeError::InvalidRequest("Order symbol cannot be empty".into()));
        }
        let amount = parse_decimal("amount", &self.amount)?;
        if amount <= Decimal::ZERO {
            return Err(ExchangeError::InvalidRequest(format!(
                "Order amount must be > 0 (got {})",
                self.amount
            )));
        }
        let price = parse_decimal("price", &self.price)?;
        if price < Decimal::ZERO || (price.is_zero() && !self.order_type.is_market()) {
            return Err(ExchangeError::InvalidRequest(format!(
                "Order price must be > 0 for {} orders (got {})",
                self.order_type, self.price
            )));
        }
        Ok(())
    }
}

impl fmt::Display for NewOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ {} ({}, {})",
            self.side, self.amount, self.symbol, self.price, self.order_type, self.exchange
        )
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MultipleOrdersFields<'a> {
    pub orders: &'a [NewOrder],
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderIdFields {
    pub order_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderIdsFields<'a> {
    pub order_ids: &'a [i64],
}

#[derive(Debug, Serialize)]
pub(crate) struct CancelReplaceFields<'a> {
    pub order_id: i64,
    #[serde(flatten)]
    pub order: &'a NewOrder,
}

/// Fields of `/v1/history`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRequest {
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<Wallet>,
}

impl HistoryRequest {
    pub fn new(currency: impl AsRef<str>) -> Self {
        Self {
            currency: currency.as_ref().to_ascii_uppercase(),
            since: None,
            until: None,
            limit: None,
            wallet: None,
        }
    }

    /// Lower bound as seconds since epoch (see `unix_timestamp_secs`)
    pub fn since(mut self, since: impl ToString) -> Self {
        self.since = Some(since.to_string());
        self
    }

    pub fn until(mut self, until: impl ToString) -> Self {
        self.until = Some(until.to_string());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn wallet(mut self, wallet: Wallet) -> Self {
        self.wallet = Some(wallet);
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MyTradesFields<'a> {
    pub symbol: &'a str,
    pub timestamp: &'a str,
    pub limit_trades: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct DepositFields<'a> {
    pub currency: &'a str,
    pub method: &'a str,
    pub wallet_name: &'a str,
}

/// Fields of `/v1/offer/new`
///
/// `rate` is yearly: 10 basis points per day is `"36.5"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOffer {
    pub currency: String,
    pub amount: String,
    pub rate: String,
    pub period: u32,
    pub direction: OfferDirection,
}

impl NewOffer {
    pub fn new(
        currency: impl AsRef<str>,
        amount: impl Into<String>,
        rate: impl Into<String>,
        period: u32,
        direction: OfferDirection,
    ) -> Self {
        Self {
            currency: currency.as_ref().to_ascii_uppercase(),
            amount: amount.into(),
            rate: rate.into(),
            period,
            direction,
        }
    }

    pub fn validate(&self) -> ExchangeResult<()> {
        if parse_decimal("amount", &self.amount)? <= Decimal::ZERO {
            return Err(ExchangeError::InvalidRequest(format!(
                "Offer amount must be > 0 (got {})",
                self.amount
            )));
        }
        if parse_decimal("rate", &self.rate)? < Decimal::ZERO {
            return Err(ExchangeError::InvalidRequest(format!(
                "Offer rate cannot be negative (got {})",
                self.rate
            )));
        }
        if self.period == 0 {
            return Err(ExchangeError::InvalidRequest("Offer period must be at least 1 day".into()));
        }
        Ok(())
    }
}

impl fmt::Display for NewOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ {}%/yr for {}d",
            self.direction, self.amount, self.currency, self.rate, self.period
        )
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OfferIdFields {
    pub offer_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SwapIdFields {
    pub swap_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PositionIdFields {
    pub position_id: i64,
}

// =============================================================================
// Responses - public market data
// =============================================================================

/// 400 body shape
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SymbolDetails {
    pub pair: String,
    pub price_precision: u32,
    pub initial_margin: Decimal,
    pub minimum_margin: Decimal,
    pub maximum_order_size: Decimal,
    pub minimum_order_size: Decimal,
    pub expiration: String,
    #[serde(default)]
    pub margin: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookEntry {
    pub price: Decimal,
    pub amount: Decimal,
    pub timestamp: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderBook {
    #[serde(default)]
    pub bids: Vec<BookEntry>,
    #[serde(default)]
    pub asks: Vec<BookEntry>,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|e| e.price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|e| e.price)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ticker {
    pub mid: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
    pub last_price: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub volume: Decimal,
    pub timestamp: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PairStats {
    /// Window length in days
    pub period: u32,
    pub volume: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublicTrade {
    pub timestamp: i64,
    pub tid: i64,
    pub price: Decimal,
    pub amount: Decimal,
    pub exchange: String,
    #[serde(rename = "type")]
    pub trade_type: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LendBookEntry {
    pub rate: Decimal,
    pub amount: Decimal,
    pub period: u32,
    pub timestamp: Decimal,
    /// "Yes" when the offer is at the flash return rate
    pub frr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LendBook {
    #[serde(default)]
    pub bids: Vec<LendBookEntry>,
    #[serde(default)]
    pub asks: Vec<LendBookEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Lend {
    pub rate: Decimal,
    pub amount_lent: Decimal,
    pub amount_used: Decimal,
    pub timestamp: i64,
}

// =============================================================================
// Responses - account and trading
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Balance {
    #[serde(rename = "type")]
    pub wallet: String,
    pub currency: String,
    pub amount: Decimal,
    pub available: Decimal,
}

/// Order state as returned by new/cancel/status/active-orders
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderStatus {
    pub id: i64,
    pub symbol: String,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    pub avg_execution_price: Decimal,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub timestamp: Decimal,
    pub is_live: bool,
    pub is_cancelled: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub was_forced: bool,
    pub original_amount: Decimal,
    pub remaining_amount: Decimal,
    pub executed_amount: Decimal,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} {}/{} {} @ {} live={} cancelled={}",
            self.id,
            self.side,
            self.order_type,
            self.executed_amount,
            self.original_amount,
            self.symbol,
            self.price.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
            self.is_live,
            self.is_cancelled
        )
    }
}

/// `/v1/order/new/multi` response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultipleOrdersResponse {
    #[serde(default)]
    pub order_ids: Vec<OrderStatus>,
    #[serde(default)]
    pub status: String,
}

/// `/v1/order/cancel/replace` result with the id of the order it replaced
#[derive(Debug, Clone, PartialEq)]
pub struct CancelReplaceResponse {
    pub order: OrderStatus,
    pub original_order_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Position {
    pub id: i64,
    pub symbol: String,
    pub status: String,
    pub base: Decimal,
    pub amount: Decimal,
    pub timestamp: Decimal,
    pub swap: Decimal,
    pub pl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    pub currency: String,
    pub amount: Decimal,
    pub balance: Decimal,
    pub description: String,
    pub timestamp: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MyTrade {
    pub price: Decimal,
    pub amount: Decimal,
    pub timestamp: Decimal,
    #[serde(default)]
    pub exchange: String,
    #[serde(rename = "type")]
    pub trade_type: String,
    pub fee_currency: String,
    pub fee_amount: Decimal,
    pub tid: i64,
    pub order_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepositResponse {
    pub result: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarginLimit {
    pub on_pair: String,
    pub initial_margin: Decimal,
    pub margin_requirement: Decimal,
    pub tradable_balance: Decimal,
}

/// Element 0 of the `/v1/margin_infos` array
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarginInfo {
    pub margin_balance: Decimal,
    pub tradable_balance: Decimal,
    pub unrealized_pl: Decimal,
    pub unrealized_swap: Decimal,
    pub net_value: Decimal,
    pub required_margin: Decimal,
    pub leverage: Decimal,
    pub margin_requirement: Decimal,
    pub margin_limits: Vec<MarginLimit>,
    pub message: Option<String>,
}

// =============================================================================
// Responses - lending and margin funding
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OfferStatus {
    pub id: i64,
    pub currency: String,
    pub rate: Decimal,
    pub period: u32,
    pub direction: String,
    pub timestamp: Decimal,
    pub is_live: bool,
    pub is_cancelled: bool,
    pub original_amount: Decimal,
    pub remaining_amount: Decimal,
    pub executed_amount: Decimal,
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {}/{} {} @ {} for {}d live={} cancelled={}",
            self.id,
            self.direction,
            self.executed_amount,
            self.original_amount,
            self.currency,
            self.rate,
            self.period,
            self.is_live,
            self.is_cancelled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActiveCredit {
    pub id: i64,
    pub currency: String,
    pub status: String,
    pub rate: Decimal,
    pub period: u32,
    pub amount: Decimal,
    pub timestamp: Decimal,
}

/// Funding taken for a margin position (`/v1/taken_swaps`, `/v1/swap/close`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarginSwap {
    pub id: i64,
    #[serde(default)]
    pub position_id: Option<i64>,
    pub currency: String,
    pub rate: Decimal,
    pub period: u32,
    pub amount: Decimal,
    pub timestamp: Decimal,
}
