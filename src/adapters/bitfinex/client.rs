//! Bitfinex Client
//!
//! Typed wrappers over every supported v1 endpoint. Each call builds its
//! fields, goes through the `Dispatcher`, decodes the body and logs a
//! one-line summary inside the client's span.

use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, Span};

use crate::adapters::bitfinex::config::BitfinexConfig;
use crate::adapters::bitfinex::dispatcher::{Dispatcher, EXCHANGE_NAME};
use crate::adapters::bitfinex::endpoints::{Endpoint, PublicEndpoint};
use crate::adapters::bitfinex::nonce::NonceGenerator;
use crate::adapters::bitfinex::signing::NoFields;
use crate::adapters::bitfinex::types::{
    ActiveCredit, Balance, CancelReplaceFields, CancelReplaceResponse, Currency, DepositFields,
    DepositMethod, DepositResponse, HistoryEntry, HistoryRequest, Lend, LendBook, MarginInfo,
    MarginSwap, MultipleOrdersFields, MultipleOrdersResponse, MyTrade, MyTradesFields, NewOffer,
    NewOrder, OfferIdFields, OfferStatus, OrderBook, OrderIdFields, OrderIdsFields, OrderSide,
    OrderStatus, PairStats, Position, PositionIdFields, PublicTrade, SwapIdFields, SymbolDetails,
    Ticker, Wallet,
};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::http::ReqwestTransport;
use crate::adapters::traits::HttpTransport;

/// Bitfinex v1 REST client
///
/// Cheap to clone; clones share the transport and nonce generator.
#[derive(Debug, Clone)]
pub struct BitfinexClient {
    dispatcher: Dispatcher,
    span: Span,
}

impl BitfinexClient {
    /// Client over a pooled reqwest transport and the process-wide nonce
    pub fn new(config: BitfinexConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::new(EXCHANGE_NAME, &config.http));
        let span = tracing::info_span!("bitfinex_client", key = %config.key_hint());
        Self {
            dispatcher: Dispatcher::new(config, NonceGenerator::shared(), transport),
            span,
        }
    }

    /// Client configured from `BITFINEX_*` environment variables
    pub fn from_env() -> ExchangeResult<Self> {
        Ok(Self::new(BitfinexConfig::from_env()?))
    }

    /// Market-data-only client; signed calls fail with `AuthenticationFailed`
    pub fn public(base_url: impl Into<String>) -> Self {
        Self::new(BitfinexConfig::public(base_url))
    }

    /// Replace the span every call is logged under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_nonce_generator(mut self, nonce: Arc<NonceGenerator>) -> Self {
        self.dispatcher.set_nonce_generator(nonce);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.dispatcher.set_transport(transport);
        self
    }

    pub fn config(&self) -> &BitfinexConfig {
        self.dispatcher.config()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    async fn signed<T, R>(&self, endpoint: Endpoint, fields: &T) -> ExchangeResult<R>
    where
        T: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        self.dispatcher
            .signed_json(endpoint, fields)
            .instrument(self.span.clone())
            .await
    }

    async fn public_get<R: serde::de::DeserializeOwned>(
        &self,
        endpoint: PublicEndpoint,
    ) -> ExchangeResult<R> {
        self.dispatcher
            .public_json(&endpoint)
            .instrument(self.span.clone())
            .await
    }

    /// Calls whose success body is `{"result": "..."}`; other bodies are returned as-is
    async fn signed_result<T: serde::Serialize>(
        &self,
        endpoint: Endpoint,
        fields: &T,
    ) -> ExchangeResult<String> {
        let body = self
            .dispatcher
            .signed_body(endpoint, fields)
            .instrument(self.span.clone())
            .await?;
        Ok(result_message(&body))
    }

    // =========================================================================
    // Public market data
    // =========================================================================

    pub async fn get_symbols(&self) -> ExchangeResult<Vec<SymbolDetails>> {
        let symbols: Vec<SymbolDetails> = self.public_get(PublicEndpoint::SymbolsDetails).await?;
        tracing::debug!(parent: &self.span, count = symbols.len(), "Symbols details fetched");
        Ok(symbols)
    }

    pub async fn get_order_book(&self, pair: impl AsRef<str>) -> ExchangeResult<OrderBook> {
        let book: OrderBook = self.public_get(PublicEndpoint::book(pair)?).await?;
        tracing::debug!(
            parent: &self.span,
            bids = book.bids.len(),
            asks = book.asks.len(),
            "Order book fetched"
        );
        Ok(book)
    }

    pub async fn get_public_ticker(&self, pair: impl AsRef<str>) -> ExchangeResult<Ticker> {
        let endpoint = PublicEndpoint::ticker(pair)?;
        let ticker: Ticker = self.public_get(endpoint.clone()).await?;
        tracing::debug!(
            parent: &self.span,
            endpoint = %endpoint,
            bid = %ticker.bid,
            ask = %ticker.ask,
            last = %ticker.last_price,
            "Ticker fetched"
        );
        Ok(ticker)
    }

    pub async fn get_pair_stats(&self, pair: impl AsRef<str>) -> ExchangeResult<Vec<PairStats>> {
        let endpoint = PublicEndpoint::stats(pair)?;
        let stats: Vec<PairStats> = self.public_get(endpoint.clone()).await?;
        tracing::debug!(parent: &self.span, endpoint = %endpoint, count = stats.len(), "Pair stats fetched");
        Ok(stats)
    }

    pub async fn get_pair_trades(&self, pair: impl AsRef<str>) -> ExchangeResult<Vec<PublicTrade>> {
        let trades: Vec<PublicTrade> = self.public_get(PublicEndpoint::trades(pair)?).await?;
        tracing::debug!(parent: &self.span, count = trades.len(), "Public trades fetched");
        Ok(trades)
    }

    pub async fn get_lendbook(&self, currency: impl AsRef<str>) -> ExchangeResult<LendBook> {
        let book: LendBook = self.public_get(PublicEndpoint::lendbook(currency)?).await?;
        tracing::debug!(
            parent: &self.span,
            bids = book.bids.len(),
            asks = book.asks.len(),
            "Lend book fetched"
        );
        Ok(book)
    }

    pub async fn get_lends(&self, currency: impl AsRef<str>) -> ExchangeResult<Vec<Lend>> {
        let lends: Vec<Lend> = self.public_get(PublicEndpoint::lends(currency)?).await?;
        tracing::debug!(parent: &self.span, count = lends.len(), "Lends fetched");
        Ok(lends)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    pub async fn send_order(&self, order: NewOrder) -> ExchangeResult<OrderStatus> {
        order.validate()?;
        let status: OrderStatus = self.signed(Endpoint::NewOrder, &order).await?;
        tracing::info!(
            parent: &self.span,
            exchange = EXCHANGE_NAME,
            order_id = status.id,
            request = %order,
            "Order placed"
        );
        Ok(status)
    }

    /// `exchange limit` order on the `bitfinex` exchange
    pub async fn send_simple_limit(
        &self,
        symbol: impl AsRef<str>,
        amount: impl Into<String>,
        price: impl Into<String>,
        side: OrderSide,
    ) -> ExchangeResult<OrderStatus> {
        self.send_order(NewOrder::limit(symbol, amount, price, side))
            .await
    }

    pub async fn send_simple_limit_buy(
        &self,
        symbol: impl AsRef<str>,
        amount: impl Into<String>,
        price: impl Into<String>,
    ) -> ExchangeResult<OrderStatus> {
        self.send_simple_limit(symbol, amount, price, OrderSide::Buy)
            .await
    }

    pub async fn send_simple_limit_sell(
        &self,
        symbol: impl AsRef<str>,
        amount: impl Into<String>,
        price: impl Into<String>,
    ) -> ExchangeResult<OrderStatus> {
        self.send_simple_limit(symbol, amount, price, OrderSide::Sell)
            .await
    }

    pub async fn send_multiple_orders(
        &self,
        orders: &[NewOrder],
    ) -> ExchangeResult<MultipleOrdersResponse> {
        if orders.is_empty() {
            return Err(ExchangeError::InvalidRequest(
                "At least one order is required".into(),
            ));
        }
        for order in orders {
            order.validate()?;
        }
        let response: MultipleOrdersResponse = self
            .signed(Endpoint::NewMultipleOrders, &MultipleOrdersFields { orders })
            .await?;
        tracing::info!(
            parent: &self.span,
            exchange = EXCHANGE_NAME,
            requested = orders.len(),
            accepted = response.order_ids.len(),
            status = %response.status,
            "Multiple orders placed"
        );
        Ok(response)
    }

    pub async fn cancel_order(&self, order_id: i64) -> ExchangeResult<OrderStatus> {
        let status: OrderStatus = self
            .signed(Endpoint::CancelOrder, &OrderIdFields { order_id })
            .await?;
        tracing::info!(parent: &self.span, exchange = EXCHANGE_NAME, order_id, "Order cancelled");
        Ok(status)
    }

    /// Cancel `order_id` and place `replacement` in one request
    pub async fn cancel_replace_order(
        &self,
        order_id: i64,
        replacement: NewOrder,
    ) -> ExchangeResult<CancelReplaceResponse> {
        replacement.validate()?;
        let fields = CancelReplaceFields {
            order_id,
            order: &replacement,
        };
        let order: OrderStatus = self.signed(Endpoint::CancelReplaceOrder, &fields).await?;
        tracing::info!(
            parent: &self.span,
            exchange = EXCHANGE_NAME,
            original_order_id = order_id,
            order_id = order.id,
            "Order replaced"
        );
        Ok(CancelReplaceResponse {
            order,
            original_order_id: order_id,
        })
    }

    /// Returns the exchange's result message
    pub async fn cancel_multiple_orders(&self, order_ids: &[i64]) -> ExchangeResult<String> {
        if order_ids.is_empty() {
            return Err(ExchangeError::InvalidRequest(
                "At least one order id is required".into(),
            ));
        }
        let result = self
            .signed_result(Endpoint::CancelMultipleOrders, &OrderIdsFields { order_ids })
            .await?;
        tracing::info!(
            parent: &self.span,
            exchange = EXCHANGE_NAME,
            count = order_ids.len(),
            result = %result,
            "Multiple orders cancelled"
        );
        Ok(result)
    }

    /// Returns the exchange's result message
    pub async fn cancel_all_active_orders(&self) -> ExchangeResult<String> {
        let result = self
            .signed_result(Endpoint::CancelAllOrders, &NoFields {})
            .await?;
        tracing::info!(parent: &self.span, exchange = EXCHANGE_NAME, result = %result, "All orders cancelled");
        Ok(result)
    }

    // =========================================================================
    // Trading info
    // =========================================================================

    /// Live orders; empty when the exchange answers `[]`
    pub async fn get_active_orders(&self) -> ExchangeResult<Vec<OrderStatus>> {
        let orders: Vec<OrderStatus> = self.signed(Endpoint::ActiveOrders, &NoFields {}).await?;
        tracing::debug!(parent: &self.span, count = orders.len(), "Active orders fetched");
        Ok(orders)
    }

    pub async fn get_order_status(&self, order_id: i64) -> ExchangeResult<OrderStatus> {
        let status: OrderStatus = self
            .signed(Endpoint::OrderStatus, &OrderIdFields { order_id })
            .await?;
        tracing::debug!(parent: &self.span, order_id, status = %status, "Order status fetched");
        Ok(status)
    }

    /// Balance ledger entries
    pub async fn get_history(&self, request: HistoryRequest) -> ExchangeResult<Vec<HistoryEntry>> {
        let entries: Vec<HistoryEntry> = self.signed(Endpoint::History, &request).await?;
        tracing::debug!(
            parent: &self.span,
            currency = %request.currency,
            count = entries.len(),
            "Balance history fetched"
        );
        Ok(entries)
    }

    /// Own trades on `symbol` since `timestamp` (seconds since epoch)
    pub async fn get_my_trades(
        &self,
        symbol: impl AsRef<str>,
        timestamp: impl ToString,
        limit: u32,
    ) -> ExchangeResult<Vec<MyTrade>> {
        let symbol = symbol.as_ref().to_ascii_lowercase();
        let timestamp = timestamp.to_string();
        let fields = MyTradesFields {
            symbol: &symbol,
            timestamp: &timestamp,
            limit_trades: limit,
        };
        let trades: Vec<MyTrade> = self.signed(Endpoint::MyTrades, &fields).await?;
        tracing::debug!(parent: &self.span, symbol = %symbol, count = trades.len(), "Trades fetched");
        Ok(trades)
    }

    // =========================================================================
    // Account
    // =========================================================================

    pub async fn get_balances(&self) -> ExchangeResult<Vec<Balance>> {
        let balances: Vec<Balance> = self.signed(Endpoint::Balances, &NoFields {}).await?;
        tracing::debug!(parent: &self.span, count = balances.len(), "Balances fetched");
        Ok(balances)
    }

    /// Request a deposit address
    pub async fn deposit(
        &self,
        currency: impl AsRef<str>,
        method: DepositMethod,
        wallet: Wallet,
    ) -> ExchangeResult<DepositResponse> {
        let currency = currency.as_ref().to_ascii_uppercase();
        let fields = DepositFields {
            currency: &currency,
            method: method.as_str(),
            wallet_name: wallet.as_str(),
        };
        let response: DepositResponse = self.signed(Endpoint::Deposit, &fields).await?;
        tracing::info!(
            parent: &self.span,
            exchange = EXCHANGE_NAME,
            currency = %currency,
            method = %method,
            wallet = %wallet,
            result = %response.result,
            "Deposit address requested"
        );
        Ok(response)
    }

    /// `deposit` with the method implied by the currency
    pub async fn deposit_for(
        &self,
        currency: Currency,
        wallet: Wallet,
    ) -> ExchangeResult<DepositResponse> {
        let method = currency.deposit_method().ok_or_else(|| {
            ExchangeError::InvalidRequest(format!("No deposit method for {}", currency))
        })?;
        self.deposit(currency, method, wallet).await
    }

    /// Account fee tiers, returned undecoded
    pub async fn get_account_information(&self) -> ExchangeResult<Value> {
        let info: Value = self
            .signed(Endpoint::AccountInformation, &NoFields {})
            .await?;
        tracing::debug!(parent: &self.span, account = %info, "Account information fetched");
        Ok(info)
    }

    /// First element of the margin info array; `None` when the array is empty
    pub async fn get_margin_information(&self) -> ExchangeResult<Option<MarginInfo>> {
        let infos: Vec<MarginInfo> = self
            .signed(Endpoint::MarginInformation, &NoFields {})
            .await?;
        let info = infos.into_iter().next();
        if let Some(ref info) = info {
            tracing::debug!(
                parent: &self.span,
                margin_balance = %info.margin_balance,
                net_value = %info.net_value,
                "Margin information fetched"
            );
        }
        Ok(info)
    }

    pub async fn get_active_positions(&self) -> ExchangeResult<Vec<Position>> {
        let positions: Vec<Position> = self
            .signed(Endpoint::ActivePositions, &NoFields {})
            .await?;
        tracing::debug!(parent: &self.span, count = positions.len(), "Positions fetched");
        Ok(positions)
    }

    // =========================================================================
    // Lending & margin funding
    // =========================================================================

    pub async fn send_new_offer(&self, offer: NewOffer) -> ExchangeResult<OfferStatus> {
        offer.validate()?;
        let status: OfferStatus = self.signed(Endpoint::NewOffer, &offer).await?;
        tracing::info!(
            parent: &self.span,
            exchange = EXCHANGE_NAME,
            offer_id = status.id,
            request = %offer,
            "Offer placed"
        );
        Ok(status)
    }

    pub async fn cancel_offer(&self, offer_id: i64) -> ExchangeResult<OfferStatus> {
        let status: OfferStatus = self
            .signed(Endpoint::CancelOffer, &OfferIdFields { offer_id })
            .await?;
        tracing::info!(parent: &self.span, exchange = EXCHANGE_NAME, offer_id, "Offer cancelled");
        Ok(status)
    }

    pub async fn get_offer_status(&self, offer_id: i64) -> ExchangeResult<OfferStatus> {
        let status: OfferStatus = self
            .signed(Endpoint::OfferStatus, &OfferIdFields { offer_id })
            .await?;
        tracing::debug!(parent: &self.span, offer_id, status = %status, "Offer status fetched");
        Ok(status)
    }

    pub async fn get_active_offers(&self) -> ExchangeResult<Vec<OfferStatus>> {
        let offers: Vec<OfferStatus> = self.signed(Endpoint::ActiveOffers, &NoFields {}).await?;
        tracing::debug!(parent: &self.span, count = offers.len(), "Active offers fetched");
        Ok(offers)
    }

    pub async fn get_active_credits(&self) -> ExchangeResult<Vec<ActiveCredit>> {
        let credits: Vec<ActiveCredit> = self.signed(Endpoint::ActiveCredits, &NoFields {}).await?;
        tracing::debug!(parent: &self.span, count = credits.len(), "Active credits fetched");
        for credit in &credits {
            tracing::debug!(
                parent: &self.span,
                credit_id = credit.id,
                currency = %credit.currency,
                amount = %credit.amount,
                rate = %credit.rate,
                period = credit.period,
                status = %credit.status,
                "Active credit"
            );
        }
        Ok(credits)
    }

    pub async fn get_active_swaps_used_in_margin_position(
        &self,
    ) -> ExchangeResult<Vec<MarginSwap>> {
        let swaps: Vec<MarginSwap> = self.signed(Endpoint::TakenSwaps, &NoFields {}).await?;
        tracing::debug!(parent: &self.span, count = swaps.len(), "Taken swaps fetched");
        Ok(swaps)
    }

    pub async fn close_swap(&self, swap_id: i64) -> ExchangeResult<MarginSwap> {
        let swap: MarginSwap = self
            .signed(Endpoint::CloseSwap, &SwapIdFields { swap_id })
            .await?;
        tracing::info!(parent: &self.span, exchange = EXCHANGE_NAME, swap_id, "Swap closed");
        Ok(swap)
    }

    pub async fn claim_position(&self, position_id: i64) -> ExchangeResult<Position> {
        let position: Position = self
            .signed(Endpoint::ClaimPosition, &PositionIdFields { position_id })
            .await?;
        tracing::info!(
            parent: &self.span,
            exchange = EXCHANGE_NAME,
            position_id,
            symbol = %position.symbol,
            "Position claimed"
        );
        Ok(position)
    }
}

/// `result` field of a `{"result": ...}` body, or the trimmed body itself
fn result_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("result").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
