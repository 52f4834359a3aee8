//! Paper market for one trading pair.

use divmm_core::{
    Candle, ClientOrderId, FillEvent, OpenOrder, OrderIntent, OrderSide, OrderType, Price,
    PriceType, Size, TradingPair,
};
use divmm_mm::{MakerResult, MarketAccess};
use rust_decimal::Decimal;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};

use crate::balances::Balances;
use crate::book::BookTop;
use crate::config::PaperConfig;
use crate::error::{PaperError, PaperResult};

/// Simulated exchange for a single pair.
#[derive(Debug)]
pub struct PaperMarket {
    pair: TradingPair,
    config: PaperConfig,
    balances: Balances,
    book: Option<BookTop>,
    /// Resting orders, oldest first.
    orders: Vec<OpenOrder>,
    now_ms: i64,
    fill_tx: UnboundedSender<FillEvent>,
    fill_count: u64,
}

impl PaperMarket {
    pub fn new(pair: TradingPair, config: PaperConfig, fill_tx: UnboundedSender<FillEvent>) -> Self {
        info!(
            pair = %pair,
            balances = ?config.initial_balances,
            half_spread = %config.book_half_spread,
            "Paper market created"
        );
        Self {
            balances: Balances::new(&config.initial_balances),
            pair,
            config,
            book: None,
            orders: Vec::new(),
            now_ms: 0,
            fill_tx,
            fill_count: 0,
        }
    }

    /// Move the book to `mid` and fill anything it crosses.
    pub fn update_mid(&mut self, mid: Price, now_ms: i64) -> usize {
        let mut book = BookTop::around(mid, self.config.book_half_spread);
        book.last_trade = self.book.and_then(|b| b.last_trade);
        self.set_book(book, now_ms)
    }

    /// Replace the book and fill anything it crosses. Returns the fill count.
    pub fn set_book(&mut self, book: BookTop, now_ms: i64) -> usize {
        self.now_ms = self.now_ms.max(now_ms);
        self.book = Some(book);
        self.match_orders()
    }

    /// Walk a candle's price path and fill resting orders along it.
    ///
    /// Up candles visit open, low, high, close; down candles visit open,
    /// high, low, close.
    pub fn apply_candle(&mut self, candle: &Candle, now_ms: i64) -> usize {
        let path = if candle.close >= candle.open {
            [candle.open, candle.low, candle.high, candle.close]
        } else {
            [candle.open, candle.high, candle.low, candle.close]
        };
        let fills: usize = path
            .into_iter()
            .map(|mid| self.update_mid(mid, now_ms))
            .sum();
        trace!(
            ts = candle.timestamp_ms,
            close = %candle.close,
            fills,
            "Candle applied to paper book"
        );
        fills
    }

    fn match_orders(&mut self) -> usize {
        let Some(book) = self.book else {
            return 0;
        };

        let (crossed, resting): (Vec<OpenOrder>, Vec<OpenOrder>) =
            std::mem::take(&mut self.orders)
                .into_iter()
                .partition(|o| match o.side {
                    OrderSide::Buy => book.best_ask <= o.price,
                    OrderSide::Sell => book.best_bid >= o.price,
                });
        self.orders = resting;

        let count = crossed.len();
        for order in crossed {
            self.fill(order);
        }
        count
    }

    fn fill(&mut self, order: OpenOrder) {
        let notional = order.amount.notional(order.price);
        let keep = Decimal::ONE - self.config.maker_fee;
        match order.side {
            OrderSide::Buy => self.balances.settle(
                self.pair.quote(),
                notional,
                self.pair.base(),
                order.amount.inner() * keep,
            ),
            OrderSide::Sell => self.balances.settle(
                self.pair.base(),
                order.amount.inner(),
                self.pair.quote(),
                notional * keep,
            ),
        }
        if let Some(book) = self.book.as_mut() {
            book.last_trade = Some(order.price);
        }
        self.fill_count += 1;

        debug!(
            id = %order.id,
            side = %order.side,
            price = %order.price,
            amount = %order.amount,
            "Paper order filled"
        );

        let event = FillEvent {
            timestamp_ms: self.now_ms,
            order_id: order.id,
            pair: order.pair,
            side: order.side,
            price: order.price,
            amount: order.amount,
        };
        if self.fill_tx.send(event).is_err() {
            warn!("Fill receiver dropped, fill not reported");
        }
    }

    /// Asset and amount an intent locks while resting.
    fn reservation(&self, side: OrderSide, price: Price, amount: Size) -> (&str, Decimal) {
        match side {
            OrderSide::Buy => (self.pair.quote(), amount.notional(price)),
            OrderSide::Sell => (self.pair.base(), amount.inner()),
        }
    }

    fn check_order(&self, intent: &OrderIntent) -> PaperResult<()> {
        let book = self.book.ok_or(PaperError::NotReady)?;
        if intent.pair != self.pair {
            return Err(PaperError::InvalidOrder(format!(
                "pair {} not traded here ({})",
                intent.pair, self.pair
            )));
        }
        if intent.order_type != OrderType::Limit {
            return Err(PaperError::InvalidOrder(format!(
                "{} orders not supported",
                intent.order_type
            )));
        }
        if !intent.amount.is_positive() || !intent.price.is_positive() {
            return Err(PaperError::InvalidOrder(format!(
                "non-positive price {} or amount {}",
                intent.price, intent.amount
            )));
        }
        if intent.is_maker {
            let crosses = match intent.side {
                OrderSide::Buy => intent.price >= book.best_ask,
                OrderSide::Sell => intent.price <= book.best_bid,
            };
            if crosses {
                return Err(PaperError::WouldCross {
                    side: intent.side,
                    price: intent.price,
                    best: match intent.side {
                        OrderSide::Buy => book.best_ask,
                        OrderSide::Sell => book.best_bid,
                    },
                });
            }
        }
        Ok(())
    }

    fn place(&mut self, intent: &OrderIntent) -> PaperResult<ClientOrderId> {
        self.check_order(intent)?;
        let (asset, amount) = self.reservation(intent.side, intent.price, intent.amount);
        let asset = asset.to_string();
        self.balances.lock(&asset, amount)?;

        let id = ClientOrderId::new();
        self.orders
            .push(OpenOrder::from_intent(id.clone(), intent, self.now_ms));
        Ok(id)
    }

    fn cancel(&mut self, pair: &TradingPair, id: &ClientOrderId) -> PaperResult<()> {
        let idx = self
            .orders
            .iter()
            .position(|o| &o.id == id && &o.pair == pair)
            .ok_or_else(|| PaperError::OrderNotFound(id.clone()))?;
        let order = self.orders.remove(idx);
        let (asset, amount) = self.reservation(order.side, order.price, order.amount);
        let asset = asset.to_string();
        self.balances.unlock(&asset, amount);
        Ok(())
    }

    pub fn book(&self) -> Option<BookTop> {
        self.book
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    pub fn fill_count(&self) -> u64 {
        self.fill_count
    }

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }
}

impl MarketAccess for PaperMarket {
    fn is_ready(&self) -> bool {
        self.book.is_some()
    }

    fn reference_price(&self, pair: &TradingPair, price_type: PriceType) -> MakerResult<Price> {
        if pair != &self.pair {
            return Err(PaperError::InvalidOrder(format!("unknown pair {pair}")).into());
        }
        let book = self.book.ok_or(PaperError::NotReady)?;
        Ok(book.price(price_type)?)
    }

    fn balance(&self, asset: &str) -> Decimal {
        self.balances.total(asset)
    }

    fn available_balance(&self, asset: &str) -> Decimal {
        self.balances.available(asset)
    }

    fn clip_to_budget(&self, intents: Vec<OrderIntent>, all_or_none: bool) -> Vec<OrderIntent> {
        let mut base_left = self.balances.available(self.pair.base());
        let mut quote_left = self.balances.available(self.pair.quote());
        let mut funded = Vec::with_capacity(intents.len());

        for intent in intents {
            let (_, required) = self.reservation(intent.side, intent.price, intent.amount);
            let left = match intent.side {
                OrderSide::Buy => &mut quote_left,
                OrderSide::Sell => &mut base_left,
            };

            if required <= *left {
                *left -= required;
                funded.push(intent);
                continue;
            }
            if all_or_none {
                debug!(
                    side = %intent.side,
                    required = %required,
                    available = %*left,
                    "Budget check failed, dropping proposal"
                );
                return Vec::new();
            }

            let amount = match intent.side {
                OrderSide::Buy if intent.price.is_positive() => *left / intent.price.inner(),
                OrderSide::Buy => Decimal::ZERO,
                OrderSide::Sell => *left,
            };
            *left = Decimal::ZERO;
            if amount.is_sign_positive() && !amount.is_zero() {
                funded.push(intent.with_amount(Size::new(amount)));
            }
        }
        funded
    }

    fn submit_order(&mut self, intent: &OrderIntent) -> MakerResult<ClientOrderId> {
        Ok(self.place(intent)?)
    }

    fn cancel_order(&mut self, pair: &TradingPair, id: &ClientOrderId) -> MakerResult<()> {
        Ok(self.cancel(pair, id)?)
    }

    fn open_orders(&self, pair: &TradingPair) -> Vec<OpenOrder> {
        self.orders
            .iter()
            .filter(|o| &o.pair == pair)
            .cloned()
            .collect()
    }
}
