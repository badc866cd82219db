/// Price-level order book built from tick flow
///
/// Sorted aggregation over two sides: bids best-first descending, asks
/// best-first ascending. Each level carries the aggregate quantity and
/// the number of orders that built it. BTreeMap keeps updates O(log n)
/// and depth walks O(k).

use crate::protocol::Side;
use crate::tick::Tick;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    /// Fixed-point price, scaled by 10^4.
    pub price: i64,
    pub qty: i64,
    pub orders: u32,
}

#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    bids: BTreeMap<i64, (i64, u32)>,
    asks: BTreeMap<i64, (i64, u32)>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a tick as an add at its price level. Ticks that fail the
    /// validity predicate are ignored.
    pub fn apply(&mut self, tick: &Tick) {
        if !tick.is_valid() {
            return;
        }
        self.add(tick.side, tick.price, tick.qty as i64);
    }

    /// Add quantity at a level, creating it if absent. Trades and
    /// unset sides carry no book level and are ignored.
    pub fn add(&mut self, side: Side, price: i64, qty: i64) {
        if qty <= 0 {
            return;
        }
        if let Some(map) = self.side_mut(side) {
            let level = map.entry(price).or_insert((0, 0));
            level.0 += qty;
            level.1 += 1;
        }
    }

    /// Apply a signed quantity delta to an existing level. The level
    /// is removed once its quantity reaches zero. No-op for a price
    /// with no level.
    pub fn modify(&mut self, side: Side, price: i64, delta: i64) {
        if let Some(map) = self.side_mut(side) {
            if let Some(level) = map.get_mut(&price) {
                level.0 = (level.0 + delta).max(0);
                if level.0 == 0 {
                    map.remove(&price);
                }
            }
        }
    }

    /// Delete a level outright.
    pub fn remove(&mut self, side: Side, price: i64) {
        if let Some(map) = self.side_mut(side) {
            map.remove(&price);
        }
    }

    fn side_mut(&mut self, side: Side) -> Option<&mut BTreeMap<i64, (i64, u32)>> {
        match side {
            Side::Bid => Some(&mut self.bids),
            Side::Ask => Some(&mut self.asks),
            _ => None,
        }
    }

    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids
            .iter()
            .next_back()
            .map(|(&price, &(qty, orders))| PriceLevel { price, qty, orders })
    }

    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks
            .iter()
            .next()
            .map(|(&price, &(qty, orders))| PriceLevel { price, qty, orders })
    }

    /// Integer mean of the best prices.
    pub fn mid(&self) -> Option<i64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.price + ask.price) / 2),
            _ => None,
        }
    }

    /// Best ask minus best bid; `None` while either side is empty or
    /// the book is crossed.
    pub fn spread(&self) -> Option<i64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if bid.price < ask.price => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// The first `k` levels of a side, best-first.
    pub fn depth(&self, side: Side, k: usize) -> Vec<PriceLevel> {
        let to_level = |(&price, &(qty, orders)): (&i64, &(i64, u32))| PriceLevel {
            price,
            qty,
            orders,
        };
        match side {
            Side::Bid => self.bids.iter().rev().take(k).map(to_level).collect(),
            Side::Ask => self.asks.iter().take(k).map(to_level).collect(),
            _ => Vec::new(),
        }
    }

    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }
}
