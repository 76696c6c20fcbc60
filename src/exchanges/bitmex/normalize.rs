//! Post-fetch ordering and filtering of venue responses.
//!
//! All functions are pure and keep the relative order of the elements they
//! return.

use crate::core::types::{Candle, Order, Position};
use chrono::{DateTime, Utc};

/// Order candles by ascending open time. Stable, so candles sharing a
/// timestamp keep their received order; duplicates are never merged.
pub fn sort_candles(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|candle| candle.timestamp);
    candles
}

/// Open times that occur more than once in an ascending candle sequence.
pub fn duplicate_timestamps(sorted: &[Candle]) -> Vec<DateTime<Utc>> {
    let mut duplicates: Vec<DateTime<Utc>> = sorted
        .windows(2)
        .filter(|pair| pair[0].timestamp == pair[1].timestamp)
        .map(|pair| pair[0].timestamp)
        .collect();
    duplicates.dedup();
    duplicates
}

pub fn filter_open_orders(orders: Vec<Order>) -> Vec<Order> {
    orders.into_iter().filter(Order::is_open).collect()
}

pub fn filter_open_positions(positions: Vec<Position>) -> Vec<Position> {
    positions.into_iter().filter(|p| p.is_open).collect()
}

pub fn filter_closed_positions(positions: Vec<Position>) -> Vec<Position> {
    positions.into_iter().filter(|p| !p.is_open).collect()
}

/// First order whose id matches.
pub fn find_order_by_id<'a>(orders: &'a [Order], order_id: &str) -> Option<&'a Order> {
    orders.iter().find(|order| order.order_id == order_id)
}
