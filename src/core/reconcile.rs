#![forbid(unsafe_code)]

use std::collections::HashSet;

use crate::core::events::{listing_key, BoughtEvent, CanceledEvent, ListingEvent};

/// Derives the currently active listings: every listed event whose key does
/// not appear in the bought or canceled feeds. Pure set subtraction over the
/// listing key; output preserves the input order of `listed`.
///
/// A re-listing after a buy or cancel of the same token shares its key with
/// the first epoch and stays filtered out. The feeds carry no epoch
/// information, so this limitation is inherent to the model.
pub fn active_listings(
    listed: &[ListingEvent],
    bought: &[BoughtEvent],
    canceled: &[CanceledEvent],
) -> Vec<ListingEvent> {
    let bought_keys: HashSet<String> = bought
        .iter()
        .map(|event| listing_key(&event.nft_address, &event.token_id))
        .collect();
    let canceled_keys: HashSet<String> = canceled
        .iter()
        .map(|event| listing_key(&event.nft_address, &event.token_id))
        .collect();

    listed
        .iter()
        .filter(|event| !event.nft_address.is_empty() && !event.token_id.is_empty())
        .filter(|event| {
            let key = event.key();
            !bought_keys.contains(&key) && !canceled_keys.contains(&key)
        })
        .cloned()
        .collect()
}
