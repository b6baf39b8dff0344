//! Price ranking with SQL `RANK()` semantics
//!
//! Rows are sorted by price ascending; each row's rank is one more than the
//! number of rows strictly cheaper than it. Equal prices share a rank and the
//! next distinct price skips ahead (1, 1, 3, ...).

/// Compare prices at cent precision so 0.1 + 0.2 style noise cannot split a tie
fn cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

/// Sort `items` by price and attach a rank to each.
///
/// The sort is stable: rows with equal prices keep their incoming order, so
/// callers that pass rows ordered by id get a deterministic tie order.
pub fn rank_by_price<T, F>(mut items: Vec<T>, price: F) -> Vec<(u32, T)>
where
    F: Fn(&T) -> f64,
{
    items.sort_by_key(|item| cents(price(item)));

    let mut ranked = Vec::with_capacity(items.len());
    let mut previous: Option<(i64, u32)> = None;
    for (index, item) in items.into_iter().enumerate() {
        let key = cents(price(&item));
        let rank = match previous {
            Some((prev_key, prev_rank)) if prev_key == key => prev_rank,
            // Everything already ranked is strictly cheaper
            _ => index as u32 + 1,
        };
        previous = Some((key, rank));
        ranked.push((rank, item));
    }
    ranked
}
