/* Copyright © 2025 taxlot contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::linking::link::TransactionLink;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet, VecDeque};

/// Matching structure the calculator consults while it walks
/// transactions in time order. Given an outflow it answers "does a
/// confirmed link say these funds went somewhere the user still
/// controls?", and the mirror question for inflows.
///
/// A transfer has two halves that are processed at different points of
/// the walk, so consumption is tracked per side: eating a link on the
/// source side leaves it discoverable on the target side, and vice
/// versa. Consuming a link twice, or one that was never indexed, is a
/// deliberate no-op.
///
/// Keys are (transaction id, asset); each key holds a FIFO queue so a
/// batched withdrawal split across several on-chain outflows can carry
/// several links on one key.
pub struct LinkIndex {
	links: Vec<TransactionLink>,

	by_source: HashMap<(String, String), VecDeque<usize>>,
	by_target: HashMap<(String, String), VecDeque<usize>>,

	/// Positions in `links`, by link id, for idempotent consumption
	positions: HashMap<String, usize>,

	source_consumed: HashSet<usize>,
	target_consumed: HashSet<usize>,
}

impl LinkIndex {
	/// Indexes the confirmed links from the given set. Suggested and
	/// rejected links never participate in transfer classification.
	pub fn new(links: &[TransactionLink]) -> Self {
		let links: Vec<TransactionLink> = links
			.iter()
			.filter(|l| l.is_confirmed())
			.cloned()
			.collect();

		let mut by_source: HashMap<(String, String), VecDeque<usize>> =
			HashMap::new();
		let mut by_target: HashMap<(String, String), VecDeque<usize>> =
			HashMap::new();
		let mut positions = HashMap::new();

		for (i, link) in links.iter().enumerate() {
			by_source
				.entry((
					link.source_transaction_id.clone(),
					link.asset.clone(),
				))
				.or_default()
				.push_back(i);
			by_target
				.entry((
					link.target_transaction_id.clone(),
					link.asset.clone(),
				))
				.or_default()
				.push_back(i);
			positions.insert(link.id.clone(), i);
		}

		Self {
			links,
			by_source,
			by_target,
			positions,
			source_consumed: HashSet::new(),
			target_consumed: HashSet::new(),
		}
	}

	/// The first link, in insertion order, whose source side matches
	/// the given outflow exactly and has not yet been consumed on the
	/// source side. Amount comparison is exact decimal equality.
	pub fn find_by_source(
		&self,
		transaction_id: &str,
		asset: &str,
		amount: Decimal,
	) -> Option<&TransactionLink> {
		let key = (transaction_id.to_string(), asset.to_string());
		let queue = self.by_source.get(&key)?;

		queue
			.iter()
			.find(|&&i| {
				!self.source_consumed.contains(&i)
					&& self.links[i].source_amount == amount
			})
			.map(|&i| &self.links[i])
	}

	/// The first link, in insertion order, whose target side matches
	/// the given transaction and asset and has not yet been consumed
	/// on the target side. No amount is required here; the arriving
	/// amount may be reduced by an in-flight fee.
	pub fn find_by_target(
		&self,
		transaction_id: &str,
		asset: &str,
	) -> Option<&TransactionLink> {
		let key = (transaction_id.to_string(), asset.to_string());
		let queue = self.by_target.get(&key)?;

		queue
			.iter()
			.find(|&&i| !self.target_consumed.contains(&i))
			.map(|&i| &self.links[i])
	}

	/// Marks the link as used up on the source side only. It remains
	/// discoverable by target until consume_target_link is called.
	pub fn consume_source_link(&mut self, link: &TransactionLink) {
		let Some(&i) = self.positions.get(&link.id) else {
			return; // never indexed; nothing to do
		};

		if !self.source_consumed.insert(i) {
			return;
		}

		let key = (
			self.links[i].source_transaction_id.clone(),
			self.links[i].asset.clone(),
		);
		if let Some(queue) = self.by_source.get_mut(&key) {
			queue.retain(|&j| j != i);
		}
	}

	/// Marks the link as used up on the target side only.
	pub fn consume_target_link(&mut self, link: &TransactionLink) {
		let Some(&i) = self.positions.get(&link.id) else {
			return;
		};

		if !self.target_consumed.insert(i) {
			return;
		}

		let key = (
			self.links[i].target_transaction_id.clone(),
			self.links[i].asset.clone(),
		);
		if let Some(queue) = self.by_target.get_mut(&key) {
			queue.retain(|&j| j != i);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::linking::link::{LinkStatus, LinkType, MatchCriteria};
	use chrono::Utc;
	use rust_decimal_macros::dec;

	fn link(
		id: &str,
		source: &str,
		target: &str,
		asset: &str,
		amount: Decimal,
		status: LinkStatus,
	) -> TransactionLink {
		TransactionLink {
			id: id.to_string(),
			source_transaction_id: source.to_string(),
			target_transaction_id: target.to_string(),
			asset: asset.to_string(),
			source_amount: amount,
			target_amount: amount,
			link_type: LinkType::ExchangeToBlockchain,
			confidence_score: dec!(0.9),
			match_criteria: MatchCriteria {
				asset_match: true,
				amount_similarity: dec!(1),
				timing_valid: true,
				timing_hours: dec!(1),
			},
			status,
			reviewed_by: None,
			created_at: Utc::now(),
			updated_at: Utc::now(),
		}
	}

	#[test]
	fn test_find_by_source_requires_exact_amount() {
		let links =
			vec![link("l1", "w1", "d1", "BTC", dec!(0.5), LinkStatus::Confirmed)];
		let index = LinkIndex::new(&links);

		assert!(index.find_by_source("w1", "BTC", dec!(0.5)).is_some());
		assert!(index.find_by_source("w1", "BTC", dec!(0.50001)).is_none());
		assert!(index.find_by_source("w1", "ETH", dec!(0.5)).is_none());
		assert!(index.find_by_source("w2", "BTC", dec!(0.5)).is_none());
	}

	#[test]
	fn test_unconfirmed_links_are_not_indexed() {
		let links = vec![
			link("l1", "w1", "d1", "BTC", dec!(1), LinkStatus::Suggested),
			link("l2", "w2", "d2", "BTC", dec!(1), LinkStatus::Rejected),
		];
		let index = LinkIndex::new(&links);

		assert!(index.find_by_source("w1", "BTC", dec!(1)).is_none());
		assert!(index.find_by_target("d2", "BTC").is_none());
	}

	#[test]
	fn test_two_phase_consumption_is_independent() {
		let links =
			vec![link("l1", "w1", "d1", "BTC", dec!(1), LinkStatus::Confirmed)];
		let mut index = LinkIndex::new(&links);

		let found = index.find_by_source("w1", "BTC", dec!(1)).cloned();
		index.consume_source_link(found.as_ref().unwrap());

		// Source side is gone, target side is untouched
		assert!(index.find_by_source("w1", "BTC", dec!(1)).is_none());
		let target = index.find_by_target("d1", "BTC").cloned();
		assert_eq!(target.as_ref().map(|l| l.id.as_str()), Some("l1"));

		index.consume_target_link(target.as_ref().unwrap());
		assert!(index.find_by_target("d1", "BTC").is_none());
	}

	#[test]
	fn test_consumption_is_idempotent() {
		let links =
			vec![link("l1", "w1", "d1", "BTC", dec!(1), LinkStatus::Confirmed)];
		let mut index = LinkIndex::new(&links);

		let l = links[0].clone();
		index.consume_source_link(&l);
		index.consume_source_link(&l); // no-op
		assert!(index.find_by_target("d1", "BTC").is_some());

		// A link that was never indexed is also a no-op
		let stranger =
			link("l9", "x", "y", "BTC", dec!(2), LinkStatus::Confirmed);
		index.consume_source_link(&stranger);
		index.consume_target_link(&stranger);
	}

	#[test]
	fn test_colliding_keys_resolve_in_fifo_order() {
		let links = vec![
			link("l1", "w1", "d1", "BTC", dec!(0.3), LinkStatus::Confirmed),
			link("l2", "w1", "d2", "BTC", dec!(0.5), LinkStatus::Confirmed),
			link("l3", "w1", "d3", "BTC", dec!(0.2), LinkStatus::Confirmed),
		];
		let mut index = LinkIndex::new(&links);

		for (amount, expected) in [
			(dec!(0.5), "l2"),
			(dec!(0.3), "l1"),
			(dec!(0.2), "l3"),
		] {
			let found =
				index.find_by_source("w1", "BTC", amount).cloned().unwrap();
			assert_eq!(found.id, expected);
			index.consume_source_link(&found);
		}

		assert!(index.find_by_source("w1", "BTC", dec!(0.3)).is_none());
	}

	#[test]
	fn test_duplicate_amounts_resolve_in_insertion_order() {
		let links = vec![
			link("l1", "w1", "d1", "BTC", dec!(1), LinkStatus::Confirmed),
			link("l2", "w1", "d2", "BTC", dec!(1), LinkStatus::Confirmed),
		];
		let mut index = LinkIndex::new(&links);

		let first = index.find_by_source("w1", "BTC", dec!(1)).cloned().unwrap();
		assert_eq!(first.id, "l1");
		index.consume_source_link(&first);

		let second =
			index.find_by_source("w1", "BTC", dec!(1)).cloned().unwrap();
		assert_eq!(second.id, "l2");
	}
}
