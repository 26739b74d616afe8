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
use crate::basis::lot::Lot;
use anyhow::{bail, Error};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Per-asset, time-ordered collection of acquisition lots. Lots only
/// ever shrink; an exhausted lot stays in place for audit. In pooled
/// mode (average cost) each asset holds a single synthetic lot whose
/// unit cost is recomputed on every acquisition.
pub struct LotLedger {
	/// True for the average-cost method
	pooled: bool,

	/// asset -> lots ordered by acquisition date
	lots: BTreeMap<String, Vec<Lot>>,

	/// The ID number that will be assigned to the next lot
	next_id: u64,
}

impl LotLedger {
	pub fn new(pooled: bool) -> Self {
		Self {
			pooled,
			lots: BTreeMap::new(),
			next_id: 0,
		}
	}

	/// Records an inflow classified as a true acquisition. Returns the
	/// id of the lot created or, in pooled mode, merged into.
	pub fn add_acquisition(
		&mut self,
		asset: &str,
		acquisition_date: DateTime<Utc>,
		quantity: Decimal,
		unit_cost_basis: Decimal,
		transaction_id: &str,
		source_account: &str,
	) -> u64 {
		if self.pooled {
			return self.merge_into_pool(
				asset,
				acquisition_date,
				quantity,
				unit_cost_basis,
				transaction_id,
				source_account,
			);
		}

		self.insert_lot(
			asset,
			acquisition_date,
			quantity,
			unit_cost_basis,
			transaction_id,
			source_account,
		)
	}

	/// Records an inflow matched to a confirmed transfer. The original
	/// acquisition date and unit cost are preserved, so the lot may
	/// land anywhere in the asset's timeline, not just at the end.
	pub fn add_transferred_lot(
		&mut self,
		asset: &str,
		acquisition_date: DateTime<Utc>,
		quantity: Decimal,
		unit_cost_basis: Decimal,
		transaction_id: &str,
		source_account: &str,
	) -> u64 {
		if self.pooled {
			return self.merge_into_pool(
				asset,
				acquisition_date,
				quantity,
				unit_cost_basis,
				transaction_id,
				source_account,
			);
		}

		self.insert_lot(
			asset,
			acquisition_date,
			quantity,
			unit_cost_basis,
			transaction_id,
			source_account,
		)
	}

	/// Weighted-average merge into the asset's single pooled lot:
	/// new unit cost = (old_qty * old_cost + qty * cost) / (old_qty + qty)
	fn merge_into_pool(
		&mut self,
		asset: &str,
		acquisition_date: DateTime<Utc>,
		quantity: Decimal,
		unit_cost_basis: Decimal,
		transaction_id: &str,
		source_account: &str,
	) -> u64 {
		if let Some(pool) =
			self.lots.get_mut(asset).and_then(|v| v.first_mut())
		{
			let combined = pool.remaining_quantity + quantity;
			pool.unit_cost_basis = (pool.remaining_quantity
				* pool.unit_cost_basis
				+ quantity * unit_cost_basis)
				/ combined;
			pool.remaining_quantity = combined;
			pool.original_quantity += quantity;

			// The pool represents many acquisitions; keep the earliest
			// date so holding periods err on the side of already-held
			if acquisition_date < pool.acquisition_date {
				pool.acquisition_date = acquisition_date;
			}

			return pool.id;
		}

		self.insert_lot(
			asset,
			acquisition_date,
			quantity,
			unit_cost_basis,
			transaction_id,
			source_account,
		)
	}

	fn insert_lot(
		&mut self,
		asset: &str,
		acquisition_date: DateTime<Utc>,
		quantity: Decimal,
		unit_cost_basis: Decimal,
		transaction_id: &str,
		source_account: &str,
	) -> u64 {
		self.next_id += 1;
		let lot = Lot {
			id: self.next_id,
			asset: asset.to_string(),
			acquisition_date,
			original_quantity: quantity,
			remaining_quantity: quantity,
			unit_cost_basis,
			acquisition_transaction_id: transaction_id.to_string(),
			source_account: source_account.to_string(),
		};

		let lots = self.lots.entry(asset.to_string()).or_default();

		// Keep acquisition-date order; ties keep insertion order
		let pos = lots
			.iter()
			.position(|l| l.acquisition_date > acquisition_date)
			.unwrap_or(lots.len());
		lots.insert(pos, lot);

		self.next_id
	}

	/// Decrements a lot's remaining quantity. Going negative is a
	/// data-integrity violation, never a rounding matter, so it is a
	/// hard error here even though the strategies check first.
	pub fn consume(
		&mut self,
		asset: &str,
		lot_id: u64,
		quantity: Decimal,
	) -> Result<(), Error> {
		let lot = self
			.lots
			.get_mut(asset)
			.and_then(|v| v.iter_mut().find(|l| l.id == lot_id));

		let Some(lot) = lot else {
			bail!("No lot {} for {}", lot_id, asset);
		};

		if quantity > lot.remaining_quantity {
			bail!(
				"Lot {} of {} holds {} but {} was requested",
				lot_id,
				asset,
				lot.remaining_quantity,
				quantity
			);
		}

		lot.remaining_quantity -= quantity;
		Ok(())
	}

	pub fn total_remaining(&self, asset: &str) -> Decimal {
		self.lots
			.get(asset)
			.map(|v| v.iter().map(|l| l.remaining_quantity).sum())
			.unwrap_or_default()
	}

	/// The asset's lots in acquisition-date order, exhausted included.
	pub fn lots(&self, asset: &str) -> &[Lot] {
		self.lots.get(asset).map(|v| v.as_slice()).unwrap_or(&[])
	}

	pub fn lot(&self, asset: &str, lot_id: u64) -> Option<&Lot> {
		self.lots
			.get(asset)
			.and_then(|v| v.iter().find(|l| l.id == lot_id))
	}

	/// Flattens all assets' lots for persistence, ordered by asset
	/// then acquisition date. Consumes this.
	pub fn into_lots(self) -> Vec<Lot> {
		self.lots.into_values().flatten().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rust_decimal_macros::dec;

	fn at(day: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
	}

	#[test]
	fn test_lots_stay_date_ordered() {
		let mut ledger = LotLedger::new(false);
		ledger.add_acquisition("BTC", at(10), dec!(1), dec!(40000), "t1", "a");
		ledger.add_acquisition("BTC", at(20), dec!(1), dec!(50000), "t2", "a");

		// A transfer-in carries an older acquisition date
		ledger.add_transferred_lot(
			"BTC",
			at(5),
			dec!(2),
			dec!(30000),
			"t3",
			"b",
		);

		let dates: Vec<DateTime<Utc>> = ledger
			.lots("BTC")
			.iter()
			.map(|l| l.acquisition_date)
			.collect();
		assert_eq!(dates, vec![at(5), at(10), at(20)]);
		assert_eq!(ledger.total_remaining("BTC"), dec!(4));
	}

	#[test]
	fn test_pooled_mode_recomputes_average() {
		let mut ledger = LotLedger::new(true);
		let id1 =
			ledger.add_acquisition("ETH", at(1), dec!(10), dec!(2000), "t1", "a");
		let id2 =
			ledger.add_acquisition("ETH", at(2), dec!(10), dec!(3000), "t2", "a");

		assert_eq!(id1, id2);
		let lots = ledger.lots("ETH");
		assert_eq!(lots.len(), 1);
		assert_eq!(lots[0].remaining_quantity, dec!(20));
		assert_eq!(lots[0].unit_cost_basis, dec!(2500));
		assert_eq!(lots[0].original_quantity, dec!(20));
	}

	#[test]
	fn test_pooled_average_after_partial_consumption() {
		let mut ledger = LotLedger::new(true);
		let id =
			ledger.add_acquisition("ETH", at(1), dec!(10), dec!(2000), "t1", "a");
		ledger.consume("ETH", id, dec!(5)).unwrap();
		ledger.add_acquisition("ETH", at(2), dec!(15), dec!(4000), "t2", "a");

		// (5 * 2000 + 15 * 4000) / 20 = 3500
		let pool = ledger.lot("ETH", id).unwrap();
		assert_eq!(pool.unit_cost_basis, dec!(3500));
		assert_eq!(pool.remaining_quantity, dec!(20));
	}

	#[test]
	fn test_consume_never_goes_negative() {
		let mut ledger = LotLedger::new(false);
		let id =
			ledger.add_acquisition("BTC", at(1), dec!(1), dec!(40000), "t1", "a");

		assert!(ledger.consume("BTC", id, dec!(1.5)).is_err());
		assert!(ledger.consume("BTC", id, dec!(1)).is_ok());
		assert_eq!(ledger.total_remaining("BTC"), dec!(0));

		// Exhausted lots are retained
		assert_eq!(ledger.lots("BTC").len(), 1);
	}

	#[test]
	fn test_unknown_lot_is_an_error() {
		let mut ledger = LotLedger::new(false);
		assert!(ledger.consume("BTC", 7, dec!(1)).is_err());
	}
}
