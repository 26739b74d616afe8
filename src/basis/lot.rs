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
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A discrete quantity of one asset acquired at a specific date and
/// unit cost, tracked until fully consumed. Exhausted lots are kept
/// around so the audit trail of every disposal stays intact.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
	/// Sequential per calculation run
	pub id: u64,

	pub asset: String,
	pub acquisition_date: DateTime<Utc>,

	pub original_quantity: Decimal,

	/// Monotonically non-increasing; zero means exhausted
	pub remaining_quantity: Decimal,

	/// Cost-currency amount per unit of the asset
	pub unit_cost_basis: Decimal,

	pub acquisition_transaction_id: String,
	pub source_account: String,
}

impl Lot {
	pub fn status(&self) -> LotStatus {
		if self.remaining_quantity.is_zero() {
			LotStatus::Exhausted
		} else {
			LotStatus::Open
		}
	}

	/// Whole days this lot had been held as of the given moment.
	pub fn days_held(&self, as_of: &DateTime<Utc>) -> i64 {
		(*as_of - self.acquisition_date).num_days()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
	Open,
	Exhausted,
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rust_decimal_macros::dec;

	fn lot() -> Lot {
		Lot {
			id: 1,
			asset: "BTC".to_string(),
			acquisition_date: Utc
				.with_ymd_and_hms(2024, 1, 10, 12, 0, 0)
				.unwrap(),
			original_quantity: dec!(2),
			remaining_quantity: dec!(2),
			unit_cost_basis: dec!(30000),
			acquisition_transaction_id: "buy".to_string(),
			source_account: "kraken".to_string(),
		}
	}

	#[test]
	fn test_status_tracks_remaining_quantity() {
		let mut lot = lot();
		assert_eq!(lot.status(), LotStatus::Open);

		lot.remaining_quantity = dec!(0.5);
		assert_eq!(lot.status(), LotStatus::Open);

		lot.remaining_quantity = dec!(0);
		assert_eq!(lot.status(), LotStatus::Exhausted);
	}

	#[test]
	fn test_days_held_is_whole_days() {
		let lot = lot();

		let same_day =
			Utc.with_ymd_and_hms(2024, 1, 10, 23, 0, 0).unwrap();
		assert_eq!(lot.days_held(&same_day), 0);

		let later = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
		assert_eq!(lot.days_held(&later), 60);
	}
}
