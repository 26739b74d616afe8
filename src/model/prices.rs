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
use anyhow::{bail, Error};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Boundary with the price-fetching collaborator. The calculator asks
/// for a unit price whenever it needs to value an acquisition or a
/// disposal; where those prices come from is not this crate's concern.
pub trait PriceSource {
	fn unit_price(
		&self,
		asset: &str,
		at: &DateTime<Utc>,
		currency: &str,
	) -> Result<Decimal, Error>;
}

/// A daily close price for one asset in one currency, as supplied in
/// the input file.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
	pub asset: String,
	pub date: NaiveDate,
	pub currency: String,
	pub unit_price: Decimal,
}

/// Price table backed by a fixed set of daily prices. A missing price
/// is a hard error; inventing one would corrupt the resulting totals.
pub struct StaticPrices {
	prices: BTreeMap<(String, String, NaiveDate), Decimal>,
}

impl StaticPrices {
	pub fn new(records: Vec<PriceRecord>) -> Self {
		let mut prices = BTreeMap::new();
		for r in records {
			prices.insert((r.asset, r.currency, r.date), r.unit_price);
		}
		Self { prices }
	}
}

impl PriceSource for StaticPrices {
	fn unit_price(
		&self,
		asset: &str,
		at: &DateTime<Utc>,
		currency: &str,
	) -> Result<Decimal, Error> {
		let date = at.date_naive();
		let key = (asset.to_string(), currency.to_string(), date);
		match self.prices.get(&key) {
			Some(price) => Ok(*price),
			None => bail!(
				"No {} price for {} on {}",
				currency,
				asset,
				date
			),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rust_decimal_macros::dec;

	#[test]
	fn test_lookup_by_day() {
		let prices = StaticPrices::new(vec![PriceRecord {
			asset: "BTC".to_string(),
			date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
			currency: "USD".to_string(),
			unit_price: dec!(60000),
		}]);

		let at = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
		let price = prices.unit_price("BTC", &at, "USD").unwrap();
		assert_eq!(price, dec!(60000));
	}

	#[test]
	fn test_missing_price_is_an_error() {
		let prices = StaticPrices::new(vec![]);
		let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
		let err = prices.unit_price("ETH", &at, "USD").unwrap_err();
		assert!(err.to_string().contains("ETH"));
		assert!(err.to_string().contains("2024-03-01"));
	}
}
