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
use crate::basis::calculation::Jurisdiction;
use crate::basis::method::CostBasisMethod;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
	pub defaults: Option<Defaults>,
}

/// Per-user defaults; command-line flags always win over these.
#[derive(Debug, Default, Deserialize)]
pub struct Defaults {
	pub method: Option<CostBasisMethod>,
	pub jurisdiction: Option<Jurisdiction>,
	pub currency: Option<String>,
}
