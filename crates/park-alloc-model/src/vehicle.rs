// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::err::InvalidPlateError;
use park_alloc_core::{id::VehicleId, time::Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const MIN_PLATE_LEN: usize = 2;
const MAX_PLATE_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleClass {
    Car,
    Motorcycle,
    Truck,
    Electric,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Car,
        VehicleClass::Motorcycle,
        VehicleClass::Truck,
        VehicleClass::Electric,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            VehicleClass::Car => "Car",
            VehicleClass::Motorcycle => "Motorcycle",
            VehicleClass::Truck => "Truck",
            VehicleClass::Electric => "Electric Vehicle",
        }
    }
}

impl Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VehicleClass::Car => "CAR",
            VehicleClass::Motorcycle => "MOTORCYCLE",
            VehicleClass::Truck => "TRUCK",
            VehicleClass::Electric => "ELECTRIC",
        };
        f.write_str(s)
    }
}

/// A registered vehicle. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    id: VehicleId,
    license_plate: String,
    owner_name: String,
    class: VehicleClass,
    registered_at: Timestamp,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        license_plate: &str,
        owner_name: &str,
        class: VehicleClass,
        registered_at: Timestamp,
    ) -> Result<Self, InvalidPlateError> {
        if !Self::is_valid_plate(license_plate) {
            return Err(InvalidPlateError::new(license_plate));
        }
        Ok(Self {
            id,
            license_plate: Self::normalize_plate(license_plate),
            owner_name: owner_name.trim().to_string(),
            class,
            registered_at,
        })
    }

    /// 2 to 10 ASCII alphanumerics once spaces and dashes are stripped.
    pub fn is_valid_plate(plate: &str) -> bool {
        let mut len = 0usize;
        for c in plate.chars() {
            if c.is_whitespace() || c == '-' {
                continue;
            }
            if !c.is_ascii_alphanumeric() {
                return false;
            }
            len += 1;
        }
        (MIN_PLATE_LEN..=MAX_PLATE_LEN).contains(&len)
    }

    /// Business key used for duplicate detection: trimmed and uppercased.
    /// Inner spaces and dashes are kept, so `"AB-12"` and `"AB 12"` differ.
    pub fn normalize_plate(plate: &str) -> String {
        plate.trim().to_uppercase()
    }

    #[inline]
    pub fn id(&self) -> VehicleId {
        self.id
    }

    #[inline]
    pub fn license_plate(&self) -> &str {
        &self.license_plate
    }

    #[inline]
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    #[inline]
    pub fn class(&self) -> VehicleClass {
        self.class
    }

    #[inline]
    pub fn registered_at(&self) -> Timestamp {
        self.registered_at
    }
}

impl Display for Vehicle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Vehicle(id: {}, plate: {}, class: {}, owner: {})",
            self.id, self.license_plate, self.class, self.owner_name
        )
    }
}
