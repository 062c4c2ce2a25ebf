//! Data structures describing a guest's stay and the line items billed for it.
//!
//! The types mirror what the billing form collects: a flat record of guest details, the stay
//! dates, and up to [`ROOM_LIMIT`] rooms each carrying up to [`FOOD_LIMIT`] food packages.  They
//! derive `serde` so a form can be saved to and restored from JSON without going through the
//! rendering layer.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::invoice::{self, InvoiceNumber};

/// Maximum number of rooms a single invoice may list.
pub const ROOM_LIMIT: usize = 3;

/// Maximum number of food packages per room.
pub const FOOD_LIMIT: usize = 2;

/// Contact details of the billed guest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Guest {
    /// Full name, also used to derive the exported file name.
    pub name: String,
    /// Postal address.
    pub address: String,
    /// Phone number or e-mail.
    pub contact: String,
}

impl Guest {
    /// Creates a guest record from its three fields.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            contact: contact.into(),
        }
    }
}

/// Accommodation category; selects the tax split applied to a room's packages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    #[default]
    Villa,
    Cottage,
    Dormitory,
}

impl RoomType {
    /// All room types in the order they are offered.
    pub const ALL: [RoomType; 3] = [RoomType::Villa, RoomType::Cottage, RoomType::Dormitory];

    /// Label printed on the invoice.
    pub fn label(self) -> &'static str {
        match self {
            RoomType::Villa => "Villa",
            RoomType::Cottage => "Cottage",
            RoomType::Dormitory => "Dormitory",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Meal plan attached to a package.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodType {
    #[default]
    Veg,
    #[serde(rename = "Non Veg")]
    NonVeg,
}

impl FoodType {
    /// Label printed on the invoice.
    pub fn label(self) -> &'static str {
        match self {
            FoodType::Veg => "Veg",
            FoodType::NonVeg => "Non Veg",
        }
    }
}

impl fmt::Display for FoodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One billable package: a meal plan, a head count and the per-person nightly rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FoodEntry {
    food_type: FoodType,
    persons: u32,
    rate_per_night: i64,
}

impl FoodEntry {
    /// Creates a package with the given meal plan, head count and rate.
    pub fn new(food_type: FoodType, persons: u32, rate_per_night: i64) -> Self {
        Self {
            food_type,
            persons,
            rate_per_night,
        }
    }

    pub fn food_type(&self) -> FoodType {
        self.food_type
    }

    pub fn persons(&self) -> u32 {
        self.persons
    }

    /// Package rate per person per night, in rupees.
    pub fn rate_per_night(&self) -> i64 {
        self.rate_per_night
    }

    pub(crate) fn set_food_type(&mut self, food_type: FoodType) {
        self.food_type = food_type;
    }

    pub(crate) fn set_persons(&mut self, persons: u32) {
        self.persons = persons;
    }

    pub(crate) fn set_rate_per_night(&mut self, rate: i64) {
        self.rate_per_night = rate;
    }
}

/// A booked room and the packages sold with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomEntry {
    room_type: RoomType,
    food: Vec<FoodEntry>,
}

impl Default for RoomEntry {
    fn default() -> Self {
        Self {
            room_type: RoomType::default(),
            food: vec![FoodEntry::default()],
        }
    }
}

impl RoomEntry {
    /// Creates a room of the given type with a single default package.
    pub fn new(room_type: RoomType) -> Self {
        Self {
            room_type,
            ..Self::default()
        }
    }

    /// Replaces the packages and returns the updated room.
    pub fn with_food<I>(mut self, food: I) -> Self
    where
        I: IntoIterator<Item = FoodEntry>,
    {
        self.food = food.into_iter().collect();
        self
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    /// Packages in the order they were entered.
    pub fn food(&self) -> &[FoodEntry] {
        &self.food
    }

    pub(crate) fn set_room_type(&mut self, room_type: RoomType) {
        self.room_type = room_type;
    }

    pub(crate) fn food_mut(&mut self) -> &mut Vec<FoodEntry> {
        &mut self.food
    }
}

/// In-memory state of the billing form.
///
/// Editing goes through the operations in [`crate::form`], which enforce the room and package
/// limits.  A form restored from JSON bypasses those operations, so callers should run
/// [`StayForm::validate`] (done by [`crate::invoice::Invoice::prepare`]) before billing it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StayForm {
    pub(crate) guest: Guest,
    pub(crate) check_in: NaiveDate,
    pub(crate) check_out: NaiveDate,
    pub(crate) rooms: Vec<RoomEntry>,
    pub(crate) advance: i64,
    pub(crate) invoice_number: InvoiceNumber,
}

impl Default for StayForm {
    /// A blank form checking in today and out tomorrow with a freshly generated invoice number.
    fn default() -> Self {
        Self::starting(invoice::today(), InvoiceNumber::generate())
    }
}

impl StayForm {
    /// Creates a blank one-night form starting on `check_in`.
    pub fn starting(check_in: NaiveDate, invoice_number: InvoiceNumber) -> Self {
        Self {
            guest: Guest::default(),
            check_in,
            check_out: check_in + Duration::days(1),
            rooms: vec![RoomEntry::default()],
            advance: 0,
            invoice_number,
        }
    }

    pub fn guest(&self) -> &Guest {
        &self.guest
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn rooms(&self) -> &[RoomEntry] {
        &self.rooms
    }

    /// Advance already paid, in rupees.
    pub fn advance(&self) -> i64 {
        self.advance
    }

    pub fn invoice_number(&self) -> &InvoiceNumber {
        &self.invoice_number
    }

    /// Total number of package lines across all rooms.
    pub fn line_count(&self) -> usize {
        self.rooms.iter().map(|room| room.food.len()).sum()
    }
}
