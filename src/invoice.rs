//! Invoice identity and the assembled, ready-to-render invoice.

use std::fmt;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::billing::{self, InvoiceTotals};
use crate::form::FormError;
use crate::model::StayForm;

const INVOICE_PREFIX: &str = "INV";

/// Date format printed on the invoice.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Invoice number of the form `INV000123`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Derives a number from a millisecond timestamp using its last three digits.
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("{}{:06}", INVOICE_PREFIX, millis.rem_euclid(1000)))
    }

    /// Derives a number from the current clock.
    pub fn generate() -> Self {
        Self::from_millis(Utc::now().timestamp_millis())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InvoiceNumber {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Today's date in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Formats a date as `DD-MM-YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a rupee amount as `Rs. 1234`.
pub fn format_rupees(amount: i64) -> String {
    format!("Rs. {}", amount)
}

/// A validated form together with its derived totals and issue date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invoice {
    form: StayForm,
    totals: InvoiceTotals,
    issued_on: NaiveDate,
}

impl Invoice {
    /// Validates `form` and computes its totals.
    pub fn prepare(form: StayForm, issued_on: NaiveDate) -> Result<Self, FormError> {
        form.validate()?;
        let totals = billing::compute(&form);
        Ok(Self {
            form,
            totals,
            issued_on,
        })
    }

    pub fn form(&self) -> &StayForm {
        &self.form
    }

    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    pub fn issued_on(&self) -> NaiveDate {
        self.issued_on
    }

    pub fn number(&self) -> &InvoiceNumber {
        self.form.invoice_number()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FoodType, RoomType};

    #[test]
    fn number_keeps_last_three_digits() {
        assert_eq!(InvoiceNumber::from_millis(1_717_171_717_042).as_str(), "INV000042");
        assert_eq!(InvoiceNumber::from_millis(999).as_str(), "INV000999");
        assert_eq!(InvoiceNumber::from_millis(0).as_str(), "INV000000");
    }

    #[test]
    fn generated_number_has_fixed_shape() {
        let number = InvoiceNumber::generate();
        assert_eq!(number.as_str().len(), 9);
        assert!(number.as_str().starts_with("INV000"));
    }

    #[test]
    fn formats_dates_day_first() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).expect("valid date");
        assert_eq!(format_date(date), "04-07-2024");
        assert_eq!(format_rupees(-150), "Rs. -150");
    }

    #[test]
    fn prepare_computes_totals() {
        let check_in = NaiveDate::from_ymd_opt(2024, 7, 1).expect("valid date");
        let mut form = StayForm::starting(check_in, InvoiceNumber::from_millis(5));
        form.set_dates(check_in, check_in + chrono::Duration::days(2))
            .expect("dates");
        form.set_room_type(0, RoomType::Cottage).expect("room type");
        form.set_food_type(0, 0, FoodType::NonVeg).expect("food type");
        form.set_persons(0, 0, 2).expect("persons");
        form.set_rate(0, 0, 2000).expect("rate");
        form.set_advance(2000).expect("advance");

        let invoice = Invoice::prepare(form, check_in).expect("valid invoice");
        let totals = invoice.totals();

        // 8000 + round(8000 × 0.054) + round(8000 × 0.0275) = 8000 + 432 + 220
        assert_eq!(totals.nights, 2);
        assert_eq!(totals.grand_total, 8652);
        assert_eq!(totals.due, 6652);
        assert_eq!(invoice.number().as_str(), "INV000005");
    }
}
