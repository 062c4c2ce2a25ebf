//! Charge computation for a stay.
//!
//! Every package line is billed as `persons × nights × rate`.  GST is levied on two shares of
//! that amount: the accommodation share at 12% and the food & beverage share at 5%.  How the
//! amount splits between the two shares depends on the room type, see [`TaxSplit`].  Each figure
//! is rounded to whole rupees before it is summed, so the grand total always equals the sum of
//! the printed line totals.

use chrono::NaiveDate;
use log::debug;

use crate::model::{FoodEntry, FoodType, RoomType, StayForm};

/// GST rate applied to the accommodation share of a package.
pub const ACCOMMODATION_GST_RATE: f64 = 0.12;

/// GST rate applied to the food & beverage share of a package.
pub const FOOD_GST_RATE: f64 = 0.05;

/// Share of a package amount attributed to accommodation and to food for one room type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaxSplit {
    /// Fraction of the amount counted as accommodation.
    pub accommodation_share: f64,
    /// Fraction of the amount counted as food & beverage.
    pub food_share: f64,
}

impl TaxSplit {
    /// Returns the split used for `room_type`.
    pub fn for_room(room_type: RoomType) -> Self {
        let (accommodation_share, food_share) = match room_type {
            RoomType::Villa => (0.41, 0.59),
            RoomType::Cottage => (0.45, 0.55),
            RoomType::Dormitory => (0.33, 0.67),
        };
        Self {
            accommodation_share,
            food_share,
        }
    }

    /// Effective accommodation GST as a fraction of the whole amount.
    pub fn accommodation_factor(&self) -> f64 {
        self.accommodation_share * ACCOMMODATION_GST_RATE
    }

    /// Effective food & beverage GST as a fraction of the whole amount.
    pub fn food_factor(&self) -> f64 {
        self.food_share * FOOD_GST_RATE
    }
}

/// Largest amount a single package line may reach; amounts up to it convert to `f64` exactly.
pub const MAX_LINE_AMOUNT: i64 = 1 << 53;

/// Rounds half-way values toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

/// `persons × nights × rate`, or `None` when it exceeds [`MAX_LINE_AMOUNT`] or overflows.
pub fn line_amount(persons: u32, nights: i64, rate_per_night: i64) -> Option<i64> {
    i64::from(persons)
        .checked_mul(nights)?
        .checked_mul(rate_per_night)
        .filter(|amount| amount.abs() <= MAX_LINE_AMOUNT)
}

/// Whole nights between check-in and check-out.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    check_out.signed_duration_since(check_in).num_days()
}

/// Charges derived for a single package line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCharges {
    pub food_type: FoodType,
    pub persons: u32,
    pub rate_per_night: i64,
    pub amount: i64,
    pub accommodation_gst: i64,
    pub food_gst: i64,
    /// Amount plus both taxes.
    pub total: i64,
}

impl LineCharges {
    /// Bills `entry` for `nights` nights in a room of type `room_type`.
    ///
    /// Amounts beyond [`MAX_LINE_AMOUNT`] are clamped to it; [`StayForm::validate`] rejects
    /// forms that would reach the clamp.
    pub fn compute(room_type: RoomType, entry: &FoodEntry, nights: i64) -> Self {
        let split = TaxSplit::for_room(room_type);
        let amount = i64::from(entry.persons())
            .saturating_mul(nights)
            .saturating_mul(entry.rate_per_night())
            .clamp(-MAX_LINE_AMOUNT, MAX_LINE_AMOUNT);
        let accommodation_gst = round_half_up(amount as f64 * split.accommodation_factor());
        let food_gst = round_half_up(amount as f64 * split.food_factor());

        Self {
            food_type: entry.food_type(),
            persons: entry.persons(),
            rate_per_night: entry.rate_per_night(),
            amount,
            accommodation_gst,
            food_gst,
            total: amount + accommodation_gst + food_gst,
        }
    }
}

/// Charges for one room, one entry per package in form order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomCharges {
    pub room_type: RoomType,
    pub lines: Vec<LineCharges>,
}

impl RoomCharges {
    pub fn total(&self) -> i64 {
        self.lines
            .iter()
            .fold(0, |sum, line| sum.saturating_add(line.total))
    }
}

/// Everything the invoice prints that is derived rather than entered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub nights: i64,
    pub rooms: Vec<RoomCharges>,
    pub grand_total: i64,
    pub advance: i64,
    /// Balance still owed; negative when the advance exceeds the total.
    pub due: i64,
}

impl InvoiceTotals {
    /// Iterates over every package line across all rooms.
    pub fn lines(&self) -> impl Iterator<Item = (RoomType, &LineCharges)> + '_ {
        self.rooms
            .iter()
            .flat_map(|room| room.lines.iter().map(move |line| (room.room_type, line)))
    }
}

/// Computes every derived figure of `form` in a single pass.
pub fn compute(form: &StayForm) -> InvoiceTotals {
    let nights = nights(form.check_in(), form.check_out());

    let rooms: Vec<RoomCharges> = form
        .rooms()
        .iter()
        .map(|room| RoomCharges {
            room_type: room.room_type(),
            lines: room
                .food()
                .iter()
                .map(|entry| LineCharges::compute(room.room_type(), entry, nights))
                .collect(),
        })
        .collect();

    let grand_total = rooms
        .iter()
        .map(RoomCharges::total)
        .fold(0_i64, i64::saturating_add);
    let advance = form.advance();

    debug!(
        "Computed {} line(s) over {} night(s): grand total {}, advance {}",
        form.line_count(),
        nights,
        grand_total,
        advance
    );

    InvoiceTotals {
        nights,
        rooms,
        grand_total,
        advance,
        due: grand_total.saturating_sub(advance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.4999), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn rounding_is_exact_at_float_edges() {
        assert_eq!(round_half_up(0.499_999_999_999_999_94), 0);
        assert_eq!(round_half_up(4_503_599_627_370_497.0), 4_503_599_627_370_497);
        assert_eq!(round_half_up(-0.5), 0);
    }

    #[test]
    fn line_amount_is_bounded() {
        assert_eq!(line_amount(2, 3, 2500), Some(15_000));
        assert_eq!(line_amount(1, 1, MAX_LINE_AMOUNT), Some(MAX_LINE_AMOUNT));
        assert_eq!(line_amount(2, 1, MAX_LINE_AMOUNT), None);
        assert_eq!(line_amount(4_000_000, 1000, 4_000_000_000_000), None);
    }

    #[test]
    fn oversized_form_is_rejected_and_never_overflows() {
        let check_in = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let mut form = StayForm::starting(check_in, crate::InvoiceNumber::from_millis(1));
        form.set_dates(check_in, check_in + chrono::Duration::days(1000))
            .expect("dates");
        form.set_persons(0, 0, 4_000_000).expect("persons");
        form.set_rate(0, 0, 4_000_000_000_000).expect("rate");

        assert_eq!(
            form.validate(),
            Err(crate::FormError::AmountTooLarge { room: 0, food: 0 })
        );

        let totals = compute(&form);
        assert_eq!(totals.rooms[0].lines[0].amount, MAX_LINE_AMOUNT);
        assert!(totals.grand_total > 0);
    }

    #[test]
    fn nights_count_whole_days() {
        let check_in = NaiveDate::from_ymd_opt(2024, 2, 27).expect("valid date");
        let check_out = NaiveDate::from_ymd_opt(2024, 3, 2).expect("valid date");
        assert_eq!(nights(check_in, check_out), 4);
        assert_eq!(nights(check_in, check_in), 0);
    }

    #[test]
    fn villa_line_splits_taxes() {
        let entry = FoodEntry::new(FoodType::Veg, 2, 2500);
        let line = LineCharges::compute(RoomType::Villa, &entry, 2);

        // 10000 × 0.41 × 0.12 = 492, 10000 × 0.59 × 0.05 = 295
        assert_eq!(line.amount, 10_000);
        assert_eq!(line.accommodation_gst, 492);
        assert_eq!(line.food_gst, 295);
        assert_eq!(line.total, 10_787);
    }

    #[test]
    fn dormitory_line_rounds_each_tax() {
        let entry = FoodEntry::new(FoodType::NonVeg, 3, 1111);
        let line = LineCharges::compute(RoomType::Dormitory, &entry, 1);

        // 3333 × 0.0396 = 131.99, 3333 × 0.0335 = 111.66
        assert_eq!(line.amount, 3333);
        assert_eq!(line.accommodation_gst, 132);
        assert_eq!(line.food_gst, 112);
        assert_eq!(line.total, 3577);
    }

    #[test]
    fn factors_per_room_type() {
        let cottage = TaxSplit::for_room(RoomType::Cottage);
        assert!((cottage.accommodation_factor() - 0.054).abs() < 1e-12);
        assert!((cottage.food_factor() - 0.0275).abs() < 1e-12);

        for room_type in RoomType::ALL {
            let split = TaxSplit::for_room(room_type);
            assert!((split.accommodation_share + split.food_share - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_nights_bill_nothing() {
        let entry = FoodEntry::new(FoodType::Veg, 4, 3000);
        let line = LineCharges::compute(RoomType::Cottage, &entry, 0);
        assert_eq!(line.total, 0);
    }
}
