use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use stay_invoice::billing;
use stay_invoice::invoice::{format_rupees, Invoice};
use stay_invoice::{FoodType, FormError, Guest, InvoiceNumber, RoomType, StayForm};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Two nights across all three room types, one of them with a second package.
fn three_room_form() -> StayForm {
    let mut form = StayForm::starting(date(2024, 12, 20), InvoiceNumber::from_millis(412));
    form.set_guest(Guest::new("Meera Pillai", "14 Lake Road, Kochi", "+91 98470 00000"));
    form.set_dates(date(2024, 12, 20), date(2024, 12, 22))
        .expect("dates");

    form.set_persons(0, 0, 2).expect("persons");
    form.set_rate(0, 0, 2500).expect("rate");

    let cottage = form.add_room().expect("second room");
    form.set_room_type(cottage, RoomType::Cottage)
        .expect("room type");
    form.set_food_type(cottage, 0, FoodType::NonVeg)
        .expect("food type");
    form.set_persons(cottage, 0, 2).expect("persons");
    form.set_rate(cottage, 0, 2000).expect("rate");

    let dormitory = form.add_room().expect("third room");
    form.set_room_type(dormitory, RoomType::Dormitory)
        .expect("room type");
    form.set_persons(dormitory, 0, 1).expect("persons");
    form.set_rate(dormitory, 0, 1000).expect("rate");
    let extra = form.add_food(dormitory).expect("second package");
    form.set_food_type(dormitory, extra, FoodType::NonVeg)
        .expect("food type");
    form.set_persons(dormitory, extra, 1).expect("persons");
    form.set_rate(dormitory, extra, 1200).expect("rate");

    form.set_advance(5000).expect("advance");
    form
}

#[test]
fn grand_total_sums_every_line() {
    let form = three_room_form();
    let totals = billing::compute(&form);

    let per_line: Vec<(RoomType, i64, i64, i64, i64)> = totals
        .lines()
        .map(|(room, line)| {
            (
                room,
                line.amount,
                line.accommodation_gst,
                line.food_gst,
                line.total,
            )
        })
        .collect();

    assert_eq!(
        per_line,
        vec![
            (RoomType::Villa, 10000, 492, 295, 10787),
            (RoomType::Cottage, 8000, 432, 220, 8652),
            (RoomType::Dormitory, 2000, 79, 67, 2146),
            (RoomType::Dormitory, 2400, 95, 80, 2575),
        ]
    );
    assert_eq!(totals.nights, 2);
    assert_eq!(totals.grand_total, 24160);
    assert_eq!(totals.advance, 5000);
    assert_eq!(totals.due, 19160);
    assert_eq!(format_rupees(totals.due), "Rs. 19160");
}

#[test]
fn limits_hold_through_a_full_form() {
    let mut form = three_room_form();
    assert_eq!(form.add_room(), Err(FormError::RoomLimitReached));
    assert_eq!(form.add_food(2), Err(FormError::FoodLimitReached));
    assert_eq!(form.remove_room(0), Err(FormError::FirstRoomLocked));
    assert_eq!(form.remove_food(2, 0), Err(FormError::FirstFoodLocked));

    form.remove_food(2, 1).expect("second package removable");
    form.remove_room(1).expect("second room removable");
    assert_eq!(form.line_count(), 2);
    assert_eq!(billing::compute(&form).grand_total, 10787 + 2146);
}

#[test]
fn form_survives_json_round_trip_and_bills_the_same() {
    let form = three_room_form();
    let json = serde_json::to_string_pretty(&form).expect("serialize");
    let restored: StayForm = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored, form);
    let invoice = Invoice::prepare(restored, date(2024, 12, 22)).expect("valid form");
    assert_eq!(invoice.totals().grand_total, 24160);
    assert_eq!(invoice.number().as_str(), "INV000412");
}

#[test]
fn same_day_checkout_bills_nothing() {
    let mut form = StayForm::starting(date(2024, 1, 1), InvoiceNumber::from_millis(1));
    form.set_dates(date(2024, 1, 1), date(2024, 1, 1))
        .expect("same-day stay is allowed");
    form.set_persons(0, 0, 4).expect("persons");
    form.set_rate(0, 0, 3000).expect("rate");
    form.set_advance(500).expect("advance");

    let totals = billing::compute(&form);
    assert_eq!(totals.nights, 0);
    assert_eq!(totals.grand_total, 0);
    assert_eq!(totals.due, -500);
}
