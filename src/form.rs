//! Editing operations on [`StayForm`] that keep the room and package limits intact.

use chrono::NaiveDate;
use thiserror::Error;

use crate::billing::{self, MAX_LINE_AMOUNT};
use crate::model::{
    FoodEntry, FoodType, Guest, RoomEntry, RoomType, StayForm, FOOD_LIMIT, ROOM_LIMIT,
};

/// Errors raised while editing or validating a form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("an invoice can list at most {} rooms", ROOM_LIMIT)]
    RoomLimitReached,
    #[error("a room can carry at most {} food packages", FOOD_LIMIT)]
    FoodLimitReached,
    #[error("the first room cannot be removed")]
    FirstRoomLocked,
    #[error("the first food package of a room cannot be removed")]
    FirstFoodLocked,
    #[error("room {0} does not exist")]
    RoomOutOfRange(usize),
    #[error("room {room} has no food package {food}")]
    FoodOutOfRange { room: usize, food: usize },
    #[error("the form lists no rooms")]
    NoRooms,
    #[error("room {0} lists no food packages")]
    NoFood(usize),
    #[error("the form lists {0} rooms, more than the limit of {}", ROOM_LIMIT)]
    TooManyRooms(usize),
    #[error("room {room} lists {count} food packages, more than the limit of {}", FOOD_LIMIT)]
    TooManyFood { room: usize, count: usize },
    #[error("room {room}, package {food} has a negative rate")]
    NegativeRate { room: usize, food: usize },
    #[error("room {room}, package {food} bills more than Rs. {}", MAX_LINE_AMOUNT)]
    AmountTooLarge { room: usize, food: usize },
    #[error("the advance cannot be negative")]
    NegativeAdvance,
    #[error("check-out {check_out} is before check-in {check_in}")]
    CheckOutBeforeCheckIn {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
}

impl StayForm {
    /// Replaces the guest details.
    pub fn set_guest(&mut self, guest: Guest) {
        self.guest = guest;
    }

    /// Sets both stay dates at once so the pair can be checked together.
    pub fn set_dates(
        &mut self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<(), FormError> {
        if check_out < check_in {
            return Err(FormError::CheckOutBeforeCheckIn {
                check_in,
                check_out,
            });
        }
        self.check_in = check_in;
        self.check_out = check_out;
        Ok(())
    }

    pub fn set_advance(&mut self, advance: i64) -> Result<(), FormError> {
        if advance < 0 {
            return Err(FormError::NegativeAdvance);
        }
        self.advance = advance;
        Ok(())
    }

    /// Appends a new Villa room with one default package and returns its index.
    pub fn add_room(&mut self) -> Result<usize, FormError> {
        if self.rooms.len() >= ROOM_LIMIT {
            return Err(FormError::RoomLimitReached);
        }
        self.rooms.push(RoomEntry::default());
        Ok(self.rooms.len() - 1)
    }

    /// Removes the room at `index` and returns it.
    pub fn remove_room(&mut self, index: usize) -> Result<RoomEntry, FormError> {
        if index == 0 {
            return Err(FormError::FirstRoomLocked);
        }
        if index >= self.rooms.len() {
            return Err(FormError::RoomOutOfRange(index));
        }
        Ok(self.rooms.remove(index))
    }

    pub fn set_room_type(&mut self, room: usize, room_type: RoomType) -> Result<(), FormError> {
        self.room_mut(room)?.set_room_type(room_type);
        Ok(())
    }

    /// Appends a default package to `room` and returns its index within the room.
    pub fn add_food(&mut self, room: usize) -> Result<usize, FormError> {
        let food = self.room_mut(room)?.food_mut();
        if food.len() >= FOOD_LIMIT {
            return Err(FormError::FoodLimitReached);
        }
        food.push(FoodEntry::default());
        Ok(food.len() - 1)
    }

    pub fn remove_food(&mut self, room: usize, food: usize) -> Result<FoodEntry, FormError> {
        let entries = self.room_mut(room)?.food_mut();
        if food == 0 {
            return Err(FormError::FirstFoodLocked);
        }
        if food >= entries.len() {
            return Err(FormError::FoodOutOfRange { room, food });
        }
        Ok(entries.remove(food))
    }

    pub fn set_food_type(
        &mut self,
        room: usize,
        food: usize,
        food_type: FoodType,
    ) -> Result<(), FormError> {
        self.food_mut(room, food)?.set_food_type(food_type);
        Ok(())
    }

    pub fn set_persons(&mut self, room: usize, food: usize, persons: u32) -> Result<(), FormError> {
        self.food_mut(room, food)?.set_persons(persons);
        Ok(())
    }

    pub fn set_rate(&mut self, room: usize, food: usize, rate: i64) -> Result<(), FormError> {
        if rate < 0 {
            return Err(FormError::NegativeRate { room, food });
        }
        self.food_mut(room, food)?.set_rate_per_night(rate);
        Ok(())
    }

    /// Checks a form that may not have been built through the editing operations.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.rooms.is_empty() {
            return Err(FormError::NoRooms);
        }
        if self.rooms.len() > ROOM_LIMIT {
            return Err(FormError::TooManyRooms(self.rooms.len()));
        }

        for (room_index, room) in self.rooms.iter().enumerate() {
            let food = room.food();
            if food.is_empty() {
                return Err(FormError::NoFood(room_index));
            }
            if food.len() > FOOD_LIMIT {
                return Err(FormError::TooManyFood {
                    room: room_index,
                    count: food.len(),
                });
            }
            if let Some(food_index) = food.iter().position(|entry| entry.rate_per_night() < 0) {
                return Err(FormError::NegativeRate {
                    room: room_index,
                    food: food_index,
                });
            }
        }

        if self.advance < 0 {
            return Err(FormError::NegativeAdvance);
        }
        if self.check_out < self.check_in {
            return Err(FormError::CheckOutBeforeCheckIn {
                check_in: self.check_in,
                check_out: self.check_out,
            });
        }

        let nights = billing::nights(self.check_in, self.check_out);
        for (room_index, room) in self.rooms.iter().enumerate() {
            for (food_index, entry) in room.food().iter().enumerate() {
                if billing::line_amount(entry.persons(), nights, entry.rate_per_night()).is_none() {
                    return Err(FormError::AmountTooLarge {
                        room: room_index,
                        food: food_index,
                    });
                }
            }
        }
        Ok(())
    }

    fn room_mut(&mut self, room: usize) -> Result<&mut RoomEntry, FormError> {
        self.rooms
            .get_mut(room)
            .ok_or(FormError::RoomOutOfRange(room))
    }

    fn food_mut(&mut self, room: usize, food: usize) -> Result<&mut FoodEntry, FormError> {
        self.room_mut(room)?
            .food_mut()
            .get_mut(food)
            .ok_or(FormError::FoodOutOfRange { room, food })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceNumber;

    fn form() -> StayForm {
        let check_in = NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date");
        StayForm::starting(check_in, InvoiceNumber::from_millis(1))
    }

    #[test]
    fn rooms_stop_at_limit() {
        let mut form = form();
        assert_eq!(form.add_room(), Ok(1));
        assert_eq!(form.add_room(), Ok(2));
        assert_eq!(form.add_room(), Err(FormError::RoomLimitReached));
        assert_eq!(form.rooms().len(), ROOM_LIMIT);
    }

    #[test]
    fn added_rooms_are_independent() {
        let mut form = form();
        form.add_room().expect("second room");
        form.set_persons(1, 0, 4).expect("edit second room");

        assert_eq!(form.rooms()[0].food()[0].persons(), 0);
        assert_eq!(form.rooms()[1].food()[0].persons(), 4);
    }

    #[test]
    fn first_room_cannot_be_removed() {
        let mut form = form();
        form.add_room().expect("second room");
        assert_eq!(form.remove_room(0), Err(FormError::FirstRoomLocked));
        assert_eq!(form.remove_room(5), Err(FormError::RoomOutOfRange(5)));
        assert!(form.remove_room(1).is_ok());
        assert_eq!(form.rooms().len(), 1);
    }

    #[test]
    fn food_stops_at_limit_and_keeps_first() {
        let mut form = form();
        assert_eq!(form.add_food(0), Ok(1));
        assert_eq!(form.add_food(0), Err(FormError::FoodLimitReached));
        assert_eq!(form.remove_food(0, 0), Err(FormError::FirstFoodLocked));
        assert_eq!(
            form.remove_food(0, 3),
            Err(FormError::FoodOutOfRange { room: 0, food: 3 })
        );
        assert!(form.remove_food(0, 1).is_ok());
        assert_eq!(form.add_food(4), Err(FormError::RoomOutOfRange(4)));
    }

    #[test]
    fn setters_reject_bad_values() {
        let mut form = form();
        assert_eq!(
            form.set_rate(0, 0, -1),
            Err(FormError::NegativeRate { room: 0, food: 0 })
        );
        assert_eq!(form.set_advance(-10), Err(FormError::NegativeAdvance));

        let later = NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date");
        let earlier = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        assert!(matches!(
            form.set_dates(later, earlier),
            Err(FormError::CheckOutBeforeCheckIn { .. })
        ));
    }

    #[test]
    fn validate_catches_deserialized_overflow() {
        let mut form = form();
        form.rooms = vec![RoomEntry::default(); ROOM_LIMIT + 1];
        assert_eq!(form.validate(), Err(FormError::TooManyRooms(ROOM_LIMIT + 1)));

        form.rooms = vec![RoomEntry::new(RoomType::Cottage).with_food(Vec::new())];
        assert_eq!(form.validate(), Err(FormError::NoFood(0)));

        form.rooms = vec![RoomEntry::default().with_food([FoodEntry::default(); 3])];
        assert_eq!(
            form.validate(),
            Err(FormError::TooManyFood { room: 0, count: 3 })
        );

        form.rooms.clear();
        assert_eq!(form.validate(), Err(FormError::NoRooms));
    }

    #[test]
    fn default_form_is_valid() {
        assert_eq!(form().validate(), Ok(()));
    }
}
