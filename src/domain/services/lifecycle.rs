use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::ride::{Ride, RideStatus};
use crate::error::AppError;

/// Seats held by confirmed bookings. Cancelled bookings never count.
pub fn confirmed_seats(bookings: &[Booking]) -> i32 {
    bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .map(|b| b.seats_booked)
        .sum()
}

pub fn seats_remaining(ride: &Ride, bookings: &[Booking]) -> i32 {
    ride.available_seats - confirmed_seats(bookings)
}

/// Recomputes the automatic `active`/`full` flip from the confirmed-seat sum.
/// Only rides currently in `active` or `full` participate; a started or
/// terminal ride is never moved by bookkeeping.
pub fn capacity_status(current: RideStatus, confirmed: i32, capacity: i32) -> RideStatus {
    match current {
        RideStatus::Active | RideStatus::Full => {
            if confirmed >= capacity {
                RideStatus::Full
            } else {
                RideStatus::Active
            }
        }
        other => other,
    }
}

/// Driver-initiated transitions of the ride state machine. The automatic
/// `active`/`full` flip goes through `capacity_status` instead.
pub fn can_transition(from: RideStatus, to: RideStatus) -> bool {
    matches!(
        (from, to),
        (RideStatus::Active, RideStatus::InProgress)
            | (RideStatus::Full, RideStatus::InProgress)
            | (RideStatus::Active, RideStatus::Cancelled)
            | (RideStatus::Full, RideStatus::Cancelled)
            | (RideStatus::InProgress, RideStatus::Completed)
            | (RideStatus::InProgress, RideStatus::Active)
    )
}

/// Booking preconditions: ride accepting bookings, at least one seat
/// requested, enough capacity left. A `full` ride rejects with the capacity
/// error so the caller sees the same failure as an overbooking attempt.
pub fn validate_booking(ride: &Ride, bookings: &[Booking], seats_to_book: i32) -> Result<(), AppError> {
    if seats_to_book < 1 {
        return Err(AppError::Validation("Must book at least one seat".into()));
    }

    match ride.status {
        RideStatus::Active | RideStatus::Full => {}
        RideStatus::InProgress | RideStatus::Completed | RideStatus::Cancelled => {
            return Err(AppError::Conflict("Ride is not accepting bookings".into()));
        }
    }

    if confirmed_seats(bookings) + seats_to_book > ride.available_seats {
        return Err(AppError::Conflict("Not enough seats available".into()));
    }

    Ok(())
}

/// A participant is the driver or a passenger with a confirmed booking.
pub fn is_participant(ride: &Ride, bookings: &[Booking], user_id: &str) -> bool {
    if ride.driver_id == user_id {
        return true;
    }
    bookings
        .iter()
        .any(|b| b.passenger_id == user_id && b.status == BookingStatus::Confirmed)
}

pub fn can_send_message(ride: &Ride, bookings: &[Booking], user_id: &str) -> bool {
    is_participant(ride, bookings, user_id)
}
