use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use scheduling_cell::models::BookAppointmentRequest;
use scheduling_cell::services::availability::AvailabilityService;
use scheduling_cell::services::booking::BookingService;
use scheduling_cell::store::AppointmentStore;
use shared_config::ClinicConfig;

fn services() -> (BookingService, AvailabilityService) {
    let store = Arc::new(AppointmentStore::new());
    let config = ClinicConfig::default();
    (
        BookingService::new(Arc::clone(&store), &config),
        AvailabilityService::new(store, &config),
    )
}

fn test_day() -> NaiveDate {
    (Utc::now() + Duration::days(30)).date_naive()
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    date.and_hms_opt(hour, minute, 0).unwrap().and_utc()
}

fn request(
    doctor_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id,
        patient_id: Uuid::new_v4(),
        start_time: start,
        end_time: end,
        reason: None,
    }
}

#[tokio::test]
async fn empty_day_exposes_the_full_grid() {
    let (_, availability) = services();
    let day = test_day();

    let slots = availability
        .get_available_slots(Uuid::new_v4(), day, None)
        .await;

    // 09:00-17:00 in 30-minute steps.
    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0].start_time, at(day, 9, 0));
    assert_eq!(slots[15].end_time, at(day, 17, 0));
    assert!(slots.windows(2).all(|w| w[0].end_time == w[1].start_time));
}

#[tokio::test]
async fn booked_ranges_disappear_from_the_grid() {
    let (booking, availability) = services();
    let doctor_id = Uuid::new_v4();
    let day = test_day();

    booking
        .book(request(doctor_id, at(day, 9, 0), at(day, 9, 30)))
        .await
        .unwrap();
    // Straddles the 10:00 and 10:30 slots, removing both.
    booking
        .book(request(doctor_id, at(day, 10, 15), at(day, 10, 45)))
        .await
        .unwrap();

    let slots = availability.get_available_slots(doctor_id, day, None).await;
    assert_eq!(slots.len(), 13);
    assert!(!slots.iter().any(|s| s.start_time == at(day, 9, 0)));
    assert!(!slots.iter().any(|s| s.start_time == at(day, 10, 0)));
    assert!(!slots.iter().any(|s| s.start_time == at(day, 10, 30)));
    assert!(slots.iter().any(|s| s.start_time == at(day, 9, 30)));
}

#[tokio::test]
async fn cancelled_appointments_free_their_slots() {
    let (booking, availability) = services();
    let doctor_id = Uuid::new_v4();
    let day = test_day();

    let appointment = booking
        .book(request(doctor_id, at(day, 9, 0), at(day, 9, 30)))
        .await
        .unwrap();
    assert_eq!(
        availability
            .get_available_slots(doctor_id, day, None)
            .await
            .len(),
        15
    );

    booking.cancel(appointment.id).await.unwrap();
    assert_eq!(
        availability
            .get_available_slots(doctor_id, day, None)
            .await
            .len(),
        16
    );
}

#[tokio::test]
async fn fully_booked_day_has_no_slots() {
    let (booking, availability) = services();
    let doctor_id = Uuid::new_v4();
    let day = test_day();

    for i in 0..16 {
        let start = at(day, 9, 0) + Duration::minutes(i * 30);
        booking
            .book(request(doctor_id, start, start + Duration::minutes(30)))
            .await
            .unwrap();
    }

    assert!(availability
        .get_available_slots(doctor_id, day, None)
        .await
        .is_empty());
}

#[tokio::test]
async fn custom_slot_duration_reshapes_the_grid() {
    let (_, availability) = services();
    let day = test_day();

    let slots = availability
        .get_available_slots(Uuid::new_v4(), day, Some(60))
        .await;
    assert_eq!(slots.len(), 8);

    // Duration longer than the working window leaves nothing.
    let slots = availability
        .get_available_slots(Uuid::new_v4(), day, Some(600))
        .await;
    assert!(slots.is_empty());

    // Nonsense durations fall back to the default grid.
    let slots = availability
        .get_available_slots(Uuid::new_v4(), day, Some(0))
        .await;
    assert_eq!(slots.len(), 16);
}

#[tokio::test]
async fn available_and_blocked_slots_partition_the_grid() {
    let (booking, availability) = services();
    let doctor_id = Uuid::new_v4();
    let day = test_day();

    booking
        .book(request(doctor_id, at(day, 9, 45), at(day, 10, 45)))
        .await
        .unwrap();
    booking
        .book(request(doctor_id, at(day, 13, 0), at(day, 13, 30)))
        .await
        .unwrap();

    let available = availability.get_available_slots(doctor_id, day, None).await;
    // 09:30, 10:00, 10:30 and 13:00 are blocked out of the 16-slot grid.
    assert_eq!(available.len(), 12);
    for slot in &available {
        assert!(slot.start_time >= at(day, 9, 0));
        assert!(slot.end_time <= at(day, 17, 0));
    }
}
