//! Structural schemas for every operation payload.

use super::validation::{DateOrder, Field, FieldKind, Schema};
use crate::domain::booking::BookingStatus;
use crate::domain::payment::{PaymentMode, PaymentStatus};

const TEXT: FieldKind = FieldKind::Text;

const ROOM: &[Field] = &[
    Field::required("room_id", TEXT).non_empty(),
    Field::optional("room_rate_id", TEXT),
    Field::optional("room_name", TEXT),
    Field::required("price", FieldKind::Number).non_negative(),
    Field::optional("total_price", FieldKind::Number).non_negative(),
    Field::optional("tax", FieldKind::Number).non_negative(),
    Field::optional("currency", TEXT).non_empty(),
];

const HOTEL: &[Field] = &[
    Field::required("hotel_id", TEXT).non_empty(),
    Field::optional("hotel_name", TEXT),
    Field::optional("supplier", TEXT),
    Field::optional("meal_plan", TEXT),
    Field::optional("cancellation_policy", TEXT),
    Field::required("rooms", FieldKind::List(ROOM)).non_empty(),
];

const SELECTED_ITEM: &[Field] = &[
    Field::required("hotel_id", TEXT).non_empty(),
    Field::required("room_ids", FieldKind::StringList).non_empty(),
];

const REQUEST_ID: Field = Field::required("request_booking_id", TEXT).non_empty();

const SELECTED_ITEMS: Field =
    Field::required("selected_items", FieldKind::List(SELECTED_ITEM)).non_empty();

pub const CONFIRM_BOOKING: Schema = Schema {
    fields: &[
        Field::required("clientReference", TEXT).non_empty(),
        Field::required("bookingId", TEXT).non_empty(),
        Field::required("hotelConfirmationNo", TEXT).non_empty(),
        Field::required("status", FieldKind::Enum(&BookingStatus::ALL)),
        Field::required("hotel", FieldKind::Object),
        Field::required("hotel.id", TEXT).non_empty(),
        Field::optional("hotel.name", TEXT),
        Field::optional("hotel.cityCode", TEXT),
        Field::required("checkIn", FieldKind::Date),
        Field::required("checkOut", FieldKind::Date),
        Field::required("totalPrice", FieldKind::Number).non_negative(),
        Field::optional("currency", TEXT).non_empty(),
        Field::required("numOfRooms", FieldKind::Integer).positive(),
        Field::optional("employee", TEXT).non_empty(),
        Field::optional("company", TEXT).non_empty(),
        Field::optional("guestList", FieldKind::Any),
        Field::optional("roomList", FieldKind::Any),
        Field::optional("contact", FieldKind::Object),
        Field::optional("cancellation", FieldKind::Any),
    ],
    date_orders: &[DateOrder {
        start: "checkIn",
        end: "checkOut",
    }],
};

pub const GET_BOOKINGS: Schema = Schema {
    fields: &[
        Field::optional("employee", TEXT),
        Field::optional("company", TEXT),
        Field::optional("booking_status", FieldKind::Enum(&BookingStatus::ALL)),
        Field::optional("booking_id", TEXT),
    ],
    date_orders: &[],
};

pub const STORE_REQUEST: Schema = Schema {
    fields: &[
        Field::required("employee", TEXT).non_empty(),
        Field::required("check_in", FieldKind::Date),
        Field::required("check_out", FieldKind::Date),
        Field::optional("company", TEXT),
        Field::optional("employee_email", TEXT),
        Field::optional("occupancy", FieldKind::Integer).positive(),
        Field::optional("adult_count", FieldKind::Integer).non_negative(),
        Field::optional("child_count", FieldKind::Integer).non_negative(),
        Field::optional("child_ages", FieldKind::Any),
        Field::optional("room_count", FieldKind::Integer).positive(),
        Field::optional("destination", TEXT),
        Field::optional("destination_code", TEXT),
        Field::optional("hotel_details", FieldKind::Records(HOTEL)),
    ],
    date_orders: &[DateOrder {
        start: "check_in",
        end: "check_out",
    }],
};

pub const GET_REQUESTS: Schema = Schema {
    fields: &[
        Field::optional("company", TEXT),
        Field::optional("employee", TEXT),
        Field::optional("status", TEXT),
    ],
    date_orders: &[],
};

pub const REQUEST_DETAILS: Schema = Schema {
    fields: &[REQUEST_ID],
    date_orders: &[],
};

pub const SEND_FOR_APPROVAL: Schema = Schema {
    fields: &[REQUEST_ID, SELECTED_ITEMS],
    date_orders: &[],
};

pub const DECISION: Schema = Schema {
    fields: &[
        REQUEST_ID,
        Field::required("employee", TEXT).non_empty(),
        SELECTED_ITEMS,
    ],
    date_orders: &[],
};

/// Keys an update may never carry.
pub const IMMUTABLE_REQUEST_FIELDS: [&str; 5] = [
    "check_in",
    "check_out",
    "destination",
    "employee",
    "request_status",
];

pub const UPDATE_REQUEST: Schema = Schema {
    fields: &[
        REQUEST_ID,
        Field::optional("company", TEXT),
        Field::optional("employee_email", TEXT),
        Field::optional("agent", TEXT),
        Field::optional("occupancy", FieldKind::Integer).positive(),
        Field::optional("adult_count", FieldKind::Integer).non_negative(),
        Field::optional("child_count", FieldKind::Integer).non_negative(),
        Field::optional("child_ages", FieldKind::Any),
        Field::optional("room_count", FieldKind::Integer).positive(),
        Field::optional("destination_code", TEXT),
        Field::optional("hotel_details", FieldKind::Records(HOTEL)),
    ],
    date_orders: &[],
};

pub const CREATE_PAYMENT: Schema = Schema {
    fields: &[
        REQUEST_ID,
        Field::required("mode", FieldKind::Enum(&PaymentMode::ALL)),
    ],
    date_orders: &[],
};

pub const PAYMENT_CALLBACK: Schema = Schema {
    fields: &[
        Field::required("payment_id", TEXT).non_empty(),
        Field::required("status", FieldKind::Enum(&PaymentStatus::CALLBACK)),
        Field::required("signature", TEXT).non_empty(),
    ],
    date_orders: &[],
};

pub const CLOSE_REQUEST: Schema = Schema {
    fields: &[REQUEST_ID, Field::optional("booking_id", TEXT).non_empty()],
    date_orders: &[],
};
