diesel::table! {
    bookings (id) {
        id -> Uuid,
        person_name -> Text,
        date -> Date,
        time_slot -> Text,
        user_email -> Text,
        transaction_id -> Nullable<Text>,
        receipt_url -> Nullable<Text>,
    }
}

diesel::table! {
    people (id) {
        id -> Uuid,
        name -> Text,
        occupation -> Text,
        days -> Array<Text>,
        time_slots -> Array<Text>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(bookings, people,);
