//! Diesel table definitions for the imaging schema.
//!
//! Kept in step with `backend/migrations` by hand; `diesel print-schema`
//! against a migrated database regenerates them.

diesel::table! {
    /// Registered patients.
    patients (id) {
        /// Primary key.
        id -> Uuid,
        /// Given name, never blank.
        first_name -> Text,
        /// Family name, never blank.
        last_name -> Text,
    }
}

diesel::table! {
    /// Image sets, one patient each.
    image_sets (id) {
        /// Primary key.
        id -> Uuid,
        /// Owning patient.
        patient_id -> Uuid,
    }
}

diesel::table! {
    /// Captured images.
    images (id) {
        /// Primary key.
        id -> Uuid,
        /// Owning image set.
        set_id -> Uuid,
        /// Owning patient, repeated from the image set.
        patient_id -> Uuid,
        /// Capture time.
        image_timestamp -> Timestamptz,
        /// Storage location; unique across images.
        uri -> Text,
    }
}

diesel::table! {
    /// Analysis verdicts, one image each.
    assessments (id) {
        /// Primary key.
        id -> Uuid,
        /// Assessed image.
        image_id -> Uuid,
        /// Image set of the assessed image.
        set_id -> Uuid,
        /// Patient of the assessed image.
        patient_id -> Uuid,
        /// Verdict time.
        assessment_timestamp -> Timestamptz,
        /// Verdict.
        assessment -> Bool,
    }
}

diesel::joinable!(image_sets -> patients (patient_id));
diesel::joinable!(images -> image_sets (set_id));
diesel::joinable!(assessments -> images (image_id));

diesel::allow_tables_to_appear_in_same_query!(patients, image_sets, images, assessments);
