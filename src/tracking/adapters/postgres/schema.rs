//! Diesel schema for tracked item persistence.

diesel::table! {
    /// Tracked items of every kind, discriminated by `kind`.
    tracked_items (id) {
        /// Store-assigned item identifier.
        id -> Uuid,
        /// Item kind discriminator.
        #[max_length = 16]
        kind -> Varchar,
        /// Owning community identifier.
        #[max_length = 255]
        scope_id -> Varchar,
        /// Optional repository grouping key.
        #[max_length = 255]
        category -> Nullable<Varchar>,
        /// Item title.
        title -> Text,
        /// Item body.
        body -> Text,
        /// Supplementary text such as reproduction steps.
        supplementary_text -> Text,
        /// Priority or severity.
        #[max_length = 16]
        priority -> Varchar,
        /// Lifecycle status.
        #[max_length = 32]
        status -> Varchar,
        /// Current claimant payload.
        claimant -> Nullable<Jsonb>,
        /// Creator payload.
        creator -> Jsonb,
        /// Tag list.
        tags -> Jsonb,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Detail surface reference.
        #[max_length = 255]
        detail_surface_id -> Nullable<Varchar>,
        /// Detail message reference.
        #[max_length = 255]
        detail_message_id -> Nullable<Varchar>,
        /// List entry reference.
        #[max_length = 255]
        list_message_id -> Nullable<Varchar>,
        /// History replay message reference.
        #[max_length = 255]
        replay_message_id -> Nullable<Varchar>,
        /// Append-only update log.
        update_log -> Jsonb,
        /// Append-only reopen log.
        reopen_log -> Jsonb,
        /// When the cleanup timer was armed.
        deletion_armed_at -> Nullable<Timestamptz>,
        /// Whether a history replay is in flight.
        replay_pending -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
