//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Authors. The authoritative record for every author.
    authors (id) {
        /// Primary key minted by the author service before insert.
        id -> Uuid,
        name -> Varchar,
        /// Unique by convention; not enforced by the schema.
        email -> Varchar,
        /// Hash supplied by the external credential collaborator.
        credential_hash -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Articles. The search index mirrors title, body and author id.
    articles (id) {
        id -> Uuid,
        title -> Text,
        body -> Text,
        author_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(articles -> authors (author_id));

diesel::allow_tables_to_appear_in_same_query!(articles, authors);
