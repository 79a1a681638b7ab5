//! Core types for Notetaker.
//!
//! This module provides type-safe wrappers for common domain concepts.

/// Implement `sqlx` `Type`, `Encode`, and `Decode` for a `String` newtype
/// (with `postgres` feature), so it binds and decodes as `TEXT`.
macro_rules! impl_pg_text {
    ($name:ident) => {
        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

pub mod id;
pub mod username;

pub use id::NoteId;
pub use username::{Username, UsernameError};
