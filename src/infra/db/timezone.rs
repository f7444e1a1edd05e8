use std::fmt;

use chrono_tz::Tz;
use sqlx::encode::IsNull;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo};
use sqlx::{Encode, Postgres, Type};

/// IANA zone name bound as text, for `AT TIME ZONE` expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SqlTimeZone(pub Tz);

impl From<Tz> for SqlTimeZone {
    fn from(value: Tz) -> Self {
        Self(value)
    }
}

impl fmt::Display for SqlTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name())
    }
}

impl Type<Postgres> for SqlTimeZone {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Postgres> for SqlTimeZone {
    fn encode_by_ref(
        &self,
        buf: &mut PgArgumentBuffer,
    ) -> Result<IsNull, sqlx::error::BoxDynError> {
        <&str as Encode<Postgres>>::encode(self.0.name(), buf)
    }

    fn size_hint(&self) -> usize {
        <&str as Encode<Postgres>>::size_hint(&self.0.name())
    }
}
