use time::OffsetDateTime;

/// A single field value as seen by the validator and the patch builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Int(i64),
    Text(&'a str),
    Time(OffsetDateTime),
}

/// Named access to the fields of a request record.
///
/// `None` means the caller did not supply the field. A field supplied as
/// `""` or `0` is `Some`.
pub trait Fields {
    fn field(&self, name: &str) -> Option<Value<'_>>;
}
