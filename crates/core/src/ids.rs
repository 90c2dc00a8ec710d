#![forbid(unsafe_code)]

const MAX_ID_LEN: usize = 128;

/// Identifier of a task owner. Supplied by the identity layer and trusted as-is
/// beyond basic shape validation; the engine never derives or rewrites it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id(&value)?;
        Ok(Self(value))
    }
}

/// Opaque task identifier, assigned once at creation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id(&value)?;
        Ok(Self(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdError {
    Empty,
    TooLong,
    ContainsControl { index: usize },
}

fn validate_id(value: &str) -> Result<(), IdError> {
    if value.trim().is_empty() {
        return Err(IdError::Empty);
    }
    if value.len() > MAX_ID_LEN {
        return Err(IdError::TooLong);
    }
    for (index, ch) in value.chars().enumerate() {
        if ch.is_control() {
            return Err(IdError::ContainsControl { index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_id_validation() {
        assert_eq!(OwnerId::try_new("").unwrap_err(), IdError::Empty);
        assert_eq!(OwnerId::try_new("   ").unwrap_err(), IdError::Empty);
        assert_eq!(
            OwnerId::try_new("a".repeat(129)).unwrap_err(),
            IdError::TooLong
        );
        assert_eq!(
            OwnerId::try_new("bad\u{0007}id").unwrap_err(),
            IdError::ContainsControl { index: 3 }
        );
        assert!(OwnerId::try_new("user-42").is_ok());
    }

    #[test]
    fn task_id_accepts_uuid_shape() {
        assert!(TaskId::try_new("3f6c1f0a-8e7d-4f6b-9f1a-2b3c4d5e6f70").is_ok());
    }
}
