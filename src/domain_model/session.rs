use std::fmt;

/// Opaque, unguessable identifier embedded in a refresh token and used as the
/// session store lookup key. A fresh one is generated for every issued pair.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
