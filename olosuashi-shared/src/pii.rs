use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Bearer tokens and other credentials. Never printed, serialized as-is.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Secret<T>(pub T);

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Secret<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Masking is for log macros only; stored credentials need the real value.
        self.0.serialize(serializer)
    }
}

impl<T> Secret<T> {
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Contact details (phone numbers) that keep their last three characters
/// visible in logs so support can still correlate a booking.
#[derive(Clone, PartialEq, Eq)]
pub struct Masked<'a>(pub &'a str);

impl fmt::Display for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible = 3;
        let count = self.0.chars().count();
        if count <= visible {
            return write!(f, "{}", "*".repeat(count));
        }
        let tail: String = self.0.chars().skip(count - visible).collect();
        write!(f, "{}{}", "*".repeat(count - visible), tail)
    }
}

impl fmt::Debug for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
