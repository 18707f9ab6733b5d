//! Plain data records. Each gets a generated builder.

mod archive;

pub use archive::Archive;

#[derive(Debug, Clone, PartialEq)]
pub struct Person;

#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub zip_code: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullName(pub String, pub String);

pub mod geo {
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Point {
        pub x: i32,
        pub y: i32,
    }
}

/// Not a record: its field is private to this module.
#[derive(Debug)]
pub struct Secret {
    value: String,
}

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}
