pub mod src;

pub use self::src::SrcLoc;

/// Variable names are interned so bindings hash and compare cheaply.
pub type Ident = internment::Intern<String>;
