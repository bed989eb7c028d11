//! Domain objects exchanged with the consent service.
//!
//! # Design
//! Every type implements `Record`: it is built from a loosely-typed JSON
//! object and emits only the fields that carry a value. A `Consent`
//! exclusively owns its `Subject`, `Proof`s and `LegalNotice`s, and those
//! children are always typed values, never raw maps.

mod consent;
mod legal_notice;
mod proof;
mod subject;

pub use consent::Consent;
pub use legal_notice::LegalNotice;
pub use proof::Proof;
pub use subject::Subject;
