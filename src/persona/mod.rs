pub mod api_types;
pub mod client;
pub mod types;

pub use api_types::Ack;
pub use client::{PersonaApi, PersonaClient};
pub use types::{Persona, PersonaFields, Sex};
