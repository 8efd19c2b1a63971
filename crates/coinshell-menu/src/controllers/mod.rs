//! One controller per menu.

pub mod crypto;
pub mod discovery;
pub mod due_diligence;
pub mod overview;
