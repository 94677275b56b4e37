pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;

pub use crate::domain::entities::user::UserIdentity;
pub use r#trait::UserDirectory;
