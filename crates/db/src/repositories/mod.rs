mod character_override_repo;
mod post_repo;

pub use character_override_repo::CharacterOverrideRepo;
pub use post_repo::PostRepo;
