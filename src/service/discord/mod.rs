pub mod member;

pub use member::{MemberDirectory, SerenityMemberDirectory};
