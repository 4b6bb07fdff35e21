pub use super::activity::Entity as Activity;
