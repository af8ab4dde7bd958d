// Text utilities shared by the transform and acquisition stages

pub mod links;
pub mod slug;

pub use links::rewrite_share_link;
pub use slug::slugify;
