pub mod cards;
pub mod library;
pub mod normalize;
pub mod pack;
pub mod question;
pub mod wrong_set;
